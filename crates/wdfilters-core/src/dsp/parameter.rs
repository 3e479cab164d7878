//! Shared values for passing parameters into DSP code.
//!
//! Three pieces live here:
//!
//! - [`SmoothedParam`], fixed-duration ramps evaluated once per sample on the audio thread,
//! - [`ParamName`] and [`HasParameters`], a small vocabulary for naming the parameters of a
//!   processor and setting them by name,
//! - [`ParamsProxy`] and [`RemoteControlled`], the lock-free handoff between control threads
//!   (UI, automation) and the audio thread. Control threads only ever touch atomics in the proxy;
//!   the processor itself is exclusively owned by the audio thread, which pulls pending changes in
//!   at control rate.
use std::borrow::Cow;
use std::marker::PhantomData;
use std::ops;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use portable_atomic::{AtomicBool, AtomicF64};

use crate::dsp::{DSPMeta, DSPProcess};

/// Smallest value a multiplicative ramp will start from or go to.
const MULTIPLICATIVE_FLOOR: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Smoothing {
    Linear,
    Multiplicative,
}

impl Smoothing {
    fn step(self, current: f64, target: f64, steps: usize) -> f64 {
        let steps = steps as f64;
        match self {
            Self::Linear => (target - current) / steps,
            Self::Multiplicative => {
                let from = current.max(MULTIPLICATIVE_FLOOR).ln();
                let to = target.max(MULTIPLICATIVE_FLOOR).ln();
                ((to - from) / steps).exp()
            }
        }
    }

    fn advance(self, current: f64, step: f64) -> f64 {
        match self {
            Self::Linear => current + step,
            Self::Multiplicative => current.max(MULTIPLICATIVE_FLOOR) * step,
        }
    }
}

/// Smoothed parameter. Changes of the target value are ramped over a fixed duration, either
/// linearly or multiplicatively (constant ratio per sample, which sounds linear for frequencies).
///
/// The ramp is only evaluated while it is in progress; once the target is reached,
/// [`Self::next_sample`] returns the target as-is.
#[derive(Debug, Copy, Clone)]
pub struct SmoothedParam {
    target: f64,
    current: f64,
    step: f64,
    countdown: usize,
    ramp_samples: usize,
    duration_ms: f64,
    smoothing: Smoothing,
}

impl DSPMeta for SmoothedParam {
    type Sample = f64;

    fn reset(&mut self) {
        self.current = self.target;
        self.countdown = 0;
    }
}

impl DSPProcess<0, 1> for SmoothedParam {
    #[inline]
    fn process(&mut self, _x: [Self::Sample; 0]) -> [Self::Sample; 1] {
        [self.next_sample()]
    }
}

impl SmoothedParam {
    /// Create a new linearly smoothed parameter.
    ///
    /// # Arguments
    ///
    /// * `initial_value`: Value the parameter starts at, with no ramp in progress.
    /// * `samplerate`: Sample rate at which the smoother will run.
    /// * `duration_ms`: Duration of every ramp, in milliseconds.
    pub fn linear(initial_value: f64, samplerate: f64, duration_ms: f64) -> Self {
        Self::new(initial_value, samplerate, duration_ms, Smoothing::Linear)
    }

    /// Create a new multiplicatively smoothed parameter. Values are expected to be strictly
    /// positive; anything below `1e-9` is ramped as if it were `1e-9`.
    ///
    /// # Arguments
    ///
    /// * `initial_value`: Value the parameter starts at, with no ramp in progress.
    /// * `samplerate`: Sample rate at which the smoother will run.
    /// * `duration_ms`: Duration of every ramp, in milliseconds.
    pub fn multiplicative(initial_value: f64, samplerate: f64, duration_ms: f64) -> Self {
        Self::new(
            initial_value,
            samplerate,
            duration_ms,
            Smoothing::Multiplicative,
        )
    }

    fn new(initial_value: f64, samplerate: f64, duration_ms: f64, smoothing: Smoothing) -> Self {
        Self {
            target: initial_value,
            current: initial_value,
            step: 0.0,
            countdown: 0,
            ramp_samples: Self::ramp_length(samplerate, duration_ms),
            duration_ms,
            smoothing,
        }
    }

    fn ramp_length(samplerate: f64, duration_ms: f64) -> usize {
        let samples = (duration_ms * 1e-3 * samplerate).floor();
        if samples.is_finite() && samples > 0.0 {
            samples as usize
        } else {
            0
        }
    }

    /// Change the sample rate of the smoother. This recomputes the ramp length, and jumps to the
    /// target value, cancelling any ramp in progress.
    pub fn set_samplerate(&mut self, samplerate: f64) {
        self.ramp_samples = Self::ramp_length(samplerate, self.duration_ms);
        self.reset();
    }

    /// Set a new target value. A ramp towards it starts from the current value, and lasts the
    /// configured duration.
    pub fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }
        self.target = target;
        if self.ramp_samples == 0 {
            self.reset();
            return;
        }
        self.countdown = self.ramp_samples;
        self.step = self.smoothing.step(self.current, target, self.ramp_samples);
    }

    /// Jump to the given value immediately, cancelling any ramp in progress.
    pub fn set_current_and_target(&mut self, value: f64) {
        self.target = value;
        self.reset();
    }

    /// Returns the current smoothed value of the parameter.
    pub fn current_value(&self) -> f64 {
        self.current
    }

    /// Returns the value the parameter is ramping towards.
    pub fn target_value(&self) -> f64 {
        self.target
    }

    /// Computes the next sample of the smoother.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        if self.countdown == 0 {
            return self.target;
        }
        self.countdown -= 1;
        self.current = if self.countdown == 0 {
            self.target
        } else {
            self.smoothing.advance(self.current, self.step)
        };
        self.current
    }

    /// Returns true when the smoother is still in the process of ramping towards the target.
    pub fn is_changing(&self) -> bool {
        self.countdown > 0
    }
}

/// Parameter ID alias. Useful for type-erasing parameter names and make communication easier.
pub type ParamId = usize;

/// Trait for types that are parameter names.
///
/// This trait is most easily implemented as an enum of all possible parameters.
pub trait ParamName: Copy {
    /// Total number of elements in this type
    fn count() -> usize;

    /// Construct a [`Self`] from a [`ParamId`] value. The caller is expected to verify `value <
    /// Self::count()`, and so this method is declared as infallible.
    fn from_id(value: ParamId) -> Self;

    /// Construct a [`ParamId`] from this [`Self`].
    ///
    /// Round-trip conversion returns the same name as the one we started with, that is
    /// `Self::from_id(self.into_id()) == self`.
    fn into_id(self) -> ParamId;

    /// Return a user-friendly name for this parameter name.
    fn name(&self) -> Cow<'static, str>;

    /// Create an iterator returning all values for this type, that is, all values converted from
    /// IDs in sequence in the range `0..Self::count()`.
    fn iter() -> impl Iterator<Item = Self> {
        (0..Self::count()).map(Self::from_id)
    }
}

/// Trait of types which have modulatable parameters.
pub trait HasParameters {
    /// Parameter name type
    type Name: ParamName;

    /// Set a new value for the parameter at the given parameter name.
    fn set_parameter(&mut self, param: Self::Name, value: f64);
}

impl<P: HasParameters> HasParameters for &mut P {
    type Name = P::Name;

    fn set_parameter(&mut self, param: Self::Name, value: f64) {
        HasParameters::set_parameter(*self, param, value);
    }
}

/// Specialized map type for storing values associated to parameters.
#[derive(Debug, Clone)]
pub struct ParamMap<P, T> {
    data: Vec<T>,
    __param: PhantomData<P>,
}

impl<P: ParamName, T: Default> Default for ParamMap<P, T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<P: ParamName, T> ops::Index<P> for ParamMap<P, T> {
    type Output = T;

    fn index(&self, index: P) -> &Self::Output {
        &self.data[index.into_id()]
    }
}

impl<P: ParamName, T> ops::IndexMut<P> for ParamMap<P, T> {
    fn index_mut(&mut self, index: P) -> &mut Self::Output {
        &mut self.data[index.into_id()]
    }
}

impl<P: ParamName, T> ParamMap<P, T> {
    /// Create a new parameter map, filled in by the provided closure.
    ///
    /// # Arguments
    ///
    /// * `fill_fn`: Closure which is called for each parameter, and returns the associated value.
    ///
    /// returns: ParamMap<P, T>
    pub fn new(fill_fn: impl FnMut(P) -> T) -> Self {
        Self {
            data: Vec::from_iter(P::iter().map(fill_fn)),
            __param: PhantomData,
        }
    }

    /// Iterate over parameters and references to their values.
    pub fn iter(&self) -> impl '_ + Iterator<Item = (P, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, x)| (P::from_id(i), x))
    }
}

/// Proxy parameter updates to another type. This allows thread-safe control of processors via their
/// parameters.
///
/// Each parameter is stored as an atomic value next to an atomic "changed" flag. Writers publish
/// the value before raising the flag, so a reader which observes the flag always observes the
/// value written with it (or a newer one). Several writes between two reads coalesce into the
/// latest one.
pub struct ParamsProxy<P: ParamName> {
    params: ParamMap<P, AtomicF64>,
    param_changed: ParamMap<P, AtomicBool>,
}

/// Type alias for the type that allows remote control of processors via their parameters.
pub type RemoteControl<P> = Arc<ParamsProxy<P>>;

impl<P: ParamName> ParamsProxy<P> {
    /// Create a new param proxy.
    pub fn new() -> Arc<Self> {
        let params = ParamMap::new(|_| AtomicF64::new(0.0));
        let param_changed = ParamMap::new(|_| AtomicBool::new(false));
        Arc::new(Self {
            params,
            param_changed,
        })
    }

    /// Set a parameter for a remote type.
    ///
    /// # Arguments
    ///
    /// * `param`: Parameter to set
    /// * `value`: Value to set
    ///
    /// returns: ()
    pub fn set_parameter(&self, param: P, value: f64) {
        self.params[param].store(value, Ordering::Release);
        self.param_changed[param].store(true, Ordering::Release);
    }

    /// Returns true if any parameter has a change pending.
    pub fn has_pending_changes(&self) -> bool {
        self.param_changed
            .iter()
            .any(|(_, changed)| changed.load(Ordering::Acquire))
    }

    fn get_update(&self, param: P) -> Option<f64> {
        if self.param_changed[param].swap(false, Ordering::AcqRel) {
            return Some(self.params[param].load(Ordering::Acquire));
        }
        None
    }
}

/// Type which remote controls the type `P` through its [`RemoteControlled::proxy`].
pub struct RemoteControlled<P: HasParameters> {
    /// Remote-controlled type
    pub inner: P,
    /// Remote control proxy, which you can clone and send to another thread.
    pub proxy: RemoteControl<P::Name>,
    update_params_phase: f64,
    update_params_step: f64,
}

impl<P: HasParameters + DSPMeta> DSPMeta for RemoteControlled<P> {
    type Sample = P::Sample;

    fn latency(&self) -> usize {
        self.inner.latency()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

impl<P: HasParameters + DSPProcess<I, O>, const I: usize, const O: usize> DSPProcess<I, O>
    for RemoteControlled<P>
{
    fn process(&mut self, x: [Self::Sample; I]) -> [Self::Sample; O] {
        self.update_params_phase += self.update_params_step;
        if self.update_params_phase >= 1.0 {
            self.update_params_phase -= 1.0;
            self.update_parameters();
        }

        self.inner.process(x)
    }
}

impl<P: HasParameters> RemoteControlled<P> {
    /// Create a new remote, controlling the passed in processor.
    ///
    /// # Arguments
    ///
    /// * `samplerate`: Sample rate at which the processor and remote control will run
    /// * `update_frequency`: Frequency (in Hz) at which the remote control will check for updated
    ///     parameters, and transfer them to the inner processor.
    /// * `inner`: Inner processor, that is going to be controlled by this.
    ///
    /// returns: RemoteControlled<P>
    pub fn new(samplerate: f64, update_frequency: f64, inner: P) -> Self {
        Self {
            inner,
            proxy: ParamsProxy::new(),
            update_params_phase: 0.0,
            update_params_step: update_frequency / samplerate,
        }
    }
}

#[profiling::all_functions]
impl<P: HasParameters> RemoteControlled<P> {
    /// Check for update on all parameters, and transmit them to the inner processor if they have
    /// changed.
    pub fn update_parameters(&mut self) {
        for param in P::Name::iter() {
            if let Some(value) = self.proxy.get_update(param) {
                self.inner.set_parameter(param, value);
            }
        }
    }
}
