#![warn(missing_docs)]
//! # Circuits for `wdfilters`
//!
//! Analog filter circuits built as wave digital filters: first-order RC low-pass and high-pass
//! filters, their two-stage cascades, band-pass filters made of a high-pass stage followed by a
//! low-pass stage, and a diode clipper.
//!
//! Every circuit implements [`Filter`], and can be created from its type and order through
//! [`create`], which returns the closed [`AnyFilter`] enum.
//!
//! ```
//! use wdfilters_circuits::{create, Filter, FilterOrder, FilterType};
//!
//! let mut filter = create(FilterType::LowPass, FilterOrder::First).unwrap();
//! filter.prepare(48000.0).unwrap();
//! filter.set_cutoff(1000.0);
//! let y = filter.process_sample(1.0);
//! assert!(y > 0.0 && y < 1.0);
//! ```
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use wdfilters_core::dsp::parameter::{HasParameters, ParamId, ParamName};
use wdfilters_core::dsp::{DSPMeta, DSPProcess};

pub mod bandpass;
pub mod cascade;
pub mod clipper;
pub mod highpass;
pub mod lowpass;

use bandpass::{RcBandPass1, RcBandPass2};
use clipper::DiodeClipper;
use highpass::{RcHighPass, RcHighPass2};
use lowpass::{RcLowPass, RcLowPass2};

/// Sample rate filters run at until [`Filter::prepare`] is called (Hz).
pub const DEFAULT_SAMPLERATE: f64 = 44100.0;
/// Cutoff filters start with (Hz).
pub const DEFAULT_CUTOFF: f64 = 1000.0;
/// Capacitance of the RC filters (F).
pub const RC_CAPACITANCE: f64 = 100e-9;

/// Resistance which, paired with the capacitance `c`, puts the cutoff of an RC filter at `cutoff`.
///
/// The capacitor is discretized with the bilinear transform, so the resistance is prewarped to
/// land the -3 dB point of the digital filter exactly on `cutoff`, at any sample rate.
///
/// # Arguments
///
/// * `samplerate`: Sample rate (Hz)
/// * `cutoff`: Cutoff frequency (Hz)
/// * `c`: Capacitance (F)
///
/// returns: f64
pub fn rc_resistance(samplerate: f64, cutoff: f64, c: f64) -> f64 {
    let warped = f64::tan(std::f64::consts::PI * cutoff / samplerate);
    (2.0 * samplerate * warped * c).recip()
}

/// Errors of the filter circuits. None of them can happen on the audio path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Sample rates need to be finite and strictly positive.
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),
    /// The circuit does not exist with this type and order.
    #[error("Unsupported filter: {circuit} {kind} of order {order}")]
    Unsupported {
        /// Requested circuit
        circuit: Circuit,
        /// Requested filter type
        kind: FilterType,
        /// Requested filter order
        order: FilterOrder,
    },
    /// Name of a filter type that could not be parsed.
    #[error("Unknown filter type: {0:?}")]
    UnknownFilterType(String),
    /// Name of a filter order that could not be parsed.
    #[error("Unknown filter order: {0:?}")]
    UnknownFilterOrder(String),
    /// Name of a circuit that could not be parsed.
    #[error("Unknown circuit: {0:?}")]
    UnknownCircuit(String),
}

/// Check that a sample rate can be used to discretize circuits.
pub fn validate_samplerate(samplerate: f64) -> Result<f64, Error> {
    if samplerate.is_finite() && samplerate > 0.0 {
        Ok(samplerate)
    } else {
        Err(Error::InvalidSampleRate(samplerate))
    }
}

fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Response type of a filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// Passes frequencies below the cutoff
    LowPass,
    /// Passes frequencies above the cutoff
    HighPass,
    /// Passes frequencies around the cutoff
    BandPass,
}

impl FilterType {
    /// All filter types
    pub const ALL: [Self; 3] = [Self::LowPass, Self::HighPass, Self::BandPass];
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LowPass => "LowPass",
            Self::HighPass => "HighPass",
            Self::BandPass => "BandPass",
        })
    }
}

impl FromStr for FilterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "lowpass" | "lp" => Ok(Self::LowPass),
            "highpass" | "hp" => Ok(Self::HighPass),
            "bandpass" | "bp" => Ok(Self::BandPass),
            _ => Err(Error::UnknownFilterType(s.to_string())),
        }
    }
}

/// Order of a filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterOrder {
    /// One reactive element per path, 6 dB/octave slopes
    First,
    /// Two cascaded first-order sections, 12 dB/octave slopes
    Second,
}

impl FilterOrder {
    /// All filter orders
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// Short ordinal of the order, `1st` or `2nd`.
    pub fn ordinal(&self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
        }
    }
}

impl fmt::Display for FilterOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ordinal())
    }
}

impl FromStr for FilterOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "1" | "1st" | "first" => Ok(Self::First),
            "2" | "2nd" | "second" => Ok(Self::Second),
            _ => Err(Error::UnknownFilterOrder(s.to_string())),
        }
    }
}

/// Circuit family a filter is built from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Circuit {
    /// Resistor/capacitor networks
    #[default]
    Rc,
    /// RC low-pass loaded by an antiparallel diode pair
    DiodeClipper,
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rc => "RC",
            Self::DiodeClipper => "DiodeClipper",
        })
    }
}

impl FromStr for Circuit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "rc" => Ok(Self::Rc),
            "diodeclipper" | "clipper" | "diode" => Ok(Self::DiodeClipper),
            _ => Err(Error::UnknownCircuit(s.to_string())),
        }
    }
}

/// Names of the parameters filters can be controlled with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterParam {
    /// Cutoff, or center frequency of band-pass filters (Hz)
    Cutoff,
    /// Bandwidth of band-pass filters (octaves)
    Bandwidth,
    /// Saturation current of the diodes of the diode clipper (A)
    DiodeSaturation,
    /// Number of diodes in series in the diode clipper
    NumDiodes,
}

impl ParamName for FilterParam {
    fn count() -> usize {
        4
    }

    fn from_id(value: ParamId) -> Self {
        match value {
            0 => Self::Cutoff,
            1 => Self::Bandwidth,
            2 => Self::DiodeSaturation,
            3 => Self::NumDiodes,
            _ => unreachable!("Invalid parameter id {value}"),
        }
    }

    fn into_id(self) -> ParamId {
        self as _
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Self::Cutoff => "Cutoff",
            Self::Bandwidth => "Bandwidth",
            Self::DiodeSaturation => "Diode Saturation Current",
            Self::NumDiodes => "Number of Diodes",
        })
    }
}

/// Uniform control surface of every filter circuit.
///
/// Filters are constructed with their wiring fixed, then [`Self::prepare`]d for a sample rate
/// before being run sample by sample. Setters clamp out-of-range values instead of failing, and
/// can be interleaved with processing; they must however be called from the thread processing the
/// filter. Use [`wdfilters_core::dsp::parameter::RemoteControlled`] to control a filter from
/// another thread.
pub trait Filter:
    DSPMeta<Sample = f64> + DSPProcess<1, 1> + HasParameters<Name = FilterParam>
{
    /// Prepare the filter for running at the given sample rate. This resets the state of the
    /// circuit and its smoothers; calling it several times in a row is the same as calling it once.
    ///
    /// # Arguments
    ///
    /// * `samplerate`: New sample rate (Hz), needs to be finite and strictly positive.
    ///
    /// returns: Result<(), Error>
    fn prepare(&mut self, samplerate: f64) -> Result<(), Error>;

    /// Set the cutoff frequency, clamped to the range given by
    /// [`wdfilters_core::util::clamp_frequency`].
    fn set_cutoff(&mut self, freq: f64);

    /// Effective cutoff frequency, after clamping.
    fn cutoff(&self) -> f64;

    /// Response type of the filter.
    fn filter_type(&self) -> FilterType;

    /// Order of the filter.
    fn order(&self) -> FilterOrder;

    /// Process a single sample.
    #[inline]
    fn process_sample(&mut self, x: f64) -> f64 {
        let [y] = self.process([x]);
        y
    }
}

/// Any of the filters provided by this crate, with static dispatch.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum AnyFilter {
    /// First-order low-pass
    LowPassFirst(RcLowPass),
    /// Second-order low-pass
    LowPassSecond(RcLowPass2),
    /// First-order high-pass
    HighPassFirst(RcHighPass),
    /// Second-order high-pass
    HighPassSecond(RcHighPass2),
    /// First-order band-pass
    BandPassFirst(RcBandPass1),
    /// Second-order band-pass
    BandPassSecond(RcBandPass2),
    /// Diode clipper
    DiodeClipper(DiodeClipper),
}

macro_rules! dispatch {
    ($this:expr, $filter:ident => $body:expr) => {
        match $this {
            AnyFilter::LowPassFirst($filter) => $body,
            AnyFilter::LowPassSecond($filter) => $body,
            AnyFilter::HighPassFirst($filter) => $body,
            AnyFilter::HighPassSecond($filter) => $body,
            AnyFilter::BandPassFirst($filter) => $body,
            AnyFilter::BandPassSecond($filter) => $body,
            AnyFilter::DiodeClipper($filter) => $body,
        }
    };
}

impl AnyFilter {
    /// Circuit family of this filter.
    pub fn circuit(&self) -> Circuit {
        match self {
            Self::DiodeClipper(_) => Circuit::DiodeClipper,
            _ => Circuit::Rc,
        }
    }

    /// Set the bandwidth (in octaves) of band-pass filters. Does nothing on other filters.
    pub fn set_bandwidth(&mut self, octaves: f64) {
        self.set_parameter(FilterParam::Bandwidth, octaves);
    }
}

impl DSPMeta for AnyFilter {
    type Sample = f64;

    fn latency(&self) -> usize {
        dispatch!(self, f => f.latency())
    }

    fn reset(&mut self) {
        dispatch!(self, f => f.reset())
    }
}

impl DSPProcess<1, 1> for AnyFilter {
    #[inline]
    fn process(&mut self, x: [Self::Sample; 1]) -> [Self::Sample; 1] {
        dispatch!(self, f => f.process(x))
    }
}

impl HasParameters for AnyFilter {
    type Name = FilterParam;

    fn set_parameter(&mut self, param: Self::Name, value: f64) {
        dispatch!(self, f => f.set_parameter(param, value))
    }
}

impl Filter for AnyFilter {
    fn prepare(&mut self, samplerate: f64) -> Result<(), Error> {
        dispatch!(self, f => f.prepare(samplerate))
    }

    fn set_cutoff(&mut self, freq: f64) {
        dispatch!(self, f => f.set_cutoff(freq))
    }

    fn cutoff(&self) -> f64 {
        dispatch!(self, f => f.cutoff())
    }

    fn filter_type(&self) -> FilterType {
        dispatch!(self, f => f.filter_type())
    }

    fn order(&self) -> FilterOrder {
        dispatch!(self, f => f.order())
    }
}

/// Create an RC filter of the given type and order.
///
/// # Arguments
///
/// * `kind`: Response type of the filter
/// * `order`: Order of the filter
///
/// returns: Result<AnyFilter, Error>
pub fn create(kind: FilterType, order: FilterOrder) -> Result<AnyFilter, Error> {
    create_circuit(Circuit::Rc, kind, order)
}

/// Create a filter from the given circuit family, type and order. Combinations which do not exist
/// return [`Error::Unsupported`]; the only diode clipper is a first-order low-pass.
///
/// # Arguments
///
/// * `circuit`: Circuit family of the filter
/// * `kind`: Response type of the filter
/// * `order`: Order of the filter
///
/// returns: Result<AnyFilter, Error>
pub fn create_circuit(
    circuit: Circuit,
    kind: FilterType,
    order: FilterOrder,
) -> Result<AnyFilter, Error> {
    use FilterOrder::*;
    use FilterType::*;
    let filter = match (circuit, kind, order) {
        (Circuit::Rc, LowPass, First) => AnyFilter::LowPassFirst(RcLowPass::new()),
        (Circuit::Rc, LowPass, Second) => AnyFilter::LowPassSecond(RcLowPass2::default()),
        (Circuit::Rc, HighPass, First) => AnyFilter::HighPassFirst(RcHighPass::new()),
        (Circuit::Rc, HighPass, Second) => AnyFilter::HighPassSecond(RcHighPass2::default()),
        (Circuit::Rc, BandPass, First) => AnyFilter::BandPassFirst(RcBandPass1::default()),
        (Circuit::Rc, BandPass, Second) => AnyFilter::BandPassSecond(RcBandPass2::default()),
        (Circuit::DiodeClipper, LowPass, First) => AnyFilter::DiodeClipper(DiodeClipper::new()),
        (circuit, kind, order) => {
            tracing::error!(%circuit, %kind, %order, "Unsupported filter requested");
            return Err(Error::Unsupported {
                circuit,
                kind,
                order,
            });
        }
    };
    tracing::debug!(%circuit, %kind, %order, "Created filter");
    Ok(filter)
}
