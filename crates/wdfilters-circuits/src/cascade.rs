//! # Cascades
//!
//! Second-order filters made of two identical first-order stages in series.
use wdfilters_core::dsp::parameter::HasParameters;
use wdfilters_core::dsp::{DSPMeta, DSPProcess};
use wdfilters_core::util::clamp_frequency;

use crate::{
    validate_samplerate, Error, Filter, FilterOrder, FilterParam, FilterType, DEFAULT_CUTOFF,
    DEFAULT_SAMPLERATE,
};

/// Correction applied to the cutoff of each stage so that the -3 dB point of the cascade lands on
/// its cutoff. Low-pass stages are tuned this much higher, high-pass stages this much lower.
pub const CUTOFF_CORRECTION: f64 = 1.553;

/// Two identical first-order stages in series, tuned together.
#[derive(Debug, Clone)]
pub struct Cascade<F> {
    stages: [F; 2],
    samplerate: f64,
    cutoff: f64,
}

impl<F: Filter + Default> Default for Cascade<F> {
    fn default() -> Self {
        Self::new(F::default(), F::default())
    }
}

impl<F: Filter> Cascade<F> {
    /// Create a cascade out of two stages. The stages are retuned to the cascade's own cutoff.
    pub fn new(first: F, second: F) -> Self {
        let mut this = Self {
            stages: [first, second],
            samplerate: DEFAULT_SAMPLERATE,
            cutoff: DEFAULT_CUTOFF,
        };
        this.update_stages();
        this
    }

    /// Access the stages of the cascade, in processing order.
    pub fn stages(&self) -> &[F; 2] {
        &self.stages
    }

    fn stage_cutoff(&self) -> f64 {
        match self.stages[0].filter_type() {
            FilterType::HighPass => self.cutoff / CUTOFF_CORRECTION,
            _ => self.cutoff * CUTOFF_CORRECTION,
        }
    }

    fn update_stages(&mut self) {
        let cutoff = self.stage_cutoff();
        for stage in &mut self.stages {
            stage.set_cutoff(cutoff);
        }
    }
}

impl<F: Filter> DSPMeta for Cascade<F> {
    type Sample = f64;

    fn latency(&self) -> usize {
        self.stages.iter().map(|s| s.latency()).sum()
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

#[profiling::all_functions]
impl<F: Filter> DSPProcess<1, 1> for Cascade<F> {
    fn process(&mut self, x: [Self::Sample; 1]) -> [Self::Sample; 1] {
        let [first, second] = &mut self.stages;
        second.process(first.process(x))
    }
}

impl<F: Filter> HasParameters for Cascade<F> {
    type Name = FilterParam;

    fn set_parameter(&mut self, param: Self::Name, value: f64) {
        if let FilterParam::Cutoff = param {
            self.set_cutoff(value);
        }
    }
}

impl<F: Filter> Filter for Cascade<F> {
    fn prepare(&mut self, samplerate: f64) -> Result<(), Error> {
        self.samplerate = validate_samplerate(samplerate)?;
        tracing::debug!(samplerate, kind = %self.filter_type(), "Preparing cascade");
        for stage in &mut self.stages {
            stage.prepare(samplerate)?;
        }
        self.set_cutoff(self.cutoff);
        Ok(())
    }

    fn set_cutoff(&mut self, freq: f64) {
        self.cutoff = clamp_frequency(self.samplerate, freq);
        self.update_stages();
    }

    fn cutoff(&self) -> f64 {
        self.cutoff
    }

    fn filter_type(&self) -> FilterType {
        self.stages[0].filter_type()
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::Second
    }
}
