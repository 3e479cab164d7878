//! # RC low-pass filters
//!
//! A resistor in series with a capacitor, driven by an ideal voltage source. The output is taken
//! across the capacitor.
use wdfilters_core::dsp::parameter::HasParameters;
use wdfilters_core::dsp::{DSPMeta, DSPProcess};
use wdfilters_core::util::clamp_frequency;
use wdfilters_wdf::dsl::*;
use wdfilters_wdf::{Capacitor, IdealVoltageSource, Inverter, Resistor, Series, WdfModule};

use crate::cascade::Cascade;
use crate::{
    rc_resistance, validate_samplerate, Error, Filter, FilterOrder, FilterParam, FilterType,
    DEFAULT_CUTOFF, DEFAULT_SAMPLERATE, RC_CAPACITANCE,
};

type RcCircuit =
    WdfModule<IdealVoltageSource<f64>, Inverter<Series<Resistor<f64>, Capacitor<f64>>>>;

/// First-order RC low-pass filter.
#[derive(Debug, Clone)]
pub struct RcLowPass {
    circuit: RcCircuit,
    samplerate: f64,
    cutoff: f64,
}

impl Default for RcLowPass {
    fn default() -> Self {
        Self::new()
    }
}

impl RcLowPass {
    /// Create a new low-pass filter, with a cutoff at 1 kHz.
    pub fn new() -> Self {
        let circuit = module(
            ivsource(0.0),
            inverter(series(
                resistor(rc_resistance(DEFAULT_SAMPLERATE, DEFAULT_CUTOFF, RC_CAPACITANCE)),
                capacitor(DEFAULT_SAMPLERATE, RC_CAPACITANCE),
            )),
        );
        Self {
            circuit,
            samplerate: DEFAULT_SAMPLERATE,
            cutoff: DEFAULT_CUTOFF,
        }
    }

    /// Resistance currently tuning the filter (Ohm).
    pub fn resistance(&self) -> f64 {
        self.circuit.leaf.inner.left.r
    }
}

impl DSPMeta for RcLowPass {
    type Sample = f64;

    fn reset(&mut self) {
        self.circuit.reset();
    }
}

#[profiling::all_functions]
impl DSPProcess<1, 1> for RcLowPass {
    fn process(&mut self, [x]: [Self::Sample; 1]) -> [Self::Sample; 1] {
        self.circuit.root.set_voltage(x);
        self.circuit.process_sample();
        [voltage(&self.circuit.leaf.inner.right)]
    }
}

impl HasParameters for RcLowPass {
    type Name = FilterParam;

    fn set_parameter(&mut self, param: Self::Name, value: f64) {
        if let FilterParam::Cutoff = param {
            self.set_cutoff(value);
        }
    }
}

impl Filter for RcLowPass {
    fn prepare(&mut self, samplerate: f64) -> Result<(), Error> {
        self.samplerate = validate_samplerate(samplerate)?;
        tracing::debug!(samplerate, "Preparing first-order low-pass");
        self.circuit.set_samplerate(samplerate);
        self.circuit.reset();
        self.set_cutoff(self.cutoff);
        Ok(())
    }

    fn set_cutoff(&mut self, freq: f64) {
        self.cutoff = clamp_frequency(self.samplerate, freq);
        self.circuit
            .leaf
            .inner
            .left
            .set_resistance(rc_resistance(self.samplerate, self.cutoff, RC_CAPACITANCE));
    }

    fn cutoff(&self) -> f64 {
        self.cutoff
    }

    fn filter_type(&self) -> FilterType {
        FilterType::LowPass
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::First
    }
}

/// Second-order low-pass filter, made of two cascaded first-order stages.
pub type RcLowPass2 = Cascade<RcLowPass>;
