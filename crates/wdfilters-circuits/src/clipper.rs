//! # Diode clipper
//!
//! RC low-pass filter loaded by an antiparallel pair of diodes (or chains of diodes). The input
//! drives a resistive voltage source, whose series resistance sets the cutoff together with the
//! capacitor. The diodes sit across the capacitor and clip the output voltage.
use wdfilters_core::dsp::parameter::{HasParameters, SmoothedParam};
use wdfilters_core::dsp::{DSPMeta, DSPProcess};
use wdfilters_core::util::clamp_frequency;
use wdfilters_wdf::dsl::*;
use wdfilters_wdf::{
    Capacitor, DiodePair, Parallel, ResistiveVoltageSource, WdfModule, NUM_DIODES_RANGE,
    SATURATION_CURRENT_RANGE, THERMAL_VOLTAGE,
};

use crate::{
    rc_resistance, validate_samplerate, Error, Filter, FilterOrder, FilterParam, FilterType,
    DEFAULT_CUTOFF,
};

/// Capacitance of the clipper (F).
pub const CAPACITANCE: f64 = 47e-9;
/// Default saturation current of the diodes (A).
pub const DEFAULT_SATURATION_CURRENT: f64 = 2.52e-9;
/// Default number of diodes in series.
pub const DEFAULT_NUM_DIODES: f64 = 2.0;
/// Cutoff the clipper is reset to when prepared (Hz).
pub const PREPARED_CUTOFF: f64 = 500.0;
/// Duration of parameter ramps (ms).
pub const SMOOTHING_MS: f64 = 10.0;

const DEFAULT_SAMPLERATE: f64 = 48000.0;

type ClipperCircuit =
    WdfModule<DiodePair<f64>, Parallel<Capacitor<f64>, ResistiveVoltageSource<f64>>>;

/// Diode clipper.
///
/// Changes to the cutoff and the number of diodes are ramped over 10 ms, multiplicatively for the
/// cutoff and linearly for the number of diodes. Changes to the saturation current apply on the
/// next sample.
#[derive(Debug, Clone)]
pub struct DiodeClipper {
    circuit: ClipperCircuit,
    cutoff: SmoothedParam,
    num_diodes: SmoothedParam,
    isat: f64,
    diode_dirty: bool,
    samplerate: f64,
}

impl Default for DiodeClipper {
    fn default() -> Self {
        Self::new()
    }
}

impl DiodeClipper {
    /// Create a new diode clipper, with a cutoff of 1 kHz and two diodes in each direction.
    pub fn new() -> Self {
        let mut diodes = diode_pair(DEFAULT_SATURATION_CURRENT);
        diodes.set_diode_parameters(
            DEFAULT_SATURATION_CURRENT,
            THERMAL_VOLTAGE,
            DEFAULT_NUM_DIODES,
        );
        let circuit = module(
            diodes,
            parallel(
                capacitor(DEFAULT_SAMPLERATE, CAPACITANCE),
                rvsource(rc_resistance(DEFAULT_SAMPLERATE, DEFAULT_CUTOFF, CAPACITANCE), 0.0),
            ),
        );
        Self {
            circuit,
            cutoff: SmoothedParam::multiplicative(DEFAULT_CUTOFF, DEFAULT_SAMPLERATE, SMOOTHING_MS),
            num_diodes: SmoothedParam::linear(DEFAULT_NUM_DIODES, DEFAULT_SAMPLERATE, SMOOTHING_MS),
            isat: DEFAULT_SATURATION_CURRENT,
            diode_dirty: false,
            samplerate: DEFAULT_SAMPLERATE,
        }
    }

    /// Set the parameters of the clipper.
    ///
    /// # Arguments
    ///
    /// * `cutoff`: Cutoff frequency (Hz), clamped to the usable range
    /// * `isat`: Saturation current of the diodes (A), clamped to `1e-12..=1e-6`
    /// * `num_diodes`: Number of diodes in series in each direction, clamped to `1..=8`
    /// * `force_now`: Jump to the new values instead of ramping to them
    ///
    /// returns: ()
    pub fn set_parameters(&mut self, cutoff: f64, isat: f64, num_diodes: f64, force_now: bool) {
        let cutoff = clamp_frequency(self.samplerate, cutoff);
        let num_diodes = clamp_or_min(num_diodes, NUM_DIODES_RANGE);
        self.isat = clamp_or_min(isat, SATURATION_CURRENT_RANGE);
        self.diode_dirty = true;

        if force_now {
            self.cutoff.set_current_and_target(cutoff);
            self.num_diodes.set_current_and_target(num_diodes);
            self.apply_parameters();
        } else {
            self.cutoff.set_target(cutoff);
            self.num_diodes.set_target(num_diodes);
        }
    }

    /// Set the saturation current of the diodes (A), applied on the next sample.
    pub fn set_saturation_current(&mut self, isat: f64) {
        self.isat = clamp_or_min(isat, SATURATION_CURRENT_RANGE);
        self.diode_dirty = true;
    }

    /// Set the number of diodes in series, ramped to over 10 ms.
    pub fn set_num_diodes(&mut self, num_diodes: f64) {
        self.num_diodes
            .set_target(clamp_or_min(num_diodes, NUM_DIODES_RANGE));
    }

    /// Cutoff currently in use, which lags behind [`Filter::cutoff`] while ramping.
    pub fn smoothed_cutoff(&self) -> f64 {
        self.cutoff.current_value()
    }

    /// Number of diodes currently in use, which lags behind its target while ramping.
    pub fn smoothed_num_diodes(&self) -> f64 {
        self.num_diodes.current_value()
    }

    /// Saturation current of the diodes (A).
    pub fn saturation_current(&self) -> f64 {
        self.isat
    }

    /// Whether a parameter ramp is in progress.
    pub fn is_smoothing(&self) -> bool {
        self.cutoff.is_changing() || self.num_diodes.is_changing()
    }

    fn apply_parameters(&mut self) {
        self.circuit
            .leaf
            .right
            .set_resistance(rc_resistance(self.samplerate, self.cutoff.current_value(), CAPACITANCE));
        self.circuit.root.set_diode_parameters(
            self.isat,
            THERMAL_VOLTAGE,
            self.num_diodes.current_value(),
        );
        self.diode_dirty = false;
    }
}

fn clamp_or_min(value: f64, (min, max): (f64, f64)) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

impl DSPMeta for DiodeClipper {
    type Sample = f64;

    fn reset(&mut self) {
        self.circuit.reset();
        self.cutoff.reset();
        self.num_diodes.reset();
        self.apply_parameters();
    }
}

#[profiling::all_functions]
impl DSPProcess<1, 1> for DiodeClipper {
    fn process(&mut self, [x]: [Self::Sample; 1]) -> [Self::Sample; 1] {
        if self.cutoff.is_changing() {
            let cutoff = self.cutoff.next_sample();
            self.circuit
                .leaf
                .right
                .set_resistance(rc_resistance(self.samplerate, cutoff, CAPACITANCE));
        }
        if self.num_diodes.is_changing() || self.diode_dirty {
            let num_diodes = self.num_diodes.next_sample();
            self.circuit
                .root
                .set_diode_parameters(self.isat, THERMAL_VOLTAGE, num_diodes);
            self.diode_dirty = false;
        }

        self.circuit.leaf.right.set_voltage(x);
        // The capacitor is read once the diodes are solved, before it takes in its new state
        self.circuit.scatter_up();
        let y = voltage(&self.circuit.leaf.left);
        self.circuit.scatter_down();
        [y]
    }
}

impl HasParameters for DiodeClipper {
    type Name = FilterParam;

    fn set_parameter(&mut self, param: Self::Name, value: f64) {
        match param {
            FilterParam::Cutoff => self.set_cutoff(value),
            FilterParam::DiodeSaturation => self.set_saturation_current(value),
            FilterParam::NumDiodes => self.set_num_diodes(value),
            FilterParam::Bandwidth => {}
        }
    }
}

impl Filter for DiodeClipper {
    fn prepare(&mut self, samplerate: f64) -> Result<(), Error> {
        self.samplerate = validate_samplerate(samplerate)?;
        tracing::debug!(samplerate, "Preparing diode clipper");
        self.circuit.set_samplerate(samplerate);
        self.circuit.reset();
        self.cutoff.set_samplerate(samplerate);
        self.num_diodes.set_samplerate(samplerate);
        self.cutoff
            .set_current_and_target(clamp_frequency(samplerate, PREPARED_CUTOFF));
        self.num_diodes.set_current_and_target(DEFAULT_NUM_DIODES);
        self.apply_parameters();
        Ok(())
    }

    fn set_cutoff(&mut self, freq: f64) {
        self.cutoff.set_target(clamp_frequency(self.samplerate, freq));
    }

    fn cutoff(&self) -> f64 {
        self.cutoff.target_value()
    }

    fn filter_type(&self) -> FilterType {
        FilterType::LowPass
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::First
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::{BLUE, RED};
    use std::f64::consts::TAU;
    use wdfilters_core::util::tests::{Plot, Series};

    const FS: f64 = 48000.0;

    fn sine(freq: f64, amplitude: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * f64::sin(TAU * freq * i as f64 / FS))
            .collect()
    }

    #[test]
    fn prepare_resets_to_defaults() {
        let mut clipper = DiodeClipper::new();
        clipper.set_parameters(2000.0, 1e-8, 4.0, true);
        clipper.prepare(FS).unwrap();
        assert_eq!(500.0, clipper.cutoff());
        assert_eq!(500.0, clipper.smoothed_cutoff());
        assert_eq!(2.0, clipper.smoothed_num_diodes());
        assert!(!clipper.is_smoothing());
    }

    #[test]
    fn cutoff_ramps_over_10ms() {
        let mut clipper = DiodeClipper::new();
        clipper.prepare(FS).unwrap();
        clipper.set_parameters(2000.0, DEFAULT_SATURATION_CURRENT, 4.0, false);
        assert_eq!(2000.0, clipper.cutoff());
        assert_eq!(500.0, clipper.smoothed_cutoff());

        clipper.process_sample(0.0);
        let first = clipper.smoothed_cutoff();
        assert!(first > 500.0 && first < 2000.0, "{first}");

        for _ in 1..479 {
            clipper.process_sample(0.0);
        }
        assert!(clipper.is_smoothing());
        clipper.process_sample(0.0);
        assert!(!clipper.is_smoothing());
        assert_eq!(2000.0, clipper.smoothed_cutoff());
        assert_eq!(4.0, clipper.smoothed_num_diodes());
    }

    #[test]
    fn force_now_skips_ramp() {
        let mut clipper = DiodeClipper::new();
        clipper.prepare(FS).unwrap();
        clipper.set_parameters(3000.0, 1e-7, 3.0, true);
        assert!(!clipper.is_smoothing());
        assert_eq!(3000.0, clipper.smoothed_cutoff());
        assert_eq!(3.0, clipper.smoothed_num_diodes());
        assert_eq!(1e-7, clipper.saturation_current());
    }

    #[test]
    fn parameters_are_clamped() {
        let mut clipper = DiodeClipper::new();
        clipper.prepare(FS).unwrap();
        clipper.set_parameters(-10.0, 1.0, 20.0, true);
        assert_eq!(20.0, clipper.cutoff());
        assert_eq!(1e-6, clipper.saturation_current());
        assert_eq!(8.0, clipper.smoothed_num_diodes());
        clipper.set_parameters(30000.0, 0.0, f64::NAN, true);
        assert_eq!(21600.0, clipper.cutoff());
        assert_eq!(1e-12, clipper.saturation_current());
        assert_eq!(1.0, clipper.smoothed_num_diodes());
    }

    #[test]
    fn clips_loud_sine() {
        let mut clipper = DiodeClipper::new();
        clipper.prepare(FS).unwrap();
        clipper.set_parameters(1000.0, DEFAULT_SATURATION_CURRENT, 2.0, true);

        let input = sine(100.0, 1.0, 4800);
        let output = input
            .iter()
            .map(|&x| clipper.process_sample(x))
            .collect::<Vec<_>>();
        let peak = output.iter().copied().map(f64::abs).fold(0.0, f64::max);
        assert!(peak < 0.8, "Output not clipped: {peak}");
        assert!(peak > 0.3, "Output too quiet: {peak}");

        Plot {
            title: "Diode clipper",
            bode: false,
            series: &[
                Series {
                    label: "Input",
                    samplerate: FS,
                    series: &input,
                    color: &BLUE,
                },
                Series {
                    label: "Output",
                    samplerate: FS,
                    series: &output,
                    color: &RED,
                },
            ],
        }
        .create_svg("plots/circuits/diode_clipper.svg");
    }

    #[test]
    fn step_response_starts_from_rest() {
        let mut clipper = DiodeClipper::new();
        clipper.prepare(FS).unwrap();
        clipper.set_parameters(1000.0, DEFAULT_SATURATION_CURRENT, 2.0, true);
        let output = [0.0; 3].map(|_| clipper.process_sample(0.5));
        let expected = [0.0, 0.0615104, 0.1154494];
        for (y, e) in output.into_iter().zip(expected) {
            assert!((y - e).abs() < 1e-5, "{output:?}");
        }
    }

    #[test]
    fn saturation_current_applies_on_next_sample() {
        let run = |isat| {
            let mut clipper = DiodeClipper::new();
            clipper.prepare(FS).unwrap();
            clipper.set_saturation_current(isat);
            (0..480).map(|_| clipper.process_sample(1.0)).last().unwrap()
        };
        // Leakier diodes conduct at lower voltages
        assert!(run(1e-6) < run(1e-9));
    }
}
