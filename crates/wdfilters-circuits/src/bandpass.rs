//! # RC band-pass filters
//!
//! A high-pass stage followed by a low-pass stage, with their cutoffs spread around the center
//! frequency according to the bandwidth.
use wdfilters_core::dsp::parameter::HasParameters;
use wdfilters_core::dsp::{DSPMeta, DSPProcess};
use wdfilters_core::util::clamp_frequency;

use crate::highpass::{RcHighPass, RcHighPass2};
use crate::lowpass::{RcLowPass, RcLowPass2};
use crate::{
    validate_samplerate, Error, Filter, FilterOrder, FilterParam, FilterType, DEFAULT_CUTOFF,
    DEFAULT_SAMPLERATE,
};

/// Bandwidth band-pass filters start with (octaves).
pub const DEFAULT_BANDWIDTH: f64 = 1.0;
/// Narrowest bandwidth allowed (octaves).
pub const MIN_BANDWIDTH: f64 = 0.1;
/// Input gain compensating for the passband loss of first-order band-pass filters.
pub const AUTO_GAIN_FIRST_ORDER: f64 = 1.5;
/// Input gain compensating for the passband loss of second-order band-pass filters.
pub const AUTO_GAIN_SECOND_ORDER: f64 = 1.45;

/// Band-pass filter: a high-pass stage followed by a low-pass stage.
#[derive(Debug, Clone)]
pub struct BandPass<HP, LP> {
    high_pass: HP,
    low_pass: LP,
    samplerate: f64,
    cutoff: f64,
    bandwidth: f64,
    auto_gain: bool,
}

/// First-order band-pass filter.
pub type RcBandPass1 = BandPass<RcHighPass, RcLowPass>;
/// Second-order band-pass filter.
pub type RcBandPass2 = BandPass<RcHighPass2, RcLowPass2>;

impl<HP: Filter + Default, LP: Filter + Default> Default for BandPass<HP, LP> {
    fn default() -> Self {
        Self::new(HP::default(), LP::default())
    }
}

impl<HP: Filter, LP: Filter> BandPass<HP, LP> {
    /// Create a new band-pass filter out of its two stages, which must be of the same order. The
    /// stages are retuned around a center frequency of 1 kHz, with a bandwidth of one octave.
    ///
    /// # Arguments
    ///
    /// * `high_pass`: High-pass stage, processed first
    /// * `low_pass`: Low-pass stage, processed last
    ///
    /// returns: BandPass<HP, LP>
    pub fn new(high_pass: HP, low_pass: LP) -> Self {
        debug_assert_eq!(high_pass.order(), low_pass.order());
        let mut this = Self {
            high_pass,
            low_pass,
            samplerate: DEFAULT_SAMPLERATE,
            cutoff: DEFAULT_CUTOFF,
            bandwidth: DEFAULT_BANDWIDTH,
            auto_gain: true,
        };
        this.update_stages();
        this
    }

    /// Set the bandwidth, in octaves. Bandwidths narrower than 0.1 octave are widened to 0.1.
    pub fn set_bandwidth(&mut self, octaves: f64) {
        self.bandwidth = if octaves.is_nan() {
            MIN_BANDWIDTH
        } else {
            octaves.max(MIN_BANDWIDTH)
        };
        self.update_stages();
    }

    /// Effective bandwidth, in octaves.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Enable or disable the input gain compensating for the passband loss of the cascade.
    pub fn set_auto_gain(&mut self, enabled: bool) {
        self.auto_gain = enabled;
    }

    /// Whether the input gain compensation is applied.
    pub fn auto_gain(&self) -> bool {
        self.auto_gain
    }

    /// High-pass stage, setting the lower edge of the band.
    pub fn high_pass(&self) -> &HP {
        &self.high_pass
    }

    /// Low-pass stage, setting the upper edge of the band.
    pub fn low_pass(&self) -> &LP {
        &self.low_pass
    }

    fn gain(&self) -> f64 {
        if !self.auto_gain {
            return 1.0;
        }
        match self.order() {
            FilterOrder::First => AUTO_GAIN_FIRST_ORDER,
            FilterOrder::Second => AUTO_GAIN_SECOND_ORDER,
        }
    }

    fn update_stages(&mut self) {
        let ratio = f64::powf(2.0, self.bandwidth / 2.0);
        self.high_pass
            .set_cutoff(clamp_frequency(self.samplerate, self.cutoff / ratio));
        self.low_pass
            .set_cutoff(clamp_frequency(self.samplerate, self.cutoff * ratio));
    }
}

impl<HP: Filter, LP: Filter> DSPMeta for BandPass<HP, LP> {
    type Sample = f64;

    fn latency(&self) -> usize {
        self.high_pass.latency() + self.low_pass.latency()
    }

    fn reset(&mut self) {
        self.high_pass.reset();
        self.low_pass.reset();
    }
}

#[profiling::all_functions]
impl<HP: Filter, LP: Filter> DSPProcess<1, 1> for BandPass<HP, LP> {
    fn process(&mut self, [x]: [Self::Sample; 1]) -> [Self::Sample; 1] {
        let x = x * self.gain();
        self.low_pass.process(self.high_pass.process([x]))
    }
}

impl<HP: Filter, LP: Filter> HasParameters for BandPass<HP, LP> {
    type Name = FilterParam;

    fn set_parameter(&mut self, param: Self::Name, value: f64) {
        match param {
            FilterParam::Cutoff => self.set_cutoff(value),
            FilterParam::Bandwidth => self.set_bandwidth(value),
            _ => {}
        }
    }
}

impl<HP: Filter, LP: Filter> Filter for BandPass<HP, LP> {
    fn prepare(&mut self, samplerate: f64) -> Result<(), Error> {
        self.samplerate = validate_samplerate(samplerate)?;
        tracing::debug!(samplerate, order = %self.order(), "Preparing band-pass");
        self.high_pass.prepare(samplerate)?;
        self.low_pass.prepare(samplerate)?;
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
        FilterType::BandPass
    }

    fn order(&self) -> FilterOrder {
        self.high_pass.order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn one_octave_spreads_half_an_octave_each_way() {
        let mut filter = RcBandPass1::default();
        filter.prepare(48000.0).unwrap();
        filter.set_cutoff(1000.0);
        filter.set_bandwidth(1.0);
        let sqrt2 = std::f64::consts::SQRT_2;
        assert!((filter.high_pass().cutoff() - 1000.0 / sqrt2).abs() < 1e-9);
        assert!((filter.low_pass().cutoff() - 1000.0 * sqrt2).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0, MIN_BANDWIDTH)]
    #[case(-3.0, MIN_BANDWIDTH)]
    #[case(f64::NAN, MIN_BANDWIDTH)]
    #[case(2.0, 2.0)]
    fn bandwidth_has_a_floor(#[case] octaves: f64, #[case] expected: f64) {
        let mut filter = RcBandPass2::default();
        filter.set_bandwidth(octaves);
        assert_eq!(expected, filter.bandwidth());
    }

    #[test]
    fn edges_are_clamped_independently() {
        let mut filter = RcBandPass1::default();
        filter.prepare(48000.0).unwrap();
        filter.set_cutoff(100.0);
        filter.set_bandwidth(6.0);
        assert_eq!(20.0, filter.high_pass().cutoff());
        assert!((filter.low_pass().cutoff() - 800.0).abs() < 1e-9);
        assert_eq!(100.0, filter.cutoff());
    }

    #[rstest]
    #[case(FilterOrder::First, RcBandPass1::default().order())]
    #[case(FilterOrder::Second, RcBandPass2::default().order())]
    fn order_follows_stages(#[case] expected: FilterOrder, #[case] actual: FilterOrder) {
        assert_eq!(expected, actual);
    }

    #[test]
    fn auto_gain_scales_input() {
        let mut with_gain = RcBandPass1::default();
        let mut without_gain = RcBandPass1::default();
        without_gain.set_auto_gain(false);
        assert!(with_gain.auto_gain());
        assert!(!without_gain.auto_gain());
        let a = with_gain.process_sample(1.0);
        let b = without_gain.process_sample(1.0);
        assert!((a - 1.5 * b).abs() < 1e-12, "{a} != 1.5 * {b}");
    }
}
