//! Utilities for all of `wdfilters`.

use crate::Scalar;
use numeric_literals::replace_float_literals;

/// Convert a linear gain into decibels.
///
/// # Arguments
///
/// * `gain`: Linear gain
///
/// returns: T
#[replace_float_literals(T::from_f64(literal))]
pub fn gain_to_db<T: Scalar>(gain: T) -> T {
    20.0 * gain.simd_log10()
}

/// Convert decibels into a linear gain.
///
/// # Arguments
///
/// * `db`: Gain in decibels
///
/// returns: T
#[replace_float_literals(T::from_f64(literal))]
pub fn db_to_gain<T: Scalar>(db: T) -> T {
    10.0.simd_powf(db / 20.0)
}

/// Clamp a frequency to the range usable at the given sample rate: 20 Hz up to 45% of the sample
/// rate. The upper bound keeps the bilinear transform away from Nyquist.
///
/// # Arguments
///
/// * `samplerate`: Sample rate (Hz)
/// * `freq`: Frequency to clamp (Hz)
///
/// returns: f64
///
/// # Examples
///
/// ```
/// use wdfilters_core::util::clamp_frequency;
/// assert_eq!(20.0, clamp_frequency(48000.0, -10.0));
/// assert_eq!(21600.0, clamp_frequency(48000.0, 30000.0));
/// ```
pub fn clamp_frequency(samplerate: f64, freq: f64) -> f64 {
    const MIN_FREQ: f64 = 20.0;
    let max = (0.45 * samplerate).max(MIN_FREQ);
    if freq.is_nan() {
        return MIN_FREQ;
    }
    freq.clamp(MIN_FREQ, max)
}


#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_db_round_trip() {
        assert!((gain_to_db(0.5f64) + 6.0206).abs() < 1e-4);
        assert!((db_to_gain(-3.0103f64) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_frequency_nan() {
        assert_eq!(20.0, clamp_frequency(48000.0, f64::NAN));
        assert_eq!(1000.0, clamp_frequency(48000.0, 1000.0));
    }
}
