//! Analysis settings, read from a TOML file. Missing keys take their default value.
//!
//! ```toml
//! samplerate = 96000
//! cutoff = 2000
//! output_dir = "out"
//!
//! [waveform]
//! frequency = 220
//! wav = true
//! ```
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use wdfilters_circuits::bandpass::DEFAULT_BANDWIDTH;
use wdfilters_circuits::clipper::{DEFAULT_NUM_DIODES, DEFAULT_SATURATION_CURRENT};

use crate::Error;

/// Allowed FFT orders (the FFT size is `2^order`).
pub const FFT_ORDER_RANGE: RangeInclusive<u32> = 4..=20;

/// Settings shared by all analyses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Sample rate the filters run at (Hz)
    pub samplerate: f64,
    /// FFT size of frequency responses, as a power of two
    pub fft_order: u32,
    /// Cutoff (or center frequency) of the filters (Hz)
    pub cutoff: f64,
    /// Bandwidth of band-pass filters (octaves)
    pub bandwidth: f64,
    /// Duration of audio processed when measuring real-time factors (s)
    pub test_seconds: f64,
    /// Directory the analysis directories are created in
    pub output_dir: PathBuf,
    pub waveform: WaveformConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            samplerate: 48000.0,
            fft_order: 14,
            cutoff: 1000.0,
            bandwidth: DEFAULT_BANDWIDTH,
            test_seconds: 30.0,
            output_dir: PathBuf::from("."),
            waveform: WaveformConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration out of TOML text.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)?;
        config.validate()
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading configuration");
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Check the settings which cannot be clamped.
    pub fn validate(self) -> Result<Self, Error> {
        if !FFT_ORDER_RANGE.contains(&self.fft_order) {
            return Err(Error::InvalidFftOrder(self.fft_order));
        }
        wdfilters_circuits::validate_samplerate(self.samplerate)?;
        Ok(self)
    }
}

/// Settings of the diode clipper waveform analysis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveformConfig {
    /// Frequency of the input sine wave (Hz)
    pub frequency: f64,
    /// Peak amplitude of the input sine wave
    pub amplitude: f64,
    /// Duration of the input (s)
    pub duration: f64,
    /// Cutoff of the clipper (Hz)
    pub cutoff: f64,
    /// Saturation current of the diodes (A)
    pub saturation_current: f64,
    /// Number of diodes in series
    pub num_diodes: f64,
    /// Also write WAV files
    pub wav: bool,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            amplitude: 1.0,
            duration: 0.01,
            cutoff: 1000.0,
            saturation_current: DEFAULT_SATURATION_CURRENT,
            num_diodes: DEFAULT_NUM_DIODES,
            wav: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AnalysisConfig::default(), AnalysisConfig::parse("").unwrap());
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let config = AnalysisConfig::parse(
            r#"
            samplerate = 96000.0
            output_dir = "out"

            [waveform]
            frequency = 220.0
            wav = true
            "#,
        )
        .unwrap();
        assert_eq!(96000.0, config.samplerate);
        assert_eq!(14, config.fft_order);
        assert_eq!(PathBuf::from("out"), config.output_dir);
        assert_eq!(220.0, config.waveform.frequency);
        assert_eq!(2.0, config.waveform.num_diodes);
        assert!(config.waveform.wav);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            AnalysisConfig::parse("sample_rate = 48000.0"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            AnalysisConfig::parse("fft_order = 32"),
            Err(Error::InvalidFftOrder(32))
        ));
        assert!(matches!(
            AnalysisConfig::parse("samplerate = -1.0"),
            Err(Error::Filter(
                wdfilters_circuits::Error::InvalidSampleRate(_)
            ))
        ));
    }
}
