//! # Offline analysis of wdfilters circuits
//!
//! Measurements written as CSV files (and optionally WAV files), meant to be compared against
//! circuit simulations:
//!
//! - [`response`]: magnitude and phase response of every filter, from its impulse response
//! - [`waveform`]: a sine wave run through the diode clipper
//! - [`rtf`]: real-time factor of every filter
use std::fs;
use std::path::Path;

pub use config::{AnalysisConfig, WaveformConfig};
pub use error::Error;

pub mod config;
pub mod error;
pub mod response;
pub mod rtf;
pub mod waveform;

/// Create the output directory (and its parents) when it does not exist yet.
pub fn create_output_dir(path: &Path) -> Result<(), Error> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
        tracing::debug!(path = %path.display(), "Created output directory");
    }
    Ok(())
}
