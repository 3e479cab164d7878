use thiserror::Error;

/// Errors raised while running an analysis.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Cannot write WAV file: {0}")]
    Wav(#[from] hound::Error),
    #[error("FFT failed: {0}")]
    Fft(#[from] realfft::FftError),
    #[error(transparent)]
    Filter(#[from] wdfilters_circuits::Error),
    #[error("FFT order {0} out of range, expected 4 to 20")]
    InvalidFftOrder(u32),
}
