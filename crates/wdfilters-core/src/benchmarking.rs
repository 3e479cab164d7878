//! Module for benchmarking utilies.

use crate::dsp::DSPProcess;
use std::hint::black_box;
use std::time::Instant;

/// Measure the real-time factor of a mono process: the wall-clock time spent processing divided by
/// the duration of the processed audio. Values below 1 mean the process runs faster than real time.
///
/// The process is driven by a unit impulse followed by silence, so that it has some actual work to
/// do without the input itself costing anything.
///
/// # Arguments
///
/// * `dsp`: Process to measure
/// * `samplerate`: Sample rate the process is running at
/// * `seconds`: Duration of audio to process
///
/// returns: f64
pub fn realtime_factor<P: DSPProcess<1, 1, Sample = f64>>(
    mut dsp: P,
    samplerate: f64,
    seconds: f64,
) -> f64 {
    let total_samples = (seconds * samplerate).max(1.0) as usize;
    let start = Instant::now();
    for n in 0..total_samples {
        let x = if n == 0 { 1.0 } else { 0.0 };
        black_box(black_box(&mut dsp).process([black_box(x)]));
    }
    let wall = start.elapsed().as_secs_f64();
    wall * samplerate / total_samples as f64
}
