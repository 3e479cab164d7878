//! # Frequency responses
//!
//! The response of a filter is measured by running a unit impulse through it, and taking the real
//! FFT of the result.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use realfft::RealFftPlanner;
use wdfilters_circuits::{create, Filter, FilterOrder, FilterType};
use wdfilters_core::util::gain_to_db;

use crate::{create_output_dir, AnalysisConfig, Error};

/// Name of the directory frequency responses are written to.
pub const OUTPUT_DIR: &str = "frequency_responses";

/// Magnitude and phase response of a filter, over the bins `0..N/2` of an `N`-point FFT.
#[derive(Debug, Clone, Default)]
pub struct FrequencyResponse {
    /// Center frequency of each bin (Hz)
    pub frequencies: Vec<f64>,
    /// Magnitude of each bin, normalized so that the loudest bin sits at 0 dB
    pub magnitudes_db: Vec<f64>,
    /// Phase of each bin (degrees)
    pub phases_deg: Vec<f64>,
}

impl FrequencyResponse {
    /// Measure the response of a prepared filter. The filter is not reset before or after.
    ///
    /// # Arguments
    ///
    /// * `filter`: Filter to measure
    /// * `samplerate`: Sample rate the filter was prepared for (Hz)
    /// * `fft_order`: FFT size as a power of two
    ///
    /// returns: Result<FrequencyResponse, Error>
    pub fn measure(
        filter: &mut impl Filter,
        samplerate: f64,
        fft_order: u32,
    ) -> Result<Self, Error> {
        let size = 1usize << fft_order;
        let fft = RealFftPlanner::<f64>::new().plan_fft_forward(size);
        let mut input = fft.make_input_vec();
        for (i, y) in input.iter_mut().enumerate() {
            *y = filter.process_sample(if i == 0 { 1.0 } else { 0.0 });
        }
        let mut spectrum = fft.make_output_vec();
        fft.process(&mut input, &mut spectrum)?;

        let bins = &spectrum[..size / 2];
        let peak = bins.iter().map(|c| c.norm()).fold(0.0, f64::max);
        let reference = if peak > 0.0 { peak } else { 1.0 };
        Ok(Self {
            frequencies: (0..bins.len())
                .map(|i| i as f64 * samplerate / size as f64)
                .collect(),
            magnitudes_db: bins.iter().map(|c| gain_to_db(c.norm() / reference)).collect(),
            phases_deg: bins.iter().map(|c| c.arg().to_degrees()).collect(),
        })
    }

    /// Index of the bin closest to the given frequency.
    pub fn bin_of(&self, freq: f64) -> usize {
        let step = self.frequencies.get(1).copied().unwrap_or(1.0);
        ((freq / step).round() as usize).min(self.frequencies.len().saturating_sub(1))
    }

    /// Write the response as CSV, with a `frequency_hz,magnitude_db,phase_deg` header.
    pub fn write_csv(&self, mut writer: impl Write) -> io::Result<()> {
        writeln!(writer, "frequency_hz,magnitude_db,phase_deg")?;
        for ((f, m), p) in self
            .frequencies
            .iter()
            .zip(&self.magnitudes_db)
            .zip(&self.phases_deg)
        {
            writeln!(writer, "{f},{m},{p}")?;
        }
        writer.flush()
    }
}

/// Name of the CSV file holding the response of the given filter, for instance
/// `LowPass_1storder_1000Hz.csv`.
pub fn file_name(kind: FilterType, order: FilterOrder, cutoff: f64) -> String {
    format!("{kind}_{}order_{}Hz.csv", order.ordinal(), cutoff as i64)
}

/// Measure the frequency responses of the selected filters and write them under
/// `<output_dir>/frequency_responses`. All type and order combinations are measured when none is
/// selected.
///
/// returns: Paths of the written files.
pub fn run(
    config: &AnalysisConfig,
    kinds: &[FilterType],
    orders: &[FilterOrder],
) -> Result<Vec<PathBuf>, Error> {
    let dir = config.output_dir.join(OUTPUT_DIR);
    create_output_dir(&dir)?;
    let kinds: &[FilterType] = if kinds.is_empty() { &FilterType::ALL } else { kinds };
    let orders: &[FilterOrder] = if orders.is_empty() { &FilterOrder::ALL } else { orders };
    tracing::info!(
        dir = %dir.display(),
        samplerate = config.samplerate,
        cutoff = config.cutoff,
        "Generating frequency responses"
    );

    let mut written = Vec::with_capacity(kinds.len() * orders.len());
    for &kind in kinds {
        for &order in orders {
            let mut filter = create(kind, order)?;
            filter.prepare(config.samplerate)?;
            filter.set_cutoff(config.cutoff);
            filter.set_bandwidth(config.bandwidth);
            let response =
                FrequencyResponse::measure(&mut filter, config.samplerate, config.fft_order)?;

            let path = dir.join(file_name(kind, order, config.cutoff));
            response.write_csv(BufWriter::new(File::create(&path)?))?;
            tracing::info!(path = %path.display(), "Generated frequency response");
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn response(kind: FilterType, order: FilterOrder) -> FrequencyResponse {
        let mut filter = create(kind, order).unwrap();
        filter.prepare(48000.0).unwrap();
        filter.set_cutoff(1000.0);
        FrequencyResponse::measure(&mut filter, 48000.0, 14).unwrap()
    }

    #[rstest]
    #[case(FilterType::LowPass, FilterOrder::First, "LowPass_1storder_1000Hz.csv")]
    #[case(FilterType::HighPass, FilterOrder::Second, "HighPass_2ndorder_1000Hz.csv")]
    #[case(FilterType::BandPass, FilterOrder::First, "BandPass_1storder_1000Hz.csv")]
    fn file_names(#[case] kind: FilterType, #[case] order: FilterOrder, #[case] expected: &str) {
        assert_eq!(expected, file_name(kind, order, 1000.0));
    }

    #[test]
    fn bins_cover_up_to_nyquist() {
        let response = response(FilterType::LowPass, FilterOrder::First);
        assert_eq!(8192, response.frequencies.len());
        assert_eq!(8192, response.magnitudes_db.len());
        assert_eq!(0.0, response.frequencies[0]);
        assert!((response.frequencies[1] - 48000.0 / 16384.0).abs() < 1e-12);
        assert!(response.frequencies[8191] < 24000.0);
    }

    #[rstest]
    #[case(FilterType::LowPass, FilterOrder::First)]
    #[case(FilterType::LowPass, FilterOrder::Second)]
    #[case(FilterType::HighPass, FilterOrder::First)]
    #[case(FilterType::HighPass, FilterOrder::Second)]
    fn normalized_to_0db_with_3db_at_cutoff(#[case] kind: FilterType, #[case] order: FilterOrder) {
        let response = response(kind, order);
        let peak = response
            .magnitudes_db
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(peak.abs() < 1e-9, "{peak}");
        let at_cutoff = response.magnitudes_db[response.bin_of(1000.0)];
        assert!((at_cutoff + 3.01).abs() < 0.15, "{kind} {order}: {at_cutoff} dB");
    }

    #[test]
    fn first_order_low_pass_lags_45_degrees_at_cutoff() {
        let response = response(FilterType::LowPass, FilterOrder::First);
        let phase = response.phases_deg[response.bin_of(1000.0)];
        assert!((phase + 45.0).abs() < 2.0, "{phase}");
    }

    #[test]
    fn csv_has_header_and_one_line_per_bin() {
        let response = response(FilterType::BandPass, FilterOrder::Second);
        let mut out = Vec::new();
        response.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(Some("frequency_hz,magnitude_db,phase_deg"), lines.next());
        assert_eq!(8192, lines.clone().count());
        assert!(lines.all(|line| line.split(',').count() == 3));
    }
}
