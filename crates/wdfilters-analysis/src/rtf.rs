//! # Real-time factors
//!
//! Ratio of the wall-clock time spent processing to the duration of the processed audio, for each
//! filter. Values below 1 mean the filter runs faster than real time.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use wdfilters_circuits::{
    create, create_circuit, AnyFilter, Circuit, Filter, FilterOrder, FilterType,
};
use wdfilters_core::benchmarking::realtime_factor;

use crate::{create_output_dir, AnalysisConfig, Error};

/// Name of the directory real-time factors are written to.
pub const OUTPUT_DIR: &str = "rtf_analysis";

/// Real-time factor of one filter.
#[derive(Debug, Clone, PartialEq)]
pub struct RtfReport {
    /// Name of the filter, for instance `LowPass (1st order)`
    pub label: String,
    /// Wall-clock time over audio time
    pub rtf: f64,
}

fn label(filter: &AnyFilter) -> String {
    match filter.circuit() {
        Circuit::Rc => format!("{} ({} order)", filter.filter_type(), filter.order().ordinal()),
        circuit => circuit.to_string(),
    }
}

/// Filters measured by [`measure_all`]: every RC filter, then the diode clipper.
pub fn filters() -> Result<Vec<AnyFilter>, Error> {
    let mut filters = Vec::with_capacity(7);
    for kind in FilterType::ALL {
        for order in FilterOrder::ALL {
            filters.push(create(kind, order)?);
        }
    }
    filters.push(create_circuit(
        Circuit::DiodeClipper,
        FilterType::LowPass,
        FilterOrder::First,
    )?);
    Ok(filters)
}

/// Measure the real-time factor of every filter, each driven by an impulse for `test_seconds`
/// seconds of audio.
pub fn measure_all(config: &AnalysisConfig) -> Result<Vec<RtfReport>, Error> {
    filters()?
        .into_iter()
        .map(|mut filter| {
            filter.prepare(config.samplerate)?;
            filter.set_cutoff(config.cutoff);
            let label = label(&filter);
            let rtf = realtime_factor(filter, config.samplerate, config.test_seconds);
            tracing::info!(%label, rtf, "Measured real-time factor");
            Ok(RtfReport { label, rtf })
        })
        .collect()
}

/// Write reports as CSV, with a `filter,rtf` header.
pub fn write_csv(mut writer: impl Write, reports: &[RtfReport]) -> io::Result<()> {
    writeln!(writer, "filter,rtf")?;
    for report in reports {
        writeln!(writer, "{},{}", report.label, report.rtf)?;
    }
    writer.flush()
}

/// Measure real-time factors and write them to `<output_dir>/rtf_analysis/rtf.csv`.
///
/// returns: The measured reports and the path of the written file.
pub fn run(config: &AnalysisConfig) -> Result<(Vec<RtfReport>, PathBuf), Error> {
    let dir = config.output_dir.join(OUTPUT_DIR);
    create_output_dir(&dir)?;
    tracing::info!(
        dir = %dir.display(),
        seconds = config.test_seconds,
        samplerate = config.samplerate,
        cutoff = config.cutoff,
        "Analyzing real-time factors"
    );
    let reports = measure_all(config)?;
    let path = dir.join("rtf.csv");
    write_csv(BufWriter::new(File::create(&path)?), &reports)?;
    Ok((reports, path))
}
