use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wdfilters_analysis::{response, rtf, waveform, AnalysisConfig, Error};
use wdfilters_circuits::{FilterOrder, FilterType};

#[derive(Debug, Parser)]
#[command(name = "wdfilters-analysis", version)]
#[command(about = "Measure the wdfilters circuits and write the results as CSV files")]
struct Cli {
    /// Log debug messages (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// TOML file with analysis settings; command-line flags take precedence
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Directory in which the analysis directories are created
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
    /// Sample rate (Hz)
    #[arg(long, global = true)]
    fs: Option<f64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Frequency responses of the RC filters, from their impulse response
    FrequencyResponse(FrequencyResponseArgs),
    /// Sine wave through the diode clipper
    Waveform(WaveformArgs),
    /// Real-time factor of every filter
    Rtf(RtfArgs),
}

#[derive(Debug, Args)]
struct FrequencyResponseArgs {
    /// Only measure this filter type (lowpass, highpass, bandpass)
    #[arg(long = "type")]
    kind: Option<FilterType>,
    /// Only measure this order (1st, 2nd)
    #[arg(long)]
    order: Option<FilterOrder>,
    /// Cutoff or center frequency (Hz)
    #[arg(long)]
    cutoff: Option<f64>,
    /// Band-pass bandwidth (octaves)
    #[arg(long)]
    bandwidth: Option<f64>,
    /// FFT size as a power of two
    #[arg(long)]
    fft_order: Option<u32>,
}

#[derive(Debug, Args)]
struct WaveformArgs {
    /// Duration of the input (s)
    #[arg(long)]
    duration: Option<f64>,
    /// Frequency of the input sine wave (Hz)
    #[arg(long)]
    freq: Option<f64>,
    /// Peak amplitude of the input
    #[arg(long)]
    amp: Option<f64>,
    /// Cutoff of the clipper (Hz)
    #[arg(long)]
    cutoff: Option<f64>,
    /// Saturation current of the diodes (A)
    #[arg(long = "is")]
    saturation_current: Option<f64>,
    /// Number of diodes in series
    #[arg(long)]
    diodes: Option<f64>,
    /// Also write WAV files
    #[arg(long)]
    wav: bool,
}

#[derive(Debug, Args)]
struct RtfArgs {
    /// Duration of processed audio (s)
    #[arg(long)]
    seconds: Option<f64>,
    /// Cutoff of the filters (Hz)
    #[arg(long)]
    cutoff: Option<f64>,
}

fn override_with<T>(value: &mut T, arg: Option<T>) {
    if let Some(arg) = arg {
        *value = arg;
    }
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig, Error> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    override_with(&mut config.output_dir, cli.output.clone());
    override_with(&mut config.samplerate, cli.fs);
    match &cli.command {
        Command::FrequencyResponse(args) => {
            override_with(&mut config.cutoff, args.cutoff);
            override_with(&mut config.bandwidth, args.bandwidth);
            override_with(&mut config.fft_order, args.fft_order);
        }
        Command::Waveform(args) => {
            let waveform = &mut config.waveform;
            override_with(&mut waveform.duration, args.duration);
            override_with(&mut waveform.frequency, args.freq);
            override_with(&mut waveform.amplitude, args.amp);
            override_with(&mut waveform.cutoff, args.cutoff);
            override_with(&mut waveform.saturation_current, args.saturation_current);
            override_with(&mut waveform.num_diodes, args.diodes);
            waveform.wav |= args.wav;
        }
        Command::Rtf(args) => {
            override_with(&mut config.test_seconds, args.seconds);
            override_with(&mut config.cutoff, args.cutoff);
        }
    }
    config.validate()
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = load_config(&cli)?;
    tracing::debug!(?config, "Loaded configuration");
    match cli.command {
        Command::FrequencyResponse(args) => {
            let kinds = Vec::from_iter(args.kind);
            let orders = Vec::from_iter(args.order);
            let written = response::run(&config, &kinds, &orders)?;
            println!("Generated {} frequency responses", written.len());
        }
        Command::Waveform(_) => {
            for path in waveform::run(&config)? {
                println!("Generated {}", path.display());
            }
        }
        Command::Rtf(_) => {
            let (reports, path) = rtf::run(&config)?;
            for report in &reports {
                println!("{}: RTF = {:.6}", report.label, report.rtf);
            }
            println!("Written to {}", path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "wdfilters-analysis",
            "waveform",
            "--freq",
            "220",
            "--is",
            "1e-8",
            "--wav",
            "--fs",
            "96000",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(96000.0, config.samplerate);
        assert_eq!(220.0, config.waveform.frequency);
        assert_eq!(1e-8, config.waveform.saturation_current);
        assert_eq!(2.0, config.waveform.num_diodes);
        assert!(config.waveform.wav);
    }

    #[test]
    fn filter_names_are_parsed() {
        let cli = Cli::parse_from([
            "wdfilters-analysis",
            "frequency-response",
            "--type",
            "band-pass",
            "--order",
            "2nd",
        ]);
        let Command::FrequencyResponse(args) = cli.command else {
            panic!("Wrong subcommand");
        };
        assert_eq!(Some(FilterType::BandPass), args.kind);
        assert_eq!(Some(FilterOrder::Second), args.order);
    }

    #[test]
    fn invalid_fft_order_is_rejected() {
        let cli = Cli::parse_from(["wdfilters-analysis", "frequency-response", "--fft-order", "2"]);
        assert!(matches!(load_config(&cli), Err(Error::InvalidFftOrder(2))));
    }
}
