//! # Diode clipper waveforms
//!
//! A sine wave is run through the diode clipper, and both the input and the output are written out
//! for comparison with a circuit simulation.
use std::f64::consts::TAU;
use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use wdfilters_circuits::clipper::DiodeClipper;
use wdfilters_circuits::Filter;

use crate::{create_output_dir, AnalysisConfig, Error, WaveformConfig};

/// Name of the directory waveforms are written to.
pub const OUTPUT_DIR: &str = "waveform_analysis";

/// Generate a sine wave starting at phase 0.
///
/// # Arguments
///
/// * `frequency`: Frequency of the sine wave (Hz)
/// * `amplitude`: Peak amplitude
/// * `duration`: Duration of the signal (s)
/// * `samplerate`: Sample rate (Hz)
///
/// returns: Vec<f64>
pub fn sine(frequency: f64, amplitude: f64, duration: f64, samplerate: f64) -> Vec<f64> {
    let len = (duration * samplerate).max(0.0) as usize;
    (0..len)
        .map(|i| amplitude * f64::sin(TAU * frequency * i as f64 / samplerate))
        .collect()
}

/// Run a signal through a freshly prepared diode clipper, its parameters applied without
/// smoothing.
pub fn clip(
    input: &[f64],
    samplerate: f64,
    settings: &WaveformConfig,
) -> Result<Vec<f64>, Error> {
    let mut clipper = DiodeClipper::new();
    clipper.prepare(samplerate)?;
    clipper.set_parameters(
        settings.cutoff,
        settings.saturation_current,
        settings.num_diodes,
        true,
    );
    Ok(input.iter().map(|&x| clipper.process_sample(x)).collect())
}

/// Time of each sample of a signal (s).
pub fn time_points(len: usize, samplerate: f64) -> impl Iterator<Item = f64> {
    (0..len).map(move |i| i as f64 / samplerate)
}

/// Common stem of the file names of a waveform analysis, for instance
/// `Sine_440Hz_cutoff1000_diodes2`.
pub fn file_stem(settings: &WaveformConfig) -> String {
    format!(
        "Sine_{}Hz_cutoff{}_diodes{}",
        settings.frequency as i64, settings.cutoff as i64, settings.num_diodes as i64
    )
}

/// Write a single signal as CSV, with a `time_s,amplitude` header.
pub fn write_waveform_csv(
    mut writer: impl Write,
    samplerate: f64,
    signal: &[f64],
) -> io::Result<()> {
    writeln!(writer, "time_s,amplitude")?;
    for (t, x) in time_points(signal.len(), samplerate).zip(signal) {
        writeln!(writer, "{t},{x}")?;
    }
    writer.flush()
}

/// Write an input signal next to the output signal as CSV, with a `time_s,input,output` header.
pub fn write_comparison_csv(
    mut writer: impl Write,
    samplerate: f64,
    input: &[f64],
    output: &[f64],
) -> io::Result<()> {
    writeln!(writer, "time_s,input,output")?;
    for ((t, x), y) in time_points(input.len(), samplerate).zip(input).zip(output) {
        writeln!(writer, "{t},{x},{y}")?;
    }
    writer.flush()
}

/// Write a signal as 16-bit mono PCM. Samples are clamped to [-1, 1] before conversion.
pub fn write_wav<W: Write + Seek>(
    writer: W,
    samplerate: f64,
    signal: &[f64],
) -> Result<(), Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: samplerate.round() as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::new(writer, spec)?;
    for &x in signal {
        writer.write_sample((x.clamp(-1.0, 1.0) * i16::MAX as f64) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

fn write_csv_file(
    path: &Path,
    write: impl FnOnce(BufWriter<File>) -> io::Result<()>,
) -> Result<(), Error> {
    write(BufWriter::new(File::create(path)?))?;
    tracing::info!(path = %path.display(), "Generated waveform");
    Ok(())
}

fn write_wav_file(path: &Path, samplerate: f64, signal: &[f64]) -> Result<(), Error> {
    write_wav(BufWriter::new(File::create(path)?), samplerate, signal)?;
    tracing::info!(path = %path.display(), "Generated WAV file");
    Ok(())
}

/// Run the waveform analysis and write its results under `<output_dir>/waveform_analysis`.
///
/// returns: Paths of the written files.
pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>, Error> {
    let settings = &config.waveform;
    let samplerate = config.samplerate;
    let dir = config.output_dir.join(OUTPUT_DIR);
    create_output_dir(&dir)?;
    tracing::info!(dir = %dir.display(), ?settings, "Generating diode clipper waveforms");

    let input = sine(settings.frequency, settings.amplitude, settings.duration, samplerate);
    let output = clip(&input, samplerate, settings)?;
    let stem = file_stem(settings);

    let mut written = vec![
        dir.join(format!("Input_{stem}.csv")),
        dir.join(format!("DiodeClipper_{stem}.csv")),
        dir.join(format!("Comparison_{stem}.csv")),
    ];
    write_csv_file(&written[0], |w| write_waveform_csv(w, samplerate, &input))?;
    write_csv_file(&written[1], |w| write_waveform_csv(w, samplerate, &output))?;
    write_csv_file(&written[2], |w| write_comparison_csv(w, samplerate, &input, &output))?;

    if settings.wav {
        let input_wav = dir.join(format!("Input_{stem}.wav"));
        let output_wav = dir.join(format!("DiodeClipper_{stem}.wav"));
        write_wav_file(&input_wav, samplerate, &input)?;
        write_wav_file(&output_wav, samplerate, &output)?;
        written.extend([input_wav, output_wav]);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn sine_length_and_shape() {
        let x = sine(1000.0, 0.5, 0.01, 48000.0);
        assert_eq!(480, x.len());
        assert_eq!(0.0, x[0]);
        assert!((x[12] - 0.5).abs() < 1e-12);
        assert!((x[36] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn default_stem() {
        assert_eq!(
            "Sine_440Hz_cutoff1000_diodes2",
            file_stem(&WaveformConfig::default())
        );
    }

    #[test]
    fn clipper_attenuates_loud_sine() {
        let settings = WaveformConfig {
            amplitude: 4.0,
            duration: 0.05,
            ..Default::default()
        };
        let input = sine(settings.frequency, settings.amplitude, settings.duration, 48000.0);
        let output = clip(&input, 48000.0, &settings).unwrap();
        assert_eq!(input.len(), output.len());
        let peak = output.iter().copied().map(f64::abs).fold(0.0, f64::max);
        assert!(peak > 0.3 && peak < 1.5, "{peak}");
    }

    #[test]
    fn comparison_csv_lines() {
        let mut out = Vec::new();
        write_comparison_csv(&mut out, 4.0, &[0.0, 1.0], &[0.0, 0.5]).unwrap();
        assert_eq!(
            "time_s,input,output\n0,0,0\n0.25,1,0.5\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn waveform_csv_lines() {
        let mut out = Vec::new();
        write_waveform_csv(&mut out, 2.0, &[0.25, -0.5]).unwrap();
        assert_eq!(
            "time_s,amplitude\n0,0.25\n0.5,-0.5\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn wav_is_16bit_mono_and_clamped() {
        let mut cursor = Cursor::new(Vec::new());
        write_wav(&mut cursor, 48000.0, &[0.0, 0.5, 2.0, -2.0]).unwrap();
        let bytes = cursor.into_inner();
        assert_eq!(44 + 4 * 2, bytes.len());

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(1, spec.channels);
        assert_eq!(48000, spec.sample_rate);
        assert_eq!(16, spec.bits_per_sample);
        let samples = reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(vec![0, 16383, 32767, -32767], samples);
    }
}
