use std::fs;
use std::path::PathBuf;

use wdfilters_analysis::{response, waveform, AnalysisConfig, WaveformConfig};
use wdfilters_circuits::{FilterOrder, FilterType};

fn output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "wdfilters-analysis-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn frequency_responses_for_every_filter() {
    let config = AnalysisConfig {
        fft_order: 10,
        output_dir: output_dir("responses"),
        ..Default::default()
    };
    let written = response::run(&config, &[], &[]).unwrap();
    let names = written
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            "LowPass_1storder_1000Hz.csv",
            "LowPass_2ndorder_1000Hz.csv",
            "HighPass_1storder_1000Hz.csv",
            "HighPass_2ndorder_1000Hz.csv",
            "BandPass_1storder_1000Hz.csv",
            "BandPass_2ndorder_1000Hz.csv",
        ],
        names
    );
    for path in &written {
        assert!(path.starts_with(config.output_dir.join(response::OUTPUT_DIR)));
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(1 + 512, text.lines().count(), "{}", path.display());
    }
    fs::remove_dir_all(&config.output_dir).unwrap();
}

#[test]
fn selected_frequency_response() {
    let config = AnalysisConfig {
        fft_order: 8,
        cutoff: 2500.0,
        output_dir: output_dir("selected"),
        ..Default::default()
    };
    let written =
        response::run(&config, &[FilterType::HighPass], &[FilterOrder::Second]).unwrap();
    assert_eq!(1, written.len());
    assert!(written[0].ends_with("HighPass_2ndorder_2500Hz.csv"));
    fs::remove_dir_all(&config.output_dir).unwrap();
}

#[test]
fn waveform_files() {
    let config = AnalysisConfig {
        output_dir: output_dir("waveform"),
        waveform: WaveformConfig {
            wav: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let written = waveform::run(&config).unwrap();
    let dir = config.output_dir.join(waveform::OUTPUT_DIR);
    let stem = "Sine_440Hz_cutoff1000_diodes2";
    assert_eq!(
        vec![
            dir.join(format!("Input_{stem}.csv")),
            dir.join(format!("DiodeClipper_{stem}.csv")),
            dir.join(format!("Comparison_{stem}.csv")),
            dir.join(format!("Input_{stem}.wav")),
            dir.join(format!("DiodeClipper_{stem}.wav")),
        ],
        written
    );

    let comparison = fs::read_to_string(&written[2]).unwrap();
    let mut lines = comparison.lines();
    assert_eq!(Some("time_s,input,output"), lines.next());
    assert_eq!(480, lines.count());

    let reader = hound::WavReader::open(&written[4]).unwrap();
    assert_eq!(480, reader.len());
    fs::remove_dir_all(&config.output_dir).unwrap();
}
