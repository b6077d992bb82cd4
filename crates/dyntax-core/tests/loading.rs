use dyntax_core::common::{SynthesisConfig, WavelengthRange};
use dyntax_core::domain::DynTaxErrorKind;
use dyntax_core::loader::{load_from_dir, load_source};
use dyntax_core::persistence::{load_series_json, save_series_json};
use std::fs;
use std::path::Path;

const TDDFT_LOG: &str = include_str!("fixtures/geo_20.out");

fn write_trajectory(dir: &Path) {
    fs::write(dir.join("geo_0.out"), TDDFT_LOG).expect("log should be written");
    fs::write(
        dir.join("geo_1.out"),
        TDDFT_LOG.replace("=    4.1000", "=    4.2000"),
    )
    .expect("log should be written");
    fs::write(
        dir.join("geo_2.out"),
        TDDFT_LOG.replace("Transition Moments Between Ground", "Moments Between Ground"),
    )
    .expect("log should be written");
    fs::write(dir.join("README.txt"), "not a log").expect("file should be written");
}

#[test]
fn directory_load_skips_broken_logs_and_sorts_by_time() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    write_trajectory(temp.path());

    let mut report =
        load_from_dir(temp.path(), &SynthesisConfig::default()).expect("directory should load");

    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].identifier.ends_with("geo_2.out"));
    assert_eq!(report.skipped[0].error.kind(), DynTaxErrorKind::MalformedLog);
    assert_eq!(report.skipped[0].error.placeholder(), "INPUT.LOG_TRANSITION_TABLE");

    let times: Vec<f64> = report.series.records().iter().map(|r| r.time()).collect();
    assert_eq!(times, vec![0.0, 0.05]);
    assert!((report.series.infer_timestep().expect("two records") - 0.05).abs() < 1.0e-12);
    assert!((report.series.records()[1].energies()[1] - 1.0).abs() < 1.0e-9);
}

#[test]
fn configured_suffix_selects_other_logs() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    fs::write(temp.path().join("frame_4.log"), TDDFT_LOG).expect("log should be written");
    fs::write(temp.path().join("frame_5.out"), TDDFT_LOG).expect("log should be written");

    let config = SynthesisConfig {
        log_suffix: ".log".to_string(),
        time_per_step: 0.5,
        ..SynthesisConfig::default()
    };
    let mut report = load_from_dir(temp.path(), &config).expect("directory should load");
    assert_eq!(report.loaded, 1);
    assert_eq!(report.series.records()[0].time(), 2.0);
}

#[test]
fn saved_series_reloads_within_tolerance() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    write_trajectory(temp.path());
    let mut report =
        load_from_dir(temp.path(), &SynthesisConfig::default()).expect("directory should load");

    let json_path = temp.path().join("series.json");
    save_series_json(&mut report.series, &json_path, false).expect("series should save");
    let mut reloaded =
        load_series_json(&json_path, SynthesisConfig::default()).expect("series should reload");

    assert_eq!(reloaded, report.series);
    let record = &reloaded.records()[0];
    assert_eq!(record.reference_state_index(), 1);
    assert_eq!(
        record.state_labels(),
        &["S2".to_string(), "S3".to_string(), "S4".to_string()]
    );

    let saved = fs::read_to_string(&json_path).expect("saved file should be readable");
    let value: serde_json::Value = serde_json::from_str(&saved).expect("saved file is JSON");
    assert_eq!(value["esa1"]["time"], 0.05);
    assert_eq!(value["esa0"]["transition_moments"][1], 0.3127);
}

#[test]
fn load_source_dispatches_on_path_kind() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    write_trajectory(temp.path());

    let from_dir = load_source(temp.path(), &SynthesisConfig::default()).expect("directory");
    assert_eq!(from_dir.loaded, 2);

    let single = load_source(temp.path().join("geo_1.out"), &SynthesisConfig::default())
        .expect("single log");
    assert_eq!(single.loaded, 1);
    assert!(single.skipped.is_empty());

    let error = load_source(temp.path().join("geo_2.out"), &SynthesisConfig::default())
        .expect_err("a single broken log is an error");
    assert_eq!(error.placeholder(), "INPUT.LOG_TRANSITION_TABLE");

    fs::write(temp.path().join("bad.json"), "{\"esa0\": 3}").expect("file should be written");
    let error = load_source(temp.path().join("bad.json"), &SynthesisConfig::default())
        .expect_err("malformed JSON");
    assert_eq!(error.kind(), DynTaxErrorKind::Persistence);
    assert_eq!(error.placeholder(), "INPUT.JSON_PARSE");
}

#[test]
fn missing_series_file_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let error = load_series_json(temp.path().join("absent.json"), SynthesisConfig::default())
        .expect_err("absent file");
    assert_eq!(error.kind(), DynTaxErrorKind::Io);
    assert_eq!(error.placeholder(), "IO.JSON_READ");
}

#[test]
fn invalid_settings_stop_every_entry_point() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    write_trajectory(temp.path());
    let json_path = temp.path().join("series.json");
    let mut report =
        load_from_dir(temp.path(), &SynthesisConfig::default()).expect("directory should load");
    save_series_json(&mut report.series, &json_path, false).expect("series should save");

    let reversed = SynthesisConfig {
        wavelength_range: WavelengthRange::new(800.0, 400.0),
        ..SynthesisConfig::default()
    };
    let error = load_from_dir(temp.path(), &reversed).expect_err("reversed range");
    assert_eq!(error.placeholder(), "INPUT.CONFIG_VALUE");
    let error = load_source(temp.path().join("geo_0.out"), &reversed).expect_err("single log");
    assert_eq!(error.placeholder(), "INPUT.CONFIG_VALUE");

    let flat = SynthesisConfig {
        peak_breadth: 0.0,
        ..SynthesisConfig::default()
    };
    let error = load_series_json(&json_path, flat).expect_err("zero breadth");
    assert_eq!(error.kind(), DynTaxErrorKind::InvalidConfiguration);
}
