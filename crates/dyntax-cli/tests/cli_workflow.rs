use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture_log() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../dyntax-core/tests/fixtures/geo_20.out")
}

fn dyntax(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dyntax"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("dyntax binary should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_trajectory(dir: &Path) {
    let log = fs::read_to_string(fixture_log()).expect("fixture should be readable");
    fs::create_dir_all(dir).expect("trajectory dir should be created");
    fs::write(dir.join("geo_0.out"), &log).expect("log should be written");
    fs::write(dir.join("geo_1.out"), log.replace("=    3.6000", "=    3.7000"))
        .expect("log should be written");
    fs::write(dir.join("geo_2.out"), log.replace("$molecule\n0 1\n", "$molecule\n"))
        .expect("log should be written");
}

#[test]
fn extract_prints_the_record_as_json() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let log = fixture_log();
    let output = dyntax(&["extract", log.to_str().expect("utf-8 path")], temp.path());

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout should be JSON");
    let time = value["time"].as_f64().expect("time");
    assert!((time - 1.0).abs() < 1.0e-12);
    assert_eq!(value["reference_state"], 1);
    assert_eq!(value["transitions"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["transitions"][1]["label"]["symbol"], "S");
    assert_eq!(value["transitions"][1]["label"]["subscript"], "2");
    assert_eq!(value["transitions"][1]["moment"], 0.3127);
}

#[test]
fn malformed_log_exits_with_input_validation_code() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    write_trajectory(temp.path());

    let output = dyntax(&["extract", "geo_2.out"], temp.path());
    assert_eq!(output.status.code(), Some(2));
    let diagnostics = stderr(&output);
    assert!(diagnostics.contains("ERROR: [INPUT.LOG_MULTIPLICITY_MARKER]"));
    assert!(diagnostics.contains("FATAL EXIT CODE: 2"));
}

#[test]
fn load_reports_skips_and_saves_json() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    write_trajectory(&temp.path().join("traj"));

    let output = dyntax(
        &["load", "traj", "--json", "series.json", "--compact"],
        temp.path(),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let summary = stdout(&output);
    assert!(summary.contains("Loaded 2 record(s)"));
    assert!(summary.contains("geo_2.out"));
    assert!(summary.contains("Timestep: 0.05 fs"));

    let saved = fs::read_to_string(temp.path().join("series.json")).expect("saved series");
    assert!(!saved.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&saved).expect("saved JSON");
    assert!(value.get("esa0").is_some());
    assert!(value.get("esa1").is_some());
    assert!(value.get("esa2").is_none());
}

#[test]
fn script_renders_every_output() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    write_trajectory(&temp.path().join("traj"));
    fs::write(
        temp.path().join("job.txt"),
        "\
# full pipeline
load traj
save json to series.json
render ta to ta.json
render every 2 esa to esa.json
slice at 387.45 to mono.json
slice band 387.45 10 to band.json
",
    )
    .expect("script should be written");

    let output = dyntax(&["script", "job.txt"], temp.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Executed 6 script command(s)"));

    let ta: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("ta.json")).expect("ta output"),
    )
    .expect("ta JSON");
    assert_eq!(ta["axes"]["resolution"], 500);
    assert_eq!(ta["grid"]["times"].as_array().map(Vec::len), Some(2));

    let esa: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("esa.json")).expect("esa output"),
    )
    .expect("esa JSON");
    assert_eq!(esa.as_array().map(Vec::len), Some(1));

    let band: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("band.json")).expect("band output"),
    )
    .expect("band JSON");
    assert_eq!(band["kind"], "band");
    assert_eq!(band["samples"], 20);
}

#[test]
fn script_order_errors_stop_before_writing() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    fs::write(temp.path().join("job.txt"), "save json to series.json\n")
        .expect("script should be written");

    let output = dyntax(&["script", "job.txt"], temp.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("[INPUT.SCRIPT_ORDER]"));
    assert!(!temp.path().join("series.json").exists());
}

#[test]
fn invalid_configuration_is_rejected() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    fs::write(
        temp.path().join("dyntax.config"),
        "# broadening\npeak_breadth = 0.0\n",
    )
    .expect("config should be written");
    let log = fixture_log();

    let output = dyntax(
        &[
            "--config",
            "dyntax.config",
            "extract",
            log.to_str().expect("utf-8 path"),
        ],
        temp.path(),
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("[INPUT.CONFIG_VALUE]"));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let output = dyntax(&[], temp.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("[INPUT.CLI_USAGE]"));
}
