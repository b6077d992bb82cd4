use super::CliError;
use super::helpers::{to_json, write_json};
use super::script;
use anyhow::Context;
use dyntax_core::common::SynthesisConfig;
use dyntax_core::extract::LogExtractor;
use dyntax_core::loader::load_source;
use dyntax_core::persistence::save_series_json;
use dyntax_core::plot::{split_state_label, EsaPlot, StateLabelParts};
use dyntax_core::spectrum::{energy_to_wavelength, EsaRecord, TaSeries};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct ExtractArgs {
    /// Q-Chem log file; its name must end in the step number
    #[arg(value_name = "log")]
    log: PathBuf,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// Also write the record's spectrum plot description to this path
    #[arg(long, value_name = "path")]
    plot: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct LoadArgs {
    /// Directory of `<name>_<step><suffix>` logs, a saved `.json` series, or one log
    #[arg(value_name = "source")]
    source: PathBuf,

    /// Save the loaded series as JSON
    #[arg(long, value_name = "out")]
    json: Option<PathBuf>,

    /// Write the saved JSON without indentation
    #[arg(long, requires = "json")]
    compact: bool,
}

#[derive(clap::Args)]
pub(super) struct ScriptArgs {
    /// Job script; relative paths inside it resolve against its directory
    #[arg(value_name = "file")]
    script: PathBuf,
}

#[derive(Debug, Serialize)]
struct TransitionView {
    label: StateLabelParts,
    energy: f64,
    wavelength: f64,
    moment: f64,
}

#[derive(Debug, Serialize)]
struct RecordView {
    time: f64,
    ground_state_multiplicity: u8,
    reference_state: usize,
    transitions: Vec<TransitionView>,
}

impl From<&EsaRecord> for RecordView {
    fn from(record: &EsaRecord) -> Self {
        Self {
            time: record.time(),
            ground_state_multiplicity: record.ground_state_multiplicity(),
            reference_state: record.reference_state_index(),
            transitions: record
                .transitions()
                .map(|(energy, moment, label)| TransitionView {
                    label: split_state_label(label),
                    energy,
                    wavelength: energy_to_wavelength(energy),
                    moment,
                })
                .collect(),
        }
    }
}

pub(super) fn run_extract_command(
    args: ExtractArgs,
    config: &SynthesisConfig,
) -> Result<i32, CliError> {
    let record = LogExtractor::from_config(config).extract_file(&args.log)?;
    println!("{}", to_json(&RecordView::from(&record), args.compact)?);

    if let Some(path) = args.plot {
        let series = TaSeries::new(config.clone())?;
        let plot = EsaPlot::from_record(&series, &record);
        write_json(&path, &plot)?;
    }
    Ok(0)
}

pub(super) fn run_load_command(args: LoadArgs, config: &SynthesisConfig) -> Result<i32, CliError> {
    let mut report = load_source(&args.source, config)?;

    println!(
        "Loaded {} record(s) from '{}'",
        report.loaded,
        args.source.display()
    );
    for skipped in &report.skipped {
        println!(
            "Skipped {}: {}",
            skipped.identifier,
            skipped.error.diagnostic_line()
        );
    }

    match report.series.infer_timestep() {
        Ok(step) => println!("Timestep: {} fs", step),
        Err(error) => println!("Timestep: unavailable ({})", error.message()),
    }

    if let Some(path) = args.json {
        save_series_json(&mut report.series, &path, args.compact)?;
        println!("JSON series: {}", path.display());
    }

    Ok(0)
}

pub(super) fn run_script_command(
    args: ScriptArgs,
    config: &SynthesisConfig,
) -> Result<i32, CliError> {
    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read job script '{}'", args.script.display()))?;
    let base_dir = args
        .script
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();

    let outcome = script::run_script(&source, &base_dir, config)?;
    for path in &outcome.outputs {
        println!("Wrote {}", path.display());
    }
    println!("Executed {} script command(s)", outcome.executed);
    Ok(0)
}
