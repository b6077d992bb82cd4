//! Line-oriented job scripts.
//!
//! ```text
//! # comment
//! load traj/              (or: read series.json)
//! save json to series.json [compact]
//! render ta to ta.json
//! render all esa to esa.json
//! render every 10 esa to esa_sparse.json
//! slice at 620 to trace.json
//! slice band 620 15 to band.json
//! ```
//!
//! The whole script is parsed before anything runs, so a typo on the last
//! line fails without side effects.

use super::helpers::write_json;
use dyntax_core::common::SynthesisConfig;
use dyntax_core::domain::{DynTaxError, DynTaxResult};
use dyntax_core::loader::load_source;
use dyntax_core::persistence::save_series_json;
use dyntax_core::plot::{esa_plots, TaPlot, TracePlot};
use dyntax_core::spectrum::TaSeries;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub(super) enum ScriptCommand {
    Load(PathBuf),
    SaveJson { path: PathBuf, compact: bool },
    RenderTa(PathBuf),
    RenderEsa { stride: usize, path: PathBuf },
    SliceAt { wavelength: f64, path: PathBuf },
    SliceBand { wavelength: f64, span: f64, path: PathBuf },
}

impl ScriptCommand {
    fn needs_series(&self) -> bool {
        !matches!(self, Self::Load(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct ScriptLine {
    pub number: usize,
    pub command: ScriptCommand,
}

#[derive(Debug, Default)]
pub(super) struct ScriptOutcome {
    pub executed: usize,
    pub outputs: Vec<PathBuf>,
}

fn syntax_error(number: usize, line: &str, detail: &str) -> DynTaxError {
    DynTaxError::script(
        "INPUT.SCRIPT_SYNTAX",
        format!("script line {}: {} in '{}'", number, detail, line.trim()),
    )
}

fn parse_number<T: std::str::FromStr>(
    number: usize,
    line: &str,
    token: &str,
    what: &str,
) -> DynTaxResult<T> {
    token
        .parse::<T>()
        .map_err(|_| syntax_error(number, line, &format!("'{}' is not a valid {}", token, what)))
}

/// Parses one line; blank and comment-only lines give `None`.
pub(super) fn parse_line(number: usize, line: &str) -> DynTaxResult<Option<ScriptCommand>> {
    let content = line.split('#').next().unwrap_or_default();
    let tokens: Vec<&str> = content.split_whitespace().collect();

    let command = match tokens.as_slice() {
        [] => return Ok(None),
        ["load" | "read", source] => ScriptCommand::Load(PathBuf::from(*source)),
        ["save", "json", "to", path] => ScriptCommand::SaveJson {
            path: PathBuf::from(*path),
            compact: false,
        },
        ["save", "json", "to", path, "compact"] => ScriptCommand::SaveJson {
            path: PathBuf::from(*path),
            compact: true,
        },
        ["render", "ta", "to", path] => ScriptCommand::RenderTa(PathBuf::from(*path)),
        ["render", "all", "esa", "to", path] => ScriptCommand::RenderEsa {
            stride: 1,
            path: PathBuf::from(*path),
        },
        ["render", "every", stride, "esa", "to", path] => {
            let stride: usize = parse_number(number, line, stride, "stride")?;
            if stride == 0 {
                return Err(syntax_error(number, line, "stride must be at least 1"));
            }
            ScriptCommand::RenderEsa {
                stride,
                path: PathBuf::from(*path),
            }
        }
        ["slice", "at", wavelength, "to", path] => ScriptCommand::SliceAt {
            wavelength: parse_number(number, line, wavelength, "wavelength")?,
            path: PathBuf::from(*path),
        },
        ["slice", "band", wavelength, span, "to", path] => ScriptCommand::SliceBand {
            wavelength: parse_number(number, line, wavelength, "wavelength")?,
            span: parse_number(number, line, span, "span")?,
            path: PathBuf::from(*path),
        },
        _ => return Err(syntax_error(number, line, "unrecognized command")),
    };

    Ok(Some(command))
}

pub(super) fn parse_script(source: &str) -> DynTaxResult<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let number = index + 1;
        if let Some(command) = parse_line(number, line)? {
            lines.push(ScriptLine { number, command });
        }
    }
    Ok(lines)
}

struct ScriptSession<'a> {
    base_dir: &'a Path,
    config: &'a SynthesisConfig,
    series: Option<TaSeries>,
    outcome: ScriptOutcome,
}

impl ScriptSession<'_> {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn execute(&mut self, line: &ScriptLine) -> DynTaxResult<()> {
        if line.command.needs_series() && self.series.is_none() {
            return Err(DynTaxError::script(
                "INPUT.SCRIPT_ORDER",
                format!(
                    "script line {}: nothing is loaded yet; add a 'load' line first",
                    line.number
                ),
            ));
        }

        match &line.command {
            ScriptCommand::Load(source) => {
                let report = load_source(self.resolve(source), self.config)?;
                for skipped in &report.skipped {
                    warn!(
                        line = line.number,
                        identifier = %skipped.identifier,
                        "log skipped: {}",
                        skipped.error.message()
                    );
                }
                self.series = Some(report.series);
            }
            ScriptCommand::SaveJson { path, compact } => {
                let path = self.resolve(path);
                save_series_json(self.series_mut()?, &path, *compact)?;
                self.outcome.outputs.push(path);
            }
            ScriptCommand::RenderTa(path) => {
                let path = self.resolve(path);
                let plot = TaPlot::from_series(self.series_mut()?);
                write_json(&path, &plot)?;
                self.outcome.outputs.push(path);
            }
            ScriptCommand::RenderEsa { stride, path } => {
                let path = self.resolve(path);
                let plots = esa_plots(self.series_mut()?, *stride)?;
                write_json(&path, &plots)?;
                self.outcome.outputs.push(path);
            }
            ScriptCommand::SliceAt { wavelength, path } => {
                let path = self.resolve(path);
                let trace = TracePlot::Mono(self.series_mut()?.mono_slice(*wavelength));
                write_json(&path, &trace)?;
                self.outcome.outputs.push(path);
            }
            ScriptCommand::SliceBand {
                wavelength,
                span,
                path,
            } => {
                let path = self.resolve(path);
                let trace = TracePlot::Band(self.series_mut()?.band_slice(*wavelength, *span)?);
                write_json(&path, &trace)?;
                self.outcome.outputs.push(path);
            }
        }

        info!(line = line.number, command = ?line.command, "script command done");
        self.outcome.executed += 1;
        Ok(())
    }

    fn series_mut(&mut self) -> DynTaxResult<&mut TaSeries> {
        self.series.as_mut().ok_or_else(|| {
            DynTaxError::script("INPUT.SCRIPT_ORDER", "nothing is loaded yet")
        })
    }
}

/// Parses and runs `source`; relative paths resolve against `base_dir`.
pub(super) fn run_script(
    source: &str,
    base_dir: &Path,
    config: &SynthesisConfig,
) -> DynTaxResult<ScriptOutcome> {
    let lines = parse_script(source)?;
    let mut session = ScriptSession {
        base_dir,
        config,
        series: None,
        outcome: ScriptOutcome::default(),
    };
    for line in &lines {
        session.execute(line)?;
    }
    Ok(session.outcome)
}

#[cfg(test)]
mod tests {
    use super::{parse_line, parse_script, run_script, ScriptCommand};
    use dyntax_core::common::SynthesisConfig;
    use dyntax_core::domain::DynTaxErrorKind;
    use dyntax_core::persistence::save_series_json;
    use dyntax_core::spectrum::{EsaRecord, TaSeries};
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn commands_parse_with_comments_and_blank_lines() {
        assert_eq!(parse_line(1, "   ").expect("blank"), None);
        assert_eq!(parse_line(2, "# only a comment").expect("comment"), None);
        assert_eq!(
            parse_line(3, "read traj # trajectory").expect("read"),
            Some(ScriptCommand::Load(PathBuf::from("traj")))
        );
        assert_eq!(
            parse_line(4, "save json to out.json compact").expect("save"),
            Some(ScriptCommand::SaveJson {
                path: PathBuf::from("out.json"),
                compact: true,
            })
        );
        assert_eq!(
            parse_line(5, "render every 3 esa to esa.json").expect("render"),
            Some(ScriptCommand::RenderEsa {
                stride: 3,
                path: PathBuf::from("esa.json"),
            })
        );
        assert_eq!(
            parse_line(6, "slice band 620 12.5 to band.json").expect("band"),
            Some(ScriptCommand::SliceBand {
                wavelength: 620.0,
                span: 12.5,
                path: PathBuf::from("band.json"),
            })
        );
    }

    #[test]
    fn syntax_errors_report_the_line_number() {
        let error = parse_script("load traj\nslice at blue to x.json\n")
            .expect_err("bad wavelength");
        assert_eq!(error.kind(), DynTaxErrorKind::Script);
        assert_eq!(error.placeholder(), "INPUT.SCRIPT_SYNTAX");
        assert!(error.message().contains("line 2"));

        let error = parse_line(7, "render every 0 esa to x.json").expect_err("zero stride");
        assert!(error.message().contains("line 7"));

        let error = parse_line(8, "plot everything").expect_err("unknown command");
        assert_eq!(error.placeholder(), "INPUT.SCRIPT_SYNTAX");
    }

    #[test]
    fn rendering_before_loading_is_an_order_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let error = run_script("render ta to ta.json\n", temp.path(), &SynthesisConfig::default())
            .expect_err("nothing loaded");
        assert_eq!(error.placeholder(), "INPUT.SCRIPT_ORDER");
        assert!(error.message().contains("line 1"));
        assert!(!temp.path().join("ta.json").exists());
    }

    #[test]
    fn script_runs_against_a_saved_series() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let mut series = TaSeries::default();
        for step in 0..3 {
            series.add(
                EsaRecord::with_default_labels(step as f64 * 0.05, 1, vec![2.0], vec![1.0])
                    .expect("record should validate"),
            );
        }
        save_series_json(&mut series, temp.path().join("series.json"), false)
            .expect("series should save");

        let script = "\
read series.json
render ta to ta.json
render all esa to esa.json
slice at 619.9205 to mono.json
slice band 619.9205 0 to band.json
save json to copy.json compact
";
        let outcome = run_script(script, temp.path(), &SynthesisConfig::default())
            .expect("script should run");
        assert_eq!(outcome.executed, 6);
        assert_eq!(outcome.outputs.len(), 5);

        let mono: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("mono.json")).expect("mono output"),
        )
        .expect("mono JSON");
        assert_eq!(mono["kind"], "mono");
        let first = mono["points"][0]["intensity"].as_f64().expect("intensity");
        assert!((first - 1.0).abs() < 1.0e-12);

        let band: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("band.json")).expect("band output"),
        )
        .expect("band JSON");
        let spread = band["points"][2]["spread"].as_f64().expect("spread");
        assert!(spread.abs() < 1.0e-12);

        let esa: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("esa.json")).expect("esa output"),
        )
        .expect("esa JSON");
        assert_eq!(esa.as_array().map(Vec::len), Some(3));
        assert!(temp.path().join("copy.json").exists());
    }
}
