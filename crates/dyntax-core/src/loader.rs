//! Batch loading of trajectory logs and saved series.

use crate::common::SynthesisConfig;
use crate::domain::{DynTaxError, DynTaxResult};
use crate::extract::LogExtractor;
use crate::persistence::load_series_json;
use crate::spectrum::TaSeries;
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A log that could not be turned into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLog {
    pub identifier: String,
    pub error: DynTaxError,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub series: TaSeries,
    pub loaded: usize,
    pub skipped: Vec<SkippedLog>,
}

impl LoadReport {
    fn from_series(series: TaSeries) -> Self {
        let loaded = series.len();
        Self {
            series,
            loaded,
            skipped: Vec::new(),
        }
    }
}

/// Matches trajectory log names such as `geo_12.out`.
pub fn log_matcher(suffix: &str) -> DynTaxResult<GlobMatcher> {
    let pattern = format!("*_[0-9]*{}", suffix);
    Glob::new(&pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| {
            DynTaxError::invalid_configuration(
                "INPUT.LOG_SUFFIX",
                format!("log suffix '{}' gives an invalid pattern: {}", suffix, source),
            )
        })
}

/// Matching log files directly inside `dir`, sorted by file name.
pub fn discover_logs(dir: &Path, suffix: &str) -> DynTaxResult<Vec<PathBuf>> {
    let matcher = log_matcher(suffix)?;
    let entries = fs::read_dir(dir).map_err(|source| directory_error(dir, &source))?;

    let mut logs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| directory_error(dir, &source))?.path();
        let Some(name) = path.file_name() else {
            continue;
        };
        if path.is_file() && matcher.is_match(name) {
            logs.push(path);
        }
    }
    logs.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    Ok(logs)
}

fn directory_error(dir: &Path, source: &std::io::Error) -> DynTaxError {
    DynTaxError::io_system(
        "IO.LOG_DIRECTORY",
        format!("failed to list log directory '{}': {}", dir.display(), source),
    )
}

/// Extracts every matching log in `dir`. A log that fails is reported in
/// [`LoadReport::skipped`] and the rest still load.
pub fn load_from_dir(dir: impl AsRef<Path>, config: &SynthesisConfig) -> DynTaxResult<LoadReport> {
    let dir = dir.as_ref();
    let mut series = TaSeries::new(config.clone())?;
    let extractor = LogExtractor::from_config(config);
    let mut skipped = Vec::new();

    for path in discover_logs(dir, &config.log_suffix)? {
        match extractor.extract_file(&path) {
            Ok(record) => series.add(record),
            Err(error) => {
                let identifier = path.display().to_string();
                warn!(
                    identifier = %identifier,
                    placeholder = error.placeholder(),
                    "skipping log: {}",
                    error.message()
                );
                skipped.push(SkippedLog { identifier, error });
            }
        }
    }

    series.sort();
    let loaded = series.len();
    info!(
        dir = %dir.display(),
        loaded,
        skipped = skipped.len(),
        "loaded trajectory logs"
    );
    Ok(LoadReport {
        series,
        loaded,
        skipped,
    })
}

/// Loads a log directory, a saved `.json` series, or a single log file.
pub fn load_source(path: impl AsRef<Path>, config: &SynthesisConfig) -> DynTaxResult<LoadReport> {
    let path = path.as_ref();
    if path.is_dir() {
        return load_from_dir(path, config);
    }

    let is_json = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    if is_json {
        return load_series_json(path, config.clone()).map(LoadReport::from_series);
    }

    let mut series = TaSeries::new(config.clone())?;
    let record = LogExtractor::from_config(config).extract_file(path)?;
    series.add(record);
    Ok(LoadReport::from_series(series))
}
