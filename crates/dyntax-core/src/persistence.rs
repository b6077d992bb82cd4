//! JSON form of a series: `{"esa0": {time, state_number,
//! absorption_energies, transition_moments}, ...}`.
//!
//! Labels and ground-state multiplicity are not stored; loading resets them
//! to singlet defaults.

use crate::common::SynthesisConfig;
use crate::domain::{DynTaxError, DynTaxResult};
use crate::spectrum::{EsaRecord, TaSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub time: f64,
    pub state_number: usize,
    pub absorption_energies: Vec<f64>,
    pub transition_moments: Vec<f64>,
}

impl From<&EsaRecord> for PersistedRecord {
    fn from(record: &EsaRecord) -> Self {
        Self {
            time: record.time(),
            state_number: record.reference_state_index(),
            absorption_energies: record.energies().to_vec(),
            transition_moments: record.transition_moments().to_vec(),
        }
    }
}

impl PersistedRecord {
    pub fn into_record(self) -> DynTaxResult<EsaRecord> {
        EsaRecord::with_default_labels(
            self.time,
            self.state_number,
            self.absorption_energies,
            self.transition_moments,
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to read series JSON '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write series JSON '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("series JSON is not a map of ESA records: {source}")]
    Parse { source: serde_json::Error },
    #[error("failed to encode series JSON: {source}")]
    Encode { source: serde_json::Error },
    #[error("series JSON entry '{key}' is not a valid record: {message}")]
    InvalidRecord { key: String, message: String },
}

impl From<PersistenceError> for DynTaxError {
    fn from(error: PersistenceError) -> Self {
        let placeholder = match &error {
            PersistenceError::Read { .. } => "IO.JSON_READ",
            PersistenceError::Write { .. } => "IO.JSON_WRITE",
            PersistenceError::Parse { .. } => "INPUT.JSON_PARSE",
            PersistenceError::Encode { .. } => "RUN.JSON_ENCODE",
            PersistenceError::InvalidRecord { .. } => "INPUT.JSON_RECORD",
        };
        match &error {
            PersistenceError::Read { .. } | PersistenceError::Write { .. } => {
                DynTaxError::io_system(placeholder, error.to_string())
            }
            _ => DynTaxError::persistence(placeholder, error.to_string()),
        }
    }
}

fn record_key(index: usize) -> String {
    format!("esa{}", index)
}

/// Time-ordered `esa<i>` map of the series.
pub fn series_to_map(series: &mut TaSeries) -> BTreeMap<String, PersistedRecord> {
    series
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| (record_key(index), PersistedRecord::from(record)))
        .collect()
}

pub fn series_to_json_string(series: &mut TaSeries, compact: bool) -> DynTaxResult<String> {
    let map = series_to_map(series);
    let encoded = if compact {
        serde_json::to_vec(&map)
    } else {
        to_indented_vec(&map)
    }
    .map_err(|source| PersistenceError::Encode { source })?;

    String::from_utf8(encoded).map_err(|source| {
        DynTaxError::persistence("RUN.JSON_ENCODE", format!("series JSON is not UTF-8: {}", source))
    })
}

fn to_indented_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

pub fn series_from_json_str(source: &str, config: SynthesisConfig) -> DynTaxResult<TaSeries> {
    let mut series = TaSeries::new(config)?;
    let map: BTreeMap<String, PersistedRecord> =
        serde_json::from_str(source).map_err(|source| PersistenceError::Parse { source })?;

    for (key, persisted) in map {
        let record = persisted.into_record().map_err(|error| PersistenceError::InvalidRecord {
            key: key.clone(),
            message: error.message().to_string(),
        })?;
        series.add(record);
    }
    series.sort();
    Ok(series)
}

/// Writes the series to `path`, indented by four spaces unless `compact`.
pub fn save_series_json(
    series: &mut TaSeries,
    path: impl AsRef<Path>,
    compact: bool,
) -> DynTaxResult<()> {
    let path = path.as_ref();
    let content = series_to_json_string(series, compact)?;
    fs::write(path, content).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), records = series.len(), "saved series JSON");
    Ok(())
}

pub fn load_series_json(path: impl AsRef<Path>, config: SynthesisConfig) -> DynTaxResult<TaSeries> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let series = series_from_json_str(&content, config)?;
    info!(path = %path.display(), records = series.len(), "loaded series JSON");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::{series_from_json_str, series_to_json_string};
    use crate::common::SynthesisConfig;
    use crate::domain::DynTaxErrorKind;
    use crate::spectrum::{EsaRecord, TaSeries};

    fn series() -> TaSeries {
        let mut series = TaSeries::default();
        series.add(
            EsaRecord::new(
                0.1,
                3,
                1,
                vec![1.25, 2.5],
                vec![0.3, 0.6],
                vec!["T2".to_string(), "S1".to_string()],
            )
            .expect("record should validate"),
        );
        series.add(EsaRecord::with_default_labels(0.05, 2, vec![0.75], vec![0.1]).expect("record"));
        series
    }

    #[test]
    fn keys_follow_time_order() {
        let json = series_to_json_string(&mut series(), true).expect("encode");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["esa0"]["time"], 0.05);
        assert_eq!(value["esa0"]["state_number"], 2);
        assert_eq!(value["esa1"]["absorption_energies"][1], 2.5);
        assert!(!json.contains('\n'));
    }

    #[test]
    fn pretty_form_indents_by_four_spaces() {
        let json = series_to_json_string(&mut series(), false).expect("encode");
        assert!(json.starts_with("{\n    \"esa0\": {\n        \"time\""));
    }

    #[test]
    fn loading_resets_labels_and_multiplicity() {
        let mut original = series();
        let json = series_to_json_string(&mut original, false).expect("encode");
        let mut loaded = series_from_json_str(&json, SynthesisConfig::default()).expect("decode");

        assert_eq!(loaded, original);
        let later = &loaded.records()[1];
        assert_eq!(later.ground_state_multiplicity(), 1);
        assert_eq!(later.state_labels(), &["S2".to_string(), "S3".to_string()]);
    }

    #[test]
    fn malformed_json_is_a_persistence_error() {
        let error = series_from_json_str("[1, 2", SynthesisConfig::default())
            .expect_err("truncated JSON");
        assert_eq!(error.kind(), DynTaxErrorKind::Persistence);
        assert_eq!(error.placeholder(), "INPUT.JSON_PARSE");
    }

    #[test]
    fn invalid_entries_name_their_key() {
        let json = r#"{"esa0": {"time": 0.0, "state_number": 1,
            "absorption_energies": [1.0, 2.0], "transition_moments": [0.5]}}"#;
        let error = series_from_json_str(json, SynthesisConfig::default())
            .expect_err("shape mismatch");
        assert_eq!(error.placeholder(), "INPUT.JSON_RECORD");
        assert!(error.message().contains("esa0"));
    }
}
