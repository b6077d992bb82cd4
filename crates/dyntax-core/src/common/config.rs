//! Key/value configuration store and the synthesis settings derived from it.
//!
//! The on-disk format is one `key = value` pair per line; blank lines and
//! lines starting with `#` are ignored. Values are typed on read.

use super::constants::{
    DEFAULT_BAND_SAMPLES, DEFAULT_LOG_SUFFIX, DEFAULT_PEAK_BREADTH_NM, DEFAULT_TIME_PER_STEP,
    DEFAULT_WAVELENGTH_MAX_NM, DEFAULT_WAVELENGTH_MIN_NM, DEFAULT_WAVELENGTH_RESOLUTION,
};
use crate::domain::{DynTaxError, DynTaxResult};
use crate::numerics::linspace;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl ConfigValue {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "True" => return Self::Bool(true),
            "False" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Int(value);
        }
        if let Ok(value) = raw.parse::<f64>() {
            return Self::Float(value);
        }
        Self::Text(raw.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Self::Int(value) => usize::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config line {line} is not a 'key = value' pair: '{raw}'")]
    Syntax { line: usize, raw: String },
}

impl From<ConfigStoreError> for DynTaxError {
    fn from(error: ConfigStoreError) -> Self {
        match &error {
            ConfigStoreError::Read { .. } => {
                DynTaxError::io_system("IO.CONFIG_READ", error.to_string())
            }
            ConfigStoreError::Syntax { .. } => {
                DynTaxError::invalid_configuration("INPUT.CONFIG_SYNTAX", error.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigStore {
    values: BTreeMap<String, ConfigValue>,
}

impl ConfigStore {
    pub fn parse(source: &str) -> Result<Self, ConfigStoreError> {
        let mut values = BTreeMap::new();
        for (index, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigStoreError::Syntax {
                    line: index + 1,
                    raw: trimmed.to_string(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigStoreError::Syntax {
                    line: index + 1,
                    raw: trimmed.to_string(),
                });
            }
            values.insert(key.to_string(), ConfigValue::parse(value));
        }

        Ok(Self { values })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigStoreError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigStoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn f64_or(&self, key: &'static str, default: f64) -> DynTaxResult<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_f64().ok_or_else(|| type_error(key, "a number", value)),
        }
    }

    fn usize_or(&self, key: &'static str, default: usize) -> DynTaxResult<usize> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_usize()
                .ok_or_else(|| type_error(key, "a non-negative integer", value)),
        }
    }

    fn text_or(&self, key: &'static str, default: &str) -> DynTaxResult<String> {
        match self.get(key) {
            None => Ok(default.to_string()),
            Some(value) => value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| type_error(key, "text", value)),
        }
    }
}

fn type_error(key: &str, expected: &str, value: &ConfigValue) -> DynTaxError {
    DynTaxError::invalid_configuration(
        "INPUT.CONFIG_VALUE",
        format!("config key '{}' must be {}, got {:?}", key, expected, value),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavelengthRange {
    pub min: f64,
    pub max: f64,
}

impl WavelengthRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Evenly spaced samples including both bounds.
    pub fn samples(&self, resolution: usize) -> Vec<f64> {
        linspace(self.min, self.max, resolution)
    }
}

/// Explicit settings shared by every record of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    pub peak_breadth: f64,
    pub wavelength_range: WavelengthRange,
    pub wavelength_resolution: usize,
    pub time_per_step: f64,
    pub log_suffix: String,
    pub band_samples: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            peak_breadth: DEFAULT_PEAK_BREADTH_NM,
            wavelength_range: WavelengthRange::new(
                DEFAULT_WAVELENGTH_MIN_NM,
                DEFAULT_WAVELENGTH_MAX_NM,
            ),
            wavelength_resolution: DEFAULT_WAVELENGTH_RESOLUTION,
            time_per_step: DEFAULT_TIME_PER_STEP,
            log_suffix: DEFAULT_LOG_SUFFIX.to_string(),
            band_samples: DEFAULT_BAND_SAMPLES,
        }
    }
}

impl SynthesisConfig {
    pub fn from_store(store: &ConfigStore) -> DynTaxResult<Self> {
        let config = Self {
            peak_breadth: store.f64_or("peak_breadth", DEFAULT_PEAK_BREADTH_NM)?,
            wavelength_range: WavelengthRange::new(
                store.f64_or("wavelength_min", DEFAULT_WAVELENGTH_MIN_NM)?,
                store.f64_or("wavelength_max", DEFAULT_WAVELENGTH_MAX_NM)?,
            ),
            wavelength_resolution: store
                .usize_or("wavelength_resolution", DEFAULT_WAVELENGTH_RESOLUTION)?,
            time_per_step: store.f64_or("time_per_step", DEFAULT_TIME_PER_STEP)?,
            log_suffix: store.text_or("log_suffix", DEFAULT_LOG_SUFFIX)?,
            band_samples: store.usize_or("band_samples", DEFAULT_BAND_SAMPLES)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> DynTaxResult<Self> {
        let store = ConfigStore::load(path)?;
        Self::from_store(&store)
    }

    pub fn validate(&self) -> DynTaxResult<()> {
        if !self.peak_breadth.is_finite() || self.peak_breadth <= 0.0 {
            return Err(DynTaxError::invalid_configuration(
                "INPUT.CONFIG_VALUE",
                format!(
                    "peak_breadth must be finite and > 0, got {}",
                    self.peak_breadth
                ),
            ));
        }

        let range = self.wavelength_range;
        if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
            return Err(DynTaxError::invalid_configuration(
                "INPUT.CONFIG_VALUE",
                format!(
                    "wavelength range must satisfy min < max, got [{}, {}]",
                    range.min, range.max
                ),
            ));
        }

        if self.wavelength_resolution == 0 {
            return Err(DynTaxError::invalid_configuration(
                "INPUT.CONFIG_VALUE",
                "wavelength_resolution must be at least 1",
            ));
        }

        if self.band_samples == 0 {
            return Err(DynTaxError::invalid_configuration(
                "INPUT.CONFIG_VALUE",
                "band_samples must be at least 1",
            ));
        }

        if !self.time_per_step.is_finite() {
            return Err(DynTaxError::invalid_configuration(
                "INPUT.CONFIG_VALUE",
                format!("time_per_step must be finite, got {}", self.time_per_step),
            ));
        }

        Ok(())
    }

    pub fn wavelength_samples(&self) -> Vec<f64> {
        self.wavelength_range.samples(self.wavelength_resolution)
    }
}
