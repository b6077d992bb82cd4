use dyntax_core::common::SynthesisConfig;
use dyntax_core::domain::{DynTaxError, DynTaxResult};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr. `RUST_LOG` is honoured unless `-v` forces debug.
pub(super) fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when the CLI is driven from tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(super) fn load_config(path: Option<&Path>) -> DynTaxResult<SynthesisConfig> {
    match path {
        Some(path) => {
            let config = SynthesisConfig::load(path)?;
            debug!(path = %path.display(), ?config, "loaded configuration");
            Ok(config)
        }
        None => Ok(SynthesisConfig::default()),
    }
}

pub(super) fn to_json<T: Serialize>(value: &T, compact: bool) -> DynTaxResult<String> {
    let encoded = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    encoded.map_err(|source| {
        DynTaxError::persistence("RUN.JSON_ENCODE", format!("failed to encode JSON: {}", source))
    })
}

pub(super) fn write_json<T: Serialize>(path: &Path, value: &T) -> DynTaxResult<()> {
    let content = to_json(value, false)?;
    fs::write(path, content).map_err(|source| {
        DynTaxError::io_system(
            "IO.OUTPUT_WRITE",
            format!("failed to write '{}': {}", path.display(), source),
        )
    })
}
