pub mod config;
pub mod constants;

pub use config::{ConfigStore, ConfigStoreError, ConfigValue, SynthesisConfig, WavelengthRange};
