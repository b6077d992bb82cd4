//! Excited-state absorption extraction and transient-absorption synthesis.
//!
//! Q-Chem excited-state logs are turned into [`spectrum::EsaRecord`]s by
//! [`extract::LogExtractor`], collected into a time-ordered
//! [`spectrum::TaSeries`], and broadened into curves, density grids and time
//! traces by [`spectrum::SpectralSynthesizer`].

pub mod common;
pub mod domain;
pub mod extract;
pub mod loader;
pub mod numerics;
pub mod persistence;
pub mod plot;
pub mod spectrum;
