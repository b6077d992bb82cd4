pub mod record;
pub mod series;
pub mod synthesis;

pub use record::{default_state_label, EsaRecord};
pub use series::TaSeries;
pub use synthesis::{
    energy_to_wavelength, infer_timestep, BandPoint, BandTrace, DensityGrid, SpectralCurve,
    SpectralSynthesizer, SpectrumAxes, TimeTrace, TracePoint, WavelengthQuery,
};
