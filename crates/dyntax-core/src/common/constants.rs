//! Physical conversion factors and Q-Chem log markers.
//!
//! The marker strings are matched case-sensitively against raw log text.

/// `hc` in eV·nm, used for `nm = EV_NM / eV`.
pub const EV_NM: f64 = 1_239.841_f64;

/// Simulation time per trajectory step, in fs.
pub const DEFAULT_TIME_PER_STEP: f64 = 0.05_f64;

pub const DEFAULT_PEAK_BREADTH_NM: f64 = 50.0_f64;
pub const DEFAULT_WAVELENGTH_MIN_NM: f64 = 300.0_f64;
pub const DEFAULT_WAVELENGTH_MAX_NM: f64 = 1_000.0_f64;
pub const DEFAULT_WAVELENGTH_RESOLUTION: usize = 500;
pub const DEFAULT_BAND_SAMPLES: usize = 20;
pub const DEFAULT_LOG_SUFFIX: &str = ".out";

/// Absolute tolerance used by record and series equality.
pub const RECORD_TOLERANCE: f64 = 1.0e-7_f64;

pub const MOLECULE_SECTION_MARKER: &str = "$molecule";
pub const EXCITED_STATE_MARKER: &str = "Excited state";
pub const EXCITATION_ENERGY_MARKER: &str = "excitation energy (eV) =";
pub const TOTAL_ENERGY_MARKER: &str = "Total energy for state";
pub const STATE_MULTIPLICITY_MARKER: &str = "Multiplicity:";
pub const TRANSITION_TABLE_MARKER: &str = "Transition Moments Between Ground and Excited States";

/// Zero-based column of the moment magnitude in a transition-moment row
/// (`bra ket X Y Z strength`).
pub const TRANSITION_MOMENT_COLUMN: usize = 5;
