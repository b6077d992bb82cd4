use crate::domain::{DynTaxError, DynTaxResult};
use crate::numerics::ApproxEq;

/// Default ground-state multiplicity assumed when a record is rebuilt from
/// its persisted form.
pub const DEFAULT_MULTIPLICITY: u8 = 1;
pub const DEFAULT_REFERENCE_STATE: usize = 1;

/// One excited-state absorption spectrum sampled at one simulation time.
///
/// `energies[i]` is the excitation energy of the i-th state above the
/// reference state, in eV relative to the reference. `transition_moments` and
/// `state_labels` run parallel to it.
#[derive(Debug, Clone, PartialEq)]
pub struct EsaRecord {
    time: f64,
    ground_state_multiplicity: u8,
    reference_state_index: usize,
    energies: Vec<f64>,
    transition_moments: Vec<f64>,
    state_labels: Vec<String>,
}

impl EsaRecord {
    pub fn new(
        time: f64,
        ground_state_multiplicity: u8,
        reference_state_index: usize,
        energies: Vec<f64>,
        transition_moments: Vec<f64>,
        state_labels: Vec<String>,
    ) -> DynTaxResult<Self> {
        let record = Self {
            time,
            ground_state_multiplicity,
            reference_state_index,
            energies,
            transition_moments,
            state_labels,
        };
        record.validate()?;
        Ok(record)
    }

    /// Builds a record whose labels follow the `S2, S3, ...` convention.
    pub fn with_default_labels(
        time: f64,
        reference_state_index: usize,
        energies: Vec<f64>,
        transition_moments: Vec<f64>,
    ) -> DynTaxResult<Self> {
        let state_labels = (0..energies.len()).map(default_state_label).collect();
        Self::new(
            time,
            DEFAULT_MULTIPLICITY,
            reference_state_index,
            energies,
            transition_moments,
            state_labels,
        )
    }

    /// A record without computed excitations; it synthesizes to zero.
    pub fn empty(time: f64) -> Self {
        Self {
            time,
            ground_state_multiplicity: DEFAULT_MULTIPLICITY,
            reference_state_index: DEFAULT_REFERENCE_STATE,
            energies: Vec::new(),
            transition_moments: Vec::new(),
            state_labels: Vec::new(),
        }
    }

    fn validate(&self) -> DynTaxResult<()> {
        if self.energies.len() != self.transition_moments.len()
            || self.energies.len() != self.state_labels.len()
        {
            return Err(DynTaxError::invalid_input(
                "INPUT.RECORD_SHAPE",
                format!(
                    "record at t={} has {} energies, {} transition moments and {} labels",
                    self.time,
                    self.energies.len(),
                    self.transition_moments.len(),
                    self.state_labels.len()
                ),
            ));
        }

        if !self.time.is_finite() {
            return Err(DynTaxError::invalid_input(
                "INPUT.RECORD_TIME",
                format!("record time must be finite, got {}", self.time),
            ));
        }

        if self.ground_state_multiplicity == 0 {
            return Err(DynTaxError::invalid_input(
                "INPUT.RECORD_MULTIPLICITY",
                format!("record at t={} has multiplicity 0", self.time),
            ));
        }

        if let Some((index, energy)) = self
            .energies
            .iter()
            .enumerate()
            .find(|(_, energy)| !energy.is_finite())
        {
            return Err(DynTaxError::invalid_input(
                "INPUT.RECORD_ENERGY",
                format!(
                    "record at t={} has non-finite energy {} at state {}",
                    self.time, energy, index
                ),
            ));
        }

        if let Some((index, moment)) = self
            .transition_moments
            .iter()
            .enumerate()
            .find(|(_, moment)| !moment.is_finite() || **moment < 0.0)
        {
            return Err(DynTaxError::invalid_input(
                "INPUT.RECORD_MOMENT",
                format!(
                    "record at t={} has invalid transition moment {} at state {}",
                    self.time, moment, index
                ),
            ));
        }

        Ok(())
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn ground_state_multiplicity(&self) -> u8 {
        self.ground_state_multiplicity
    }

    pub fn reference_state_index(&self) -> usize {
        self.reference_state_index
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn transition_moments(&self) -> &[f64] {
        &self.transition_moments
    }

    pub fn state_labels(&self) -> &[String] {
        &self.state_labels
    }

    pub fn state_count(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// `(energy, moment, label)` triples in log order.
    pub fn transitions(&self) -> impl Iterator<Item = (f64, f64, &str)> + '_ {
        self.energies
            .iter()
            .zip(&self.transition_moments)
            .zip(&self.state_labels)
            .map(|((energy, moment), label)| (*energy, *moment, label.as_str()))
    }
}

/// Label of the state at `position` when the log gives no multiplicity:
/// the first state above the reference is `S2`.
pub fn default_state_label(position: usize) -> String {
    format!("S{}", position + 2)
}

impl ApproxEq for EsaRecord {
    /// Compares time, reference state, energies and moments. Labels and
    /// multiplicity are not part of the persisted form and are ignored.
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.time.approx_eq(&other.time, tolerance)
            && self.reference_state_index == other.reference_state_index
            && self.energies.approx_eq(&other.energies, tolerance)
            && self
                .transition_moments
                .approx_eq(&other.transition_moments, tolerance)
    }
}
