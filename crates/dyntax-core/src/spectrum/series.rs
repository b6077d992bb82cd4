use super::record::EsaRecord;
use super::synthesis::{
    infer_timestep, BandTrace, DensityGrid, SpectralCurve, SpectralSynthesizer, SpectrumAxes,
    TimeTrace,
};
use crate::common::constants::RECORD_TOLERANCE;
use crate::common::SynthesisConfig;
use crate::domain::{DynTaxResult, SynthesisResult};
use crate::numerics::ApproxEq;
use std::cmp::Ordering;

/// One simulation trajectory: ESA records plus the settings shared by all of
/// them.
///
/// Records are kept in insertion order until a synthesis call needs them in
/// time order; the sort is stable and happens in place, so every accessor
/// that returns records takes `&mut self`.
#[derive(Debug, Clone)]
pub struct TaSeries {
    records: Vec<EsaRecord>,
    sorted: bool,
    config: SynthesisConfig,
}

impl TaSeries {
    /// Rejects settings that would make synthesis meaningless: a non-positive
    /// peak breadth, an empty or reversed wavelength range, zero samples.
    pub fn new(config: SynthesisConfig) -> DynTaxResult<Self> {
        config.validate()?;
        Ok(Self::with_validated(config))
    }

    fn with_validated(config: SynthesisConfig) -> Self {
        Self {
            records: Vec::new(),
            sorted: true,
            config,
        }
    }

    pub fn add(&mut self, record: EsaRecord) {
        if let Some(last) = self.records.last()
            && last.time().total_cmp(&record.time()) == Ordering::Greater
        {
            self.sorted = false;
        }
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn synthesizer(&self) -> SpectralSynthesizer {
        SpectralSynthesizer::from_validated(self.config.peak_breadth)
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn sort(&mut self) {
        if !self.sorted {
            self.records
                .sort_by(|lhs, rhs| lhs.time().total_cmp(&rhs.time()));
            self.sorted = true;
        }
    }

    /// Records in time order.
    pub fn records(&mut self) -> &[EsaRecord] {
        self.sort();
        &self.records
    }

    /// Records in their current storage order, without sorting.
    pub fn stored_records(&self) -> &[EsaRecord] {
        &self.records
    }

    /// A time-ordered copy for batches of read-only synthesis work.
    pub fn snapshot(&mut self) -> Vec<EsaRecord> {
        self.records().to_vec()
    }

    pub fn curve_for(&self, record: &EsaRecord) -> SpectralCurve {
        self.synthesizer().build_curve(
            record,
            self.config.wavelength_range,
            self.config.wavelength_resolution,
        )
    }

    /// Recomputed on every call; records may have been added since the last.
    pub fn density_grid(&mut self) -> DensityGrid {
        let synthesizer = self.synthesizer();
        let range = self.config.wavelength_range;
        let resolution = self.config.wavelength_resolution;
        synthesizer.build_density_grid(self.records(), range, resolution)
    }

    pub fn mono_slice(&mut self, wavelength: f64) -> TimeTrace {
        let synthesizer = self.synthesizer();
        synthesizer.mono_slice(self.records(), wavelength)
    }

    pub fn averaged_slice(
        &mut self,
        centre: f64,
        span: f64,
        samples: usize,
    ) -> SynthesisResult<BandTrace> {
        let synthesizer = self.synthesizer();
        synthesizer.averaged_slice(self.records(), centre, span, samples)
    }

    /// Averaged slice sampled with the configured band resolution.
    pub fn band_slice(&mut self, centre: f64, span: f64) -> SynthesisResult<BandTrace> {
        let samples = self.config.band_samples;
        self.averaged_slice(centre, span, samples)
    }

    pub fn infer_timestep(&mut self) -> DynTaxResult<f64> {
        infer_timestep(self.records())
    }

    pub fn axes(&mut self) -> SpectrumAxes {
        SpectrumAxes {
            wavelength_min: self.config.wavelength_range.min,
            wavelength_max: self.config.wavelength_range.max,
            resolution: self.config.wavelength_resolution,
            time_step: self.infer_timestep().ok(),
        }
    }

    /// Records ordered by time only; equal times keep insertion order.
    fn time_order(&self) -> Vec<&EsaRecord> {
        let mut ordered: Vec<&EsaRecord> = self.records.iter().collect();
        ordered.sort_by(|lhs, rhs| lhs.time().total_cmp(&rhs.time()));
        ordered
    }
}

impl Default for TaSeries {
    fn default() -> Self {
        Self::with_validated(SynthesisConfig::default())
    }
}

impl ApproxEq for TaSeries {
    /// Pairs every record with an unclaimed counterpart inside its time
    /// window. Records sharing a time may match in any order.
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let candidates = other.time_order();
        let mut claimed = vec![false; candidates.len()];
        self.time_order().into_iter().all(|record| {
            let start = candidates.partition_point(|candidate| {
                candidate.time() < record.time() - tolerance
            });
            let matched = candidates[start..]
                .iter()
                .enumerate()
                .take_while(|(_, candidate)| candidate.time() <= record.time() + tolerance)
                .find(|(offset, candidate)| {
                    !claimed[start + offset] && record.approx_eq(**candidate, tolerance)
                })
                .map(|(offset, _)| start + offset);
            match matched {
                Some(index) => {
                    claimed[index] = true;
                    true
                }
                None => false,
            }
        })
    }
}

/// Record-wise comparison within `1e-7`, independent of insertion order and
/// of the synthesis settings.
impl PartialEq for TaSeries {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, RECORD_TOLERANCE)
    }
}
