//! Gaussian broadening of discrete ESA transitions.
//!
//! Every transition contributes at every query wavelength; there is no
//! windowing, so distant peaks leave small tails. Intensities are returned
//! unnormalized so that records and times stay comparable.

use super::record::EsaRecord;
use crate::common::constants::EV_NM;
use crate::common::WavelengthRange;
use crate::domain::{DynTaxError, DynTaxResult, SynthesisResult};
use crate::numerics::{linspace, mean_and_std, GaussianLineShape};
use serde::Serialize;

/// Converts an excitation energy in eV to a wavelength in nm.
pub fn energy_to_wavelength(energy_ev: f64) -> f64 {
    EV_NM / energy_ev
}

/// Shape-preserving query: a scalar wavelength yields a scalar intensity, a
/// sequence yields one intensity per element.
pub trait WavelengthQuery {
    type Output;

    fn evaluate_with(self, synthesizer: &SpectralSynthesizer, record: &EsaRecord) -> Self::Output;
}

impl WavelengthQuery for f64 {
    type Output = f64;

    fn evaluate_with(self, synthesizer: &SpectralSynthesizer, record: &EsaRecord) -> f64 {
        synthesizer.intensity_at(record, self)
    }
}

impl WavelengthQuery for &[f64] {
    type Output = Vec<f64>;

    fn evaluate_with(self, synthesizer: &SpectralSynthesizer, record: &EsaRecord) -> Vec<f64> {
        self.iter()
            .map(|&wavelength| synthesizer.intensity_at(record, wavelength))
            .collect()
    }
}

impl WavelengthQuery for &Vec<f64> {
    type Output = Vec<f64>;

    fn evaluate_with(self, synthesizer: &SpectralSynthesizer, record: &EsaRecord) -> Vec<f64> {
        self.as_slice().evaluate_with(synthesizer, record)
    }
}

impl<const N: usize> WavelengthQuery for [f64; N] {
    type Output = [f64; N];

    fn evaluate_with(self, synthesizer: &SpectralSynthesizer, record: &EsaRecord) -> [f64; N] {
        self.map(|wavelength| synthesizer.intensity_at(record, wavelength))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralCurve {
    pub wavelengths: Vec<f64>,
    pub intensities: Vec<f64>,
}

impl SpectralCurve {
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn max_intensity(&self) -> f64 {
        self.intensities.iter().copied().fold(0.0, f64::max)
    }
}

/// Time × wavelength intensity grid, row-major: one row per record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityGrid {
    pub times: Vec<f64>,
    pub wavelengths: Vec<f64>,
    pub values: Vec<f64>,
}

impl DensityGrid {
    pub fn rows(&self) -> usize {
        self.times.len()
    }

    pub fn cols(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let cols = self.cols();
        (index < self.rows()).then(|| &self.values[index * cols..(index + 1) * cols])
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        (col < self.cols())
            .then(|| self.row(row).map(|values| values[col]))
            .flatten()
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    pub time: f64,
    pub intensity: f64,
}

/// Intensity at one wavelength over time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeTrace {
    pub wavelength: f64,
    pub points: Vec<TracePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPoint {
    pub time: f64,
    pub intensity: f64,
    pub spread: f64,
}

/// Band-averaged intensity over time with the per-record standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandTrace {
    pub centre: f64,
    pub span: f64,
    pub samples: usize,
    pub points: Vec<BandPoint>,
}

/// Axis metadata handed to renderers alongside synthesized data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumAxes {
    pub wavelength_min: f64,
    pub wavelength_max: f64,
    pub resolution: usize,
    pub time_step: Option<f64>,
}

/// Stateless evaluator parameterized by the shared peak breadth (nm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralSynthesizer {
    peak_breadth: f64,
}

impl SpectralSynthesizer {
    pub fn new(peak_breadth: f64) -> DynTaxResult<Self> {
        if !peak_breadth.is_finite() || peak_breadth <= 0.0 {
            return Err(DynTaxError::invalid_input(
                "INPUT.PEAK_BREADTH",
                format!("peak breadth must be finite and > 0, got {}", peak_breadth),
            ));
        }
        Ok(Self { peak_breadth })
    }

    /// Caller guarantees `peak_breadth` already passed validation.
    pub(crate) const fn from_validated(peak_breadth: f64) -> Self {
        Self { peak_breadth }
    }

    pub const fn peak_breadth(&self) -> f64 {
        self.peak_breadth
    }

    fn intensity_at(&self, record: &EsaRecord, wavelength: f64) -> f64 {
        record
            .energies()
            .iter()
            .zip(record.transition_moments())
            .map(|(&energy, &moment)| {
                GaussianLineShape::new(energy_to_wavelength(energy), moment, self.peak_breadth)
                    .value(wavelength)
            })
            .sum()
    }

    pub fn evaluate_at<Q: WavelengthQuery>(&self, record: &EsaRecord, query: Q) -> Q::Output {
        query.evaluate_with(self, record)
    }

    pub fn build_curve(
        &self,
        record: &EsaRecord,
        range: WavelengthRange,
        resolution: usize,
    ) -> SpectralCurve {
        let wavelengths = range.samples(resolution);
        let intensities = self.evaluate_at(record, &wavelengths);
        SpectralCurve {
            wavelengths,
            intensities,
        }
    }

    /// Expects `records` in time order; [`super::TaSeries`] guarantees it.
    pub fn build_density_grid(
        &self,
        records: &[EsaRecord],
        range: WavelengthRange,
        resolution: usize,
    ) -> DensityGrid {
        let wavelengths = range.samples(resolution);
        let mut values = Vec::with_capacity(records.len() * wavelengths.len());
        for record in records {
            values.extend(self.evaluate_at(record, &wavelengths));
        }

        DensityGrid {
            times: records.iter().map(EsaRecord::time).collect(),
            wavelengths,
            values,
        }
    }

    pub fn mono_slice(&self, records: &[EsaRecord], wavelength: f64) -> TimeTrace {
        TimeTrace {
            wavelength,
            points: records
                .iter()
                .map(|record| TracePoint {
                    time: record.time(),
                    intensity: self.evaluate_at(record, wavelength),
                })
                .collect(),
        }
    }

    pub fn averaged_slice(
        &self,
        records: &[EsaRecord],
        centre: f64,
        span: f64,
        samples: usize,
    ) -> SynthesisResult<BandTrace> {
        if samples == 0 {
            return Err(DynTaxError::invalid_input(
                "INPUT.BAND_SAMPLES",
                "averaged slice needs at least one sample per record",
            ));
        }
        if !span.is_finite() || span < 0.0 || !centre.is_finite() {
            return Err(DynTaxError::invalid_input(
                "INPUT.BAND_SPAN",
                format!(
                    "averaged slice needs a finite centre and span >= 0, got centre={} span={}",
                    centre, span
                ),
            ));
        }

        let band = if samples == 1 {
            vec![centre]
        } else {
            linspace(centre - span, centre + span, samples)
        };

        let points = records
            .iter()
            .map(|record| {
                let intensities = self.evaluate_at(record, &band);
                let (intensity, spread) = mean_and_std(&intensities).unwrap_or((0.0, 0.0));
                BandPoint {
                    time: record.time(),
                    intensity,
                    spread,
                }
            })
            .collect();

        Ok(BandTrace {
            centre,
            span,
            samples,
            points,
        })
    }
}

/// `time[1] - time[0]` of time-ordered records. Uniform spacing is assumed,
/// not checked.
pub fn infer_timestep(records: &[EsaRecord]) -> DynTaxResult<f64> {
    match records {
        [first, second, ..] => Ok(second.time() - first.time()),
        _ => Err(DynTaxError::degenerate_series(format!(
            "timestep inference needs at least two records, series has {}",
            records.len()
        ))),
    }
}
