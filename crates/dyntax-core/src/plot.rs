//! Renderer-neutral plot descriptions.
//!
//! These carry the numbers and text a figure needs and nothing about how it
//! looks; the CLI writes them out as JSON.

use crate::domain::{DynTaxError, DynTaxResult};
use crate::spectrum::{
    energy_to_wavelength, BandTrace, DensityGrid, EsaRecord, SpectralCurve, SpectrumAxes,
    TaSeries, TimeTrace,
};
use serde::Serialize;

/// A state label split for sub-scripted display: `S2` → `S` + `2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateLabelParts {
    pub symbol: String,
    pub subscript: String,
}

/// Splits the leading letters from the trailing index. Labels without an
/// index keep the whole text as the symbol.
pub fn split_state_label(label: &str) -> StateLabelParts {
    let split = label
        .char_indices()
        .find(|(_, character)| !character.is_alphabetic())
        .map_or(label.len(), |(index, _)| index);
    StateLabelParts {
        symbol: label[..split].to_string(),
        subscript: label[split..].to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakMarker {
    pub wavelength: f64,
    /// Curve height at the peak wavelength.
    pub intensity: f64,
    pub label: StateLabelParts,
}

/// One record's broadened spectrum with its peak positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsaPlot {
    pub time: f64,
    pub curve: SpectralCurve,
    /// Peaks that fall inside the curve's wavelength range.
    pub peaks: Vec<PeakMarker>,
}

impl EsaPlot {
    pub fn from_record(series: &TaSeries, record: &EsaRecord) -> Self {
        let synthesizer = series.synthesizer();
        let range = series.config().wavelength_range;
        let peaks = record
            .transitions()
            .map(|(energy, _, label)| (energy_to_wavelength(energy), label))
            .filter(|(wavelength, _)| *wavelength >= range.min && *wavelength <= range.max)
            .map(|(wavelength, label)| PeakMarker {
                wavelength,
                intensity: synthesizer.evaluate_at(record, wavelength),
                label: split_state_label(label),
            })
            .collect();

        Self {
            time: record.time(),
            curve: series.curve_for(record),
            peaks,
        }
    }
}

/// Plots for every `stride`-th record in time order, starting with the first.
pub fn esa_plots(series: &mut TaSeries, stride: usize) -> DynTaxResult<Vec<EsaPlot>> {
    if stride == 0 {
        return Err(DynTaxError::invalid_input(
            "INPUT.PLOT_STRIDE",
            "ESA plot stride must be at least 1",
        ));
    }
    let records = series.snapshot();
    Ok(records
        .iter()
        .step_by(stride)
        .map(|record| EsaPlot::from_record(series, record))
        .collect())
}

/// Time × wavelength intensity map of a whole series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaPlot {
    pub axes: SpectrumAxes,
    pub max_value: f64,
    pub grid: DensityGrid,
}

impl TaPlot {
    pub fn from_series(series: &mut TaSeries) -> Self {
        let grid = series.density_grid();
        Self {
            axes: series.axes(),
            max_value: grid.max_value(),
            grid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TracePlot {
    Mono(TimeTrace),
    Band(BandTrace),
}

impl TracePlot {
    pub fn len(&self) -> usize {
        match self {
            Self::Mono(trace) => trace.points.len(),
            Self::Band(trace) => trace.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{esa_plots, split_state_label, EsaPlot, TaPlot, TracePlot};
    use crate::common::{SynthesisConfig, WavelengthRange};
    use crate::spectrum::{EsaRecord, TaSeries};

    fn series() -> TaSeries {
        let mut series = TaSeries::new(SynthesisConfig {
            wavelength_range: WavelengthRange::new(400.0, 800.0),
            wavelength_resolution: 5,
            ..SynthesisConfig::default()
        })
        .expect("config should validate");
        for step in 0..5 {
            let time = step as f64 * 0.05;
            series.add(
                EsaRecord::with_default_labels(time, 1, vec![2.0, 5.0], vec![1.0, 0.5])
                    .expect("record should validate"),
            );
        }
        series
    }

    #[test]
    fn labels_split_into_symbol_and_subscript() {
        let parts = split_state_label("S2");
        assert_eq!(parts.symbol, "S");
        assert_eq!(parts.subscript, "2");

        let parts = split_state_label("T12");
        assert_eq!((parts.symbol.as_str(), parts.subscript.as_str()), ("T", "12"));

        let parts = split_state_label("GS");
        assert_eq!((parts.symbol.as_str(), parts.subscript.as_str()), ("GS", ""));
    }

    #[test]
    fn esa_plot_keeps_only_visible_peaks() {
        let series = series();
        let record = &series.stored_records()[0];
        let plot = EsaPlot::from_record(&series, record);

        assert_eq!(plot.curve.len(), 5);
        assert_eq!(plot.peaks.len(), 1);
        assert!((plot.peaks[0].wavelength - 619.9205).abs() < 1.0e-9);
        assert!(plot.peaks[0].intensity >= 1.0);
        assert_eq!(plot.peaks[0].label.symbol, "S");
        assert_eq!(plot.peaks[0].label.subscript, "2");
    }

    #[test]
    fn stride_selects_every_nth_record() {
        let mut series = series();
        let plots = esa_plots(&mut series, 2).expect("stride 2 is valid");
        let times: Vec<f64> = plots.iter().map(|plot| plot.time).collect();
        assert_eq!(times.len(), 3);
        assert_eq!(times[0], 0.0);
        assert!((times[2] - 0.2).abs() < 1.0e-12);

        assert!(esa_plots(&mut series, 0).is_err());
    }

    #[test]
    fn ta_plot_carries_axes_and_grid() {
        let mut series = series();
        let plot = TaPlot::from_series(&mut series);
        assert_eq!(plot.grid.rows(), 5);
        assert_eq!(plot.axes.resolution, 5);
        assert!(plot.axes.time_step.is_some());
        assert!(plot.max_value > 0.0);
    }

    #[test]
    fn trace_plot_serializes_with_kind_tag() {
        let mut series = series();
        let plot = TracePlot::Mono(series.mono_slice(619.9205));
        assert_eq!(plot.len(), 5);

        let value = serde_json::to_value(&plot).expect("plot should serialize");
        assert_eq!(value["kind"], "mono");
        assert_eq!(value["points"].as_array().map(Vec::len), Some(5));
    }
}
