//! Q-Chem excited-state log scanning.
//!
//! A log is read front to back by a single cursor moving through four
//! states: the charge/multiplicity line, the `Excited state` sections, the
//! ground-to-excited transition-moment table, and done. Each state only looks
//! forward from where the previous one stopped; a failure in any state aborts
//! the whole log and no record is produced.

pub mod identifier;

pub use identifier::{step_index, timestamp};

use crate::common::SynthesisConfig;
use crate::common::constants::{
    EXCITATION_ENERGY_MARKER, EXCITED_STATE_MARKER, MOLECULE_SECTION_MARKER,
    STATE_MULTIPLICITY_MARKER, TOTAL_ENERGY_MARKER, TRANSITION_MOMENT_COLUMN,
    TRANSITION_TABLE_MARKER,
};
use crate::domain::{DynTaxError, ExtractResult, SpinMultiplicity};
use crate::spectrum::record::{DEFAULT_MULTIPLICITY, DEFAULT_REFERENCE_STATE};
use crate::spectrum::{default_state_label, EsaRecord, TaSeries};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekMultiplicity,
    SeekExcitedState,
    SeekTransitionTable,
    Done,
}

/// One `Excited state` block of the log.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcitedStateSection {
    /// State number as printed in the section header.
    pub state_number: usize,
    /// Absolute excitation energy in eV.
    pub excitation_energy: f64,
    pub multiplicity: Option<SpinMultiplicity>,
}

/// Everything read from one log before it is reduced to an [`EsaRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedLog {
    pub ground_state_multiplicity: u8,
    pub sections: Vec<ExcitedStateSection>,
    /// Moments for the states after the reference, in log order.
    pub transition_moments: Vec<f64>,
}

impl ScannedLog {
    /// State number the energies are measured from.
    pub fn reference_state(&self) -> usize {
        self.sections
            .first()
            .map_or(DEFAULT_REFERENCE_STATE, |section| section.state_number)
    }

    /// Excitation energies relative to the first section.
    pub fn relative_energies(&self) -> Vec<f64> {
        match self.sections.split_first() {
            Some((reference, rest)) => rest
                .iter()
                .map(|section| section.excitation_energy - reference.excitation_energy)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Labels for the states after the reference.
    ///
    /// When no section names its multiplicity every state is a singlet
    /// numbered from `S2`. Otherwise states are numbered per multiplicity
    /// letter in log order, the reference being number one of its letter.
    pub fn state_labels(&self) -> Vec<String> {
        let excited = self.sections.len().saturating_sub(1);
        if self.sections.iter().all(|section| section.multiplicity.is_none()) {
            return (0..excited).map(default_state_label).collect();
        }

        let fallback = SpinMultiplicity::from_count(self.ground_state_multiplicity)
            .unwrap_or(SpinMultiplicity::Singlet);
        let mut counters: HashMap<SpinMultiplicity, usize> = HashMap::new();
        let mut labels = Vec::with_capacity(excited);
        for (position, section) in self.sections.iter().enumerate() {
            let multiplicity = section.multiplicity.unwrap_or(fallback);
            let counter = counters.entry(multiplicity).or_insert(0);
            *counter += 1;
            if position > 0 {
                labels.push(format!("{}{}", multiplicity.symbol(), counter));
            }
        }
        labels
    }

    pub fn into_record(self, time: f64) -> ExtractResult<EsaRecord> {
        let energies = self.relative_energies();
        let labels = self.state_labels();
        let reference = self.reference_state();
        EsaRecord::new(
            time,
            self.ground_state_multiplicity,
            reference,
            energies,
            self.transition_moments,
            labels,
        )
    }
}

/// Byte-offset cursor over the raw log text.
struct LogCursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> LogCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    fn find(&self, marker: &str) -> Option<usize> {
        self.find_from(self.position, marker)
    }

    fn find_from(&self, from: usize, marker: &str) -> Option<usize> {
        self.text[from..].find(marker).map(|offset| from + offset)
    }

    fn line_end(&self, from: usize) -> usize {
        self.text[from..]
            .find('\n')
            .map_or(self.text.len(), |offset| from + offset + 1)
    }

    /// Moves to the start of the line after the one containing `offset`.
    fn skip_line_at(&mut self, offset: usize) {
        self.position = self.line_end(offset);
    }

    fn next_line(&mut self) -> Option<&'a str> {
        if self.position >= self.text.len() {
            return None;
        }
        let end = self.line_end(self.position);
        let line = &self.text[self.position..end];
        self.position = end;
        Some(line.trim_end_matches(['\n', '\r']))
    }
}

/// Runs the scan state machine over one log.
pub fn scan_log(text: &str, identifier: &str) -> ExtractResult<ScannedLog> {
    let mut cursor = LogCursor::new(text);
    let mut scanned = ScannedLog {
        ground_state_multiplicity: DEFAULT_MULTIPLICITY,
        sections: Vec::new(),
        transition_moments: Vec::new(),
    };

    let mut state = ScanState::SeekMultiplicity;
    loop {
        state = match state {
            ScanState::SeekMultiplicity => {
                scanned.ground_state_multiplicity = seek_multiplicity(&mut cursor, identifier)?;
                ScanState::SeekExcitedState
            }
            ScanState::SeekExcitedState => {
                let position = scanned.sections.len();
                match next_section(&mut cursor, identifier, position)? {
                    Some(section) => {
                        scanned.sections.push(section);
                        ScanState::SeekExcitedState
                    }
                    None => ScanState::SeekTransitionTable,
                }
            }
            ScanState::SeekTransitionTable => {
                scanned.transition_moments =
                    read_transition_table(&mut cursor, identifier, &scanned.sections)?;
                ScanState::Done
            }
            ScanState::Done => break,
        };
    }

    Ok(scanned)
}

fn seek_multiplicity(cursor: &mut LogCursor<'_>, identifier: &str) -> ExtractResult<u8> {
    if let Some(offset) = cursor.find(MOLECULE_SECTION_MARKER) {
        cursor.skip_line_at(offset);
    }

    while let Some(line) = cursor.next_line() {
        if let Some(multiplicity) = parse_charge_multiplicity(line) {
            return Ok(multiplicity);
        }
    }

    Err(DynTaxError::malformed_log(
        "INPUT.LOG_MULTIPLICITY_MARKER",
        format!(
            "log '{}' has no '<charge> <multiplicity>' line after '{}'",
            identifier, MOLECULE_SECTION_MARKER
        ),
    ))
}

/// `0 1` style line: an integer charge and a single-digit multiplicity.
fn parse_charge_multiplicity(line: &str) -> Option<u8> {
    let mut tokens = line.split_whitespace();
    let (Some(charge), Some(multiplicity), None) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return None;
    };
    charge.parse::<i32>().ok()?;
    match multiplicity.as_bytes() {
        [digit @ b'1'..=b'9'] => Some(digit - b'0'),
        _ => None,
    }
}

fn next_section(
    cursor: &mut LogCursor<'_>,
    identifier: &str,
    position: usize,
) -> ExtractResult<Option<ExcitedStateSection>> {
    let Some(header) = cursor.find(EXCITED_STATE_MARKER) else {
        return Ok(None);
    };
    if let Some(table) = cursor.find(TRANSITION_TABLE_MARKER)
        && table < header
    {
        return Ok(None);
    }

    let Some(end) = cursor.find_from(header, TOTAL_ENERGY_MARKER) else {
        return Err(section_error(identifier, position, TOTAL_ENERGY_MARKER));
    };
    let body = &cursor.text[header..end];

    let state_number = body[EXCITED_STATE_MARKER.len()..]
        .split(':')
        .next()
        .and_then(|number| number.trim().parse::<usize>().ok())
        .unwrap_or(position + 1);

    let excitation_energy = body
        .find(EXCITATION_ENERGY_MARKER)
        .and_then(|offset| {
            body[offset + EXCITATION_ENERGY_MARKER.len()..]
                .split_whitespace()
                .next()
        })
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or_else(|| section_error(identifier, position, EXCITATION_ENERGY_MARKER))?;

    cursor.skip_line_at(end);
    let multiplicity = section_multiplicity(cursor);

    Ok(Some(ExcitedStateSection {
        state_number,
        excitation_energy,
        multiplicity,
    }))
}

/// `Multiplicity:` word between the cursor and the next section or table.
fn section_multiplicity(cursor: &LogCursor<'_>) -> Option<SpinMultiplicity> {
    let boundary = [
        cursor.find(EXCITED_STATE_MARKER),
        cursor.find(TRANSITION_TABLE_MARKER),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(cursor.text.len());

    let window = &cursor.text[cursor.position..boundary];
    let offset = window.find(STATE_MULTIPLICITY_MARKER)?;
    window[offset + STATE_MULTIPLICITY_MARKER.len()..]
        .split_whitespace()
        .next()
        .and_then(SpinMultiplicity::from_word)
}

fn section_error(identifier: &str, position: usize, marker: &str) -> DynTaxError {
    DynTaxError::malformed_log(
        "INPUT.LOG_EXCITED_STATE_SECTION",
        format!(
            "excited-state section {} of log '{}' is missing '{}'",
            position + 1,
            identifier,
            marker
        ),
    )
}

fn read_transition_table(
    cursor: &mut LogCursor<'_>,
    identifier: &str,
    sections: &[ExcitedStateSection],
) -> ExtractResult<Vec<f64>> {
    let (Some(reference), Some(last)) = (sections.first(), sections.last()) else {
        return Ok(Vec::new());
    };
    let expected = sections.len() - 1;
    if expected == 0 {
        return Ok(Vec::new());
    }

    let Some(header) = cursor.find(TRANSITION_TABLE_MARKER) else {
        return Err(DynTaxError::malformed_log(
            "INPUT.LOG_TRANSITION_TABLE",
            format!(
                "log '{}' has {} excited states but no '{}' table",
                identifier,
                sections.len(),
                TRANSITION_TABLE_MARKER
            ),
        ));
    };
    cursor.skip_line_at(header);

    let mut moments = Vec::with_capacity(expected);
    let mut in_rows = false;
    while let Some(line) = cursor.next_line() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(ket) = row_states(&tokens) else {
            if in_rows {
                break;
            }
            continue;
        };
        in_rows = true;

        if ket == reference.state_number {
            continue;
        }
        moments.push(row_moment(&tokens, line, identifier)?);
        if ket == last.state_number {
            break;
        }
    }

    if moments.len() != expected {
        return Err(DynTaxError::malformed_log(
            "INPUT.LOG_TRANSITION_ROW_COUNT",
            format!(
                "log '{}' lists {} transition moments under '{}' for {} excited states",
                identifier, moments.len(), TRANSITION_TABLE_MARKER, expected
            ),
        ));
    }

    Ok(moments)
}

/// Ket index of a table row whose first two tokens are state numbers.
fn row_states(tokens: &[&str]) -> Option<usize> {
    let [bra, ket, ..] = tokens else {
        return None;
    };
    bra.parse::<usize>().ok()?;
    ket.parse::<usize>().ok()
}

fn row_moment(tokens: &[&str], line: &str, identifier: &str) -> ExtractResult<f64> {
    tokens
        .get(TRANSITION_MOMENT_COLUMN)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| {
            DynTaxError::malformed_log(
                "INPUT.LOG_TRANSITION_ROW",
                format!(
                    "log '{}' has an unreadable transition moment in row '{}' of '{}'",
                    identifier,
                    line.trim(),
                    TRANSITION_TABLE_MARKER
                ),
            )
        })
}

/// Turns log text into [`EsaRecord`]s using the configured step-to-time
/// factor and file suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct LogExtractor {
    time_per_step: f64,
    log_suffix: String,
}

impl LogExtractor {
    pub fn new(time_per_step: f64, log_suffix: impl Into<String>) -> Self {
        Self {
            time_per_step,
            log_suffix: log_suffix.into(),
        }
    }

    pub fn from_config(config: &SynthesisConfig) -> Self {
        Self::new(config.time_per_step, config.log_suffix.clone())
    }

    pub fn time_per_step(&self) -> f64 {
        self.time_per_step
    }

    pub fn log_suffix(&self) -> &str {
        &self.log_suffix
    }

    pub fn extract(&self, text: &str, identifier: &str) -> ExtractResult<EsaRecord> {
        let time = timestamp(identifier, &self.log_suffix, self.time_per_step)?;
        let record = scan_log(text, identifier)?.into_record(time)?;
        debug!(
            identifier,
            time = record.time(),
            states = record.state_count(),
            multiplicity = record.ground_state_multiplicity(),
            "extracted excited-state record"
        );
        Ok(record)
    }

    /// Reads `path` and extracts it, using the file name as identifier.
    pub fn extract_file(&self, path: &Path) -> ExtractResult<EsaRecord> {
        let text = fs::read_to_string(path).map_err(|source| {
            DynTaxError::io_system(
                "IO.LOG_READ",
                format!("failed to read log '{}': {}", path.display(), source),
            )
        })?;
        let identifier = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.extract(&text, &identifier)
    }

    /// Extracts one log and appends it to `series`; on error the series is
    /// left untouched.
    pub fn extract_into(
        &self,
        series: &mut TaSeries,
        text: &str,
        identifier: &str,
    ) -> ExtractResult<()> {
        let record = self.extract(text, identifier)?;
        series.add(record);
        Ok(())
    }
}

impl Default for LogExtractor {
    fn default() -> Self {
        Self::from_config(&SynthesisConfig::default())
    }
}
