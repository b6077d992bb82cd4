use crate::domain::{DynTaxError, ExtractResult};

/// Trailing step index of a log identifier such as `geo_12.out`.
///
/// `suffix` is removed first when present; the remaining string must end in
/// at least one ASCII digit.
pub fn step_index(identifier: &str, suffix: &str) -> ExtractResult<u64> {
    let stem = identifier.strip_suffix(suffix).unwrap_or(identifier);
    let digit_count = stem
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .count();

    if digit_count == 0 {
        return Err(DynTaxError::unrecognized_identifier(format!(
            "log identifier '{}' does not end in a step number before '{}'",
            identifier, suffix
        )));
    }

    let digits = &stem[stem.len() - digit_count..];
    digits.parse::<u64>().map_err(|source| {
        DynTaxError::unrecognized_identifier(format!(
            "log identifier '{}' has unreadable step number '{}': {}",
            identifier, digits, source
        ))
    })
}

/// Simulation time of a log: step index × `time_per_step`.
pub fn timestamp(identifier: &str, suffix: &str, time_per_step: f64) -> ExtractResult<f64> {
    step_index(identifier, suffix).map(|step| step as f64 * time_per_step)
}
