//! Timecode formatting and parsing for MLT playlist entries.
//!
//! Entries written by vmh use `HH:MM:S.mmm`: hours and minutes are padded to
//! two digits while seconds keep three decimals without padding. Values under
//! one minute therefore read `00:00:2.500`, which is what existing projects
//! produced by the fragment template contain.

use thiserror::Error;

const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Format seconds as an entry timecode.
///
/// Negative and non-finite values are written as zero.
///
/// # Examples
/// ```
/// use vmh_models::timecode::format_timecode;
/// assert_eq!(format_timecode(2.5), "00:00:2.500");
/// assert_eq!(format_timecode(75.25), "00:01:15.250");
/// assert_eq!(format_timecode(-0.2), "00:00:0.000");
/// ```
pub fn format_timecode(total_secs: f64) -> String {
    let total_secs = if total_secs.is_finite() && total_secs > 0.0 {
        total_secs
    } else {
        0.0
    };

    // Branch on the printed value so both forms agree at rounding ties.
    let rounded = format!("{:.3}", total_secs);
    let millis = rounded
        .parse::<f64>()
        .map(|secs| (secs * 1000.0).round() as u64)
        .unwrap_or_default();
    if millis < MILLIS_PER_MINUTE {
        return format!("00:00:{}", rounded);
    }

    let hours = millis / MILLIS_PER_HOUR;
    let mins = (millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    let secs = (millis % MILLIS_PER_MINUTE) as f64 / 1000.0;

    format!("{:02}:{:02}:{:.3}", hours, mins, secs)
}

/// Parse a clock timecode (`HH:MM:SS[.mmm]` or `MM:SS[.mmm]`) into seconds.
///
/// Bare numbers are rejected: MLT reads those as frame counts, which cannot
/// be converted without the project profile.
pub fn parse_timecode(tc: &str) -> Result<f64, TimecodeError> {
    let tc = tc.trim();
    if tc.is_empty() {
        return Err(TimecodeError::Empty);
    }

    let parts: Vec<&str> = tc.split(':').collect();
    let (hours, mins, secs) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(TimecodeError::InvalidFormat(tc.to_string())),
    };

    let hours: f64 = hours
        .parse()
        .map_err(|_| TimecodeError::InvalidValue("hours", hours.to_string()))?;
    let mins: f64 = mins
        .parse()
        .map_err(|_| TimecodeError::InvalidValue("minutes", mins.to_string()))?;
    let secs: f64 = secs
        .parse()
        .map_err(|_| TimecodeError::InvalidValue("seconds", secs.to_string()))?;

    if hours < 0.0 || mins < 0.0 || secs < 0.0 {
        return Err(TimecodeError::Negative);
    }

    Ok(hours * 3600.0 + mins * 60.0 + secs)
}

/// Timecode parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimecodeError {
    #[error("Timecode cannot be empty")]
    Empty,

    #[error("Timecode cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timecode format '{0}'. Use HH:MM:SS.mmm or MM:SS.mmm")]
    InvalidFormat(String),
}
