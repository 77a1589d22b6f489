//! Segment derivation from silence boundary timestamps.
//!
//! Boundaries alternate `[silence_start, silence_end, silence_start, ...]`.
//! Overlapping pairs are taken over the whole list and, skipping the first
//! pair, every other pair is kept:
//!
//! ```text
//! timestamps   0.5   1.0   2.0   3.0   4.0   5.0
//! pairs        └─0─┘ └─1─┘ └─2─┘ └─3─┘ └─4─┘
//!              skip  KEEP  skip  KEEP  skip
//! ```
//!
//! The skipped pairs are the silent runs, the kept ones the speech between.

use vmh_models::CutSegment;

use crate::error::{ProjectError, ProjectResult};

/// Check that timestamps are finite and never go backwards.
pub fn validate_timestamps(timestamps: &[f64]) -> ProjectResult<()> {
    if let Some((index, value)) = timestamps
        .iter()
        .enumerate()
        .find(|(_, t)| !t.is_finite())
    {
        return Err(ProjectError::invalid_timestamps(format!(
            "timestamp {} is not finite ({})",
            index, value
        )));
    }

    if let Some(index) = timestamps.windows(2).position(|w| w[1] < w[0]) {
        return Err(ProjectError::invalid_timestamps(format!(
            "timestamp {} ({:.3}) comes before timestamp {} ({:.3})",
            index + 1,
            timestamps[index + 1],
            index,
            timestamps[index]
        )));
    }

    Ok(())
}

/// Derive the kept segments, clamping negative starts to zero.
pub fn derive_segments(timestamps: &[f64]) -> ProjectResult<Vec<CutSegment>> {
    validate_timestamps(timestamps)?;

    Ok(timestamps
        .windows(2)
        .skip(1)
        .step_by(2)
        .map(|pair| CutSegment::new(pair[0], pair[1]).clamped())
        .collect())
}
