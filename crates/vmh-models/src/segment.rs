//! Cut segments derived from silence boundaries.

use serde::{Deserialize, Serialize};

use crate::timecode::format_timecode;

/// A retained `(start, end)` range of a clip, in seconds.
///
/// Segments are regenerated on every run from the boundary timestamps and
/// are never stored on their own; they only exist as playlist entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutSegment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl CutSegment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Copy of this segment with a negative start moved to zero.
    pub fn clamped(self) -> Self {
        Self {
            start: self.start.max(0.0),
            end: self.end,
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Entry `in` timecode.
    pub fn in_timecode(&self) -> String {
        format_timecode(self.start)
    }

    /// Entry `out` timecode.
    pub fn out_timecode(&self) -> String {
        format_timecode(self.end)
    }
}

impl std::fmt::Display for CutSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s -> {:.3}s", self.start, self.end)
    }
}
