//! Distance buckets for silence detection.
//!
//! A bucket sets how far cuts stay away from speech:
//!
//! - `negative`: cuts bite into the edges of speech (tightest)
//! - `tiny` to `huge`: progressively wider margins around speech

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Margin kept between detected speech and the cut points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    Negative,
    #[default]
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl Distance {
    /// All buckets, tightest first.
    pub const ALL: &'static [Distance] = &[
        Distance::Negative,
        Distance::Tiny,
        Distance::Small,
        Distance::Medium,
        Distance::Large,
        Distance::Huge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Negative => "negative",
            Distance::Tiny => "tiny",
            Distance::Small => "small",
            Distance::Medium => "medium",
            Distance::Large => "large",
            Distance::Huge => "huge",
        }
    }

    /// Seconds of audio kept on each side of speech.
    ///
    /// Negative for [`Distance::Negative`], which trims into speech instead.
    pub fn margin_secs(&self) -> f64 {
        match self {
            Distance::Negative => -0.1,
            Distance::Tiny => 0.05,
            Distance::Small => 0.1,
            Distance::Medium => 0.2,
            Distance::Large => 0.35,
            Distance::Huge => 0.5,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Distance {
    type Err = DistanceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "negative" => Ok(Distance::Negative),
            "tiny" => Ok(Distance::Tiny),
            "small" => Ok(Distance::Small),
            "medium" => Ok(Distance::Medium),
            "large" => Ok(Distance::Large),
            "huge" => Ok(Distance::Huge),
            _ => Err(DistanceParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown distance bucket: {0}")]
pub struct DistanceParseError(String);
