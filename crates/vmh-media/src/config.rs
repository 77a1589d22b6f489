//! Configuration for silence detection.
//!
//! These parameters control what FFmpeg's `silencedetect` filter reports as
//! silence and how much room is left around speech.

use serde::{Deserialize, Serialize};
use vmh_models::Distance;

/// Configuration for FFmpeg silence detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceDetectionConfig {
    /// Minimum silence duration worth cutting (seconds).
    ///
    /// - Lower values (0.2-0.3): Aggressive cutting, jumpy result
    /// - Default (0.5): Natural pauses between sentences are removed
    /// - Higher values (1.0+): Only long pauses are cut
    pub min_silence_secs: f64,

    /// Loudness below which audio counts as silence (dBFS).
    ///
    /// Quiet rooms work with -40 or lower; noisy recordings need -30 or
    /// higher so background hum is not mistaken for speech.
    pub threshold_db: i32,

    /// Margin kept between speech and the cut points.
    pub distance: Distance,

    /// Upper bound for one FFmpeg analysis run (seconds).
    pub timeout_secs: u64,
}

impl Default for SilenceDetectionConfig {
    fn default() -> Self {
        Self {
            min_silence_secs: 0.5,
            threshold_db: -35,
            distance: Distance::Tiny,
            timeout_secs: 3600,
        }
    }
}

impl SilenceDetectionConfig {
    /// Create a more aggressive configuration for fast-paced content.
    pub fn aggressive() -> Self {
        Self {
            min_silence_secs: 0.3,
            threshold_db: -30,
            distance: Distance::Negative,
            ..Self::default()
        }
    }

    /// Create a conservative configuration that preserves more content.
    pub fn conservative() -> Self {
        Self {
            min_silence_secs: 1.0,
            threshold_db: -45,
            distance: Distance::Medium,
            ..Self::default()
        }
    }

    /// Builder-style setter for the minimum silence duration.
    pub fn with_min_silence_secs(mut self, secs: f64) -> Self {
        self.min_silence_secs = if secs.is_finite() { secs.max(0.01) } else { 0.01 };
        self
    }

    /// Builder-style setter for the loudness threshold.
    pub fn with_threshold_db(mut self, db: i32) -> Self {
        self.threshold_db = db.clamp(-100, 0);
        self
    }

    /// Builder-style setter for the distance bucket.
    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    /// The `silencedetect` filter expression for this configuration.
    pub fn filter(&self) -> String {
        format!(
            "silencedetect=noise={}dB:d={}",
            self.threshold_db, self.min_silence_secs
        )
    }
}
