//! Silence boundary detection.
//!
//! Runs FFmpeg's `silencedetect` filter over a media file and turns the
//! reported silent intervals into a flat boundary list:
//!
//! ```text
//! [silence_start, silence_end, silence_start, silence_end, ..., (duration)]
//! ```
//!
//! The list always opens with a silence: when the audio starts with speech a
//! zero-length silence at `0.0` is prepended. When the audio ends with
//! speech, the media duration closes the last speech run. Speech runs are
//! widened by the distance margin; runs swallowed by a negative margin merge
//! the silences around them.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cache::TimestampCache;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::SilenceDetectionConfig;
use crate::error::MediaResult;
use crate::probe::probe_duration;

/// One silent interval reported by FFmpeg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceInterval {
    /// Start time in seconds, may be slightly negative.
    pub start: f64,
    /// End time in seconds; `None` when silence runs to the end of the file.
    pub end: Option<f64>,
}

/// Source of silence boundary timestamps.
#[async_trait]
pub trait SilenceDetector: Send + Sync {
    /// Detect silence boundaries in `path`.
    ///
    /// With `force`, previously computed results are ignored.
    async fn detect(
        &self,
        path: &Path,
        config: &SilenceDetectionConfig,
        force: bool,
    ) -> MediaResult<Vec<f64>>;
}

/// Silence detector backed by the FFmpeg CLI.
#[derive(Debug, Clone, Default)]
pub struct FfmpegSilenceDetector {
    cache: Option<TimestampCache>,
}

impl FfmpegSilenceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse boundaries from earlier runs stored in `cache`.
    pub fn with_cache(mut self, cache: TimestampCache) -> Self {
        self.cache = Some(cache);
        self
    }
}

#[async_trait]
impl SilenceDetector for FfmpegSilenceDetector {
    async fn detect(
        &self,
        path: &Path,
        config: &SilenceDetectionConfig,
        force: bool,
    ) -> MediaResult<Vec<f64>> {
        if let (Some(cache), false) = (&self.cache, force) {
            if let Some(timestamps) = cache.load(path, config).await? {
                info!(path = %path.display(), boundaries = timestamps.len(), "Using cached silence boundaries");
                return Ok(timestamps);
            }
        }

        let duration = probe_duration(path).await?;

        debug!(
            path = %path.display(),
            duration,
            filter = %config.filter(),
            "Starting silence detection"
        );

        let cmd = FfmpegCommand::new(path)
            .no_video()
            .audio_filter(config.filter());
        let stderr = FfmpegRunner::new()
            .with_timeout(config.timeout_secs)
            .run_capture_stderr(&cmd)
            .await?;

        let intervals = parse_silencedetect(&stderr);
        let timestamps = silence_boundaries(&intervals, duration, config.distance.margin_secs());

        info!(
            path = %path.display(),
            silences = intervals.len(),
            boundaries = timestamps.len(),
            "Silence detection complete"
        );

        if let Some(cache) = &self.cache {
            cache.remember(path, config, &timestamps).await;
        }

        Ok(timestamps)
    }
}

/// Parse `silence_start` / `silence_end` lines from FFmpeg's log.
pub fn parse_silencedetect(log: &str) -> Vec<SilenceInterval> {
    let mut intervals: Vec<SilenceInterval> = Vec::new();

    for line in log.lines() {
        if let Some(start) = value_after(line, "silence_start:") {
            intervals.push(SilenceInterval { start, end: None });
        } else if let Some(end) = value_after(line, "silence_end:") {
            match intervals.last_mut() {
                Some(open) if open.end.is_none() => open.end = Some(end),
                // End without a start: silence from the very beginning.
                _ => intervals.push(SilenceInterval {
                    start: 0.0,
                    end: Some(end),
                }),
            }
        }
    }

    intervals
}

fn value_after(line: &str, key: &str) -> Option<f64> {
    let rest = &line[line.find(key)? + key.len()..];
    rest.split(|c: char| c.is_whitespace() || c == '|')
        .find(|token| !token.is_empty())?
        .parse()
        .ok()
}

/// Build the boundary list from silent intervals.
///
/// `margin` is kept on each side of speech; a negative margin trims speech.
pub fn silence_boundaries(intervals: &[SilenceInterval], duration: f64, margin: f64) -> Vec<f64> {
    let mut silences: Vec<(f64, f64)> = Vec::new();

    for interval in intervals {
        let end = interval.end.unwrap_or(duration);
        let start = if interval.start <= 0.0 {
            interval.start
        } else {
            interval.start + margin
        };
        let end = if end >= duration { end } else { end - margin };

        if end <= start {
            continue;
        }

        match silences.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => silences.push((start, end)),
        }
    }

    if silences.first().map_or(true, |(start, _)| *start > 0.0) {
        silences.insert(0, (0.0, 0.0));
    }

    let mut timestamps: Vec<f64> = silences.iter().flat_map(|&(s, e)| [s, e]).collect();

    if silences.last().map_or(true, |(_, end)| *end < duration) {
        timestamps.push(duration);
    }

    timestamps
}
