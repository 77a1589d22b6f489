//! FFmpeg silence detection for vmh.
//!
//! This crate provides:
//! - The `SilenceDetector` seam the cut pipeline depends on
//! - An FFmpeg `silencedetect` implementation with duration probing
//! - A JSON cache of detected boundaries keyed by file and parameters
//!
//! # Usage
//!
//! ```rust,ignore
//! use vmh_media::{FfmpegSilenceDetector, SilenceDetectionConfig, SilenceDetector, TimestampCache};
//!
//! let detector = FfmpegSilenceDetector::new().with_cache(TimestampCache::default());
//! let timestamps = detector
//!     .detect(&audio_path, &SilenceDetectionConfig::default(), false)
//!     .await?;
//! ```

pub mod cache;
pub mod command;
pub mod config;
pub mod error;
pub mod probe;
pub mod silence;

pub use cache::TimestampCache;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use config::SilenceDetectionConfig;
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration;
pub use silence::{
    parse_silencedetect, silence_boundaries, FfmpegSilenceDetector, SilenceDetector,
    SilenceInterval,
};
