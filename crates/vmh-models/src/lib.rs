//! Shared data models for vmh.
//!
//! This crate provides Serde-serializable types for:
//! - Timecodes as written into MLT playlist entries
//! - Cut segments derived from silence boundaries
//! - Resolved clip identities and logical tracks
//! - Silence detection distance buckets

pub mod clip;
pub mod distance;
pub mod segment;
pub mod timecode;

// Re-export common types
pub use clip::{ResolvedClip, TrackKind};
pub use distance::{Distance, DistanceParseError};
pub use segment::CutSegment;
pub use timecode::{format_timecode, parse_timecode, TimecodeError};
