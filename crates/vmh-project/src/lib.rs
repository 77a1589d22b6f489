//! Clip resolution and playlist rewriting for Kdenlive/MLT projects.
//!
//! This crate provides:
//! - A lossless in-memory XML tree for project documents
//! - Chain lookup by media file, with `set.test_audio` disambiguation
//! - Segment derivation from silence boundary timestamps
//! - Destructive playlist rewrites, in place or copy-on-write
//! - Standalone entry fragments for manual pasting
//!
//! # Usage
//!
//! ```rust,ignore
//! use vmh_project::{resolve_clip, rewrite_playlist, PlaylistRewrite};
//!
//! let clip = resolve_clip(&video, &project, Some("0"))?;
//! let output = rewrite_playlist(
//!     &project,
//!     PlaylistRewrite {
//!         playlist_id: &clip.playlist_id,
//!         chain_id: &clip.chain_id,
//!         editing_id: &clip.editing_id,
//!     },
//!     &timestamps,
//!     &output,
//!     false,
//! )?;
//! ```

pub mod document;
pub mod error;
pub mod fragment;
pub mod resolver;
pub mod segments;
pub mod writer;

pub use document::{Document, Element, Node};
pub use error::{ProjectError, ProjectResult};
pub use fragment::{export_fragment, render_fragment};
pub use resolver::{resolve_clip, search_name, ClipResolver};
pub use segments::{derive_segments, validate_timestamps};
pub use writer::{
    apply_segments, apply_timestamps, output_target, rewrite_playlist, PlaylistRewrite,
};
