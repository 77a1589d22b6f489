//! Silence cutting for Kdenlive projects.
//!
//! Ties silence detection to playlist rewriting:
//! - [`CutPipeline`] detects silences once and cuts every track of a recording
//! - [`inspect`] reports how a media file is wired into a project
//! - [`CutConfig`] collects defaults from the environment

pub mod cli;
pub mod config;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod pipeline;

pub use config::CutConfig;
pub use error::{PipelineError, PipelineResult};
pub use inspect::{inspect, EntrySummary, Inspection};
pub use logging::{init_tracing, TrackLogger};
pub use pipeline::{apply_cut, CutPipeline, CutReport, CutRequest, OutputMode, TrackOutcome};
