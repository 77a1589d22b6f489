//! Error types for project operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Errors that can occur while resolving clips or rewriting playlists.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{filename} not found in project")]
    Resolution { filename: String },

    #[error("{filename} matches {} chains in project: {}", candidates.len(), candidates.join(", "))]
    Ambiguous {
        filename: String,
        candidates: Vec<String>,
    },

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("Chain not found: {0}")]
    ChainNotFound(String),

    #[error("Invalid timestamps: {0}")]
    InvalidTimestamps(String),

    #[error("Output path is the input project, use overwrite instead: {0}")]
    OutputIsInput(PathBuf),

    #[error("Malformed project document: {0}")]
    Malformed(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProjectError {
    /// Create a resolution error for a file that has no usable chain.
    pub fn resolution(filename: impl Into<String>) -> Self {
        Self::Resolution {
            filename: filename.into(),
        }
    }

    /// Create an invalid timestamps error.
    pub fn invalid_timestamps(message: impl Into<String>) -> Self {
        Self::InvalidTimestamps(message.into())
    }

    /// Create a malformed document error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
