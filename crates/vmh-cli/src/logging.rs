//! Tracing setup and per-track logging.

use std::path::Path;

use tracing::{info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vmh_models::{ResolvedClip, TrackKind};

/// Install the global subscriber.
///
/// Colored human output by default, JSON with `json`. `RUST_LOG` replaces
/// the `vmh=info` baseline.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vmh=info"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logs the lifecycle of one track inside a cut with consistent fields.
#[derive(Debug, Clone)]
pub struct TrackLogger {
    project: String,
    track: TrackKind,
}

impl TrackLogger {
    pub fn new(project: &Path, track: TrackKind) -> Self {
        Self {
            project: project.display().to_string(),
            track,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn track(&self) -> TrackKind {
        self.track
    }

    /// Log the chain a media file resolved to.
    ///
    /// Every playlist placing the chain is listed; only the first one is
    /// rewritten, so extra playlists are reported as a warning.
    pub fn log_resolved(&self, file: &Path, clip: &ResolvedClip) {
        info!(
            project = %self.project,
            track = %self.track,
            file = %file.display(),
            chain_id = %clip.chain_id,
            editing_id = %clip.editing_id,
            playlist_id = %clip.playlist_id,
            playlists = ?clip.playlists,
            "Clip resolved"
        );

        if clip.has_multiple_playlists() {
            warn!(
                project = %self.project,
                track = %self.track,
                chain_id = %clip.chain_id,
                playlists = ?clip.playlists,
                "Chain appears in several playlists, rewriting {}", clip.playlist_id
            );
        }
    }

    /// Log a finished playlist rewrite.
    pub fn log_rewritten(&self, playlist_id: &str, entries: usize) {
        info!(
            project = %self.project,
            track = %self.track,
            playlist_id = %playlist_id,
            entries,
            "Playlist rewritten"
        );
    }

    /// Log an exported fragment file.
    pub fn log_exported(&self, path: &Path, entries: usize) {
        info!(
            project = %self.project,
            track = %self.track,
            path = %path.display(),
            entries,
            "Fragment exported"
        );
    }

    /// Span wrapping all work on this track.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("track", project = %self.project, track = %self.track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_logger_fields() {
        let logger = TrackLogger::new(Path::new("/work/talk.kdenlive"), TrackKind::VideoAudio);
        assert_eq!(logger.project(), "/work/talk.kdenlive");
        assert_eq!(logger.track(), TrackKind::VideoAudio);
    }
}
