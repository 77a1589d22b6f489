//! Multi-track cut orchestration.
//!
//! A recording usually appears three times in a project: the video chain
//! (`set.test_audio = 0`), the same file feeding the audio track
//! (`set.test_audio = 1`) and, when sound was recorded separately, the
//! audio file's own chain. One set of silence boundaries drives all of them
//! so the tracks stay in sync.

use std::path::{Path, PathBuf};

use tracing::{info, Instrument};
use vmh_media::{SilenceDetectionConfig, SilenceDetector};
use vmh_models::{ResolvedClip, TrackKind};
use vmh_project::{
    apply_timestamps, derive_segments, export_fragment, output_target, search_name, ClipResolver,
    Document, PlaylistRewrite,
};

use crate::error::PipelineResult;
use crate::logging::TrackLogger;

/// Where the cut ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Rewrite playlists in the project; in place with `overwrite`.
    Project { overwrite: bool },
    /// Leave the project alone and write one entry fragment per track
    /// into the output directory.
    Fragments,
}

/// One cut invocation.
#[derive(Debug, Clone)]
pub struct CutRequest {
    pub video: PathBuf,
    /// Separately recorded audio; detection runs on it when present.
    pub audio: Option<PathBuf>,
    pub project: PathBuf,
    /// Output project file, or directory in fragment mode.
    pub output: PathBuf,
    pub mode: OutputMode,
    pub detection: SilenceDetectionConfig,
    /// Fail when several chains match a file.
    pub strict: bool,
    /// Ignore cached detection results.
    pub force: bool,
}

impl CutRequest {
    /// File the silence boundaries are detected on.
    pub fn detection_source(&self) -> &Path {
        self.audio.as_deref().unwrap_or(&self.video)
    }

    /// Tracks to cut, in processing order, with the media file each one
    /// is resolved from.
    pub fn tracks(&self) -> Vec<(TrackKind, &Path)> {
        let audio = self.audio.as_deref().filter(|a| *a != self.video);

        TrackKind::ALL
            .iter()
            .filter_map(|&track| match track {
                TrackKind::VideoOnly | TrackKind::VideoAudio => Some((track, self.video.as_path())),
                TrackKind::Audio => audio.map(|file| (track, file)),
            })
            .collect()
    }
}

/// Result for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackOutcome {
    pub track: TrackKind,
    pub clip: ResolvedClip,
    pub entries: usize,
    /// Fragment file, in fragment mode.
    pub fragment: Option<PathBuf>,
}

/// Result of a whole cut.
#[derive(Debug, Clone, PartialEq)]
pub struct CutReport {
    /// Project file written, or fragment directory.
    pub output: PathBuf,
    pub boundaries: usize,
    pub tracks: Vec<TrackOutcome>,
}

/// Detects silences once and cuts every track of a recording.
#[derive(Debug, Clone)]
pub struct CutPipeline<D> {
    detector: D,
}

impl<D: SilenceDetector> CutPipeline<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub async fn run(&self, request: &CutRequest) -> PipelineResult<CutReport> {
        let source = request.detection_source();

        let timestamps = self
            .detector
            .detect(source, &request.detection, request.force)
            .instrument(tracing::info_span!("detect", source = %source.display()))
            .await?;

        info!(
            source = %source.display(),
            boundaries = timestamps.len(),
            "Silence boundaries ready"
        );

        apply_cut(request, &timestamps)
    }
}

/// Cut every track of `request` at `timestamps`.
///
/// Tracks are processed in order and the first failure aborts the run. In
/// project mode all rewrites are applied to one document, each track seeing
/// the edits of the ones before it, and the result is saved once.
pub fn apply_cut(request: &CutRequest, timestamps: &[f64]) -> PipelineResult<CutReport> {
    // Reject bad boundaries before anything is resolved or written.
    derive_segments(timestamps)?;

    match request.mode {
        OutputMode::Project { overwrite } => cut_project(request, timestamps, overwrite),
        OutputMode::Fragments => cut_fragments(request, timestamps),
    }
}

fn cut_project(
    request: &CutRequest,
    timestamps: &[f64],
    overwrite: bool,
) -> PipelineResult<CutReport> {
    let target = output_target(&request.project, &request.output, overwrite)?;
    let mut document = Document::open(&request.project)?;
    let mut tracks = Vec::new();

    for (track, file) in request.tracks() {
        let logger = TrackLogger::new(&request.project, track);
        let _span = logger.create_span().entered();

        let clip = resolve_track(&document, request, track, file)?;
        logger.log_resolved(file, &clip);

        let entries = apply_timestamps(
            &mut document,
            PlaylistRewrite {
                playlist_id: &clip.playlist_id,
                chain_id: &clip.chain_id,
                editing_id: &clip.editing_id,
            },
            timestamps,
        )?;
        logger.log_rewritten(&clip.playlist_id, entries);

        tracks.push(TrackOutcome {
            track,
            clip,
            entries,
            fragment: None,
        });
    }

    document.save(&target)?;
    info!(output = %target.display(), tracks = tracks.len(), "Project saved");

    Ok(CutReport {
        output: target,
        boundaries: timestamps.len(),
        tracks,
    })
}

fn cut_fragments(request: &CutRequest, timestamps: &[f64]) -> PipelineResult<CutReport> {
    let document = Document::open(&request.project)?;
    std::fs::create_dir_all(&request.output)?;
    let mut tracks = Vec::new();

    for (track, file) in request.tracks() {
        let logger = TrackLogger::new(&request.project, track);
        let _span = logger.create_span().entered();

        let clip = resolve_track(&document, request, track, file)?;
        logger.log_resolved(file, &clip);

        let path = request.output.join(track.fragment_file_name());
        let path = export_fragment(&clip.chain_id, &clip.editing_id, timestamps, &path)?;
        let entries = derive_segments(timestamps)?.len();
        logger.log_exported(&path, entries);

        tracks.push(TrackOutcome {
            track,
            clip,
            entries,
            fragment: Some(path),
        });
    }

    Ok(CutReport {
        output: request.output.clone(),
        boundaries: timestamps.len(),
        tracks,
    })
}

fn resolve_track(
    document: &Document,
    request: &CutRequest,
    track: TrackKind,
    file: &Path,
) -> PipelineResult<ResolvedClip> {
    let name = search_name(file, &request.project);
    let clip = ClipResolver::new(document)
        .strict(request.strict)
        .resolve(&name, track.secondary_value())?;
    Ok(clip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(audio: Option<&str>) -> CutRequest {
        CutRequest {
            video: PathBuf::from("/work/talk.mp4"),
            audio: audio.map(PathBuf::from),
            project: PathBuf::from("/work/talk.kdenlive"),
            output: PathBuf::from("/work/talk-cut.kdenlive"),
            mode: OutputMode::Project { overwrite: false },
            detection: SilenceDetectionConfig::default(),
            strict: false,
            force: false,
        }
    }

    #[test]
    fn test_tracks_without_audio() {
        let req = request(None);
        let kinds: Vec<_> = req.tracks().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![TrackKind::VideoOnly, TrackKind::VideoAudio]);
        assert_eq!(req.detection_source(), Path::new("/work/talk.mp4"));
    }

    #[test]
    fn test_tracks_with_audio() {
        let req = request(Some("/work/voice.wav"));
        let tracks = req.tracks();
        let kinds: Vec<_> = tracks.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, TrackKind::ALL);
        assert_eq!(tracks[2], (TrackKind::Audio, Path::new("/work/voice.wav")));
        assert_eq!(req.detection_source(), Path::new("/work/voice.wav"));
    }

    #[test]
    fn test_audio_same_as_video_is_not_a_track() {
        let req = request(Some("/work/talk.mp4"));
        assert_eq!(req.tracks().len(), 2);
    }

    #[test]
    fn test_invalid_timestamps_fail_before_io() {
        // The project path does not exist; validation must fail first.
        let err = apply_cut(&request(None), &[0.0, f64::NAN]).unwrap_err();
        assert!(matches!(
            err,
            crate::PipelineError::Project(vmh_project::ProjectError::InvalidTimestamps(_))
        ));
    }
}
