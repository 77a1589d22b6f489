//! Playlist rewriting.
//!
//! Replaces every child of a playlist with one `entry` per kept segment:
//!
//! ```xml
//! <playlist id="playlist0">
//!   <entry producer="chain1" in="00:00:1.000" out="00:00:2.000">
//!     <property name="kdenlive:id">2</property>
//!   </entry>
//! </playlist>
//! ```
//!
//! The rewrite is destructive: blanks, previous entries and any attribute
//! other than `id` are gone afterwards.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vmh_models::CutSegment;

use crate::document::{Document, Element};
use crate::error::{ProjectError, ProjectResult};
use crate::resolver::{ClipResolver, EDITING_ID_PROPERTY};
use crate::segments::derive_segments;

/// Identity of the playlist edit.
#[derive(Debug, Clone, Copy)]
pub struct PlaylistRewrite<'a> {
    /// Playlist whose entries are replaced.
    pub playlist_id: &'a str,
    /// Chain referenced by every new entry.
    pub chain_id: &'a str,
    /// Editing identifier stamped on every new entry.
    pub editing_id: &'a str,
}

/// Build one playlist entry for a segment.
pub fn entry_element(chain_id: &str, editing_id: &str, segment: &CutSegment) -> Element {
    Element::new("entry")
        .with_attr("producer", chain_id)
        .with_attr("in", segment.in_timecode())
        .with_attr("out", segment.out_timecode())
        .with_child(
            Element::new("property")
                .with_attr("name", EDITING_ID_PROPERTY)
                .with_text(editing_id),
        )
}

/// Replace the entries of a playlist in a parsed document.
///
/// Returns the number of entries written.
pub fn apply_segments(
    document: &mut Document,
    rewrite: PlaylistRewrite<'_>,
    segments: &[CutSegment],
) -> ProjectResult<usize> {
    if !ClipResolver::new(document).has_source(rewrite.chain_id) {
        return Err(ProjectError::ChainNotFound(rewrite.chain_id.to_string()));
    }

    let playlist = document
        .find_mut(|el| el.name() == "playlist" && el.attr("id") == Some(rewrite.playlist_id))
        .ok_or_else(|| ProjectError::PlaylistNotFound(rewrite.playlist_id.to_string()))?;

    playlist.clear();
    playlist.set_attr("id", rewrite.playlist_id);

    for segment in segments {
        playlist.push_child(entry_element(rewrite.chain_id, rewrite.editing_id, segment));
    }

    debug!(
        playlist_id = rewrite.playlist_id,
        chain_id = rewrite.chain_id,
        entries = segments.len(),
        kept_secs = segments.iter().map(CutSegment::duration_secs).sum::<f64>(),
        "Playlist entries replaced"
    );

    Ok(segments.len())
}

/// Derive segments from `timestamps` and rewrite a playlist in a parsed document.
pub fn apply_timestamps(
    document: &mut Document,
    rewrite: PlaylistRewrite<'_>,
    timestamps: &[f64],
) -> ProjectResult<usize> {
    let segments = derive_segments(timestamps)?;
    apply_segments(document, rewrite, &segments)
}

/// Rewrite a playlist of the project at `project_path`.
///
/// With `overwrite` the project is replaced and its path returned; otherwise
/// the result goes to `output_path`, which must be a different file.
///
/// To accumulate several rewrites in one document, pass the returned path as
/// the next call's `project_path`.
pub fn rewrite_playlist(
    project_path: &Path,
    rewrite: PlaylistRewrite<'_>,
    timestamps: &[f64],
    output_path: &Path,
    overwrite: bool,
) -> ProjectResult<PathBuf> {
    let target = output_target(project_path, output_path, overwrite)?;

    let mut document = Document::open(project_path)?;
    let entries = apply_timestamps(&mut document, rewrite, timestamps)?;
    document.save(&target)?;

    info!(
        playlist_id = rewrite.playlist_id,
        entries,
        output = %target.display(),
        "Playlist rewritten"
    );

    Ok(target)
}

/// File a rewrite of `project_path` is saved to.
///
/// Fails with [`ProjectError::OutputIsInput`] when a copy-on-write target
/// names the project itself.
pub fn output_target(project_path: &Path, output_path: &Path, overwrite: bool) -> ProjectResult<PathBuf> {
    if overwrite {
        return Ok(project_path.to_path_buf());
    }
    if same_file(project_path, output_path) {
        return Err(ProjectError::OutputIsInput(output_path.to_path_buf()));
    }
    Ok(output_path.to_path_buf())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"<mlt>
 <chain id="chain1">
  <property name="resource">talk.mp4</property>
  <property name="kdenlive:id">2</property>
 </chain>
 <playlist id="playlist0" title="old">
  <entry producer="chain1" in="00:00:00.000" out="00:00:09.000"/>
  <blank length="4"/>
 </playlist>
</mlt>"#;

    fn rewrite() -> PlaylistRewrite<'static> {
        PlaylistRewrite {
            playlist_id: "playlist0",
            chain_id: "chain1",
            editing_id: "2",
        }
    }

    #[test]
    fn test_entry_element_shape() {
        let entry = entry_element("chain1", "2", &CutSegment::new(1.0, 2.5));
        let doc = Document::from_nodes(vec![crate::document::Node::Element(entry)]);
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<entry producer="chain1" in="00:00:1.000" out="00:00:2.500"><property name="kdenlive:id">2</property></entry>"#
        );
    }

    #[test]
    fn test_apply_replaces_all_children() {
        let mut doc = Document::parse(PROJECT).unwrap();
        let written = apply_timestamps(&mut doc, rewrite(), &[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(written, 2);

        let playlist = doc.playlist("playlist0").unwrap();
        assert_eq!(playlist.attributes(), &[("id".to_string(), "playlist0".to_string())]);

        let entries: Vec<_> = playlist.child_elements().collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.name() == "entry"));
        assert_eq!(entries[0].attr("in"), Some("00:00:1.000"));
        assert_eq!(entries[0].attr("out"), Some("00:00:2.000"));
        assert_eq!(entries[1].attr("in"), Some("00:00:3.000"));
        assert_eq!(entries[1].attr("out"), Some("00:00:4.000"));
        assert_eq!(entries[1].property("kdenlive:id").as_deref(), Some("2"));
    }

    #[test]
    fn test_missing_playlist_is_not_found() {
        let mut doc = Document::parse(PROJECT).unwrap();
        let err = apply_timestamps(
            &mut doc,
            PlaylistRewrite {
                playlist_id: "playlist9",
                ..rewrite()
            },
            &[0.0, 1.0, 2.0],
        )
        .unwrap_err();
        assert!(matches!(err, ProjectError::PlaylistNotFound(ref id) if id == "playlist9"));
    }

    #[test]
    fn test_missing_chain_is_not_found() {
        let mut doc = Document::parse(PROJECT).unwrap();
        let err = apply_timestamps(
            &mut doc,
            PlaylistRewrite {
                chain_id: "chain7",
                ..rewrite()
            },
            &[0.0, 1.0, 2.0],
        )
        .unwrap_err();
        assert!(matches!(err, ProjectError::ChainNotFound(_)));
    }

    #[test]
    fn test_copy_on_write_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.kdenlive");
        let output = dir.path().join("out.kdenlive");
        std::fs::write(&input, PROJECT).unwrap();

        let written =
            rewrite_playlist(&input, rewrite(), &[0.0, 1.0, 2.0], &output, false).unwrap();

        assert_eq!(written, output);
        assert_eq!(std::fs::read_to_string(&input).unwrap(), PROJECT);
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .contains(r#"in="00:00:1.000" out="00:00:2.000""#));
    }

    #[test]
    fn test_overwrite_replaces_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.kdenlive");
        std::fs::write(&input, PROJECT).unwrap();

        let written = rewrite_playlist(
            &input,
            rewrite(),
            &[0.0, 1.0, 2.0],
            &dir.path().join("ignored.kdenlive"),
            true,
        )
        .unwrap();

        assert_eq!(written, input);
        assert!(!dir.path().join("ignored.kdenlive").exists());
        assert!(!std::fs::read_to_string(&input).unwrap().contains("<blank"));
    }

    #[test]
    fn test_copy_on_write_to_same_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.kdenlive");
        std::fs::write(&input, PROJECT).unwrap();

        let result = rewrite_playlist(&input, rewrite(), &[0.0, 1.0, 2.0], &input, false);
        assert!(matches!(result, Err(ProjectError::OutputIsInput(_))));
        assert_eq!(std::fs::read_to_string(&input).unwrap(), PROJECT);
    }
}
