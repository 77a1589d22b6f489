//! Clip resolution.
//!
//! Maps a media file to the chain that plays it inside a project, that
//! chain's editing identifier, and the playlists placing it on the timeline.
//!
//! A chain matches when its `resource` property equals the search name and,
//! if a secondary value is given, its `set.test_audio` property equals that
//! value. Kdenlive keeps several chains for one file (bin clip, video track,
//! audio track), so the secondary value is what tells them apart.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use vmh_models::ResolvedClip;

use crate::document::{Document, Element};
use crate::error::{ProjectError, ProjectResult};

/// Property holding the media file of a chain.
pub const RESOURCE_PROPERTY: &str = "resource";
/// Property holding the editing identifier.
pub const EDITING_ID_PROPERTY: &str = "kdenlive:id";
/// Property used to tell apart chains sharing a resource.
pub const SECONDARY_PROPERTY: &str = "set.test_audio";
/// Element names that can carry a media resource.
pub const SOURCE_ELEMENTS: &[&str] = &["chain", "producer"];

/// True for `<chain>` and `<producer>` elements.
pub fn is_source(el: &Element) -> bool {
    SOURCE_ELEMENTS.contains(&el.name())
}

/// Name a media file is recorded under in the project.
///
/// Kdenlive stores resources relative to the project: a file next to the
/// project is matched by bare name, anything else by the path as given.
/// `.` components are ignored, so `./talk.mp4` and `talk.mp4` name the same
/// file.
pub fn search_name(filename: &Path, project_path: &Path) -> String {
    let filename = without_cur_dir(filename);
    let project_path = without_cur_dir(project_path);

    if filename.parent() == project_path.parent() {
        if let Some(name) = filename.file_name() {
            return name.to_string_lossy().into_owned();
        }
    }
    filename.to_string_lossy().into_owned()
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Resolve a media file inside a project file on disk.
///
/// # Arguments
/// - `filename`: media file to look up
/// - `project_path`: project document
/// - `secondary`: optional `set.test_audio` value narrowing the match
pub fn resolve_clip(
    filename: &Path,
    project_path: &Path,
    secondary: Option<&str>,
) -> ProjectResult<ResolvedClip> {
    let document = Document::open(project_path)?;
    let name = search_name(filename, project_path);
    ClipResolver::new(&document).resolve(&name, secondary)
}

/// Read-only queries over a parsed project.
#[derive(Debug, Clone, Copy)]
pub struct ClipResolver<'a> {
    document: &'a Document,
    strict: bool,
}

impl<'a> ClipResolver<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            strict: false,
        }
    }

    /// Reject names matching more than one chain instead of taking the first.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Resolve a search name to its chain, editing id and playlists.
    pub fn resolve(&self, search_name: &str, secondary: Option<&str>) -> ProjectResult<ResolvedClip> {
        let matches = self.matching_sources(search_name, secondary);

        if matches.len() > 1 {
            let candidates: Vec<String> = matches
                .iter()
                .map(|el| el.attr("id").unwrap_or_default().to_string())
                .collect();

            if self.strict {
                return Err(ProjectError::Ambiguous {
                    filename: search_name.to_string(),
                    candidates,
                });
            }

            warn!(
                filename = search_name,
                secondary = secondary.unwrap_or("-"),
                candidates = ?candidates,
                "Several chains match, using the first one"
            );
        }

        let source = matches
            .first()
            .ok_or_else(|| ProjectError::resolution(search_name))?;

        let chain_id = source.attr("id").unwrap_or_default().to_string();
        let editing_id = source.property(EDITING_ID_PROPERTY).unwrap_or_default();
        let playlists = self.playlists_for(&chain_id);

        debug!(
            filename = search_name,
            chain_id = %chain_id,
            editing_id = %editing_id,
            playlists = ?playlists,
            "Resolved chain"
        );

        let playlist_id = playlists.first().cloned().unwrap_or_default();
        if chain_id.is_empty() || editing_id.is_empty() || playlist_id.is_empty() {
            return Err(ProjectError::resolution(search_name));
        }

        Ok(ResolvedClip {
            chain_id,
            editing_id,
            playlist_id,
            playlists,
        })
    }

    /// Ids of every playlist with a direct entry for `chain_id`, in document order.
    pub fn playlists_for(&self, chain_id: &str) -> Vec<String> {
        if chain_id.is_empty() {
            return Vec::new();
        }

        self.document
            .elements()
            .filter(|el| el.name() == "playlist")
            .filter(|playlist| {
                playlist
                    .child_elements()
                    .any(|entry| entry.name() == "entry" && entry.attr("producer") == Some(chain_id))
            })
            .filter_map(|playlist| playlist.attr("id"))
            .map(str::to_string)
            .collect()
    }

    /// True when a chain or producer with this id exists.
    pub fn has_source(&self, chain_id: &str) -> bool {
        self.document
            .find(|el| is_source(el) && el.attr("id") == Some(chain_id))
            .is_some()
    }

    fn matching_sources(&self, search_name: &str, secondary: Option<&str>) -> Vec<&'a Element> {
        self.document
            .elements()
            .filter(|el| is_source(el))
            .filter(|el| el.property(RESOURCE_PROPERTY).as_deref() == Some(search_name))
            .filter(|el| match secondary {
                Some(value) => el.property(SECONDARY_PROPERTY).as_deref() == Some(value),
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<mlt>
 <chain id="chain0">
  <property name="resource">talk.mp4</property>
  <property name="kdenlive:id">2</property>
  <property name="set.test_audio">1</property>
 </chain>
 <chain id="chain1">
  <property name="resource">talk.mp4</property>
  <property name="kdenlive:id">2</property>
  <property name="set.test_audio">0</property>
 </chain>
 <chain id="chain2">
  <property name="resource">voice.wav</property>
  <property name="kdenlive:id">3</property>
 </chain>
 <chain id="chain3">
  <property name="resource">orphan.mp4</property>
  <property name="kdenlive:id">5</property>
 </chain>
 <chain id="chain4">
  <property name="resource">noid.mp4</property>
 </chain>
 <playlist id="playlist0">
  <entry producer="chain1" in="00:00:00.000" out="00:00:09.000"/>
 </playlist>
 <playlist id="playlist1">
  <entry producer="chain0" in="00:00:00.000" out="00:00:09.000"/>
 </playlist>
 <playlist id="playlist2">
  <entry producer="chain2" in="00:00:00.000" out="00:00:09.000"/>
 </playlist>
 <playlist id="playlist3">
  <entry producer="chain2" in="00:00:10.000" out="00:00:12.000"/>
  <entry producer="chain4" in="00:00:00.000" out="00:00:01.000"/>
 </playlist>
</mlt>
"#;

    fn resolver_doc() -> Document {
        Document::parse(PROJECT).unwrap()
    }

    #[test]
    fn test_search_name_same_directory() {
        let name = search_name(
            &PathBuf::from("/videos/talk.mp4"),
            &PathBuf::from("/videos/project.kdenlive"),
        );
        assert_eq!(name, "talk.mp4");
    }

    #[test]
    fn test_search_name_other_directory() {
        let name = search_name(
            &PathBuf::from("/media/talk.mp4"),
            &PathBuf::from("/videos/project.kdenlive"),
        );
        assert_eq!(name, "/media/talk.mp4");
    }

    #[test]
    fn test_search_name_leading_dot_on_media() {
        let name = search_name(Path::new("./talk.mp4"), Path::new("talk.kdenlive"));
        assert_eq!(name, "talk.mp4");
    }

    #[test]
    fn test_search_name_leading_dot_on_project() {
        let name = search_name(Path::new("talk.mp4"), Path::new("./talk.kdenlive"));
        assert_eq!(name, "talk.mp4");
    }

    #[test]
    fn test_search_name_relative_other_directory() {
        let name = search_name(Path::new("./media/talk.mp4"), Path::new("talk.kdenlive"));
        assert_eq!(name, "media/talk.mp4");
    }

    #[test]
    fn test_resolve_with_secondary_value() {
        let doc = resolver_doc();
        let resolver = ClipResolver::new(&doc);

        let video = resolver.resolve("talk.mp4", Some("0")).unwrap();
        assert_eq!(video.chain_id, "chain1");
        assert_eq!(video.editing_id, "2");
        assert_eq!(video.playlist_id, "playlist0");

        let audio = resolver.resolve("talk.mp4", Some("1")).unwrap();
        assert_eq!(audio.chain_id, "chain0");
        assert_eq!(audio.playlist_id, "playlist1");
    }

    #[test]
    fn test_resolve_without_secondary_takes_first_match() {
        let doc = resolver_doc();
        let clip = ClipResolver::new(&doc).resolve("talk.mp4", None).unwrap();
        assert_eq!(clip.chain_id, "chain0");
    }

    #[test]
    fn test_strict_rejects_ambiguous_match() {
        let doc = resolver_doc();
        let err = ClipResolver::new(&doc)
            .strict(true)
            .resolve("talk.mp4", None)
            .unwrap_err();

        match err {
            ProjectError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates, vec!["chain0", "chain1"]);
            }
            other => panic!("expected ambiguous error, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_secondary_value_fails() {
        let doc = resolver_doc();
        let result = ClipResolver::new(&doc).resolve("talk.mp4", Some("7"));
        assert!(matches!(result, Err(ProjectError::Resolution { .. })));
    }

    #[test]
    fn test_unknown_file_fails() {
        let doc = resolver_doc();
        let err = ClipResolver::new(&doc).resolve("missing.mp4", None).unwrap_err();
        assert_eq!(err.to_string(), "missing.mp4 not found in project");
    }

    #[test]
    fn test_chain_without_playlist_fails() {
        let doc = resolver_doc();
        let result = ClipResolver::new(&doc).resolve("orphan.mp4", None);
        assert!(matches!(result, Err(ProjectError::Resolution { .. })));
    }

    #[test]
    fn test_chain_without_editing_id_fails() {
        let doc = resolver_doc();
        let result = ClipResolver::new(&doc).resolve("noid.mp4", None);
        assert!(matches!(result, Err(ProjectError::Resolution { .. })));
    }

    #[test]
    fn test_all_playlists_are_reported() {
        let doc = resolver_doc();
        let clip = ClipResolver::new(&doc).resolve("voice.wav", None).unwrap();
        assert_eq!(clip.playlist_id, "playlist2");
        assert_eq!(clip.playlists, vec!["playlist2", "playlist3"]);
        assert!(clip.has_multiple_playlists());
    }

    #[test]
    fn test_has_source() {
        let doc = resolver_doc();
        let resolver = ClipResolver::new(&doc);
        assert!(resolver.has_source("chain3"));
        assert!(!resolver.has_source("chain9"));
    }

    #[test]
    fn test_resolve_clip_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project.kdenlive");
        std::fs::write(&project, PROJECT).unwrap();

        let clip = resolve_clip(&dir.path().join("voice.wav"), &project, None).unwrap();
        assert_eq!(clip.chain_id, "chain2");
        assert_eq!(clip.editing_id, "3");
    }
}
