//! Read-only view of how a media file sits in a project.

use std::path::Path;

use vmh_models::{parse_timecode, ResolvedClip};
use vmh_project::{search_name, ClipResolver, Document};

use crate::error::PipelineResult;

/// One entry of a playlist as currently stored.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySummary {
    pub producer: String,
    pub in_point: String,
    pub out_point: String,
    /// `None` when either point is not a clock timecode (e.g. a frame count).
    pub duration_secs: Option<f64>,
}

/// Resolution and current playlist contents for one media file.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub search_name: String,
    pub clip: ResolvedClip,
    pub entries: Vec<EntrySummary>,
}

impl Inspection {
    /// Summed duration of the entries with clock timecodes.
    pub fn total_secs(&self) -> f64 {
        self.entries.iter().filter_map(|e| e.duration_secs).sum()
    }
}

/// Resolve `file` in the project and list the primary playlist's entries.
pub fn inspect(
    project: &Path,
    file: &Path,
    secondary: Option<&str>,
    strict: bool,
) -> PipelineResult<Inspection> {
    let document = Document::open(project)?;
    let name = search_name(file, project);
    let clip = ClipResolver::new(&document)
        .strict(strict)
        .resolve(&name, secondary)?;

    let entries = document
        .playlist(&clip.playlist_id)
        .map(|playlist| {
            playlist
                .child_elements()
                .filter(|el| el.name() == "entry")
                .map(|entry| {
                    let in_point = entry.attr("in").unwrap_or_default().to_string();
                    let out_point = entry.attr("out").unwrap_or_default().to_string();
                    let duration_secs = match (parse_timecode(&in_point), parse_timecode(&out_point)) {
                        (Ok(start), Ok(end)) => Some(end - start),
                        _ => None,
                    };
                    EntrySummary {
                        producer: entry.attr("producer").unwrap_or_default().to_string(),
                        in_point,
                        out_point,
                        duration_secs,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Inspection {
        search_name: name,
        clip,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<mlt>
 <chain id="chain0">
  <property name="resource">talk.mp4</property>
  <property name="kdenlive:id">4</property>
 </chain>
 <playlist id="playlist1">
  <entry producer="chain0" in="00:00:01.000" out="00:00:03.500"/>
  <blank length="25"/>
  <entry producer="chain0" in="120" out="240"/>
 </playlist>
</mlt>"#;

    #[test]
    fn test_inspect_lists_entries() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("talk.kdenlive");
        std::fs::write(&project, PROJECT).unwrap();

        let inspection = inspect(&project, &dir.path().join("talk.mp4"), None, false).unwrap();
        assert_eq!(inspection.search_name, "talk.mp4");
        assert_eq!(inspection.clip.chain_id, "chain0");
        assert_eq!(inspection.clip.playlist_id, "playlist1");
        assert_eq!(inspection.entries.len(), 2);
        assert_eq!(inspection.entries[0].duration_secs, Some(2.5));
        // Frame counts are listed but not measured.
        assert_eq!(inspection.entries[1].duration_secs, None);
        assert!((inspection.total_secs() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_inspect_unknown_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("talk.kdenlive");
        std::fs::write(&project, PROJECT).unwrap();

        let result = inspect(&project, &dir.path().join("other.mp4"), None, false);
        assert!(matches!(
            result,
            Err(crate::PipelineError::Project(vmh_project::ProjectError::Resolution { .. }))
        ));
    }
}
