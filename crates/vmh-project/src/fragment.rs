//! Standalone entry fragments.
//!
//! Older workflows did not touch the project at all: the derived entries
//! were written to a small file per track and pasted into the playlist by
//! hand. The output is a sequence of `entry` elements, not a full document.

use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::Writer;
use tracing::info;

use crate::document::{write_node, Node};
use crate::error::{ProjectError, ProjectResult};
use crate::segments::derive_segments;
use crate::writer::entry_element;

/// Render the entries derived from `timestamps` as indented XML.
pub fn render_fragment(chain_id: &str, editing_id: &str, timestamps: &[f64]) -> ProjectResult<String> {
    let segments = derive_segments(timestamps)?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    for segment in &segments {
        let entry = Node::Element(entry_element(chain_id, editing_id, segment));
        write_node(&mut writer, &entry)?;
    }

    let mut buf = writer.into_inner();
    if !buf.is_empty() {
        buf.push(b'\n');
    }
    String::from_utf8(buf).map_err(|e| ProjectError::malformed(e.to_string()))
}

/// Write the entries derived from `timestamps` to `path`.
pub fn export_fragment(
    chain_id: &str,
    editing_id: &str,
    timestamps: &[f64],
    path: &Path,
) -> ProjectResult<PathBuf> {
    let fragment = render_fragment(chain_id, editing_id, timestamps)?;

    let mut file = std::fs::File::create(path)?;
    file.write_all(fragment.as_bytes())?;
    file.sync_all()?;

    info!(path = %path.display(), chain_id, "Fragment written");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_fragment_contains_one_entry_per_segment() {
        let xml = render_fragment("chain2", "3", &[0.0, 0.5, 1.25, 2.0, 3.0]).unwrap();
        let doc = Document::parse(&xml).unwrap();

        let entries: Vec<_> = doc.elements().filter(|el| el.name() == "entry").collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].attr("producer"), Some("chain2"));
        assert_eq!(entries[0].attr("in"), Some("00:00:0.500"));
        assert_eq!(entries[0].attr("out"), Some("00:00:1.250"));
        assert_eq!(entries[1].property("kdenlive:id").as_deref(), Some("3"));
    }

    #[test]
    fn test_empty_fragment() {
        assert_eq!(render_fragment("chain2", "3", &[1.0]).unwrap(), "");
    }

    #[test]
    fn test_export_fragment_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio.xml");

        export_fragment("chain2", "3", &[-0.4, -0.2, 1.0], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"<entry producer="chain2" in="00:00:0.000" out="00:00:1.000">"#));
    }
}
