//! Clip identities inside a project and the logical tracks they play on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a media clip inside a project document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedClip {
    /// `id` attribute of the matched chain element.
    pub chain_id: String,
    /// Editing identifier (`kdenlive:id`) of the chain.
    pub editing_id: String,
    /// First playlist, in document order, with an entry for the chain.
    pub playlist_id: String,
    /// Every playlist with an entry for the chain, in document order.
    pub playlists: Vec<String>,
}

impl ResolvedClip {
    /// True when more than one playlist places this chain.
    pub fn has_multiple_playlists(&self) -> bool {
        self.playlists.len() > 1
    }
}

/// Logical track a chain is used on.
///
/// Kdenlive keeps separate chains for the same file: one tuned for video
/// playback and one feeding the audio track, told apart by
/// `set.test_audio`. A separately recorded audio file has its own chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Video chain with `set.test_audio = 0`.
    VideoOnly,
    /// Video chain with `set.test_audio = 1`, used as audio reference.
    VideoAudio,
    /// Chain of a separate audio file.
    Audio,
}

impl TrackKind {
    /// Tracks in the order the cut pipeline processes them.
    pub const ALL: &'static [TrackKind] = &[
        TrackKind::VideoOnly,
        TrackKind::VideoAudio,
        TrackKind::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::VideoOnly => "video",
            TrackKind::VideoAudio => "video_audio",
            TrackKind::Audio => "audio",
        }
    }

    /// Secondary property value narrowing the chain match, if any.
    pub fn secondary_value(&self) -> Option<&'static str> {
        match self {
            TrackKind::VideoOnly => Some("0"),
            TrackKind::VideoAudio => Some("1"),
            TrackKind::Audio => None,
        }
    }

    /// File name used when the track is exported as a standalone fragment.
    pub fn fragment_file_name(&self) -> String {
        format!("{}.xml", self.as_str())
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secondary_values() {
        assert_eq!(TrackKind::VideoOnly.secondary_value(), Some("0"));
        assert_eq!(TrackKind::VideoAudio.secondary_value(), Some("1"));
        assert_eq!(TrackKind::Audio.secondary_value(), None);
    }

    #[test]
    fn test_fragment_names() {
        assert_eq!(TrackKind::VideoOnly.fragment_file_name(), "video.xml");
        assert_eq!(TrackKind::VideoAudio.fragment_file_name(), "video_audio.xml");
        assert_eq!(TrackKind::Audio.fragment_file_name(), "audio.xml");
    }

    #[test]
    fn test_multiple_playlists() {
        let clip = ResolvedClip {
            chain_id: "chain1".into(),
            editing_id: "4".into(),
            playlist_id: "playlist0".into(),
            playlists: vec!["playlist0".into(), "playlist2".into()],
        };
        assert!(clip.has_multiple_playlists());
    }
}
