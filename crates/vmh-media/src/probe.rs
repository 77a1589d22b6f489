//! FFprobe media duration.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe the duration of a media file in seconds.
pub async fn probe_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe exited with status {:?}", output.status.code()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
        });
    }

    parse_duration(&output.stdout)
}

fn parse_duration(json: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    probe
        .format
        .duration
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| MediaError::invalid_media("no duration in ffprobe output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = br#"{"format": {"filename": "talk.mp4", "duration": "61.440000"}}"#;
        assert!((parse_duration(json).unwrap() - 61.44).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_missing() {
        let json = br#"{"format": {"filename": "still.png"}}"#;
        assert!(matches!(parse_duration(json), Err(MediaError::InvalidMedia(_))));
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let result = probe_duration("/nonexistent/talk.mp4").await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
