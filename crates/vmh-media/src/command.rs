//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Builder for analysis-only FFmpeg commands.
///
/// Output defaults to the null muxer: the interesting result of an
/// analysis filter is what FFmpeg logs on stderr.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command reading `input`.
    pub fn new(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output_args: Vec::new(),
        }
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Drop video streams.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostats".to_string(),
            "-v".to_string(),
            // silencedetect reports at info level
            "info".to_string(),
        ];

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());

        // Null muxer
        args.extend(["-f", "null", "-"].map(String::from));

        args
    }
}

/// Runner for analysis commands.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run the command and return everything FFmpeg logged on stderr.
    pub async fn run_capture_stderr(&self, cmd: &FfmpegCommand) -> MediaResult<String> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match self.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output()).await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!("FFmpeg timed out after {} seconds, killing process", secs);
                        return Err(MediaError::ffmpeg_failed(
                            format!("timed out after {} seconds", secs),
                            None,
                            None,
                        ));
                    }
                }
            }
            None => child.wait_with_output().await?,
        };

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(stderr),
                output.status.code(),
            ));
        }

        Ok(stderr)
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("talk.mp4")
            .no_video()
            .audio_filter("silencedetect=noise=-35dB:d=0.5");

        let args = cmd.build_args();
        assert_eq!(args[..4], ["-hide_banner", "-nostats", "-v", "info"]);
        assert!(args.contains(&"-vn".to_string()));
        assert!(args.contains(&"silencedetect=noise=-35dB:d=0.5".to_string()));
        assert_eq!(args[args.len() - 3..], ["-f", "null", "-"]);
    }

    #[test]
    fn test_output_args_follow_input() {
        let args = FfmpegCommand::new("talk.mp4").no_video().build_args();

        let input = args.iter().position(|a| a == "-i").unwrap();
        let vn = args.iter().position(|a| a == "-vn").unwrap();
        assert_eq!(args[input + 1], "talk.mp4");
        assert!(input < vn);
    }
}
