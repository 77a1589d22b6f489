//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vmh_models::Distance;

use crate::config::CutConfig;
use crate::pipeline::{CutRequest, OutputMode};

#[derive(Debug, Parser)]
#[command(name = "vmh", version, about = "Cut silences out of Kdenlive projects")]
pub struct Cli {
    /// Emit JSON logs (same as LOG_FORMAT=json)
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect silences and rewrite the clip's playlists
    Cut(CutArgs),
    /// Show which chain and playlist a media file resolves to
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct CutArgs {
    /// Video file used in the project
    #[arg(long)]
    pub video: PathBuf,

    /// Separately recorded audio file; silences are detected on it
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Kdenlive project to edit
    #[arg(long)]
    pub project: PathBuf,

    /// Output project, or directory with --fragments
    #[arg(long, required_unless_present = "overwrite")]
    pub output: Option<PathBuf>,

    /// Edit the project in place
    #[arg(long, conflicts_with = "fragments")]
    pub overwrite: bool,

    /// Write entry fragments per track instead of editing the project
    #[arg(long)]
    pub fragments: bool,

    /// Fail when several chains match a file
    #[arg(long)]
    pub strict: bool,

    /// Minimum silence length in seconds
    #[arg(long, value_name = "SECS")]
    pub min_silence: Option<f64>,

    /// Loudness below which audio counts as silence, in dB
    #[arg(long, value_name = "DB", allow_negative_numbers = true)]
    pub threshold: Option<i32>,

    /// Margin kept around speech
    #[arg(long, value_parser = parse_distance)]
    pub distance: Option<Distance>,

    /// Recompute silences even if cached
    #[arg(long)]
    pub force: bool,

    /// Do not read or write the detection cache
    #[arg(long)]
    pub no_cache: bool,
}

impl CutArgs {
    /// Merge flags over `config` into a cut request.
    pub fn into_request(self, config: &CutConfig) -> CutRequest {
        let mut detection = config.detection.clone();
        if let Some(secs) = self.min_silence {
            detection = detection.with_min_silence_secs(secs);
        }
        if let Some(db) = self.threshold {
            detection = detection.with_threshold_db(db);
        }
        if let Some(distance) = self.distance {
            detection = detection.with_distance(distance);
        }

        let mode = if self.fragments {
            OutputMode::Fragments
        } else {
            OutputMode::Project {
                overwrite: self.overwrite,
            }
        };

        CutRequest {
            output: self.output.unwrap_or_else(|| self.project.clone()),
            video: self.video,
            audio: self.audio,
            project: self.project,
            mode,
            detection,
            strict: self.strict || config.strict,
            force: self.force,
        }
    }
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Kdenlive project to read
    #[arg(long)]
    pub project: PathBuf,

    /// Media file to look up
    #[arg(long)]
    pub file: PathBuf,

    /// `set.test_audio` value of the wanted chain
    #[arg(long)]
    pub secondary: Option<String>,

    /// Fail when several chains match
    #[arg(long)]
    pub strict: bool,
}

fn parse_distance(s: &str) -> Result<Distance, String> {
    s.parse().map_err(|e: vmh_models::DistanceParseError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vmh").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cut_flags_override_config() {
        let cli = parse(&[
            "cut",
            "--video",
            "talk.mp4",
            "--project",
            "talk.kdenlive",
            "--output",
            "cut.kdenlive",
            "--threshold",
            "-40",
            "--distance",
            "huge",
        ]);
        let Command::Cut(args) = cli.command else {
            panic!("expected cut");
        };

        let request = args.into_request(&CutConfig::default());
        assert_eq!(request.detection.threshold_db, -40);
        assert_eq!(request.detection.distance, Distance::Huge);
        assert!((request.detection.min_silence_secs - 0.5).abs() < f64::EPSILON);
        assert_eq!(request.mode, OutputMode::Project { overwrite: false });
        assert_eq!(request.output, PathBuf::from("cut.kdenlive"));
    }

    #[test]
    fn test_overwrite_without_output() {
        let cli = parse(&["cut", "--video", "v.mp4", "--project", "p.kdenlive", "--overwrite"]);
        let Command::Cut(args) = cli.command else {
            panic!("expected cut");
        };

        let config = CutConfig {
            strict: true,
            ..CutConfig::default()
        };
        let request = args.into_request(&config);
        assert_eq!(request.mode, OutputMode::Project { overwrite: true });
        assert_eq!(request.output, PathBuf::from("p.kdenlive"));
        assert!(request.strict);
    }

    #[test]
    fn test_output_required_unless_overwrite() {
        let result = Cli::try_parse_from(["vmh", "cut", "--video", "v.mp4", "--project", "p.kdenlive"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fragments_conflict_with_overwrite() {
        let result = Cli::try_parse_from([
            "vmh",
            "cut",
            "--video",
            "v.mp4",
            "--project",
            "p.kdenlive",
            "--fragments",
            "--overwrite",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_distance() {
        let result = Cli::try_parse_from([
            "vmh", "cut", "--video", "v.mp4", "--project", "p.kdenlive", "--output", "o", "--distance", "far",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inspect_args() {
        let cli = parse(&["inspect", "--project", "p.kdenlive", "--file", "talk.mp4", "--secondary", "1"]);
        let Command::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(args.secondary.as_deref(), Some("1"));
        assert!(!args.strict);
    }
}
