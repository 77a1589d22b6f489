//! `vmh` command line tool.

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use vmh_cli::cli::{Cli, Command, CutArgs, InspectArgs};
use vmh_cli::{init_tracing, inspect, CutConfig, CutPipeline, OutputMode};
use vmh_media::{FfmpegSilenceDetector, TimestampCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CutConfig::from_env();

    init_tracing(cli.json_logs || config.json_logs);
    debug!("Config: {:?}", config);

    match cli.command {
        Command::Cut(args) => run_cut(args, &config).await,
        Command::Inspect(args) => run_inspect(args, &config),
    }
}

async fn run_cut(args: CutArgs, config: &CutConfig) -> anyhow::Result<()> {
    let use_cache = !(args.no_cache || config.no_cache);
    let request = args.into_request(config);

    let mut detector = FfmpegSilenceDetector::new();
    if use_cache {
        detector = detector.with_cache(TimestampCache::new(config.cache_dir.clone()));
    }

    info!(
        project = %request.project.display(),
        source = %request.detection_source().display(),
        "Starting cut"
    );

    let report = CutPipeline::new(detector)
        .run(&request)
        .await
        .with_context(|| format!("cutting {}", request.project.display()))?;

    for outcome in &report.tracks {
        match &outcome.fragment {
            Some(path) => println!(
                "{:<12} {} -> {} ({} entries)",
                outcome.track.as_str(),
                outcome.clip.chain_id,
                path.display(),
                outcome.entries
            ),
            None => println!(
                "{:<12} {} in {} ({} entries)",
                outcome.track.as_str(),
                outcome.clip.chain_id,
                outcome.clip.playlist_id,
                outcome.entries
            ),
        }
    }
    if let OutputMode::Project { .. } = request.mode {
        println!("written to {}", report.output.display());
    }

    Ok(())
}

fn run_inspect(args: InspectArgs, config: &CutConfig) -> anyhow::Result<()> {
    let inspection = inspect(
        &args.project,
        &args.file,
        args.secondary.as_deref(),
        args.strict || config.strict,
    )
    .with_context(|| format!("inspecting {}", args.project.display()))?;

    let clip = &inspection.clip;
    println!("file        {}", inspection.search_name);
    println!("chain       {}", clip.chain_id);
    println!("editing id  {}", clip.editing_id);
    println!("playlists   {}", clip.playlists.join(", "));
    println!();

    for entry in &inspection.entries {
        let duration = entry
            .duration_secs
            .map(|d| format!("{:.3}s", d))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:>14} {:>14} {:>10}",
            entry.producer, entry.in_point, entry.out_point, duration
        );
    }
    println!(
        "{} entries in {}, {:.3}s",
        inspection.entries.len(),
        clip.playlist_id,
        inspection.total_secs()
    );

    Ok(())
}
