use anyhow::Context;
use clap::Parser;
use longtang::collaborators::Services;
use longtang::config::LongtangConfig;
use longtang::lifecycle::{setup_tracing, LongtangSystem};
use std::path::PathBuf;
use tracing::{error, info};

/// Organize a music collection into an artist/album library.
#[derive(Debug, Parser)]
#[command(name = "longtang", version)]
struct Args {
    /// Directory to scan for audio files and archives.
    #[arg(short, long)]
    source: PathBuf,

    /// Root of the organized library.
    #[arg(short, long)]
    target: PathBuf,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip remote lookups, use file tags only.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LongtangConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => LongtangConfig::default(),
    };
    config.packaging.target = args.target.clone();
    config.id3.offline |= args.offline;

    setup_tracing(config.logging.level);
    info!(source = %args.source.display(), target = %args.target.display(), "Starting longtang");

    let system = LongtangSystem::start(Services::from_config(&config), config).await?;

    let outcome = system.organize(&args.source).await;
    match &outcome {
        Ok(summary) => {
            info!(
                processed = summary.audio_successes(true).len(),
                failed = summary.audio_failures(true).len(),
                archives_failed = summary.archive_failures().len(),
                "Organize complete"
            );
            for entry in summary.audio_failures(true) {
                println!("FAILED  {}", entry.source.display());
            }
            for entry in summary.archive_failures() {
                println!("UNOPENED {}", entry.source.display());
            }
        }
        Err(e) => error!(error = %e, "Organize failed"),
    }

    system.shutdown().await?;
    outcome.map(|_| ()).context("organize")
}
