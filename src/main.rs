use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_aggregator::{
    config::{Config, defaults::DEFAULT_CONFIG_PATH},
    errors::AppError,
    pipeline::{ConsoleProgress, Pipeline, RunSummary},
};

#[derive(Parser)]
#[command(name = "m3u-aggregator")]
#[command(version)]
#[command(about = "Aggregate IPTV playlists into one categorized, liveness-checked playlist")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Output directory (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Also write the CSV history file
    #[arg(long)]
    history: bool,

    /// Disable progress bars
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter = format!("m3u_aggregator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting M3U Aggregator v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(summary) => {
            summary.log();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            log_remediation_hints(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let mut config = Config::load_from_file(&cli.config)?;

    // Override config with CLI arguments
    if let Some(output_dir) = cli.output_dir {
        config.paths.output_dir = output_dir;
    }
    if cli.history {
        config.exporter.enable_history = true;
    }

    let mut pipeline = Pipeline::from_config(config)?;
    if !cli.quiet {
        pipeline = pipeline.with_progress(Arc::new(ConsoleProgress::new()));
    }

    let summary = pipeline.run().await.context("aggregation run aborted")?;
    info!(
        "Done: {}/{} channels online, outputs in {}",
        summary.online,
        summary.unique,
        pipeline.config().paths.output_dir.display()
    );
    Ok(summary)
}

fn log_remediation_hints(error: &anyhow::Error) {
    let app_error = error.downcast_ref::<AppError>();
    match app_error {
        Some(AppError::MissingInput { path, .. }) => {
            info!("Create {} or point the configuration at an existing file", path.display());
        }
        Some(AppError::Configuration { .. }) => {
            info!("Check the configuration file for invalid values");
        }
        Some(AppError::Io { path, .. }) => {
            info!("Make sure {} is writable", path.display());
        }
        _ => {}
    }
    info!("Troubleshooting:");
    info!("1. Check that the files under the config directory exist");
    info!("2. Confirm the source URLs are reachable");
    info!("3. Verify the category template format");
}
