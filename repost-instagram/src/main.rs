//! repost-instagram - Post archived Weibo content to Instagram
//!
//! Runs one batch: fetches posts not yet completed on Instagram,
//! publishes each one, records the outcome, and exits. Re-running the
//! same batch retries failures and skips completed posts.

use clap::Parser;
use librepost::config::Config;
use librepost::error::ConfigError;
use librepost::platforms::instagram::InstagramPublisher;
use librepost::{BatchRunner, Database, Result, RunSummary};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "repost-instagram")]
#[command(version)]
#[command(about = "Post archived Weibo content to Instagram, one batch at a time")]
struct Cli {
    /// Batch number for fetching records
    #[arg(long, default_value_t = 1)]
    batch: u32,

    /// Path to the config file (defaults to the XDG location)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Failures are discoverable via the status table and the logs; the
    // exit code stays zero either way.
    if let Err(e) = run(cli).await {
        error!("run failed: {}", e);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let db = Database::new(&config.database.path).await?;

    // The pool is closed on every path out of the run, login and fetch
    // failures included.
    let result = run_batch(&cli, &config, db.clone()).await;
    db.close().await;

    let summary = result?;
    info!(
        batch = cli.batch,
        fetched = summary.fetched,
        completed = summary.completed,
        failed = summary.failed,
        "instagram batch done"
    );
    Ok(())
}

async fn run_batch(cli: &Cli, config: &Config, db: Database) -> Result<RunSummary> {
    let credentials = config
        .instagram
        .as_ref()
        .ok_or_else(|| ConfigError::MissingField("instagram".to_string()))?;

    let publisher = InstagramPublisher::login(credentials).await?;
    let runner = BatchRunner::new(
        db,
        publisher,
        &config.local_image_directory,
        Duration::from_secs(config.post_delay_seconds),
    );
    runner.run(cli.batch, config.batch_size).await
}
