use anyhow::{Context, Result};
use clap::Parser;
use feedpane::app::App;
use feedpane::config::{default_config_path, Config};
use feedpane::feed::{FeedBackend, FeedlyClient};
use feedpane::preview::PreviewPipeline;
use feedpane::ui;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "feedpane", about = "Split-pane terminal client for Feedly")]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/feedpane/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the preview scratch file
    #[arg(long, value_name = "DIR")]
    tmp_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log debug output from feedpane
    #[arg(long)]
    verbose: bool,
}

/// The UI owns the terminal, so stderr logging stays at `error` unless
/// RUST_LOG or `--verbose` asks for more.
fn init_tracing(args: &Args) -> Result<()> {
    let default = match (args.verbose, args.log_file.is_some()) {
        (true, _) => "feedpane=debug",
        (false, true) => "feedpane=info",
        (false, false) => "error",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match &args.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path(
            std::env::var("XDG_CONFIG_HOME").ok(),
            std::env::var("HOME").ok(),
        )?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    tracing::debug!(?config, "Configuration");

    let token = config
        .feedly
        .token(std::env::var("FEEDLY_ACCESS_TOKEN").ok())?;
    let client = FeedlyClient::new(&config.feedly.base_url, token, config.feedly.stream_count)
        .context("Failed to create Feedly client")?;
    client
        .authenticate()
        .await
        .context("Failed to authenticate with Feedly")?;

    let browser = config.text_browser(std::env::var("BROWSER").ok());
    let tmp_dir = args
        .tmp_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("feedpane"));
    let pipeline = PreviewPipeline::new(&tmp_dir, &config, &browser)
        .with_context(|| format!("Failed to prepare scratch directory '{}'", tmp_dir.display()))?;

    let mut app = App::new(Arc::new(client), pipeline, &config);
    ui::run(&mut app).await?;

    Ok(())
}
