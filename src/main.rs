//! Subtitle engine command line
//!
//! Loads a media file's subtitles the way a player would, optionally
//! changes the selection, and prints the resulting track list.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use subtitle_engine::config_file::ConfigFile;
use subtitle_engine::{
    ConsoleDisplay, EngineConfig, JsonFileStore, LogFormat, SubtitleEngine, SubtitleError,
    TokioFs,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "subtitle-engine";

#[derive(Parser, Debug, Clone)]
#[command(name = "subtitle-engine")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Media file whose subtitles should be loaded
    media: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file holding selection history and preferences
    #[arg(short, long, default_value = "subtitle-store.json")]
    store: PathBuf,

    /// Select a subtitle by path, or `off`
    #[arg(long)]
    select: Option<String>,

    /// Load an external subtitle file and show it
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the active subtitle's canonical content to stdout
    #[arg(long)]
    print: bool,
}

#[tokio::main]
async fn main() -> Result<(), SubtitleError> {
    let args = Args::parse();

    // Logging settings come from the config file, so read it first
    let config_file = args.config.as_ref().map(ConfigFile::from_file);
    let config = match &config_file {
        Some(Ok(file)) => file.clone().into_engine_config(),
        _ => EngineConfig::default(),
    };

    init_logging(&config);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    if let Some(Err(e)) = &config_file {
        tracing::warn!("Failed to load config file: {}. Using defaults.", e);
    }
    tracing::debug!("Configuration loaded: {:?}", config);

    let store = JsonFileStore::open(&args.store)?;
    let engine = SubtitleEngine::new(config, TokioFs, store, ConsoleDisplay);

    let media = args.media.to_string_lossy().into_owned();
    let found = engine.detect_and_apply(&media).await;
    tracing::info!(media = media.as_str(), found = found.len(), "media loaded");

    if let Some(path) = &args.load {
        engine.load_external(&path.to_string_lossy()).await?;
    }

    match args.select.as_deref() {
        Some("off") => engine.select_track(None)?,
        Some(path) => engine.select_track(Some(path))?,
        None => {}
    }

    if args.print {
        if let Some(content) = engine.active_content() {
            std::io::stdout()
                .write_all(&content)
                .map_err(|e| SubtitleError::io("<stdout>", e))?;
        }
    }

    Ok(())
}

/// Initialize logging with tracing
fn init_logging(config: &EngineConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("subtitle_engine={}", config.log_level).into());

    // Logs go to stderr so --print output stays clean
    let layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}
