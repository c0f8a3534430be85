//! gatewise binary entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gatewise::api::server::{start_server, AppState};
use gatewise::cache::{AnswerStore, JsonFileStore};
use gatewise::fallback::FallbackTable;
use gatewise::handler::QueryHandler;
use gatewise::providers::gemini::{GeminiAuth, GeminiProvider};
use gatewise::providers::InferenceProvider;
use gatewise::throttle::RequestGate;
use gatewise::Config;

#[derive(Parser)]
#[command(name = "gatewise", version, about = "AI airport travel assistant service")]
struct Cli {
    /// Path to a JSON config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP service (default).
    Serve {
        /// Override the bind address.
        #[arg(long)]
        bind: Option<String>,
        /// Override the HTTP port.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Report which credential source a Gemini API key resolves from.
    CheckKey,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command.unwrap_or(Command::Serve {
        bind: None,
        port: None,
    }) {
        Command::Serve { bind, port } => serve(config, bind, port).await,
        Command::CheckKey => check_key(&config),
    }
}

async fn serve(config: Config, bind: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let provider: Option<Arc<dyn InferenceProvider>> =
        match GeminiProvider::from_config(config.api_key.as_deref(), &config.model) {
            Some(p) => {
                info!(model = %config.model, "Gemini provider configured");
                Some(Arc::new(p))
            }
            None => {
                warn!("No Gemini API key found; serving canned fallback answers only");
                None
            }
        };

    let store = JsonFileStore::open(config.cache_file());
    info!(entries = store.len(), "Answer cache ready");

    let handler = QueryHandler::new(
        provider,
        Box::new(store),
        FallbackTable::default(),
        RequestGate::new(Duration::from_secs(config.min_request_interval_secs)),
    );

    let bind = bind.unwrap_or_else(|| config.bind.clone());
    let port = port.unwrap_or(config.port);

    start_server(&bind, port, AppState::new(handler), config.static_dir.clone())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))
}

fn check_key(config: &Config) -> anyhow::Result<()> {
    match GeminiAuth::source(config.api_key.as_deref()) {
        Some(source) => {
            println!("Gemini API key found (source: {source})");
            Ok(())
        }
        None => {
            println!(
                "No Gemini API key found. Set GEMINI_API_KEY (or GOOGLE_API_KEY), \
                 or add api_key to the config file."
            );
            std::process::exit(1);
        }
    }
}
