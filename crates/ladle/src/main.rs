//! ladle server binary.
//!
//! `ladle serve` loads the configuration, picks the storage backend, and
//! serves the REST API until ctrl-c.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ladle::web::{self, AppState, LoginGate};
use ladleconf::{LadleConfig, StorageBackend};
use larder::{BlobStore, CollectionStore, Coordinator, FileStore, LoginLog};

#[derive(Parser)]
#[command(name = "ladle")]
#[command(about = "Recipe-bookmark manager server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server
    Serve {
        /// Config file path (replaces the local ./ladle.toml override)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// HTTP port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the effective configuration and where it came from
    Config {
        /// Config file path (replaces the local ./ladle.toml override)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port } => serve(config, port).await,
        Commands::Config { config } => print_config(config),
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}

fn build_store(config: &LadleConfig) -> Result<Arc<dyn CollectionStore>> {
    match config.storage.backend {
        StorageBackend::Local => Ok(Arc::new(FileStore::new(config.recipes_path()))),
        StorageBackend::Blob => {
            let url = config
                .storage
                .blob_url
                .clone()
                .context("storage.blob_url is required for the blob backend")?;
            Ok(Arc::new(BlobStore::new(
                url,
                config.storage.blob_token.clone(),
                config.storage.load_retries,
                config.storage.retry_backoff_ms,
            )))
        }
    }
}

async fn serve(config_path: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let mut config =
        LadleConfig::load_from(config_path.as_deref()).context("failed to load configuration")?;
    if let Some(port) = port {
        config.bind.http_port = port;
    }

    init_tracing(&config.telemetry.log_level);

    let store = build_store(&config)?;
    let gate = config.access.clone().map(|access| {
        Arc::new(LoginGate {
            access,
            log: LoginLog::new(config.logins_path()),
        })
    });

    let state = AppState {
        coordinator: Coordinator::new(store),
        gate,
    };

    let addr = format!("{}:{}", config.bind.host, config.bind.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %addr,
        backend = ?config.storage.backend,
        "ladle serving"
    );

    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}

fn print_config(config_path: Option<PathBuf>) -> Result<()> {
    let (config, sources) = LadleConfig::load_with_sources(config_path.as_deref())
        .context("failed to load configuration")?;

    println!("{}", toml::to_string_pretty(&config)?);
    for file in &sources.files {
        println!("# loaded: {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# env override: {var}");
    }

    Ok(())
}
