//! imsd - IMS Gateway Daemon
//!
//! Serves the inventory frontend and forwards its JSON requests to the
//! XML-RPC backend.
//!
//! Usage:
//!   imsd [--config <file>] [--port N] [--backend-url URL] [--static-dir DIR]

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ims_api::{create_router, AppState};
use ims_core::RpcBackend;
use ims_rpc::XmlRpcClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Overrides};

#[derive(Parser, Debug)]
#[command(name = "imsd", version, about = "IMS gateway daemon")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "IMS_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "IMS_PORT")]
    port: Option<u16>,

    /// XML-RPC backend URL
    #[arg(long, env = "IMS_BACKEND_URL")]
    backend_url: Option<String>,

    /// Directory holding the built frontend
    #[arg(long, env = "IMS_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imsd=info,ims_api=info,ims_rpc=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting imsd (IMS Gateway Daemon)");

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    }
    .apply(Overrides {
        port: args.port,
        backend_url: args.backend_url,
        static_dir: args.static_dir,
    });

    let backend = XmlRpcClient::with_config(
        &config.backend.url,
        config.timeout(),
        config.connect_timeout(),
    )
    .with_context(|| format!("Invalid backend URL {}", config.backend.url))?;
    let backend: Arc<dyn RpcBackend> = Arc::new(backend);
    tracing::info!(backend = backend.endpoint(), "Forwarding to XML-RPC backend");

    let static_files = config.static_files();
    if !static_files.index_path().is_file() {
        tracing::warn!(
            "Entry document {} not found; frontend routes will return 404",
            static_files.index_path().display()
        );
    }

    let state = AppState::with_static_files(backend, static_files);
    let app = create_router(state);

    let addr = config.listen_addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
