//! IMS CLI - command-line portal for the inventory gateway
//!
//! Runs the same operations as the browser portals through the gateway's
//! envelope endpoint.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ims_client::GatewayClient;
use ims_core::{Association, EntityKind};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "ims-cli")]
#[command(author, version, about = "Inventory Management System CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Gateway URL [default: http://localhost:5050]
    #[arg(short, long, env = "IMS_SERVER")]
    server: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "IMS_CLI_CONFIG")]
    config: Option<PathBuf>,

    /// Output format [default: table]
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the ids of every record of a kind
    List {
        /// product, supplier, category or image
        entity: EntityKind,
    },

    /// Create a record
    Create {
        /// product, supplier, category or image
        entity: EntityKind,

        /// Field value as key=value (repeatable)
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// Show one record
    Read {
        /// product, supplier, category or image
        entity: EntityKind,

        /// Record ID
        id: String,
    },

    /// Replace every field of a record
    Update {
        /// product, supplier, category or image
        entity: EntityKind,

        /// Record ID
        id: String,

        /// Field value as key=value (repeatable)
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// Delete a record
    Delete {
        /// product, supplier, category or image
        entity: EntityKind,

        /// Record ID
        id: String,
    },

    /// Link a product to a supplier or category
    Associate {
        /// supplier or category
        with: Association,

        /// Supplier or category ID
        id: String,

        /// Product ID
        p_id: String,
    },

    /// Remove a product link
    Dissociate {
        /// supplier or category
        with: Association,

        /// Supplier or category ID
        id: String,

        /// Product ID
        p_id: String,
    },

    /// List the products linked to a supplier or category
    Products {
        /// supplier or category
        of: Association,

        /// Supplier or category ID
        id: String,
    },

    /// Check that the gateway is up
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let quiet = cli.quiet;
    if let Err(e) = run(cli).await {
        let ctx = OutputContext::new(OutputFormat::Table, false, quiet);
        ctx.error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    let merged = config.merge_with_args(cli.server.as_deref(), cli.output, cli.no_color);
    let ctx = OutputContext::new(merged.output, merged.no_color, cli.quiet);
    tracing::debug!(server = %merged.server, "Using gateway");
    let client = create_client(&merged.server)?;

    match &cli.command {
        Commands::List { entity } => commands::list(&client, *entity, &ctx).await,
        Commands::Create { entity, fields } => {
            commands::create(&client, *entity, fields, &ctx).await
        }
        Commands::Read { entity, id } => commands::read(&client, *entity, id, &ctx).await,
        Commands::Update { entity, id, fields } => {
            commands::update(&client, *entity, id, fields, &ctx).await
        }
        Commands::Delete { entity, id } => commands::delete(&client, *entity, id, &ctx).await,
        Commands::Associate { with, id, p_id } => {
            commands::associate(&client, *with, id, p_id, &ctx).await
        }
        Commands::Dissociate { with, id, p_id } => {
            commands::dissociate(&client, *with, id, p_id, &ctx).await
        }
        Commands::Products { of, id } => commands::products(&client, *of, id, &ctx).await,
        Commands::Health => commands::health(&client, &ctx).await,
    }
}

/// Create a gateway client for the given server URL
fn create_client(server: &str) -> Result<GatewayClient> {
    GatewayClient::new(server).context("Failed to create gateway client")
}
