//! K3 Bridge - Main Entry Point
//!
//! Command-line access to the K3 Cloud web API.

use std::env;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use k3_bridge::cache::InventoryCache;
use k3_bridge::client::K3Client;
use k3_bridge::config::Config;
use k3_bridge::inventory::{calculate_metrics, dashboard_rows};
use k3_bridge::sync;
use k3_common::BillQuery;

const RULE: &str = "--------------------------------------------------";

#[derive(Parser)]
#[command(rename_all = "snake_case")]
#[clap(name = "k3-bridge", about = "Signed queries against the K3 Cloud web API")]
enum Cmd {
    #[clap(about = "Send one signed inventory query and print the raw response")]
    Query {
        #[clap(long, default_value = "CK0201", long_help = "Warehouse number to filter on")]
        warehouse: String,

        #[clap(long, default_value = "2", long_help = "Maximum rows to return")]
        limit: u32,
    },

    #[clap(about = "Show all-warehouse inventory metrics and table rows")]
    Inventory {
        #[clap(long, long_help = "Ignore the snapshot cache and query K3 Cloud")]
        refresh: bool,
    },

    #[clap(about = "Refresh the inventory snapshot file")]
    Sync {
        #[clap(long, long_help = "Keep running and sync on the configured interval")]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading LOG_FORMAT / RUST_LOG
    dotenvy::dotenv().ok();
    init_tracing();

    let cmd = Cmd::parse();
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        server = %config.server_url,
        "Starting K3 Bridge"
    );

    let client = K3Client::new(&config).context("Failed to build K3 Cloud client")?;

    match cmd {
        Cmd::Query { warehouse, limit } => run_query(&client, &warehouse, limit).await,
        Cmd::Inventory { refresh } => run_inventory(&client, &config, refresh).await,
        Cmd::Sync { watch } => {
            if watch {
                sync::watch(&client, &config, shutdown_signal()).await?;
            } else {
                let rows = sync::sync_once(&client, &config).await?;
                info!(rows, "Single sync complete");
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "k3_bridge=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_query(client: &K3Client, warehouse: &str, limit: u32) -> Result<()> {
    let request = client.prepare(BillQuery::inventory(warehouse, limit));

    println!("{RULE}");
    println!("{request}");
    println!("{RULE}");

    let response = client
        .send(&request)
        .await
        .context("K3 Cloud request failed")?;

    println!("{response}");
    Ok(())
}

async fn run_inventory(client: &K3Client, config: &Config, refresh: bool) -> Result<()> {
    let cache = InventoryCache::from_config(config);
    let inventory = cache
        .get_inventory(client, &config.warehouses, refresh)
        .await;

    let output = serde_json::json!({
        "rows": inventory.len(),
        "metrics": calculate_metrics(&inventory, &config.warehouses),
        "table": dashboard_rows(&inventory),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal, stopping...");
}
