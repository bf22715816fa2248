use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use ledger_gateway::assets::{pretty_json, Asset, AssetService};
use ledger_gateway::config::{load_config, load_default_config};
use ledger_gateway::http::HttpServer;
use ledger_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "ledger-gateway")]
#[command(about = "Asset client for a permissioned ledger gateway", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit InitLedger and wait for the commit
    Init,
    /// Evaluate GetAllAssets and print the result
    Get,
    /// Submit CreateAsset and wait for the commit
    Create {
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value = "yellow")]
        color: String,
        #[arg(long, default_value_t = 5)]
        size: u32,
        #[arg(long, default_value = "Tom")]
        owner: String,
        #[arg(long, default_value_t = 1300)]
        appraised_value: u64,
    },
    /// Serve the HTTP trigger endpoints
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };
    logging::init(&config.observability.log_filter);

    tracing::info!(
        endpoint = %config.gateway.endpoint,
        msp_id = %config.identity.msp_id,
        channel = %config.network.channel_name,
        chaincode = %config.network.chaincode_name,
        "Configuration loaded"
    );

    let config = Arc::new(config);
    let service = AssetService::new(config.clone());

    match cli.command {
        Commands::Init => {
            service.init_ledger().await?;
            tracing::info!("Transaction committed successfully");
        }
        Commands::Get => {
            let payload = service.get_all_assets().await?;
            println!("{}", pretty_json(&payload)?);
        }
        Commands::Create {
            id,
            color,
            size,
            owner,
            appraised_value,
        } => {
            let asset = Asset {
                id: id.unwrap_or_else(default_asset_id),
                color,
                size,
                owner,
                appraised_value,
            };
            service.create_asset(&asset).await?;
            tracing::info!(asset_id = %asset.id, "Asset created");
        }
        Commands::Serve => {
            let listener = TcpListener::bind(&config.http.bind_address).await?;
            HttpServer::new(service, &config.http).run(listener).await?;
            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}

fn default_asset_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("asset{}", millis)
}
