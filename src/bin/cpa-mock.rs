//! cpa-mock server - answers gateway CPA checks and payment-result callbacks
//!
//! Serves `/operation/check`, `/operation/callback` and the tester JSON routes
//! backed by files in the data directory.

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use cpa_mock::api::{router, AppState};
use cpa_mock::ServerConfig;

#[derive(Parser)]
#[command(name = "cpa-mock")]
#[command(version, about = "Merchant test double for gateway CPA callbacks", long_about = None)]
struct Cli {
    /// Address to bind (env: CPA_HOST)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on (env: PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory with settings.json, callbacks.json, cards.json (env: CPA_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Gateway payment page base URL (env: CPA_GATEWAY_URL)
    #[arg(long)]
    gateway_url: Option<String>,

    /// Merchant id used in initiation links (env: CPA_MERCHANT_ID)
    #[arg(long)]
    merchant_id: Option<String>,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            gateway_url: self.gateway_url.unwrap_or(defaults.gateway_url),
            merchant_id: self.merchant_id.unwrap_or(defaults.merchant_id),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();
    let addr = config.socket_addr();

    tracing::info!("cpa-mock listening on {}", addr);
    tracing::info!("Data directory: {}", config.data_dir.display());

    let app = router(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", addr, e);
            process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        process::exit(1);
    }
}
