//! Server configuration.
//!
//! Values come from environment variables (optionally via `.env`) and can be
//! overridden by command-line flags in the `cpa-mock` binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 7443;
pub const DEFAULT_GATEWAY_URL: &str = "https://lt.pga.gazprombank.ru";
pub const DEFAULT_MERCHANT_ID: &str = "ECOM_CPA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory holding settings, callbacks, cards and the order counter
    pub data_dir: PathBuf,
    /// Base URL of the gateway payment pages used in initiation links
    pub gateway_url: String,
    pub merchant_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("CPA_HOST")
                .ok()
                .and_then(|host| host.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: std::env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            data_dir: std::env::var("CPA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            gateway_url: std::env::var("CPA_GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            merchant_id: std::env::var("CPA_MERCHANT_ID")
                .unwrap_or_else(|_| DEFAULT_MERCHANT_ID.to_string()),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Gateway base URL without a trailing slash
    pub fn gateway_base(&self) -> &str {
        self.gateway_url.trim_end_matches('/')
    }
}
