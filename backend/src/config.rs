use anyhow::{Context, Result};
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub bind_address: IpAddr,
    /// Optional TOML file with the transcript settings
    pub config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1".to_string())
                .parse()
                .context("BIND_ADDRESS must be an IP address")?,
            config_path: env::var("TRANSCRIPTS_CONFIG").ok().map(PathBuf::from),
        })
    }
}
