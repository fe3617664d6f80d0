//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use storefront_observability::LogFormat;

pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";
pub const DEFAULT_CHECKOUT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the catalog service (no trailing path).
    pub catalog_url: String,
    /// Directory for the state database; the OS data dir when unset.
    pub data_dir: Option<PathBuf>,
    /// How long the simulated payment takes.
    pub checkout_delay: Duration,
    /// Per-request timeout; the transport default when unset.
    pub request_timeout: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            data_dir: None,
            checkout_delay: DEFAULT_CHECKOUT_DELAY,
            request_timeout: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ClientConfig {
    /// Path of the SQLite state database: `{data_dir}/storefront/state.db`.
    pub fn state_db_path(&self) -> anyhow::Result<PathBuf> {
        let mut dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        dir.push("storefront");
        dir.push("state.db");
        Ok(dir)
    }
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")
}
