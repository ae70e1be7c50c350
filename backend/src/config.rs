use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Published open-data roster for the exhibit, refreshed by the zoo.
const DEFAULT_SOURCE_URL: &str = "https://ckan.odp.jig.jp/dataset/d62824ca-8b19-4d8f-b81d-7f7cc114f25d/resource/ccc95c6d-e3d0-4dd6-99fb-163704f5ab33/download/-.xlsx";
const DEFAULT_FALLBACK_PATH: &str = "assets/redpandas_backup.xlsx";
const DEFAULT_ASSET_BASE_URL: &str = "https://storage.googleapis.com/redpandaapp-202509-assets";
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_HEADER_ROWS_TO_SKIP: usize = 2;
const DEFAULT_DATABASE_URL: &str = "sqlite:diary.db";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Application configuration, resolved once at startup and passed into the
/// services that need it. Nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Remote roster spreadsheet.
    pub source_url: String,
    /// Bundled snapshot used when the remote fetch fails.
    pub fallback_path: PathBuf,
    /// Root of the public object store holding panda photos.
    pub asset_base_url: String,
    /// Connect/read timeout applied to each image existence probe.
    pub probe_timeout: Duration,
    /// Title and column-header rows above the roster data.
    pub header_rows_to_skip: usize,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub listen_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let probe_timeout_ms: u64 = env_or("REDPANDA_PROBE_TIMEOUT_MS", &DEFAULT_PROBE_TIMEOUT_MS.to_string())
            .parse()
            .context("REDPANDA_PROBE_TIMEOUT_MS must be a number of milliseconds")?;
        let header_rows_to_skip: usize = env_or("REDPANDA_HEADER_ROWS", &DEFAULT_HEADER_ROWS_TO_SKIP.to_string())
            .parse()
            .context("REDPANDA_HEADER_ROWS must be a row count")?;

        Ok(Self {
            source_url: env_or("REDPANDA_SHEET_URL", DEFAULT_SOURCE_URL),
            fallback_path: PathBuf::from(env_or("REDPANDA_SHEET_FALLBACK", DEFAULT_FALLBACK_PATH)),
            asset_base_url: env_or("REDPANDA_ASSET_BASE", DEFAULT_ASSET_BASE_URL),
            probe_timeout: Duration::from_millis(probe_timeout_ms),
            header_rows_to_skip,
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            upload_dir: PathBuf::from(env_or("REDPANDA_UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            listen_addr: env_or("REDPANDA_LISTEN_ADDR", DEFAULT_LISTEN_ADDR),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
