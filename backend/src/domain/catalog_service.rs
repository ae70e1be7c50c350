//! Catalog loading.
//!
//! The roster lives in a published spreadsheet; every load fetches and
//! re-parses it (callers wanting stability within a request load once and
//! reuse the result). Network or parse trouble falls back to the bundled
//! snapshot, and if that fails too the catalog is served empty rather than
//! failing the request.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Xlsx};
use tracing::{info, warn};

use crate::config::AppConfig;
use shared::RedPanda;

use super::{query, sheet};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Loads animal records from the roster spreadsheet.
#[derive(Clone)]
pub struct CatalogService {
    http: reqwest::Client,
    source_url: String,
    fallback_path: PathBuf,
    header_rows_to_skip: usize,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("building roster fetch client")?;
        Ok(Self {
            http,
            source_url: config.source_url.clone(),
            fallback_path: config.fallback_path.clone(),
            header_rows_to_skip: config.header_rows_to_skip,
        })
    }

    /// Load the full roster, newest state wins.
    pub async fn load(&self) -> Vec<RedPanda> {
        match self.fetch_remote().await {
            Ok(pandas) => {
                info!("loaded {} roster rows from remote", pandas.len());
                pandas
            }
            Err(e) => {
                warn!("remote roster fetch failed ({e:#}); using bundled snapshot");
                match self.load_fallback() {
                    Ok(pandas) => pandas,
                    Err(e) => {
                        warn!("bundled roster snapshot unreadable ({e:#}); serving an empty catalog");
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Animals a diary post can be filed under: the in-park subset.
    pub async fn load_postable(&self) -> Vec<RedPanda> {
        self.load().await.into_iter().filter(RedPanda::is_in_park).collect()
    }

    /// First exact-name match over the unfiltered roster.
    pub async fn find_by_name(&self, name: &str) -> Option<RedPanda> {
        let all = self.load().await;
        query::find_by_name(&all, name).cloned()
    }

    async fn fetch_remote(&self) -> Result<Vec<RedPanda>> {
        let response = self
            .http
            .get(&self.source_url)
            .send()
            .await
            .context("requesting roster spreadsheet")?
            .error_for_status()
            .context("roster spreadsheet request rejected")?;
        let bytes = response.bytes().await.context("reading roster spreadsheet body")?;
        self.parse_workbook(&bytes)
    }

    fn load_fallback(&self) -> Result<Vec<RedPanda>> {
        let bytes = std::fs::read(&self.fallback_path)
            .with_context(|| format!("reading fallback snapshot {}", self.fallback_path.display()))?;
        self.parse_workbook(&bytes)
    }

    fn parse_workbook(&self, bytes: &[u8]) -> Result<Vec<RedPanda>> {
        let mut workbook = Xlsx::new(Cursor::new(bytes)).context("opening roster workbook")?;
        let range = workbook
            .worksheet_range_at(0)
            .context("roster workbook has no sheets")??;
        Ok(self.records_from_range(&range))
    }

    /// Map every data row below the header block; blank rows are skipped
    /// without terminating the scan, and rows without a parseable name are
    /// still included with blank fields.
    fn records_from_range(&self, range: &Range<Data>) -> Vec<RedPanda> {
        range
            .rows()
            .skip(self.header_rows_to_skip)
            .filter(|row| !sheet::is_blank_row(row))
            .map(sheet::map_row)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(source_url: &str, fallback_path: PathBuf) -> AppConfig {
        AppConfig {
            source_url: source_url.to_string(),
            fallback_path,
            asset_base_url: "https://assets.example".to_string(),
            probe_timeout: Duration::from_millis(100),
            header_rows_to_skip: 2,
            database_url: "sqlite::memory:".to_string(),
            upload_dir: PathBuf::from("uploads"),
            listen_addr: "127.0.0.1:0".to_string(),
        }
    }

    fn set(range: &mut Range<Data>, row: u32, cells: &[(u32, &str)]) {
        for (col, value) in cells {
            range.set_value((row, *col), Data::String(value.to_string()));
        }
    }

    fn roster_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (5, 15));
        set(&mut range, 0, &[(0, "レッサーパンダ個体一覧")]);
        set(&mut range, 1, &[(0, "名前"), (1, "性別"), (2, "生年月日")]);
        set(&mut range, 2, &[(0, "いちご"), (1, "メス"), (2, "2020/01/01")]);
        set(&mut range, 3, &[(0, "にごう"), (1, "オス"), (2, "2019/01/01"), (3, "2022/05/01")]);
        // row 4 left fully blank
        set(&mut range, 5, &[(0, "さんた"), (1, "オス")]);
        range
    }

    #[test]
    fn test_records_from_range_skips_headers_and_blank_rows() {
        let config = test_config("http://127.0.0.1:9/roster.xlsx", PathBuf::from("missing.xlsx"));
        let service = CatalogService::new(&config).unwrap();

        let pandas = service.records_from_range(&roster_range());
        let names: Vec<&str> = pandas.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["いちご", "にごう", "さんた"]);

        assert!(pandas[0].is_in_park());
        assert!(!pandas[1].is_in_park());
        assert_eq!(pandas[1].age, "3歳");
        assert_eq!(pandas[2].birth_date, "");
    }

    #[test]
    fn test_records_include_rows_without_a_name() {
        let config = test_config("http://127.0.0.1:9/roster.xlsx", PathBuf::from("missing.xlsx"));
        let service = CatalogService::new(&config).unwrap();

        let mut range = Range::new((0, 0), (2, 15));
        set(&mut range, 2, &[(1, "メス")]);
        let pandas = service.records_from_range(&range);
        assert_eq!(pandas.len(), 1);
        assert_eq!(pandas[0].name, "");
        assert_eq!(pandas[0].gender, "メス");
    }

    #[tokio::test]
    async fn test_load_falls_back_to_bundled_snapshot() {
        let fallback = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/redpandas_backup.xlsx"));
        let config = test_config("http://127.0.0.1:9/roster.xlsx", fallback);
        let service = CatalogService::new(&config).unwrap();

        let pandas = service.load().await;
        assert!(!pandas.is_empty());
        assert!(pandas.iter().all(|p| !p.name.is_empty()));
    }

    #[tokio::test]
    async fn test_load_serves_empty_catalog_when_all_sources_fail() {
        let config = test_config("http://127.0.0.1:9/roster.xlsx", PathBuf::from("no/such/snapshot.xlsx"));
        let service = CatalogService::new(&config).unwrap();

        assert!(service.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_postable_keeps_only_in_park_animals() {
        let fallback = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/redpandas_backup.xlsx"));
        let config = test_config("http://127.0.0.1:9/roster.xlsx", fallback);
        let service = CatalogService::new(&config).unwrap();

        let postable = service.load_postable().await;
        assert!(!postable.is_empty());
        assert!(postable.iter().all(RedPanda::is_in_park));
    }
}
