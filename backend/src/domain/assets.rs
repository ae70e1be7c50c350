//! Image resolution against the photo object store.
//!
//! The store exposes no listing API, so the resolver enumerates a bounded
//! set of candidate filenames per animal and probes each one for existence.
//! Probing sits behind [`AssetExistenceChecker`] so a real listing API or a
//! cached index can replace it without touching candidate generation.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::AppConfig;

use super::names;

/// Served when no stored image could be confirmed for an animal.
pub const PLACEHOLDER_IMAGE_URL: &str = "/pandas/placeholder.jpg";

const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const MAX_NUMBERED: u32 = 20;

/// Path-segment encoding: unreserved characters stay, spaces become `%20`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Candidate object filenames for an animal, in probe order: the literal
/// name and its normalized token crossed with the known extensions, then
/// the numbered variants 1..=20 with literal and normalized interleaved at
/// each index. Duplicates collapse to their first occurrence.
pub fn candidate_filenames(name: &str) -> Vec<String> {
    let token = names::normalize_name(name);
    let mut candidates = Vec::new();
    for ext in EXTENSIONS {
        candidates.push(format!("{name}.{ext}"));
    }
    for ext in EXTENSIONS {
        candidates.push(format!("{token}.{ext}"));
    }
    for i in 1..=MAX_NUMBERED {
        for ext in EXTENSIONS {
            candidates.push(format!("{name}{i}.{ext}"));
            candidates.push(format!("{token}{i}.{ext}"));
        }
    }
    dedup_preserving_order(candidates)
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

/// Existence probe against the asset store.
#[async_trait]
pub trait AssetExistenceChecker: Send + Sync {
    async fn exists(&self, filename: &str) -> bool;
}

/// HEAD-probes public objects under `<base>/pandas/`. Each probe carries
/// its own timeout, so one hung object cannot stall the rest.
pub struct HttpAssetChecker {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAssetChecker {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.probe_timeout)
            .timeout(config.probe_timeout)
            .build()
            .context("building asset probe client")?;
        Ok(Self {
            http,
            base_url: config.asset_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AssetExistenceChecker for HttpAssetChecker {
    async fn exists(&self, filename: &str) -> bool {
        let url = format!("{}/pandas/{}", self.base_url, encode_path_segment(filename));
        match self.http.head(&url).send().await {
            // 2xx, or 3xx for signed-URL redirects, counts as present.
            Ok(response) => (200..400).contains(&response.status().as_u16()),
            // Timeouts and transport errors read as "absent", never as errors.
            Err(_) => false,
        }
    }
}

/// Resolves the confirmed image URL set for an animal.
#[derive(Clone)]
pub struct AssetResolver {
    checker: Arc<dyn AssetExistenceChecker>,
}

impl AssetResolver {
    pub fn new(checker: Arc<dyn AssetExistenceChecker>) -> Self {
        Self { checker }
    }

    /// Confirmed image URLs in candidate order; empty when nothing is
    /// stored. Probes run concurrently but results merge in generation
    /// order, which fixes which URL becomes the thumbnail.
    pub async fn image_urls(&self, name: &str) -> Vec<String> {
        let candidates = candidate_filenames(name);
        let probes = candidates.iter().map(|filename| self.checker.exists(filename));
        let results = join_all(probes).await;
        candidates
            .iter()
            .zip(results)
            .filter(|(_, exists)| *exists)
            .map(|(filename, _)| format!("/pandas/{filename}"))
            .collect()
    }

    /// URL list with the placeholder substituted when nothing was confirmed.
    pub async fn image_urls_or_placeholder(&self, name: &str) -> Vec<String> {
        let urls = self.image_urls(name).await;
        if urls.is_empty() {
            vec![PLACEHOLDER_IMAGE_URL.to_string()]
        } else {
            urls
        }
    }

    /// The thumbnail: first confirmed URL, or the placeholder.
    pub async fn first_image_url(&self, name: &str) -> String {
        self.image_urls(name)
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string())
    }
}
