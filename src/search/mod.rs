pub mod serpapi;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use serpapi::SerpApiProvider;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Network Error: {0}")]
    Network(String),
    #[error("{0}")]
    Api(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// One organic hit as the search API returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHit {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchInformation {
    pub total_results: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMetadata {
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub organic_results: Vec<RawHit>,
    pub search_information: Option<SearchInformation>,
    pub search_metadata: Option<SearchMetadata>,
    pub error: Option<String>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches up to `page_size` raw hits. A provider-level `error` field is
    /// reported as `SearchError::Api`.
    async fn search(&self, query: &str, page_size: u32) -> Result<RawSearchResponse, SearchError>;
}

pub fn create_default(config: &AppConfig) -> Arc<dyn SearchProvider> {
    let cfg = &config.search;
    Arc::new(SerpApiProvider::new(
        cfg.api_key.clone(),
        cfg.api_base.clone(),
        cfg.engine.clone(),
    ))
}
