use chrono::{DateTime, SecondsFormat, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use url::Url;

use crate::proxy::{summary, ProxyError};
use crate::search::{RawHit, RawSearchResponse, SearchError, SearchProvider};

/// Hits requested from the provider per query.
pub const PAGE_SIZE: u32 = 10;
/// Hits kept after post-processing.
pub const MAX_RESULTS: usize = 6;

pub const UNTITLED: &str = "Untitled";
pub const NO_SNIPPET: &str = "No description available";
pub const NO_URL: &str = "#";
pub const DEFAULT_DOMAIN: &str = "example.com";

/// Decorative "indexed" times. The provider does not report when a page was
/// indexed, so each result gets one of these at random.
pub const RELATIVE_TIMES: &[&str] = &[
    "just now",
    "5 minutes ago",
    "1 hour ago",
    "3 hours ago",
    "1 day ago",
    "2 days ago",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub domain: String,
    /// Relative, human-readable and not derived from the provider.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchReply {
    pub query: String,
    pub summary: String,
    pub results: Vec<SearchResult>,
    pub total_results: u64,
    pub search_time: String,
}

pub struct ResearchProxy {
    provider: Arc<dyn SearchProvider>,
    rng: Mutex<StdRng>,
}

impl ResearchProxy {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self::with_rng(provider, StdRng::from_entropy())
    }

    /// Uses `rng` for the relative timestamps, e.g. a seeded one in tests.
    pub fn with_rng(provider: Arc<dyn SearchProvider>, rng: StdRng) -> Self {
        Self {
            provider,
            rng: Mutex::new(rng),
        }
    }

    pub async fn handle(&self, req: ResearchRequest) -> Result<ResearchReply, ProxyError> {
        // Blankness is judged on the trimmed text; the query itself is echoed as sent.
        let query = match req.query {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Err(ProxyError::validation("Search query is required")),
        };

        let raw = match self.provider.search(&query, PAGE_SIZE).await {
            Ok(raw) => raw,
            Err(SearchError::NotConfigured(what)) => {
                error!("{} not found", what);
                return Err(ProxyError::not_configured(what));
            }
            Err(e) => {
                error!("Error in research proxy ({}): {}", self.provider.name(), e);
                return Err(ProxyError::upstream("Failed to perform web search", e.to_string()));
            }
        };

        let reply = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            process(&query, raw, &mut *rng, Utc::now())
        };

        info!("Found {} results for: {}", reply.results.len(), query);
        Ok(reply)
    }
}

/// Turns a raw provider page into the research envelope.
pub fn process<R: Rng + ?Sized>(
    query: &str,
    raw: RawSearchResponse,
    rng: &mut R,
    now: DateTime<Utc>,
) -> ResearchReply {
    let results: Vec<SearchResult> = raw
        .organic_results
        .into_iter()
        .take(MAX_RESULTS)
        .enumerate()
        .map(|(i, hit)| to_result(i, hit, rng))
        .collect();

    let summary = summary::summarize(query, &results);

    ResearchReply {
        query: query.to_string(),
        summary,
        results,
        total_results: raw
            .search_information
            .and_then(|info| info.total_results)
            .unwrap_or(0),
        search_time: raw
            .search_metadata
            .and_then(|meta| meta.processed_at)
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
}

// Empty strings count as missing.
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn to_result<R: Rng + ?Sized>(index: usize, hit: RawHit, rng: &mut R) -> SearchResult {
    let url = or_default(hit.link, NO_URL);
    let domain = domain_of(&url);
    SearchResult {
        id: (index + 1).to_string(),
        title: or_default(hit.title, UNTITLED),
        snippet: or_default(hit.snippet, NO_SNIPPET),
        url,
        domain,
        timestamp: relative_time(rng).to_string(),
    }
}

pub fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_string())
}

pub fn relative_time<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    RELATIVE_TIMES.choose(rng).copied().unwrap_or(RELATIVE_TIMES[0])
}
