use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::search::{RawSearchResponse, SearchError, SearchProvider};

pub struct SerpApiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    engine: String,
}

impl SerpApiProvider {
    pub fn new(api_key: String, base_url: String, engine: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            engine,
        }
    }

    fn search_url(&self, query: &str, page_size: u32) -> String {
        format!(
            "{}/search.json?q={}&api_key={}&engine={}&num={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key),
            self.engine,
            page_size
        )
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn search(&self, query: &str, page_size: u32) -> Result<RawSearchResponse, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::NotConfigured("SerpAPI key"));
        }

        info!("Searching for: {}", query);
        let response = self
            .client
            .get(self.search_url(query, page_size))
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        // SerpAPI reports most failures in the body's `error` field, with or
        // without a non-2xx status.
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;
        let data = parse_response(&text)?;

        if let Some(message) = data.error {
            error!("SerpAPI error: {}", message);
            return Err(SearchError::Api(message));
        }
        if !status.is_success() {
            return Err(SearchError::Api(format!("SerpAPI error: {}", status.as_u16())));
        }

        Ok(data)
    }
}

pub fn parse_response(body: &str) -> Result<RawSearchResponse, SearchError> {
    serde_json::from_str(body).map_err(|e| SearchError::Malformed(e.to_string()))
}
