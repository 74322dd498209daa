use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::error;

use crate::vision::{VisionError, VisionProvider};

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        }
    }
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe(&self, prompt: &str) -> Result<String, VisionError> {
        if self.api_key.is_empty() {
            return Err(VisionError::NotConfigured("Gemini API key"));
        }

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Gemini API error: {} {}", status, text);
            return Err(VisionError::Api(format!("Gemini API error: {}", status.as_u16())));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| VisionError::Malformed(e.to_string()))?;

        extract_text(&json)
    }
}

/// Concatenates the text parts of the first candidate.
pub fn extract_text(json: &Value) -> Result<String, VisionError> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| VisionError::Malformed("missing candidates[0].content.parts".to_string()))?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        return Err(VisionError::Malformed("candidate has no text".to_string()));
    }
    Ok(text)
}
