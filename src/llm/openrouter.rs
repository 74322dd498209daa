use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::llm::{models::{ChatOptions, ChatResponse, Message, Usage}, LlmError, LlmProvider};

/// OpenAI-compatible chat completions served through OpenRouter.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    referer: String,
    title: String,
}

impl OpenRouterProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        default_model: String,
        referer: String,
        title: String,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            default_model,
            referer,
            title,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NotConfigured("OPENROUTER_API_KEY"));
        }

        let model = options.model.as_deref().unwrap_or(&self.default_model);

        let body = request_body(model, messages, &options);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("OpenRouter API error: {} {}", status, text);
            return Err(LlmError::Api(format!("OpenRouter API error: {}", status.as_u16())));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        debug!("OpenRouter response received");
        parse_completion(&json, model)
    }
}

/// The non-streaming completion request as sent on the wire.
pub fn request_body(model: &str, messages: &[Message], options: &ChatOptions) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "max_tokens": options.max_tokens.unwrap_or(1500),
        "temperature": options.temperature.unwrap_or(0.7),
        "top_p": options.top_p.unwrap_or(0.9),
        "frequency_penalty": options.frequency_penalty.unwrap_or(0.0),
        "presence_penalty": options.presence_penalty.unwrap_or(0.0),
        "stream": false,
    })
}

/// Pulls the first completion out of an OpenAI-style response body.
pub fn parse_completion(json: &Value, requested_model: &str) -> Result<ChatResponse, LlmError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::Malformed("missing choices[0].message.content".to_string()))?
        .to_string();

    let model = json["model"].as_str().unwrap_or(requested_model).to_string();

    let usage = json.get("usage").filter(|u| u.is_object()).map(|u| {
        let prompt = u["prompt_tokens"].as_u64().unwrap_or(0);
        let completion = u["completion_tokens"].as_u64().unwrap_or(0);
        Usage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: u["total_tokens"]
                .as_u64()
                .unwrap_or_else(|| prompt.saturating_add(completion)),
        }
    });

    Ok(ChatResponse { content, model, usage })
}
