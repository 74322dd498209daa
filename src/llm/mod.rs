pub mod models;
pub mod openrouter;

use openrouter::OpenRouterProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use models::{ChatOptions, ChatResponse, Message};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Network Error: {0}")]
    Network(String),
    #[error("{0}")]
    Api(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A chat-completion backend. One call to `chat` is one outbound request.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError>;
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Arc<dyn LlmProvider> {
        let cfg = &config.chat;
        Arc::new(OpenRouterProvider::new(
            cfg.api_key.clone(),
            cfg.api_base.clone(),
            cfg.default_model.clone(),
            cfg.referer.clone(),
            cfg.title.clone(),
        ))
    }
}
