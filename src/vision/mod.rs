pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use gemini::GeminiProvider;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Network Error: {0}")]
    Network(String),
    #[error("{0}")]
    Api(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A text-from-prompt vision model. It answers with a description, not pixels.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn describe(&self, prompt: &str) -> Result<String, VisionError>;
}

pub fn create_default(config: &AppConfig) -> Arc<dyn VisionProvider> {
    let cfg = &config.image;
    Arc::new(GeminiProvider::new(
        cfg.api_key.clone(),
        cfg.api_base.clone(),
        cfg.vision_model.clone(),
    ))
}
