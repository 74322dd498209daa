use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::llm::{
    models::{ChatOptions, Message, Usage},
    LlmError, LlmProvider,
};
use crate::proxy::ProxyError;

// Generation parameters are fixed for every request.
pub const MAX_TOKENS: u32 = 1500;
pub const TEMPERATURE: f64 = 0.7;
pub const TOP_P: f64 = 0.9;
pub const FREQUENCY_PENALTY: f64 = 0.1;
pub const PRESENCE_PENALTY: f64 = 0.1;

const ERROR_DETAILS: &str = "Check the server logs for more information";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub model: String,
    pub usage: Option<Usage>,
}

pub struct ChatProxy {
    provider: Arc<dyn LlmProvider>,
}

impl ChatProxy {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(&self, req: ChatRequest) -> Result<ChatReply, ProxyError> {
        if req.messages.is_empty() {
            return Err(ProxyError::validation("Messages are required"));
        }

        info!(
            message_count = req.messages.len(),
            model = req.model.as_deref().unwrap_or("default"),
            "Chat request received"
        );

        let options = ChatOptions {
            model: req.model,
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            top_p: Some(TOP_P),
            frequency_penalty: Some(FREQUENCY_PENALTY),
            presence_penalty: Some(PRESENCE_PENALTY),
        };

        match self.provider.chat(&req.messages, options).await {
            Ok(res) => Ok(ChatReply {
                message: res.content,
                model: res.model,
                usage: res.usage,
            }),
            Err(LlmError::NotConfigured(what)) => {
                error!("{} is not configured", what);
                Err(ProxyError::not_configured(what))
            }
            Err(e) => {
                error!("Error in chat proxy ({}): {}", self.provider.name(), e);
                Err(ProxyError::upstream(e.to_string(), ERROR_DETAILS))
            }
        }
    }
}
