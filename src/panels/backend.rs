use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::panels::{Backend, BackendError};
use crate::proxy::{
    ChatReply, ChatRequest, ErrorBody, ImageReply, ImageRequest, ResearchReply, ResearchRequest,
};

/// Calls the proxies over HTTP.
pub struct ProxyClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl ProxyClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    async fn invoke<Req, Res>(&self, function: &str, body: &Req) -> Result<Res, BackendError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(format!("{}/functions/v1/{}", self.base_url, function))
            .json(body);
        if !self.anon_key.is_empty() {
            request = request.bearer_auth(&self.anon_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        debug!("{} answered {}", function, status);

        if !status.is_success() {
            let error = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
            return Err(BackendError::Status {
                status: status.as_u16(),
                error,
            });
        }

        decode(&text)
    }
}

/// Decodes a 2xx body, treating an embedded `error` field as a failure.
pub fn decode<Res: DeserializeOwned>(text: &str) -> Result<Res, BackendError> {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        return Err(BackendError::Status {
            status: 200,
            error: body.error,
        });
    }
    serde_json::from_str(text).map_err(|e| BackendError::Malformed(e.to_string()))
}

#[async_trait]
impl Backend for ProxyClient {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.invoke("chat", req).await
    }

    async fn generate_image(&self, req: &ImageRequest) -> Result<ImageReply, BackendError> {
        self.invoke("generate-image", req).await
    }

    async fn research(&self, req: &ResearchRequest) -> Result<ResearchReply, BackendError> {
        self.invoke("web-research", req).await
    }
}
