//! The three backend functions and their shared response envelope.
//!
//! Each proxy validates its payload, makes at most one outbound call and
//! normalizes every failure into [`ProxyError`]. Nothing is cached: two equal
//! requests are two provider calls.

pub mod chat;
pub mod image;
pub mod research;
pub mod summary;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use chat::{ChatProxy, ChatReply, ChatRequest};
pub use image::{ImageProxy, ImageReply, ImageRequest};
pub use research::{ResearchProxy, ResearchReply, ResearchRequest, SearchResult};

#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required field is missing or out of range. No outbound call was made.
    #[error("{0}")]
    Validation(String),
    /// A credential is absent.
    #[error("{error}")]
    NotConfigured { error: String, details: String },
    /// The provider failed, answered non-2xx or returned an unusable body.
    #[error("{error}")]
    Upstream { error: String, details: String },
}

impl ProxyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_configured(what: impl std::fmt::Display) -> Self {
        Self::NotConfigured {
            error: format!("{} not configured", what),
            details: "Set the credential in the server configuration or environment".to_string(),
        }
    }

    pub fn upstream(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Upstream {
            error: error.into(),
            details: details.into(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Validation(message) => ErrorBody {
                error: message.clone(),
                details: None,
            },
            Self::NotConfigured { error, details } | Self::Upstream { error, details } => ErrorBody {
                error: error.clone(),
                details: Some(details.clone()),
            },
        }
    }
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured { .. } | Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// Wire shape of every non-success answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_without_details() {
        let err = ProxyError::validation("Prompt is required");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(err.body()).unwrap(),
            serde_json::json!({ "error": "Prompt is required" })
        );
    }

    #[test]
    fn config_and_upstream_share_500_shape() {
        let cfg = ProxyError::not_configured("SerpAPI key");
        let up = ProxyError::upstream("Failed to perform web search", "boom");
        assert_eq!(cfg.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(up.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(cfg.body().error, "SerpAPI key not configured");
        assert!(cfg.body().details.is_some());
        assert_eq!(up.body().details.as_deref(), Some("boom"));
    }
}
