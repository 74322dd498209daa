//! Client-side panel controllers.
//!
//! Each panel owns its state and calls exactly one backend function per user
//! action. `submit`-style methods take `&mut self` for the whole call, so a
//! panel can never have two calls in flight; `is_loading` mirrors that for
//! rendering (the primary control is disabled while it is set).

pub mod backend;
pub mod chat;
pub mod image;
pub mod research;
pub mod settings;

use async_trait::async_trait;
use thiserror::Error;

use crate::proxy::{ChatReply, ChatRequest, ImageReply, ImageRequest, ResearchReply, ResearchRequest};

pub use backend::ProxyClient;
pub use chat::{ChatMessage, ChatPanel, Role};
pub use image::{GeneratedImage, ImagePanel};
pub use research::{ResearchPanel, ResearchQuery};
pub use settings::{ApiUsage, SettingsPanel, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Chat,
    Image,
    Research,
    Settings,
}

impl PanelKind {
    pub const ALL: [PanelKind; 4] = [Self::Chat, Self::Image, Self::Research, Self::Settings];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A transient, user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("HTTP {status}: {error}")]
    Status { status: u16, error: String },
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// The three backend functions as seen from a panel.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatReply, BackendError>;

    async fn generate_image(&self, req: &ImageRequest) -> Result<ImageReply, BackendError>;

    async fn research(&self, req: &ResearchRequest) -> Result<ResearchReply, BackendError>;
}
