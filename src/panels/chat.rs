use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::llm::models::Message;
use crate::panels::{Backend, Notice};
use crate::proxy::ChatRequest;

pub const GREETING: &str = "Hello! I'm your AI assistant powered by advanced language models. \
I can help you with writing, analysis, coding, creative tasks, and much more. What would you like \
to work on today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

pub struct ChatPanel {
    pub input: String,
    pub model: Option<String>,
    transcript: Vec<ChatMessage>,
    loading: bool,
    notices: Vec<Notice>,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPanel {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            model: None,
            transcript: vec![ChatMessage::new(Role::Assistant, GREETING)],
            loading: false,
            notices: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_send(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Sends the current input. Returns the assistant message on success.
    ///
    /// The user message is appended before the call and stays in the
    /// transcript whatever the outcome; a failure only adds a notice.
    pub async fn send(&mut self, backend: &dyn Backend) -> Option<&ChatMessage> {
        if !self.can_send() {
            return None;
        }

        let user = ChatMessage::new(Role::User, std::mem::take(&mut self.input));
        self.transcript.push(user);
        self.loading = true;

        let req = ChatRequest {
            messages: self
                .transcript
                .iter()
                .map(|m| Message::new(m.role.as_str(), m.content.clone()))
                .collect(),
            model: self.model.clone(),
        };

        let result = backend.chat(&req).await;
        self.loading = false;

        match result {
            Ok(reply) => {
                self.transcript.push(ChatMessage::new(Role::Assistant, reply.message));
                self.transcript.last()
            }
            Err(e) => {
                error!("Chat error: {}", e);
                self.notices.push(Notice::error(
                    "Error",
                    "Failed to get AI response. Please try again.",
                ));
                None
            }
        }
    }

    /// Plain-text rendering of a message for the clipboard.
    pub fn copy_text(&mut self, id: Uuid) -> Option<String> {
        let content = self.transcript.iter().find(|m| m.id == id)?.content.clone();
        self.notices.push(Notice::info("Copied!", "Message copied to clipboard"));
        Some(content)
    }
}
