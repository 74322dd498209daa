use chrono::{DateTime, Utc};
use tracing::error;
use uuid::Uuid;

use crate::panels::{Backend, Notice};
use crate::proxy::{ResearchRequest, SearchResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchQuery {
    pub id: Uuid,
    pub query: String,
    pub summary: String,
    pub results: Vec<SearchResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
pub struct ResearchPanel {
    pub query: String,
    research: Vec<ResearchQuery>,
    searching: bool,
    notices: Vec<Notice>,
}

impl ResearchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first.
    pub fn research(&self) -> &[ResearchQuery] {
        &self.research
    }

    pub fn is_loading(&self) -> bool {
        self.searching
    }

    pub fn can_search(&self) -> bool {
        !self.searching && !self.query.trim().is_empty()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn search(&mut self, backend: &dyn Backend) -> Option<&ResearchQuery> {
        if !self.can_search() {
            return None;
        }

        self.searching = true;
        let req = ResearchRequest {
            query: Some(self.query.clone()),
        };
        let result = backend.research(&req).await;
        self.searching = false;

        match result {
            Ok(reply) => {
                self.notices.push(Notice::info(
                    "Research Complete!",
                    format!("Found {} relevant sources", reply.results.len()),
                ));
                self.query.clear();
                self.research.insert(
                    0,
                    ResearchQuery {
                        id: Uuid::new_v4(),
                        query: reply.query,
                        summary: reply.summary,
                        results: reply.results,
                        timestamp: Utc::now(),
                    },
                );
                self.research.first()
            }
            Err(e) => {
                error!("Research error: {}", e);
                self.notices.push(Notice::error(
                    "Search Failed",
                    "Failed to perform web search. Please try again.",
                ));
                None
            }
        }
    }
}
