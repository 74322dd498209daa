#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aidesk::auth::{
    AuthCallback, AuthError, AuthEvent, AuthProvider, ListenerSet, OAuthProvider, Session,
    SignUpOutcome, Subscription,
};
use aidesk::llm::{
    models::{ChatOptions, ChatResponse, Message},
    openrouter::parse_completion,
    LlmError, LlmProvider,
};
use aidesk::panels::{Backend, BackendError};
use aidesk::proxy::{ChatReply, ChatRequest, ImageReply, ImageRequest, ResearchReply, ResearchRequest};
use aidesk::search::{RawSearchResponse, SearchError, SearchProvider};
use aidesk::vision::{VisionError, VisionProvider};

type Respond<T, E> = Box<dyn Fn(usize) -> Result<T, E> + Send + Sync>;

// --- Chat provider ---

pub struct MockLlm {
    calls: AtomicUsize,
    pub seen: Mutex<Vec<(Vec<Message>, ChatOptions)>>,
    respond: Respond<ChatResponse, LlmError>,
}

impl MockLlm {
    pub fn new(
        respond: impl Fn(usize) -> Result<ChatResponse, LlmError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    /// Answers every call by parsing `body` as the provider's JSON.
    pub fn from_body(body: Value) -> Arc<Self> {
        Self::new(move |_| parse_completion(&body, "test-model"))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((messages.to_vec(), options));
        (self.respond)(n)
    }
}

// --- Vision provider ---

pub struct MockVision {
    calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    respond: Respond<String, VisionError>,
}

impl MockVision {
    pub fn new(
        respond: impl Fn(usize) -> Result<String, VisionError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    pub fn describing(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVision {
    fn name(&self) -> &str {
        "mock"
    }

    async fn describe(&self, prompt: &str) -> Result<String, VisionError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(n)
    }
}

// --- Search provider ---

pub struct MockSearch {
    calls: AtomicUsize,
    pub page_sizes: Mutex<Vec<u32>>,
    respond: Respond<RawSearchResponse, SearchError>,
}

impl MockSearch {
    pub fn new(
        respond: impl Fn(usize) -> Result<RawSearchResponse, SearchError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            page_sizes: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    pub fn from_body(body: Value) -> Arc<Self> {
        Self::new(move |_| Ok(serde_json::from_value(body.clone()).unwrap()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, _query: &str, page_size: u32) -> Result<RawSearchResponse, SearchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.page_sizes.lock().unwrap().push(page_size);
        (self.respond)(n)
    }
}

/// `count` organic hits titled `Result 1`, `Result 2`, ...
pub fn hits(count: usize) -> Value {
    let organic: Vec<Value> = (1..=count)
        .map(|i| {
            serde_json::json!({
                "title": format!("Result {}", i),
                "snippet": format!("Snippet number {}", i),
                "link": format!("https://site{}.example.org/page", i),
            })
        })
        .collect();
    serde_json::json!({ "organic_results": organic })
}

// --- Panel backend ---

#[derive(Default)]
pub struct MockBackend {
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub image_requests: Mutex<Vec<ImageRequest>>,
    pub research_requests: Mutex<Vec<ResearchRequest>>,
    pub fail: bool,
}

impl MockBackend {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn outcome<T>(&self, ok: T) -> Result<T, BackendError> {
        if self.fail {
            Err(BackendError::Status {
                status: 500,
                error: "upstream down".to_string(),
            })
        } else {
            Ok(ok)
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.chat_requests.lock().unwrap().push(req.clone());
        let n = self.chat_requests.lock().unwrap().len();
        self.outcome(ChatReply {
            message: format!("reply {}", n),
            model: "mock".to_string(),
            usage: None,
        })
    }

    async fn generate_image(&self, req: &ImageRequest) -> Result<ImageReply, BackendError> {
        self.image_requests.lock().unwrap().push(req.clone());
        let prompt = req.prompt.clone().unwrap_or_default();
        self.outcome(ImageReply {
            success: true,
            image_url: format!("https://img.example.com/{}", prompt.replace(' ', "-")),
            description: "desc".to_string(),
            prompt,
            model: req.model.clone().unwrap_or_default(),
            aspect_ratio: req.aspect_ratio.clone().unwrap_or_default(),
            quality: req.quality.unwrap_or(80) as u8,
            timestamp: chrono::Utc::now(),
        })
    }

    async fn research(&self, req: &ResearchRequest) -> Result<ResearchReply, BackendError> {
        self.research_requests.lock().unwrap().push(req.clone());
        let query = req.query.clone().unwrap_or_default();
        self.outcome(ResearchReply {
            summary: format!("summary of {}", query),
            query,
            results: Vec::new(),
            total_results: 0,
            search_time: "now".to_string(),
        })
    }
}

// --- Auth collaborator ---

pub struct MockAuth {
    session: Mutex<Option<Session>>,
    pub listeners: ListenerSet,
    pub sign_in_calls: AtomicUsize,
    /// Fired from inside the next `current_session`, after the answer is read.
    pub event_during_lookup: Mutex<Option<AuthEvent>>,
}

impl MockAuth {
    pub fn new(session: Option<Session>) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
            listeners: ListenerSet::default(),
            sign_in_calls: AtomicUsize::new(0),
            event_during_lookup: Mutex::new(None),
        })
    }

    /// Simulates an external sign-in/sign-out.
    pub fn fire(&self, event: AuthEvent) {
        *self.session.lock().unwrap() = match &event {
            AuthEvent::SignedIn(s) => Some(s.clone()),
            AuthEvent::SignedOut => None,
        };
        self.listeners.emit(event);
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let answer = self.session.lock().unwrap().clone();
        let pending = self.event_during_lookup.lock().unwrap().take();
        if let Some(event) = pending {
            self.fire(event);
        }
        Ok(answer)
    }

    fn subscribe(&self, callback: AuthCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> Result<Session, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let session = Session::new(email);
        self.fire(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, _email: &str, _password: &str, _full_name: &str) -> Result<SignUpOutcome, AuthError> {
        Ok(SignUpOutcome::ConfirmationRequired)
    }

    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<String, AuthError> {
        Ok(format!("https://auth.example.com/authorize?provider={}", provider.as_str()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.fire(AuthEvent::SignedOut);
        Ok(())
    }
}
