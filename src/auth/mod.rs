//! Session handling against an external auth service.
//!
//! The service itself is opaque: [`AuthProvider`] is the capability surface
//! this crate consumes, and [`AuthGate`] is the state machine that decides
//! which surface a user may reach.

pub mod gate;
pub mod hosted;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gate::{AuthGate, GateState, Surface};
pub use hosted::HostedAuth;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing information: {0}")]
    MissingFields(&'static str),
    #[error("Auth service is not configured")]
    NotConfigured,
    #[error("Network Error: {0}")]
    Network(String),
    #[error("{0}")]
    Rejected(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// What this crate reads from a session: a user is present, with this email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub access_token: Option<String>,
}

impl Session {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// The account exists but the email must be confirmed first.
    ConfirmationRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Github,
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Google => "google",
        }
    }
}

pub type AuthCallback = Box<dyn Fn(AuthEvent) + Send + Sync>;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Registers `callback` for sign-in/sign-out events until the returned
    /// guard is released.
    fn subscribe(&self, callback: AuthCallback) -> Subscription;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUpOutcome, AuthError>;

    /// Returns the URL the user must visit to finish the OAuth flow.
    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<String, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Disposal handle for a listener registration. Releasing it (explicitly or by
/// dropping) removes the listener exactly once.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

type Listener = Arc<dyn Fn(AuthEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Registry of auth-change callbacks shared by provider implementations.
#[derive(Clone, Default)]
pub struct ListenerSet {
    inner: Arc<Mutex<Listeners>>,
}

impl ListenerSet {
    pub fn subscribe(&self, callback: AuthCallback) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, Arc::from(callback)));
            id
        };

        let inner = Arc::clone(&self.inner);
        Subscription::new(move || {
            let mut inner = inner.lock().unwrap_or_else(|p| p.into_inner());
            inner.entries.retain(|(entry, _)| *entry != id);
        })
    }

    /// Calls every live listener. The registry lock is not held during calls.
    pub fn emit(&self, event: AuthEvent) {
        let snapshot: Vec<Listener> = {
            let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            inner.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in snapshot {
            listener(event.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
