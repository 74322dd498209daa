use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::auth::{AuthError, AuthEvent, AuthProvider, OAuthProvider, Session, SignUpOutcome, Subscription};
use crate::panels::PanelKind;

/// `Unknown` only before the first resolution. Afterwards the gate moves
/// between `Authenticated` and `Anonymous` and never returns to `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Unknown,
    Authenticated(Session),
    Anonymous,
}

/// What the user is shown for a requested panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Loading,
    Landing,
    Panel(PanelKind),
}

impl GateState {
    pub fn from_session(session: Option<Session>) -> Self {
        match session {
            Some(s) => Self::Authenticated(s),
            None => Self::Anonymous,
        }
    }

    pub fn after(&self, event: &AuthEvent) -> Self {
        match event {
            AuthEvent::SignedIn(session) => Self::Authenticated(session.clone()),
            AuthEvent::SignedOut => Self::Anonymous,
        }
    }

    pub fn surface(&self, requested: PanelKind) -> Surface {
        match self {
            Self::Unknown => Surface::Loading,
            Self::Anonymous => Surface::Landing,
            Self::Authenticated(_) => Surface::Panel(requested),
        }
    }

    pub fn can_reach(&self, panel: PanelKind) -> bool {
        self.surface(panel) == Surface::Panel(panel)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(s) => Some(s),
            _ => None,
        }
    }
}

/// Wraps the panels. Holds at most one auth-change subscription, released when
/// the gate is unmounted or dropped.
pub struct AuthGate {
    provider: Arc<dyn AuthProvider>,
    state: Arc<watch::Sender<GateState>>,
    subscription: Option<Subscription>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (tx, _rx) = watch::channel(GateState::Unknown);
        Self {
            provider,
            state: Arc::new(tx),
            subscription: None,
        }
    }

    /// Creates the gate and runs the initial resolution.
    pub async fn mount(provider: Arc<dyn AuthProvider>) -> Self {
        let mut gate = Self::new(provider);
        gate.resolve().await;
        gate
    }

    /// Subscribes to changes, then checks for an existing session. Runs once;
    /// later calls do nothing.
    ///
    /// An event delivered while the lookup is in flight is newer than the
    /// lookup's answer, so the answer only applies while the state is still
    /// `Unknown`.
    pub async fn resolve(&mut self) {
        if self.subscription.is_some() {
            return;
        }

        let tx = Arc::clone(&self.state);
        self.subscription = Some(self.provider.subscribe(Box::new(move |event| {
            tx.send_modify(|state| *state = state.after(&event));
        })));

        let session = match self.provider.current_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session lookup failed, treating as signed out: {}", e);
                None
            }
        };
        let resolved = GateState::from_session(session);
        let applied = self.state.send_if_modified(|state| {
            if *state == GateState::Unknown {
                *state = resolved;
                true
            } else {
                false
            }
        });
        info!(
            authenticated = self.state.borrow().session().is_some(),
            superseded = !applied,
            "Auth gate resolved"
        );
    }

    pub fn state(&self) -> GateState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    pub fn surface(&self, requested: PanelKind) -> Surface {
        self.state.borrow().surface(requested)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields("email and password are required"));
        }
        self.provider.sign_in_with_password(email.trim(), password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUpOutcome, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields("email and password are required"));
        }
        if full_name.trim().is_empty() {
            return Err(AuthError::MissingFields("name is required"));
        }
        self.provider.sign_up(email.trim(), password, full_name.trim()).await
    }

    pub async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<String, AuthError> {
        self.provider.sign_in_with_oauth(provider).await
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await
    }

    /// Tears the gate down, releasing its subscription.
    pub fn unmount(mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_never_lead_back_to_unknown() {
        let s = Session::new("a@b.c");
        for start in [GateState::Unknown, GateState::Anonymous, GateState::Authenticated(s.clone())] {
            assert_ne!(start.after(&AuthEvent::SignedOut), GateState::Unknown);
            assert_ne!(start.after(&AuthEvent::SignedIn(s.clone())), GateState::Unknown);
        }
    }

    #[test]
    fn surfaces_per_state() {
        assert_eq!(GateState::Unknown.surface(PanelKind::Chat), Surface::Loading);
        assert_eq!(GateState::Anonymous.surface(PanelKind::Image), Surface::Landing);
        let auth = GateState::Authenticated(Session::new("a@b.c"));
        for panel in PanelKind::ALL {
            assert!(auth.can_reach(panel));
            assert!(!GateState::Anonymous.can_reach(panel));
            assert!(!GateState::Unknown.can_reach(panel));
        }
    }
}
