use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Mutex;
use tracing::{error, info};
use url::Url;

use crate::auth::{
    AuthCallback, AuthError, AuthEvent, AuthProvider, ListenerSet, OAuthProvider, Session,
    SignUpOutcome, Subscription,
};

/// Client for a hosted GoTrue-style auth REST API. The session lives in memory
/// for the lifetime of the process.
pub struct HostedAuth {
    client: Client,
    base_url: String,
    anon_key: String,
    session: Mutex<Option<Session>>,
    listeners: ListenerSet,
}

impl HostedAuth {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            session: Mutex::new(None),
            listeners: ListenerSet::default(),
        }
    }

    fn ensure_configured(&self) -> Result<(), AuthError> {
        if self.base_url.is_empty() || self.anon_key.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        Ok(())
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap_or_else(|p| p.into_inner()) = session.clone();
        self.listeners.emit(match session {
            Some(s) => AuthEvent::SignedIn(s),
            None => AuthEvent::SignedOut,
        });
    }

    async fn post(&self, path: &str, body: Value, bearer: Option<&str>) -> Result<Value, AuthError> {
        let mut request = self
            .client
            .post(format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .json(&body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            error!("Auth service error {}: {}", status, text);
            return Err(AuthError::Rejected(rejection_message(&text, status.as_u16())));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for HostedAuth {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.session.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn subscribe(&self, callback: AuthCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.ensure_configured()?;
        let body = self
            .post(
                "token?grant_type=password",
                json!({ "email": email, "password": password }),
                None,
            )
            .await?;
        let session = parse_session(&body, email)
            .ok_or_else(|| AuthError::Malformed("token response has no access_token".to_string()))?;

        info!("Signed in as {}", session.email);
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUpOutcome, AuthError> {
        self.ensure_configured()?;
        let body = self
            .post(
                "signup",
                json!({ "email": email, "password": password, "data": { "full_name": full_name } }),
                None,
            )
            .await?;

        match parse_session(&body, email) {
            Some(session) => {
                self.set_session(Some(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<String, AuthError> {
        self.ensure_configured()?;
        authorize_url(&self.base_url, provider)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self
            .session
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .and_then(|s| s.access_token.clone());

        if let Some(token) = token {
            self.ensure_configured()?;
            self.post("logout", json!({}), Some(&token)).await?;
        }
        self.set_session(None);
        Ok(())
    }
}

/// A session from a token/signup response, or `None` when the response carries
/// no access token (e.g. email confirmation pending).
pub fn parse_session(body: &Value, fallback_email: &str) -> Option<Session> {
    let token = body["access_token"].as_str()?;
    let email = body["user"]["email"].as_str().unwrap_or(fallback_email);
    Some(Session {
        email: email.to_string(),
        access_token: Some(token.to_string()),
    })
}

pub fn authorize_url(base_url: &str, provider: OAuthProvider) -> Result<String, AuthError> {
    let mut url = Url::parse(&format!("{}/auth/v1/authorize", base_url))
        .map_err(|_| AuthError::NotConfigured)?;
    url.query_pairs_mut().append_pair("provider", provider.as_str());
    Ok(url.into())
}

fn rejection_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v[*k].as_str().map(str::to_string))
        })
        .unwrap_or_else(|| format!("Auth service error: {}", status))
}
