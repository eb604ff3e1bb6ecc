#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use horizon_frontend::AppState;
use horizon_frontend::config::{Settings, get_configuration};
use horizon_frontend::forms::{Credentials, RegistrationProfile};
use horizon_frontend::models::{SessionGrant, SessionUser};
use horizon_frontend::services::{AuthBackend, AuthError, LinkProvider, LinkToken};
use horizon_frontend::session::SessionRecord;
use horizon_frontend::startup::build_router;
use secrecy::Secret;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

pub const LINK_TOKEN: &str = "link-sandbox-7f3a";

/// Holds a backend call open until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory auth and linking collaborator that counts calls.
#[derive(Default)]
pub struct MockBackend {
    pub sign_in_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub link_token_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    failure: Option<fn() -> AuthError>,
    gate: Option<Arc<Gate>>,
}

impl MockBackend {
    pub fn failing(failure: fn() -> AuthError) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }

    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn answer(&self, user: SessionUser) -> Result<SessionGrant, AuthError> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        match self.failure {
            Some(make) => Err(make()),
            None => Ok(SessionGrant {
                user,
                token: Secret::new("backend-session-token".to_string()),
                expires_at: None,
            }),
        }
    }
}

pub fn ada() -> SessionUser {
    SessionUser {
        id: "u_ada".to_string(),
        email: "a@b.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn sign_up(&self, profile: &RegistrationProfile) -> Result<SessionGrant, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(SessionUser {
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            ..ada()
        })
        .await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SessionGrant, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(SessionUser {
            email: credentials.email.clone(),
            ..ada()
        })
        .await
    }

    async fn get_logged_in_user(&self, _token: &str) -> Result<Option<SessionUser>, AuthError> {
        Ok(Some(ada()))
    }

    async fn sign_out(&self, _token: &str) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl LinkProvider for MockBackend {
    async fn create_link_token(&self, _session: &SessionRecord) -> Result<LinkToken, AuthError> {
        self.link_token_calls.fetch_add(1, Ordering::SeqCst);
        Ok(LinkToken {
            link_token: LINK_TOKEN.to_string(),
            expiration: None,
        })
    }

    async fn exchange_public_token(
        &self,
        _session: &SessionRecord,
        _public_token: &str,
    ) -> Result<(), AuthError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn settings() -> Settings {
    get_configuration().expect("Failed to load base configuration")
}

pub fn spawn_app(backend: Arc<MockBackend>) -> Router {
    let settings = settings();
    let state = AppState::new(backend.clone(), backend, &settings);
    build_router(state, &settings)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, cookie: Option<&str>, pairs: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_urlencoded::to_string(pairs).unwrap()))
        .unwrap()
}

/// `name=value` of the session cookie set by a response, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .next()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub const SIGN_UP_WITHOUT_SSN: &[(&str, &str)] = &[
    ("firstName", "Ada"),
    ("lastName", "Lovelace"),
    ("address1", "1 Main St"),
    ("city", "Queens"),
    ("state", "NY"),
    ("postalCode", "11101"),
    ("dateOfBirth", "1990-12-10"),
    ("email", "ada@example.com"),
    ("password", "analytical-engine"),
];

pub fn full_sign_up() -> Vec<(&'static str, &'static str)> {
    let mut pairs = SIGN_UP_WITHOUT_SSN.to_vec();
    pairs.push(("ssn", "1234"));
    pairs
}
