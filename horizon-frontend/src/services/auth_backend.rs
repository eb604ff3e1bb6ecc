use crate::forms::{Credentials, RegistrationProfile};
use crate::models::{SessionGrant, SessionUser};
use crate::session::SessionRecord;
use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Failures reported by the auth and linking collaborators.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    AccountExists,
    #[error("Rejected by auth service: {0}")]
    Rejected(String),
    #[error("Session expired")]
    SessionExpired,
    #[error("Auth service unavailable: {0}")]
    Unavailable(String),
    #[error("Unexpected auth service response: {0}")]
    Protocol(String),
}

impl AuthError {
    /// Message suitable for showing next to the form.
    pub fn user_message(&self) -> &str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::AccountExists => "An account with this email already exists",
            AuthError::Rejected(message) => message,
            AuthError::SessionExpired => "Your session has expired. Please sign in again.",
            AuthError::Unavailable(_) | AuthError::Protocol(_) => {
                "We couldn't reach Horizon right now. Please try again."
            }
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountExists => "account_exists",
            AuthError::Rejected(_) => "rejected",
            AuthError::SessionExpired => "session_expired",
            AuthError::Unavailable(_) => "unavailable",
            AuthError::Protocol(_) => "protocol",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            AuthError::AccountExists => StatusCode::CONFLICT,
            AuthError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Protocol(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Authentication collaborator. Every path answers with a `Result`.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_up(&self, profile: &RegistrationProfile) -> Result<SessionGrant, AuthError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<SessionGrant, AuthError>;

    /// `Ok(None)` when the token no longer identifies a user.
    async fn get_logged_in_user(&self, token: &str) -> Result<Option<SessionUser>, AuthError>;

    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;
}

/// Short-lived token that opens the provider's link widget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkToken {
    pub link_token: String,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

/// Bank-linking collaborator.
#[async_trait]
pub trait LinkProvider: Send + Sync {
    async fn create_link_token(&self, session: &SessionRecord) -> Result<LinkToken, AuthError>;

    async fn exchange_public_token(
        &self,
        session: &SessionRecord,
        public_token: &str,
    ) -> Result<(), AuthError>;
}
