use super::record::{SessionPolicy, SessionRecord};
use crate::linking::LinkFlow;
use crate::models::SessionGrant;
use crate::services::{AuthBackend, AuthError};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use tower_sessions::Session;
use uuid::Uuid;

const RECORD_KEY: &str = "horizon.session";
const LINK_FLOW_KEY: &str = "horizon.link_flow";
const FORM_KEY: &str = "horizon.form_key";

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::SessionError(err.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Active(SessionRecord),
    Expired,
}

impl SessionState {
    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            SessionState::Active(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<SessionRecord> {
        match self {
            SessionState::Active(record) => Some(record),
            _ => None,
        }
    }
}

/// Owns the signed-in session stored behind the browser's session cookie.
#[derive(Clone)]
pub struct AuthContext {
    session: Session,
    policy: SessionPolicy,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
    SessionPolicy: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        Ok(Self::new(session, SessionPolicy::from_ref(state)))
    }
}

impl AuthContext {
    pub fn new(session: Session, policy: SessionPolicy) -> Self {
        Self { session, policy }
    }

    /// Store a fresh grant under a new session id.
    pub async fn establish(
        &self,
        grant: SessionGrant,
        now: DateTime<Utc>,
    ) -> Result<SessionRecord, AppError> {
        self.session.cycle_id().await.map_err(session_error)?;

        let record = SessionRecord::from_grant(grant, now, &self.policy);
        self.session
            .insert(RECORD_KEY, &record)
            .await
            .map_err(session_error)?;
        self.session
            .remove_value(LINK_FLOW_KEY)
            .await
            .map_err(session_error)?;

        tracing::info!(
            user_id = %record.user.id,
            expires_at = %record.expires_at,
            "Session established"
        );
        Ok(record)
    }

    /// Current state; an expired record is dropped on read.
    pub async fn state(&self, now: DateTime<Utc>) -> Result<SessionState, AppError> {
        let record: Option<SessionRecord> =
            self.session.get(RECORD_KEY).await.map_err(session_error)?;

        match record {
            None => Ok(SessionState::Anonymous),
            Some(record) if record.is_expired(now) => {
                tracing::info!(user_id = %record.user.id, "Session expired");
                self.discard().await?;
                Ok(SessionState::Expired)
            }
            Some(record) => Ok(SessionState::Active(record)),
        }
    }

    /// Re-check a stale session with the backend.
    ///
    /// An unreachable backend keeps the current record.
    pub async fn refresh(
        &self,
        backend: &dyn AuthBackend,
        now: DateTime<Utc>,
    ) -> Result<SessionState, AppError> {
        let record = match self.state(now).await? {
            SessionState::Active(record) => record,
            other => return Ok(other),
        };

        if !record.needs_refresh(now, &self.policy) {
            return Ok(SessionState::Active(record));
        }

        match backend.get_logged_in_user(record.token()).await {
            Ok(Some(user)) => {
                let record = record.refreshed(user, now, &self.policy);
                self.session
                    .insert(RECORD_KEY, &record)
                    .await
                    .map_err(session_error)?;
                Ok(SessionState::Active(record))
            }
            Ok(None) | Err(AuthError::SessionExpired) => {
                tracing::info!(user_id = %record.user.id, "Backend no longer recognises session");
                self.discard().await?;
                Ok(SessionState::Expired)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed; keeping current session");
                Ok(SessionState::Active(record))
            }
        }
    }

    /// Best-effort backend sign-out, then drop everything in the session.
    pub async fn sign_out(&self, backend: &dyn AuthBackend) -> Result<(), AppError> {
        let record: Option<SessionRecord> =
            self.session.get(RECORD_KEY).await.map_err(session_error)?;

        if let Some(record) = record {
            match backend.sign_out(record.token()).await {
                Ok(()) => tracing::info!(user_id = %record.user.id, "Signed out"),
                Err(e) => tracing::warn!(error = %e, "Backend sign-out failed"),
            }
        }

        self.session.flush().await.map_err(session_error)
    }

    /// Drop everything in the session without contacting the backend.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.session.flush().await.map_err(session_error)
    }

    /// Stable per-browser key for submission admission control.
    pub async fn form_key(&self) -> Result<String, AppError> {
        if let Some(key) = self
            .session
            .get::<String>(FORM_KEY)
            .await
            .map_err(session_error)?
        {
            return Ok(key);
        }

        let key = Uuid::new_v4().to_string();
        self.session
            .insert(FORM_KEY, &key)
            .await
            .map_err(session_error)?;
        Ok(key)
    }

    /// The stored link flow. A flow whose token expired is removed.
    pub async fn link_flow(&self, now: DateTime<Utc>) -> Result<LinkFlow, AppError> {
        let flow: Option<LinkFlow> = self
            .session
            .get(LINK_FLOW_KEY)
            .await
            .map_err(session_error)?;

        match flow {
            Some(flow) if flow.is_expired(now) => {
                self.session
                    .remove_value(LINK_FLOW_KEY)
                    .await
                    .map_err(session_error)?;
                Ok(LinkFlow::NotStarted)
            }
            flow => Ok(flow.unwrap_or_default()),
        }
    }

    pub async fn set_link_flow(&self, flow: &LinkFlow) -> Result<(), AppError> {
        self.session
            .insert(LINK_FLOW_KEY, flow)
            .await
            .map_err(session_error)
    }

    async fn discard(&self) -> Result<(), AppError> {
        self.session
            .remove_value(RECORD_KEY)
            .await
            .map_err(session_error)?;
        self.session
            .remove_value(LINK_FLOW_KEY)
            .await
            .map_err(session_error)?;
        Ok(())
    }
}
