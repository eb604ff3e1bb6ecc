use crate::models::{SessionGrant, SessionUser};
use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime rules for stored sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub ttl: Duration,
    pub refresh_after: Duration,
}

impl SessionPolicy {
    pub fn new(ttl_minutes: i64, refresh_after_minutes: i64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes.max(1)),
            refresh_after: Duration::minutes(refresh_after_minutes.max(0)),
        }
    }

    /// Expiry for a session touched at `now`, capped by the backend's own expiry.
    fn expiry(&self, now: DateTime<Utc>, backend_expiry: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let local = now + self.ttl;
        match backend_expiry {
            Some(backend) if backend < local => backend,
            _ => local,
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::new(60, 5)
    }
}

/// A grant as held in the browser session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user: SessionUser,
    token: String,
    backend_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub refreshed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn from_grant(grant: SessionGrant, now: DateTime<Utc>, policy: &SessionPolicy) -> Self {
        Self {
            user: grant.user,
            token: grant.token.expose_secret().clone(),
            backend_expires_at: grant.expires_at,
            created_at: now,
            refreshed_at: now,
            expires_at: policy.expiry(now, grant.expires_at),
        }
    }

    /// Backend session token. Never rendered.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>, policy: &SessionPolicy) -> bool {
        now - self.refreshed_at >= policy.refresh_after
    }

    /// Record a successful check against the backend.
    pub fn refreshed(self, user: SessionUser, now: DateTime<Utc>, policy: &SessionPolicy) -> Self {
        Self {
            user,
            refreshed_at: now,
            expires_at: policy.expiry(now, self.backend_expires_at),
            ..self
        }
    }
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("refreshed_at", &self.refreshed_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
