//! Hand-off into the third-party bank-linking widget.
//!
//! The flow only ever moves `NotStarted -> Started`; a completed link returns
//! the customer to the dashboard and the flow resets.

use crate::forms::Route;
use crate::services::{AuthError, LinkProvider};
use crate::session::SessionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LinkFlow {
    #[default]
    NotStarted,
    Started {
        link_token: String,
        #[serde(default)]
        expires_at: Option<DateTime<Utc>>,
    },
}

impl LinkFlow {
    pub fn link_token(&self) -> Option<&str> {
        match self {
            LinkFlow::NotStarted => None,
            LinkFlow::Started { link_token, .. } => Some(link_token),
        }
    }

    /// A started flow whose token the provider no longer accepts.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            LinkFlow::Started {
                expires_at: Some(expires_at),
                ..
            } => *expires_at <= now,
            _ => false,
        }
    }
}

/// Display style of the link action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkVariant {
    /// Full-width button on the auth page.
    #[default]
    Primary,
    /// Low-emphasis link in the dashboard sidebar.
    Ghost,
}

impl LinkVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkVariant::Primary => "primary",
            LinkVariant::Ghost => "ghost",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkVariant::Primary => "Connect bank",
            LinkVariant::Ghost => "Add bank",
        }
    }
}

/// Ask the provider for a link token. A started flow is reused until its
/// token expires.
pub async fn start(
    provider: &dyn LinkProvider,
    session: &SessionRecord,
    current: LinkFlow,
    now: DateTime<Utc>,
) -> Result<LinkFlow, AuthError> {
    if let LinkFlow::Started { .. } = current {
        if !current.is_expired(now) {
            return Ok(current);
        }
        tracing::debug!(user_id = %session.user.id, "Link token expired, requesting a new one");
    }

    let token = provider.create_link_token(session).await?;
    tracing::info!(user_id = %session.user.id, "Link session started");
    Ok(LinkFlow::Started {
        link_token: token.link_token,
        expires_at: token.expiration,
    })
}

/// Exchange the widget's public token, then send the customer home.
pub async fn complete(
    provider: &dyn LinkProvider,
    session: &SessionRecord,
    public_token: &str,
) -> Result<Route, AuthError> {
    let public_token = public_token.trim();
    if public_token.is_empty() {
        return Err(AuthError::Rejected(
            "The bank link did not complete. Please try again.".to_string(),
        ));
    }

    provider.exchange_public_token(session, public_token).await?;
    tracing::info!(user_id = %session.user.id, "Bank account linked");
    Ok(Route::Home)
}
