use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

/// Identity of the signed-in customer as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl SessionUser {
    /// Display name, falling back to the local part of the email address.
    pub fn name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.split('@').next().unwrap_or("User").to_string()
        } else {
            full.to_string()
        }
    }

    pub fn initials(&self) -> String {
        let from_names: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.trim().chars().next())
            .flat_map(char::to_uppercase)
            .collect();

        if !from_names.is_empty() {
            return from_names;
        }

        self.email
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }
}

/// Result of a successful sign-in or sign-up.
///
/// The token is the backend session token. It stays on the server.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub user: SessionUser,
    pub token: Secret<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}
