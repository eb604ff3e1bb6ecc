use crate::models::AccountSummary;
use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{configuration_directory, load_settings};
use service_core::error::AppError;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth_service: AuthServiceSettings,
    pub session: SessionSettings,
    pub linking: LinkingSettings,
    pub rate_limit: RateLimitSettings,
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_static_dir() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string()
}

#[derive(Deserialize, Clone)]
pub struct AuthServiceSettings {
    /// Base URL of the auth backend, e.g. http://auth-service:8080.
    pub url: String,
    /// Shared HMAC secret for request signing.
    pub signing_secret: Secret<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Clone)]
pub struct SessionSettings {
    pub ttl_minutes: i64,
    pub refresh_after_minutes: i64,
    /// Cookie lifetime without activity.
    pub inactivity_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Deserialize, Clone)]
pub struct LinkingSettings {
    /// Provider's client launcher script.
    pub script_url: String,
    /// Name shown inside the provider's widget.
    pub client_name: String,
}

impl LinkingSettings {
    /// Origin of the launcher script, for the content security policy.
    pub fn script_origin(&self) -> Option<String> {
        reqwest::Url::parse(&self.script_url)
            .ok()
            .map(|url| url.origin().ascii_serialization())
            .filter(|origin| origin != "null")
    }
}

#[derive(Deserialize, Clone)]
pub struct RateLimitSettings {
    pub attempts: u32,
    pub window_seconds: u64,
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Deserialize, Clone, Default)]
pub struct DashboardSettings {
    #[serde(default)]
    pub accounts: Vec<AccountSummary>,
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;
    let directory = configuration_directory(&base_path, "horizon-frontend");
    load_settings(&directory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_origin() {
        let linking = LinkingSettings {
            script_url: "https://cdn.plaid.com/link/v2/stable/link-initialize.js".to_string(),
            client_name: "Horizon".to_string(),
        };
        assert_eq!(linking.script_origin().as_deref(), Some("https://cdn.plaid.com"));
    }

    #[test]
    fn test_base_configuration_loads() {
        let settings = get_configuration().unwrap();
        assert_eq!(settings.server.port, 8000);
        assert!(!settings.dashboard.accounts.is_empty());
    }
}
