pub mod config;
pub mod forms;
pub mod handlers;
pub mod linking;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod startup;
pub mod views;

use axum::extract::FromRef;
use config::{LinkingSettings, Settings};
use forms::SubmissionGuard;
use metrics_exporter_prometheus::PrometheusHandle;
use models::AccountSummary;
use services::{AuthBackend, LinkProvider};
use session::SessionPolicy;
use std::sync::Arc;

/// Shared application state: collaborators, admission control and page data.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthBackend>,
    pub linker: Arc<dyn LinkProvider>,
    pub submissions: SubmissionGuard,
    pub session_policy: SessionPolicy,
    pub linking: Arc<LinkingSettings>,
    pub accounts: Arc<Vec<AccountSummary>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        linker: Arc<dyn LinkProvider>,
        settings: &Settings,
    ) -> Self {
        Self {
            auth,
            linker,
            submissions: SubmissionGuard::new(),
            session_policy: SessionPolicy::new(
                settings.session.ttl_minutes,
                settings.session.refresh_after_minutes,
            ),
            linking: Arc::new(settings.linking.clone()),
            accounts: Arc::new(settings.dashboard.accounts.clone()),
            metrics: None,
        }
    }

    pub fn with_metrics(self, handle: PrometheusHandle) -> Self {
        Self {
            metrics: Some(handle),
            ..self
        }
    }
}

impl FromRef<AppState> for SessionPolicy {
    fn from_ref(state: &AppState) -> Self {
        state.session_policy
    }
}
