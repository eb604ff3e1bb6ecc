use crate::error::AppError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return a handle for rendering
/// the scrape body.
///
/// Only one recorder can exist per process; a second call fails.
pub fn init_metrics() -> Result<PrometheusHandle, AppError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to install metrics recorder: {}", e))
        })
}
