//! service-core: shared web infrastructure for the Horizon front-end.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod utils;

pub use axum;
pub use serde;
pub use tokio;
pub use tracing;
