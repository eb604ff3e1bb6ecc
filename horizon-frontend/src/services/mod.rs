pub mod auth_backend;
pub mod auth_client;

pub use auth_backend::{AuthBackend, AuthError, LinkProvider, LinkToken};
pub use auth_client::HttpAuthBackend;
