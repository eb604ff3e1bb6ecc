//! Server-side session lifecycle for the signed-in customer.

mod context;
mod record;

pub use context::{AuthContext, SessionState};
pub use record::{SessionPolicy, SessionRecord};
