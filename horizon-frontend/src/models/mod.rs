pub mod account;
pub mod user;

pub use account::{AccountSummary, BalanceOverview, format_amount};
pub use user::{SessionGrant, SessionUser};
