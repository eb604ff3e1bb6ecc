pub mod metrics;
pub mod rate_limit;
pub mod security_headers;
pub mod tracing;

pub use metrics::metrics_middleware;
pub use rate_limit::{IpRateLimiter, create_ip_rate_limiter, ip_rate_limit_middleware};
pub use security_headers::{SecurityHeaders, security_headers_middleware};
pub use tracing::{
    REQUEST_ID_HEADER, current_request_id, make_request_span, request_id_middleware,
};
