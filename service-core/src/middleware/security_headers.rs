use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

/// Response hardening for server-rendered pages.
#[derive(Clone)]
pub struct SecurityHeaders {
    content_security_policy: HeaderValue,
}

impl SecurityHeaders {
    /// Build a page policy that also admits the given third-party script
    /// origins (for example a bank-linking widget host).
    pub fn for_pages(script_origins: &[String]) -> Arc<Self> {
        let sources = |base: &str| {
            if script_origins.is_empty() {
                base.to_string()
            } else {
                format!("{} {}", base, script_origins.join(" "))
            }
        };
        let frames = if script_origins.is_empty() {
            "'none'".to_string()
        } else {
            script_origins.join(" ")
        };
        let policy = format!(
            "default-src 'self'; \
             script-src {}; \
             style-src 'self'; \
             img-src 'self' data:; \
             frame-src {}; \
             connect-src {}; \
             frame-ancestors 'none'; \
             form-action 'self'",
            sources("'self'"),
            frames,
            sources("'self'")
        );
        let content_security_policy = HeaderValue::from_str(&policy).unwrap_or_else(|_| {
            HeaderValue::from_static("default-src 'self'; frame-ancestors 'none'")
        });
        Arc::new(Self {
            content_security_policy,
        })
    }
}

pub async fn security_headers_middleware(
    State(policy): State<Arc<SecurityHeaders>>,
    req: Request,
    next: Next,
) -> impl IntoResponse {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        policy.content_security_policy.clone(),
    );

    response
}
