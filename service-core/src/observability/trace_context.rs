//! W3C Trace Context propagation for calls to downstream services.
//!
//! Outgoing requests carry `traceparent` (and `tracestate` when present) taken
//! from the current span, plus the request correlation id when one is known.
//!
//! See: https://www.w3.org/TR/trace-context/

use opentelemetry::trace::TraceContextExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::middleware::tracing::current_request_id;

/// Header name for W3C traceparent
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header name for W3C tracestate
pub const TRACESTATE_HEADER: &str = "tracestate";

pub use crate::middleware::tracing::REQUEST_ID_HEADER;

/// Inject the current span's trace context into outgoing headers.
///
/// Nothing is written when the span has no valid OpenTelemetry context (for
/// example when no OTLP exporter is installed).
pub fn inject_trace_context(headers: &mut HeaderMap) {
    let context = Span::current().context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if !span_context.is_valid() {
        return;
    }

    // version-trace_id-span_id-trace_flags, version is always "00"
    let traceparent = format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    );
    if let Ok(value) = HeaderValue::from_str(&traceparent) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let tracestate = span_context.trace_state().header();
    if !tracestate.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&tracestate) {
            headers.insert(TRACESTATE_HEADER, value);
        }
    }
}

/// Inject trace context and, when given, the request correlation id.
pub fn inject_trace_headers(headers: &mut HeaderMap, request_id: Option<&str>) {
    inject_trace_context(headers);
    if let Some(id) = request_id {
        if let Ok(value) = HeaderValue::from_str(id) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
    }
}

/// A request builder that injects trace headers when sent.
///
/// The correlation id is taken from the inbound request handled on the
/// current task.
pub struct TracedRequest {
    request: reqwest::RequestBuilder,
}

impl TracedRequest {
    pub fn new(request: reqwest::RequestBuilder) -> Self {
        Self { request }
    }

    /// Add a header to the request. Invalid names or values are skipped.
    pub fn header(self, key: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => Self {
                request: self.request.header(name, value),
            },
            _ => {
                tracing::warn!(header = key, "Skipping invalid outgoing header");
                self
            }
        }
    }

    /// Attach a pre-serialized JSON body.
    ///
    /// Taking the body as a string lets callers sign exactly the bytes sent.
    pub fn json_body(self, body: String) -> Self {
        Self {
            request: self
                .request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body),
        }
    }

    pub fn bearer_auth<T: std::fmt::Display>(self, token: T) -> Self {
        Self {
            request: self.request.bearer_auth(token),
        }
    }

    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let request_id = current_request_id();
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, request_id.as_deref());
        self.request.headers(headers).send().await
    }
}

/// Extension trait for reqwest::Client to create traced requests.
pub trait TracedClientExt {
    fn traced_get(&self, url: &str) -> TracedRequest;
    fn traced_post(&self, url: &str) -> TracedRequest;
}

impl TracedClientExt for reqwest::Client {
    fn traced_get(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.get(url))
    }

    fn traced_post(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.post(url))
    }
}
