use axum::{
    Router,
    handler::Handler,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use service_core::middleware::{
    SecurityHeaders, create_ip_rate_limiter, ip_rate_limit_middleware, make_request_span,
    metrics_middleware, request_id_middleware, security_headers_middleware,
};
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::AppState;
use crate::config::Settings;
use crate::handlers::{
    app::{health_check, index},
    auth::{sign_in_handler, sign_in_page, sign_out_handler, sign_up_handler, sign_up_page},
    link::{exchange_handler, link_account_page, start_link_handler},
    metrics::metrics,
};
use crate::middleware::auth::require_session;

pub fn build_router(state: AppState, settings: &Settings) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(settings.session.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            settings.session.inactivity_minutes,
        )));

    let limiter = create_ip_rate_limiter(
        settings.rate_limit.attempts,
        settings.rate_limit.window_seconds,
    );
    let rate_limited = from_fn_with_state(limiter, ip_rate_limit_middleware);

    let script_origins: Vec<String> = settings.linking.script_origin().into_iter().collect();
    let security = SecurityHeaders::for_pages(&script_origins);

    let link_routes = Router::new()
        .route("/link-account", get(link_account_page))
        .route("/link-account/start", post(start_link_handler))
        .route("/link-account/exchange", post(exchange_handler))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route(
            "/sign-in",
            get(sign_in_page).post(sign_in_handler.layer(rate_limited.clone())),
        )
        .route(
            "/sign-up",
            get(sign_up_page).post(sign_up_handler.layer(rate_limited)),
        )
        .route("/sign-out", post(sign_out_handler))
        .merge(link_routes)
        .nest_service("/static", ServeDir::new(&settings.server.static_dir))
        .layer(session_layer)
        .layer(from_fn_with_state(security, security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
