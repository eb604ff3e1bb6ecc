//! Drives `HttpAuthBackend` against a fake auth service on a local port.

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use horizon_frontend::config::AuthServiceSettings;
use chrono::{TimeZone, Utc};
use horizon_frontend::forms::{Credentials, RegistrationProfile};
use horizon_frontend::models::SessionGrant;
use horizon_frontend::services::{AuthBackend, AuthError, HttpAuthBackend, LinkProvider};
use horizon_frontend::session::{SessionPolicy, SessionRecord};
use secrecy::{ExposeSecret, Secret};
use serde_json::json;
use service_core::utils::{is_fresh, verify_signature};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SECRET: &str = "shared-test-secret";

fn signature_is_valid(headers: &HeaderMap, method: &str, path: &str, body: &str) -> bool {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let Ok(timestamp) = header("x-timestamp").parse::<i64>() else {
        return false;
    };
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    is_fresh(timestamp, now, 300)
        && verify_signature(
            SECRET,
            method,
            path,
            timestamp,
            &header("x-nonce"),
            body,
            &header("x-signature"),
        )
        .unwrap_or(false)
}

fn grant_body() -> serde_json::Value {
    json!({
        "user": {"id": "u_1", "email": "a@b.com", "firstName": "Ada", "lastName": "Lovelace"},
        "token": "backend-token",
        "expiresAt": "2099-01-01T00:00:00Z"
    })
}

async fn sign_in(headers: HeaderMap, body: String) -> Response {
    if !signature_is_valid(&headers, "POST", "/auth/sign-in", &body) {
        return (StatusCode::FORBIDDEN, "bad signature").into_response();
    }
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    if payload["password"] == "x" {
        Json(grant_body()).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid credentials"}))).into_response()
    }
}

async fn sign_up(headers: HeaderMap, body: String) -> Response {
    if !signature_is_valid(&headers, "POST", "/auth/sign-up", &body) {
        return (StatusCode::FORBIDDEN, "bad signature").into_response();
    }
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    match payload["email"].as_str() {
        Some("taken@example.com") => StatusCode::CONFLICT.into_response(),
        Some("blocked@example.com") => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Email domain not allowed"})),
        )
            .into_response(),
        _ if payload["postalCode"] == "11101" => {
            (StatusCode::CREATED, Json(grant_body())).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "missing fields").into_response(),
    }
}

fn bearer_is_valid(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer backend-token")
}

async fn me(headers: HeaderMap) -> Response {
    if !signature_is_valid(&headers, "GET", "/auth/me", "") {
        return (StatusCode::FORBIDDEN, "bad signature").into_response();
    }
    if bearer_is_valid(&headers) {
        Json(grant_body()["user"].clone()).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn sign_out() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(3)).await;
    StatusCode::NO_CONTENT
}

async fn link_token(headers: HeaderMap, body: String) -> Response {
    if !signature_is_valid(&headers, "POST", "/link/token", &body) {
        return (StatusCode::FORBIDDEN, "bad signature").into_response();
    }
    if !bearer_is_valid(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    Json(json!({
        "linkToken": format!("link-sandbox-{}", payload["userId"].as_str().unwrap_or("none")),
        "expiration": "2099-01-01T04:00:00Z"
    }))
    .into_response()
}

async fn link_exchange(headers: HeaderMap, body: String) -> Response {
    if !signature_is_valid(&headers, "POST", "/link/exchange", &body) {
        return (StatusCode::FORBIDDEN, "bad signature").into_response();
    }
    if !bearer_is_valid(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    if payload["publicToken"] == "public-sandbox-1" {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Unknown public token"})),
        )
            .into_response()
    }
}

async fn spawn_fake_backend() -> String {
    let app = Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/me", get(me))
        .route("/auth/sign-out", post(sign_out))
        .route("/link/token", post(link_token))
        .route("/link/exchange", post(link_exchange));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", address)
}

async fn client() -> HttpAuthBackend {
    HttpAuthBackend::new(AuthServiceSettings {
        url: spawn_fake_backend().await,
        signing_secret: Secret::new(SECRET.to_string()),
        timeout_secs: 1,
    })
    .unwrap()
}

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "a@b.com".to_string(),
        password: password.to_string(),
    }
}

fn session(token: &str) -> SessionRecord {
    let grant: SessionGrant = serde_json::from_value(json!({
        "user": grant_body()["user"].clone(),
        "token": token,
    }))
    .unwrap();
    SessionRecord::from_grant(grant, Utc::now(), &SessionPolicy::default())
}

fn profile(email: &str) -> RegistrationProfile {
    RegistrationProfile {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        address1: "1 Main St".to_string(),
        city: "Queens".to_string(),
        state: "NY".to_string(),
        postal_code: "11101".to_string(),
        date_of_birth: "1990-12-10".to_string(),
        ssn: "1234".to_string(),
        email: email.to_string(),
        password: "analytical-engine".to_string(),
    }
}

#[tokio::test]
async fn signed_sign_in_returns_grant() {
    let backend = client().await;

    let grant = backend.sign_in(&credentials("x")).await.unwrap();

    assert_eq!(grant.user.name(), "Ada Lovelace");
    assert_eq!(grant.token.expose_secret(), "backend-token");
    assert!(grant.expires_at.is_some());
}

#[tokio::test]
async fn wrong_password_maps_to_invalid_credentials() {
    let backend = client().await;

    let err = backend.sign_in(&credentials("nope")).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn sign_up_status_mapping() {
    let backend = client().await;

    assert!(backend.sign_up(&profile("ada@example.com")).await.is_ok());
    assert!(matches!(
        backend.sign_up(&profile("taken@example.com")).await.unwrap_err(),
        AuthError::AccountExists
    ));
    match backend.sign_up(&profile("blocked@example.com")).await.unwrap_err() {
        AuthError::Rejected(message) => assert_eq!(message, "Email domain not allowed"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn logged_in_user_lookup() {
    let backend = client().await;

    let user = backend.get_logged_in_user("backend-token").await.unwrap();
    assert_eq!(user.unwrap().first_name, "Ada");

    let unknown = backend.get_logged_in_user("stale-token").await.unwrap();
    assert!(unknown.is_none());
}

#[tokio::test]
async fn slow_backend_times_out_as_unavailable() {
    let backend = client().await;

    let err = backend.sign_out("backend-token").await.unwrap_err();

    assert!(matches!(err, AuthError::Unavailable(_)));
}

#[tokio::test]
async fn unreachable_backend_is_unavailable() {
    let backend = HttpAuthBackend::new(AuthServiceSettings {
        url: "http://127.0.0.1:1".to_string(),
        signing_secret: Secret::new(SECRET.to_string()),
        timeout_secs: 1,
    })
    .unwrap();

    let err = backend.sign_in(&credentials("x")).await.unwrap_err();

    assert!(matches!(err, AuthError::Unavailable(_)));
}

#[tokio::test]
async fn link_token_is_requested_with_bearer_and_signature() {
    let backend = client().await;

    let token = backend
        .create_link_token(&session("backend-token"))
        .await
        .unwrap();

    assert_eq!(token.link_token, "link-sandbox-u_1");
    assert_eq!(
        token.expiration,
        Some(Utc.with_ymd_and_hms(2099, 1, 1, 4, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn public_token_exchange() {
    let backend = client().await;
    let session = session("backend-token");

    backend
        .exchange_public_token(&session, "public-sandbox-1")
        .await
        .unwrap();

    match backend
        .exchange_public_token(&session, "public-sandbox-9")
        .await
        .unwrap_err()
    {
        AuthError::Rejected(message) => assert_eq!(message, "Unknown public token"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn stale_bearer_on_link_endpoints_is_session_expired() {
    let backend = client().await;
    let session = session("stale-token");

    assert!(matches!(
        backend.create_link_token(&session).await.unwrap_err(),
        AuthError::SessionExpired
    ));
    assert!(matches!(
        backend
            .exchange_public_token(&session, "public-sandbox-1")
            .await
            .unwrap_err(),
        AuthError::SessionExpired
    ));
}
