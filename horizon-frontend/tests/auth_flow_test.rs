mod common;

use axum::http::{StatusCode, header};
use common::{
    Gate, LINK_TOKEN, MockBackend, SIGN_UP_WITHOUT_SSN, body_text, full_sign_up, get, post_form,
    session_cookie, spawn_app,
};
use horizon_frontend::services::AuthError;
use std::sync::Arc;
use tower::ServiceExt;

const SIGN_IN: &[(&str, &str)] = &[("email", "a@b.com"), ("password", "x")];

#[tokio::test]
async fn sign_in_redirects_home_after_one_backend_call() {
    let backend = Arc::new(MockBackend::default());
    let app = spawn_app(backend.clone());

    let page = app.clone().oneshot(get("/sign-in", None)).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let cookie = session_cookie(&page).expect("sign-in page should start a session");

    let response = app
        .clone()
        .oneshot(post_form("/sign-in", Some(&cookie), SIGN_IN))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    assert_eq!(MockBackend::count(&backend.sign_in_calls), 1);
    assert_eq!(MockBackend::count(&backend.sign_up_calls), 0);

    let cookie = session_cookie(&response).expect("session id should rotate on sign-in");
    let home = app.oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    let html = body_text(home).await;
    assert!(html.contains("Welcome"));
    assert!(html.contains("Ada Lovelace"));
}

#[tokio::test]
async fn htmx_sign_in_gets_hx_redirect() {
    let backend = Arc::new(MockBackend::default());
    let app = spawn_app(backend);

    let mut request = post_form("/sign-in", None, SIGN_IN);
    request
        .headers_mut()
        .insert("hx-request", "true".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("hx-redirect").unwrap(), "/");
}

#[tokio::test]
async fn sign_up_without_ssn_flags_only_ssn() {
    let backend = Arc::new(MockBackend::default());
    let app = spawn_app(backend.clone());

    let response = app
        .oneshot(post_form("/sign-up", None, SIGN_UP_WITHOUT_SSN))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("SSN is required"));
    assert_eq!(html.matches("is required").count(), 1);
    // Entered values survive the re-render.
    assert!(html.contains(r#"value="Lovelace""#));
    assert_eq!(MockBackend::count(&backend.sign_up_calls), 0);
}

#[tokio::test]
async fn sign_up_hands_off_to_account_linking() {
    let backend = Arc::new(MockBackend::default());
    let app = spawn_app(backend.clone());

    let response = app
        .clone()
        .oneshot(post_form("/sign-up", None, &full_sign_up()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("sign-up should establish a session");
    let html = body_text(response).await;
    assert!(html.contains("Link Account"));
    assert!(html.contains("Link your account to get started"));
    assert!(!html.contains(r#"name="password""#));
    assert_eq!(MockBackend::count(&backend.sign_up_calls), 1);

    // The sign-up page keeps showing the link step for this session.
    let page = app.clone().oneshot(get("/sign-up", Some(&cookie))).await.unwrap();
    assert!(body_text(page).await.contains("Link Account"));

    let started = app
        .clone()
        .oneshot(post_form(
            "/link-account/start",
            Some(&cookie),
            &[("variant", "primary")],
        ))
        .await
        .unwrap();
    assert_eq!(started.status(), StatusCode::OK);
    assert!(body_text(started).await.contains(LINK_TOKEN));
    assert_eq!(MockBackend::count(&backend.link_token_calls), 1);

    let exchanged = app
        .oneshot(post_form(
            "/link-account/exchange",
            Some(&cookie),
            &[("public_token", "public-sandbox-1")],
        ))
        .await
        .unwrap();
    assert_eq!(exchanged.status(), StatusCode::SEE_OTHER);
    assert_eq!(exchanged.headers().get(header::LOCATION).unwrap(), "/");
    assert_eq!(MockBackend::count(&backend.exchange_calls), 1);
}

#[tokio::test]
async fn rejected_credentials_are_shown_on_the_form() {
    let backend = Arc::new(MockBackend::failing(|| AuthError::InvalidCredentials));
    let app = spawn_app(backend.clone());

    let response = app
        .oneshot(post_form("/sign-in", None, SIGN_IN))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let html = body_text(response).await;
    assert!(html.contains("Invalid email or password"));
    assert!(html.contains(r#"value="a@b.com""#));
    assert!(!html.contains("disabled"));
    assert_eq!(MockBackend::count(&backend.sign_in_calls), 1);
}

#[tokio::test]
async fn unavailable_backend_answers_503() {
    let backend = Arc::new(MockBackend::failing(|| {
        AuthError::Unavailable("request timed out".to_string())
    }));
    let app = spawn_app(backend);

    let response = app
        .oneshot(post_form("/sign-up", None, &full_sign_up()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let html = body_text(response).await;
    assert!(html.contains("Please try again"));
    assert!(!html.contains("timed out"));
}

#[tokio::test]
async fn concurrent_submission_is_rejected_without_backend_call() {
    let gate = Arc::new(Gate::default());
    let backend = Arc::new(MockBackend::gated(gate.clone()));
    let app = spawn_app(backend.clone());

    let page = app.clone().oneshot(get("/sign-in", None)).await.unwrap();
    let cookie = session_cookie(&page).unwrap();

    let first = tokio::spawn({
        let app = app.clone();
        let request = post_form("/sign-in", Some(&cookie), SIGN_IN);
        async move { app.oneshot(request).await.unwrap() }
    });
    gate.entered.notified().await;

    let second = app
        .clone()
        .oneshot(post_form("/sign-in", Some(&cookie), SIGN_IN))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert!(body_text(second)
        .await
        .contains("A submission is already in progress"));
    assert_eq!(MockBackend::count(&backend.sign_in_calls), 1);

    gate.release.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(MockBackend::count(&backend.sign_in_calls), 1);
}

#[tokio::test]
async fn link_account_requires_a_session() {
    let app = spawn_app(Arc::new(MockBackend::default()));

    let response = app.oneshot(get("/link-account", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/sign-in");
}

#[tokio::test]
async fn sign_out_returns_to_guest_view() {
    let backend = Arc::new(MockBackend::default());
    let app = spawn_app(backend.clone());

    let signed_in = app
        .clone()
        .oneshot(post_form("/sign-in", None, SIGN_IN))
        .await
        .unwrap();
    let cookie = session_cookie(&signed_in).unwrap();

    let signed_out = app
        .clone()
        .oneshot(post_form("/sign-out", Some(&cookie), &[]))
        .await
        .unwrap();
    assert_eq!(signed_out.status(), StatusCode::SEE_OTHER);
    assert_eq!(signed_out.headers().get(header::LOCATION).unwrap(), "/sign-in");
    assert_eq!(MockBackend::count(&backend.sign_out_calls), 1);

    let home = app.oneshot(get("/", Some(&cookie))).await.unwrap();
    assert!(body_text(home).await.contains("Guest"));
}
