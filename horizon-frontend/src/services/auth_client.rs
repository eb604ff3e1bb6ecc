use crate::config::AuthServiceSettings;
use crate::forms::{Credentials, RegistrationProfile};
use crate::models::{SessionGrant, SessionUser};
use crate::services::auth_backend::{AuthBackend, AuthError, LinkProvider, LinkToken};
use crate::session::SessionRecord;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use service_core::observability::{TracedClientExt, TracedRequest};
use service_core::utils::sign_request;
use std::time::Duration;

#[derive(Clone, Copy)]
enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// How a 401 from an endpoint should be read.
#[derive(Clone, Copy)]
enum Auth<'a> {
    Credentials,
    Bearer(&'a str),
}

/// HTTP client for the external auth backend.
///
/// Requests are HMAC-signed with the shared secret and carry trace context.
pub struct HttpAuthBackend {
    client: Client,
    settings: AuthServiceSettings,
}

impl HttpAuthBackend {
    pub fn new(settings: AuthServiceSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: &str,
        auth: Auth<'_>,
    ) -> Result<reqwest::Response, AuthError> {
        let url = format!("{}{}", self.settings.url.trim_end_matches('/'), path);

        let signed = sign_request(
            self.settings.signing_secret.expose_secret(),
            method.as_str(),
            path,
            body,
        )
        .map_err(|e| AuthError::Protocol(format!("Failed to sign request: {}", e)))?;

        let mut request: TracedRequest = match method {
            Method::Get => self.client.traced_get(&url),
            Method::Post => self.client.traced_post(&url).json_body(body.to_string()),
        };
        for (name, value) in signed.pairs() {
            request = request.header(name, value);
        }
        if let Auth::Bearer(token) = auth {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "Auth service request failed");
            if e.is_timeout() {
                AuthError::Unavailable("request timed out".to_string())
            } else {
                AuthError::Unavailable(e.to_string())
            }
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response, auth).await)
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
        auth: Auth<'_>,
    ) -> Result<T, AuthError> {
        let body = serde_json::to_string(body)
            .map_err(|e| AuthError::Protocol(format!("Failed to encode request: {}", e)))?;
        let response = self.send(Method::Post, path, &body, auth).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AuthError> {
    response
        .json::<T>()
        .await
        .map_err(|e| AuthError::Protocol(format!("Failed to decode response: {}", e)))
}

async fn error_from_response(response: reqwest::Response, auth: Auth<'_>) -> AuthError {
    let status = response.status();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .or_else(|| body.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    tracing::warn!(%status, message = ?message, "Auth service returned an error");

    match status {
        StatusCode::UNAUTHORIZED => match auth {
            Auth::Credentials => AuthError::InvalidCredentials,
            Auth::Bearer(_) => AuthError::SessionExpired,
        },
        StatusCode::CONFLICT => AuthError::AccountExists,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AuthError::Rejected(
            message.unwrap_or_else(|| "Please check your details and try again".to_string()),
        ),
        StatusCode::TOO_MANY_REQUESTS => AuthError::Unavailable("rate limited".to_string()),
        s if s.is_server_error() => AuthError::Unavailable(format!("status {}", s)),
        s => AuthError::Protocol(format!("unexpected status {}", s)),
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn sign_up(&self, profile: &RegistrationProfile) -> Result<SessionGrant, AuthError> {
        self.post_json("/auth/sign-up", profile, Auth::Credentials)
            .await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SessionGrant, AuthError> {
        self.post_json("/auth/sign-in", credentials, Auth::Credentials)
            .await
    }

    async fn get_logged_in_user(&self, token: &str) -> Result<Option<SessionUser>, AuthError> {
        match self.send(Method::Get, "/auth/me", "", Auth::Bearer(token)).await {
            Ok(response) => decode(response).await.map(Some),
            Err(AuthError::SessionExpired) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.send(Method::Post, "/auth/sign-out", "{}", Auth::Bearer(token))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl LinkProvider for HttpAuthBackend {
    async fn create_link_token(&self, session: &SessionRecord) -> Result<LinkToken, AuthError> {
        let body = serde_json::json!({ "userId": session.user.id });
        self.post_json("/link/token", &body, Auth::Bearer(session.token()))
            .await
    }

    async fn exchange_public_token(
        &self,
        session: &SessionRecord,
        public_token: &str,
    ) -> Result<(), AuthError> {
        let body = serde_json::json!({ "publicToken": public_token });
        let body = serde_json::to_string(&body)
            .map_err(|e| AuthError::Protocol(format!("Failed to encode request: {}", e)))?;
        self.send(
            Method::Post,
            "/link/exchange",
            &body,
            Auth::Bearer(session.token()),
        )
        .await
        .map(|_| ())
    }
}
