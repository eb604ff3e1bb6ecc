use crate::forms::Route;
use crate::session::{AuthContext, SessionState};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use service_core::error::AppError;

/// Gate routes that need a signed-in customer.
///
/// The active `SessionRecord` is handed to the handler as a request extension.
pub async fn require_session(
    ctx: AuthContext,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match ctx.state(Utc::now()).await? {
        SessionState::Active(record) => {
            request.extensions_mut().insert(record);
            Ok(next.run(request).await)
        }
        SessionState::Anonymous | SessionState::Expired => {
            Ok(Redirect::to(Route::SignIn.path()).into_response())
        }
    }
}
