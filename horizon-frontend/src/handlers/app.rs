use crate::AppState;
use crate::session::AuthContext;
use crate::views::HomeTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use service_core::error::AppError;

pub async fn index(State(state): State<AppState>, ctx: AuthContext) -> Result<Response, AppError> {
    let session = ctx.refresh(state.auth.as_ref(), Utc::now()).await?;
    let user = session.record().map(|record| &record.user);

    Ok(HomeTemplate::new(user, &state.accounts).into_response())
}

pub async fn health_check() -> &'static str {
    "OK"
}
