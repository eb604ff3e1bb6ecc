use crate::AppState;
use crate::forms::Route;
use crate::handlers::redirect;
use crate::linking::{self, LinkFlow, LinkVariant};
use crate::services::AuthError;
use crate::session::{AuthContext, SessionRecord};
use crate::views::LinkAccountTemplate;
use axum::{
    Extension, Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use service_core::error::AppError;

#[derive(Deserialize)]
pub struct StartLinkForm {
    #[serde(default)]
    pub variant: LinkVariant,
}

#[derive(Deserialize)]
pub struct ExchangeForm {
    pub public_token: String,
}

pub(crate) fn link_view(
    state: &AppState,
    record: &SessionRecord,
    flow: &LinkFlow,
    variant: LinkVariant,
) -> LinkAccountTemplate {
    LinkAccountTemplate::new(
        &record.user,
        flow,
        variant,
        &state.linking.script_url,
        &state.linking.client_name,
    )
}

async fn expired(ctx: &AuthContext) -> Result<Response, AppError> {
    ctx.clear().await?;
    Ok(Redirect::to(Route::SignIn.path()).into_response())
}

pub async fn link_account_page(
    State(state): State<AppState>,
    ctx: AuthContext,
    Extension(record): Extension<SessionRecord>,
) -> Result<Response, AppError> {
    let flow = ctx.link_flow(Utc::now()).await?;
    Ok(link_view(&state, &record, &flow, LinkVariant::Primary).into_response())
}

pub async fn start_link_handler(
    State(state): State<AppState>,
    ctx: AuthContext,
    Extension(record): Extension<SessionRecord>,
    Form(form): Form<StartLinkForm>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let current = ctx.link_flow(now).await?;

    match linking::start(state.linker.as_ref(), &record, current.clone(), now).await {
        Ok(flow) => {
            ctx.set_link_flow(&flow).await?;
            Ok(link_view(&state, &record, &flow, form.variant).into_response())
        }
        Err(AuthError::SessionExpired) => expired(&ctx).await,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to start link session");
            Ok((
                err.status_code(),
                link_view(&state, &record, &current, form.variant).with_error(err.user_message()),
            )
                .into_response())
        }
    }
}

pub async fn exchange_handler(
    State(state): State<AppState>,
    ctx: AuthContext,
    headers: HeaderMap,
    Extension(record): Extension<SessionRecord>,
    Form(form): Form<ExchangeForm>,
) -> Result<Response, AppError> {
    match linking::complete(state.linker.as_ref(), &record, &form.public_token).await {
        Ok(route) => {
            ctx.set_link_flow(&LinkFlow::NotStarted).await?;
            Ok(redirect(&headers, route.path()))
        }
        Err(AuthError::SessionExpired) => expired(&ctx).await,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to exchange public token");
            let flow = ctx.link_flow(Utc::now()).await?;
            Ok((
                err.status_code(),
                link_view(&state, &record, &flow, LinkVariant::Primary)
                    .with_error(err.user_message()),
            )
                .into_response())
        }
    }
}
