use crate::AppState;
use crate::forms::{Field, FormController, FormMode, FormOutcome, SubmitRejected};
use crate::handlers::{link::link_view, redirect};
use crate::linking::{LinkFlow, LinkVariant};
use crate::session::{AuthContext, SessionState};
use crate::views::AuthFormTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use service_core::error::AppError;
use std::collections::HashMap;

type FormFields = Form<HashMap<String, String>>;

pub async fn sign_in_page(ctx: AuthContext) -> Result<Response, AppError> {
    // Issue the form key (and with it the session cookie) before the first post.
    ctx.form_key().await?;
    Ok(AuthFormTemplate::from_controller(&FormController::new(FormMode::SignIn)).into_response())
}

pub async fn sign_up_page(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Response, AppError> {
    ctx.form_key().await?;

    if let SessionState::Active(record) = ctx.state(Utc::now()).await? {
        let flow = ctx.link_flow(Utc::now()).await?;
        return Ok(link_view(&state, &record, &flow, LinkVariant::Primary).into_response());
    }

    Ok(AuthFormTemplate::from_controller(&FormController::new(FormMode::SignUp)).into_response())
}

pub async fn sign_in_handler(
    State(state): State<AppState>,
    ctx: AuthContext,
    headers: HeaderMap,
    Form(fields): FormFields,
) -> Result<Response, AppError> {
    submit(FormMode::SignIn, &state, &ctx, &headers, fields).await
}

pub async fn sign_up_handler(
    State(state): State<AppState>,
    ctx: AuthContext,
    headers: HeaderMap,
    Form(fields): FormFields,
) -> Result<Response, AppError> {
    submit(FormMode::SignUp, &state, &ctx, &headers, fields).await
}

fn already_submitting(controller: &FormController) -> Response {
    (StatusCode::CONFLICT, AuthFormTemplate::busy(controller)).into_response()
}

async fn submit(
    mode: FormMode,
    state: &AppState,
    ctx: &AuthContext,
    headers: &HeaderMap,
    fields: HashMap<String, String>,
) -> Result<Response, AppError> {
    let mut controller = FormController::with_values(
        mode,
        fields
            .into_iter()
            .filter_map(|(name, value)| Field::from_name(&name).map(|field| (field, value))),
    );

    let form_key = ctx.form_key().await?;
    let Some(_permit) = state.submissions.try_acquire(&form_key) else {
        tracing::warn!(mode = %mode, "Rejected concurrent submission");
        return Ok(already_submitting(&controller));
    };

    match controller.submit(state.auth.as_ref()).await {
        Err(SubmitRejected::Invalid(errors)) => {
            tracing::debug!(mode = %mode, %errors, "Form failed validation");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                AuthFormTemplate::from_controller(&controller),
            )
                .into_response())
        }
        // The controller is built per request, so concurrent posts are
        // rejected by the guard above. Same answer either way.
        Err(SubmitRejected::AlreadySubmitting) => Ok(already_submitting(&controller)),
        Ok(FormOutcome::Navigate { grant, to }) => {
            ctx.establish(grant, Utc::now()).await?;
            Ok(redirect(headers, to.path()))
        }
        Ok(FormOutcome::LinkAccount { grant }) => {
            let record = ctx.establish(grant, Utc::now()).await?;
            let view = link_view(state, &record, &LinkFlow::NotStarted, LinkVariant::Primary);
            Ok(view.into_response())
        }
        Ok(FormOutcome::Failed(err)) => Ok((
            err.status_code(),
            AuthFormTemplate::from_controller(&controller),
        )
            .into_response()),
    }
}

pub async fn sign_out_handler(
    State(state): State<AppState>,
    ctx: AuthContext,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    ctx.sign_out(state.auth.as_ref()).await?;
    Ok(redirect(&headers, FormMode::SignIn.path()))
}
