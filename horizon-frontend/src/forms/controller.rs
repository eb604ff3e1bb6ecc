use super::fields::{Field, FormMode};
use super::schema::{AuthRequest, FieldErrors, FormSchema, FormValues};
use crate::models::{SessionGrant, SessionUser};
use crate::services::{AuthBackend, AuthError};
use metrics::counter;
use thiserror::Error;

/// Lifecycle of a single form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// Navigation targets reachable from the auth forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    LinkAccount,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/sign-in",
            Route::SignUp => "/sign-up",
            Route::LinkAccount => "/link-account",
        }
    }
}

#[derive(Debug)]
pub enum FormOutcome {
    /// Sign-in succeeded; navigate exactly once.
    Navigate { grant: SessionGrant, to: Route },
    /// Sign-up succeeded; the form gives way to the linking step.
    LinkAccount { grant: SessionGrant },
    Failed(AuthError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error("Form has invalid fields: {0}")]
    Invalid(FieldErrors),
}

/// What the auth page should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormView<'a> {
    Form,
    LinkAccount(&'a SessionUser),
}

/// Field state and submission lifecycle for one auth form.
#[derive(Debug, Clone)]
pub struct FormController {
    schema: FormSchema,
    values: FormValues,
    errors: FieldErrors,
    status: SubmitStatus,
    attempted: bool,
    session_user: Option<SessionUser>,
}

impl FormController {
    pub fn new(mode: FormMode) -> Self {
        Self {
            schema: FormSchema::for_mode(mode),
            values: FormValues::new(),
            errors: FieldErrors::default(),
            status: SubmitStatus::Idle,
            attempted: false,
            session_user: None,
        }
    }

    /// Build a controller pre-filled with submitted values.
    pub fn with_values<I>(mode: FormMode, values: I) -> Self
    where
        I: IntoIterator<Item = (Field, String)>,
    {
        let mut controller = Self::new(mode);
        for (field, value) in values {
            controller.set_field(field, value);
        }
        controller
    }

    pub fn mode(&self) -> FormMode {
        self.schema.mode()
    }

    /// Store a raw value. After the first submit attempt the field is
    /// re-validated so its message follows the input.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        if !self.mode().contains(field) {
            return;
        }
        self.values.insert(field, value.into());

        if self.attempted {
            let current = self.schema.validate(&self.values);
            self.errors.set(field, current.get(field).map(str::to_string));
        }
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    pub fn session_user(&self) -> Option<&SessionUser> {
        self.session_user.as_ref()
    }

    pub fn view(&self) -> FormView<'_> {
        match &self.session_user {
            Some(user) => FormView::LinkAccount(user),
            None => FormView::Form,
        }
    }

    /// Run the schema and record the first failure per field.
    pub fn validate(&mut self) -> bool {
        self.errors = self.schema.validate(&self.values);
        self.errors.is_empty()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.schema.validate(&self.values).is_empty()
    }

    /// Enter `Submitting` and hand back the request to send.
    pub fn begin_submit(&mut self) -> Result<AuthRequest, SubmitRejected> {
        if self.is_submitting() {
            return Err(SubmitRejected::AlreadySubmitting);
        }
        self.attempted = true;

        match self.schema.parse(&self.values) {
            Ok(request) => {
                self.errors = FieldErrors::default();
                self.status = SubmitStatus::Submitting;
                Ok(request)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(SubmitRejected::Invalid(errors))
            }
        }
    }

    /// Leave `Submitting` with the collaborator's answer.
    pub fn finish(&mut self, result: Result<SessionGrant, AuthError>) -> FormOutcome {
        let mode = self.mode();
        match result {
            Ok(grant) => {
                self.status = SubmitStatus::Succeeded;
                counter!("auth_submissions_total", "mode" => mode.as_str(), "outcome" => "success")
                    .increment(1);
                match mode {
                    FormMode::SignIn => FormOutcome::Navigate {
                        grant,
                        to: Route::Home,
                    },
                    FormMode::SignUp => {
                        self.session_user = Some(grant.user.clone());
                        FormOutcome::LinkAccount { grant }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(mode = %mode, error = %err, "Authentication submission failed");
                counter!("auth_submissions_total", "mode" => mode.as_str(), "outcome" => err.kind())
                    .increment(1);
                self.status = SubmitStatus::Failed(err.user_message().to_string());
                FormOutcome::Failed(err)
            }
        }
    }

    /// Validate, call the collaborator once, and settle the outcome.
    pub async fn submit(
        &mut self,
        backend: &dyn AuthBackend,
    ) -> Result<FormOutcome, SubmitRejected> {
        let request = self.begin_submit()?;
        let result = match &request {
            AuthRequest::SignIn(credentials) => backend.sign_in(credentials).await,
            AuthRequest::SignUp(profile) => backend.sign_up(profile).await,
        };
        Ok(self.finish(result))
    }
}
