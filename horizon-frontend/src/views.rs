//! Page templates. Everything here is pure rendering from prepared data.

use crate::forms::{FormController, FormMode, SubmitStatus};
use crate::linking::{LinkFlow, LinkVariant};
use crate::models::{AccountSummary, BalanceOverview, SessionUser, format_amount};
use askama::Template;

pub const BUSY_MESSAGE: &str = "A submission is already in progress";

/// One labelled input with its inline message.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthFormTemplate {
    pub mode: FormMode,
    pub heading: &'static str,
    pub subheading: &'static str,
    pub rows: Vec<Vec<FieldView>>,
    pub submitting: bool,
    pub form_error: Option<String>,
    pub footer_prompt: &'static str,
    pub footer_link: FormMode,
}

impl AuthFormTemplate {
    pub fn from_controller(controller: &FormController) -> Self {
        let mode = controller.mode();
        let rows = mode
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|descriptor| FieldView {
                        name: descriptor.field.name(),
                        label: descriptor.label,
                        placeholder: descriptor.placeholder,
                        input_type: descriptor.kind.as_str(),
                        value: if descriptor.field.is_secret() {
                            String::new()
                        } else {
                            controller.value(descriptor.field).to_string()
                        },
                        error: controller.error(descriptor.field).map(str::to_string),
                    })
                    .collect()
            })
            .collect();

        let form_error = match controller.status() {
            SubmitStatus::Failed(message) => Some(message.clone()),
            _ => None,
        };

        Self {
            mode,
            heading: mode.title(),
            subheading: "Please enter your details",
            rows,
            submitting: controller.is_submitting(),
            form_error,
            footer_prompt: match mode {
                FormMode::SignIn => "Don't have an account?",
                FormMode::SignUp => "Already have an account?",
            },
            footer_link: mode.other(),
        }
    }

    /// The form as shown while another submission from this browser is pending.
    pub fn busy(controller: &FormController) -> Self {
        Self {
            submitting: true,
            form_error: Some(BUSY_MESSAGE.to_string()),
            ..Self::from_controller(controller)
        }
    }
}

#[derive(Template)]
#[template(path = "link_account.html")]
pub struct LinkAccountTemplate {
    pub heading: &'static str,
    pub subheading: &'static str,
    pub user_name: String,
    pub variant: LinkVariant,
    pub link_token: Option<String>,
    pub script_url: String,
    pub client_name: String,
    pub error: Option<String>,
}

impl LinkAccountTemplate {
    pub fn new(
        user: &SessionUser,
        flow: &LinkFlow,
        variant: LinkVariant,
        script_url: &str,
        client_name: &str,
    ) -> Self {
        Self {
            heading: "Link Account",
            subheading: "Link your account to get started",
            user_name: user.name(),
            variant,
            link_token: flow.link_token().map(str::to_string),
            script_url: script_url.to_string(),
            client_name: client_name.to_string(),
            error: None,
        }
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..self
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccountView {
    pub bank_name: String,
    pub balance: String,
}

#[derive(Debug, Clone)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub initials: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub title: &'static str,
    pub user_name: String,
    pub subtext: &'static str,
    pub total_banks: usize,
    pub total_balance: String,
    pub accounts: Vec<AccountView>,
    pub profile: Option<ProfileView>,
    pub add_bank: LinkVariant,
}

impl HomeTemplate {
    pub fn new(user: Option<&SessionUser>, accounts: &[AccountSummary]) -> Self {
        let overview = BalanceOverview::from_accounts(accounts);
        Self {
            title: "Welcome",
            user_name: user.map(SessionUser::name).unwrap_or_else(|| "Guest".to_string()),
            subtext: "Access and manage your account and transactions efficiently.",
            total_banks: overview.total_banks,
            total_balance: format_amount(overview.total_current_balance),
            accounts: accounts
                .iter()
                .map(|account| AccountView {
                    bank_name: account.bank_name.clone(),
                    balance: format_amount(account.current_balance),
                })
                .collect(),
            profile: user.map(|u| ProfileView {
                name: u.name(),
                email: u.email.clone(),
                initials: u.initials(),
            }),
            add_bank: LinkVariant::Ghost,
        }
    }
}
