use super::fields::{Field, FormMode};
use super::payload::{Credentials, RegistrationProfile};
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationErrors};

/// Raw input keyed by field, as typed by the user.
pub type FormValues = BTreeMap<Field, String>;

/// First failing message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub(crate) fn set(&mut self, field: Field, message: Option<String>) {
        match message {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut map = BTreeMap::new();
        for (key, failures) in errors.field_errors() {
            let Some(field) = Field::from_name(&key) else {
                continue;
            };
            if let Some(first) = failures.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                map.insert(field, message);
            }
        }
        FieldErrors(map)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// A validated request for the auth backend.
#[derive(Debug, Clone)]
pub enum AuthRequest {
    SignIn(Credentials),
    SignUp(RegistrationProfile),
}

/// Validation rules for one form mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSchema {
    mode: FormMode,
}

impl FormSchema {
    pub fn for_mode(mode: FormMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Assemble and validate the payload for this mode.
    ///
    /// Values are trimmed except secrets. Fields outside the mode are ignored.
    pub fn parse(&self, values: &FormValues) -> Result<AuthRequest, FieldErrors> {
        let take = |field: Field| -> String {
            let raw = values.get(&field).map(String::as_str).unwrap_or_default();
            if field.is_secret() {
                raw.to_string()
            } else {
                raw.trim().to_string()
            }
        };

        let request = match self.mode {
            FormMode::SignIn => AuthRequest::SignIn(Credentials {
                email: take(Field::Email),
                password: take(Field::Password),
            }),
            FormMode::SignUp => AuthRequest::SignUp(RegistrationProfile {
                first_name: take(Field::FirstName),
                last_name: take(Field::LastName),
                address1: take(Field::Address1),
                city: take(Field::City),
                state: take(Field::State),
                postal_code: take(Field::PostalCode),
                date_of_birth: take(Field::DateOfBirth),
                ssn: take(Field::Ssn),
                email: take(Field::Email),
                password: take(Field::Password),
            }),
        };

        let outcome = match &request {
            AuthRequest::SignIn(credentials) => credentials.validate(),
            AuthRequest::SignUp(profile) => profile.validate(),
        };

        match outcome {
            Ok(()) => Ok(request),
            Err(errors) => Err(FieldErrors::from(&errors)),
        }
    }

    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        self.parse(values).err().unwrap_or_default()
    }
}
