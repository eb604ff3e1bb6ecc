use serde::{Deserialize, Serialize};
use std::fmt;

/// Which authentication form is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormMode {
    SignIn,
    SignUp,
}

impl FormMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FormMode::SignIn => "sign-in",
            FormMode::SignUp => "sign-up",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FormMode::SignIn => "Sign In",
            FormMode::SignUp => "Sign Up",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            FormMode::SignIn => "/sign-in",
            FormMode::SignUp => "/sign-up",
        }
    }

    pub fn other(self) -> FormMode {
        match self {
            FormMode::SignIn => FormMode::SignUp,
            FormMode::SignUp => FormMode::SignIn,
        }
    }

    /// Input layout, one inner slice per visual row.
    pub fn rows(self) -> &'static [&'static [FieldDescriptor]] {
        match self {
            FormMode::SignIn => SIGN_IN_ROWS,
            FormMode::SignUp => SIGN_UP_ROWS,
        }
    }

    pub fn fields(self) -> impl Iterator<Item = Field> {
        self.rows().iter().flat_map(|row| row.iter().map(|d| d.field))
    }

    pub fn contains(self, field: Field) -> bool {
        self.fields().any(|f| f == field)
    }
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FirstName,
    LastName,
    Address1,
    City,
    State,
    PostalCode,
    DateOfBirth,
    Ssn,
    Email,
    Password,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::FirstName,
        Field::LastName,
        Field::Address1,
        Field::City,
        Field::State,
        Field::PostalCode,
        Field::DateOfBirth,
        Field::Ssn,
        Field::Email,
        Field::Password,
    ];

    /// Form and wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Address1 => "address1",
            Field::City => "city",
            Field::State => "state",
            Field::PostalCode => "postalCode",
            Field::DateOfBirth => "dateOfBirth",
            Field::Ssn => "ssn",
            Field::Email => "email",
            Field::Password => "password",
        }
    }

    /// Accepts the form name or the Rust field name of the payload structs.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.name() == name || f.rust_name() == name)
    }

    fn rust_name(self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::PostalCode => "postal_code",
            Field::DateOfBirth => "date_of_birth",
            other => other.name(),
        }
    }

    /// Secrets are never echoed back into a re-rendered form and never trimmed.
    pub fn is_secret(self) -> bool {
        matches!(self, Field::Password)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Password,
    Date,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Password => "password",
            InputKind::Date => "date",
        }
    }
}

/// Static description of one labelled input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field: Field,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: InputKind,
}

const fn descriptor(
    field: Field,
    label: &'static str,
    placeholder: &'static str,
    kind: InputKind,
) -> FieldDescriptor {
    FieldDescriptor {
        field,
        label,
        placeholder,
        kind,
    }
}

const EMAIL: FieldDescriptor =
    descriptor(Field::Email, "Email", "Enter your email", InputKind::Email);
const PASSWORD: FieldDescriptor = descriptor(
    Field::Password,
    "Password",
    "Enter your password",
    InputKind::Password,
);

static SIGN_IN_ROWS: &[&[FieldDescriptor]] = &[&[EMAIL], &[PASSWORD]];

static SIGN_UP_ROWS: &[&[FieldDescriptor]] = &[
    &[
        descriptor(Field::FirstName, "First Name", "ex: John", InputKind::Text),
        descriptor(Field::LastName, "Last Name", "ex: Doe", InputKind::Text),
    ],
    &[descriptor(
        Field::Address1,
        "Address",
        "Enter your specific address",
        InputKind::Text,
    )],
    &[descriptor(Field::City, "City", "Enter your city", InputKind::Text)],
    &[
        descriptor(Field::State, "State", "ex: Lagos", InputKind::Text),
        descriptor(Field::PostalCode, "Postal Code", "ex: 100001", InputKind::Text),
    ],
    &[
        descriptor(Field::DateOfBirth, "Date of Birth", "yyyy-mm-dd", InputKind::Date),
        descriptor(Field::Ssn, "SSN", "ex: 1234", InputKind::Text),
    ],
    &[EMAIL],
    &[PASSWORD],
];
