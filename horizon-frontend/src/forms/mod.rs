//! Auth form state: field layout, validation rules and the submission
//! lifecycle shared by the sign-in and sign-up pages.

pub mod controller;
pub mod fields;
pub mod guard;
pub mod payload;
pub mod schema;

pub use controller::{FormController, FormOutcome, FormView, Route, SubmitRejected, SubmitStatus};
pub use fields::{Field, FieldDescriptor, FormMode, InputKind};
pub use guard::{SubmissionGuard, SubmissionPermit};
pub use payload::{Credentials, RegistrationProfile};
pub use schema::{AuthRequest, FieldErrors, FormSchema, FormValues};
