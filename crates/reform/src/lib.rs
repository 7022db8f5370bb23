//! # Reactive form-field bindings
//!
//! `reform` turns a path into a shared form state into a live view of that
//! field: value, baseline, error, touched/updated flags, input listeners and
//! focus control. Views stay in sync with the store without manual wiring.
//!
//! - [`Form`] is the in-memory store; anything implementing [`FormStore`]
//!   can stand in for it.
//! - [`FieldBinding`] is the per-field view.
//! - [`FieldOptions`] picks the label, focus strategy and [`ValuePolicy`].
//!
//! ```rust
//! use std::rc::Rc;
//! use reform::*;
//! use serde_json::{Value, json};
//!
//! let form = Rc::new(Form::with_fields(json!({"user": {"name": "", "email": ""}})).unwrap());
//! form.set_validator(|fields: &Value| {
//!     let mut errors = ErrorMap::new();
//!     if fields["user"]["email"].is_null() {
//!         errors.insert("user.email".into(), "required".into());
//!     }
//!     errors
//! });
//!
//! let user = FieldBinding::new(form.clone(), "user", FieldOptions::new());
//! let email = FieldBinding::new(form.clone(), "user.email", FieldOptions::new());
//!
//! assert!(!form.validate_and_focus());
//! assert!(user.has_descendents_error());
//! assert_eq!(email.error(), Some(json!("required")));
//! // the field with the error consumed the focus request
//! assert!(!form.waiting_for_error_focus());
//! ```
//!
//! Everything runs on one thread; a form and its bindings are `!Send`.

pub mod binding;
mod effects;
pub mod error;
pub mod focus;
pub mod form;
pub mod input;
pub mod normalize;
pub mod options;
pub mod path;
pub mod prelude;
pub mod store;
mod tests;

pub use binding::{FieldBinding, FieldFlags, InputListeners, InputProps};
pub use error::FormError;
pub use focus::{FocusStrategy, NoFocus};
pub use form::{Form, FormState};
pub use input::{EventTarget, FieldInput, InputEvent};
pub use options::{FieldOptions, GetValue, Projection, SetValue, ValuePolicy};
pub use store::{ErrorEntry, ErrorMap, FormStore, FormTopic, Validator};

pub use reform_core::{MaybeSignal, Scope, Signal, signal};
