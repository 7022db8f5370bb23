//! What a field binding needs from the form it belongs to.

use std::collections::BTreeMap;

use reform_core::Reactor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification keys emitted by a [`FormStore`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FormTopic {
    /// Live value at a path. Writes notify equal, ancestor and descendant
    /// paths.
    Field(String),
    /// Baseline value at a path, same overlap rule as `Field`.
    InitialField(String),
    Touched(String),
    /// The error map as a whole.
    Errors,
    /// The `waiting_for_error_focus` flag.
    ErrorFocus,
}

/// Validation result for one path: a single error or an ordered list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorEntry {
    List(Vec<Value>),
    Single(Value),
}

impl ErrorEntry {
    /// The error to display: the first of a list, or the single entry.
    pub fn first(&self) -> Option<&Value> {
        match self {
            ErrorEntry::List(items) => items.first(),
            ErrorEntry::Single(v) => Some(v),
        }
    }
}

impl From<&str> for ErrorEntry {
    fn from(msg: &str) -> Self {
        ErrorEntry::Single(Value::String(msg.to_owned()))
    }
}

impl From<String> for ErrorEntry {
    fn from(msg: String) -> Self {
        ErrorEntry::Single(Value::String(msg))
    }
}

impl From<Vec<Value>> for ErrorEntry {
    fn from(items: Vec<Value>) -> Self {
        ErrorEntry::List(items)
    }
}

pub type ErrorMap = BTreeMap<String, ErrorEntry>;

/// Produces the error map for a set of field values.
pub trait Validator {
    fn validate(&self, fields: &Value) -> ErrorMap;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> ErrorMap,
{
    fn validate(&self, fields: &Value) -> ErrorMap {
        self(fields)
    }
}

/// Read/write contract of the shared form state.
///
/// Implementations must notify their [`Reactor`] after every mutation that
/// actually changes state, and only then; bindings rely on this for their
/// write-back loop to settle.
pub trait FormStore {
    fn reactor(&self) -> &Reactor<FormTopic>;

    fn field(&self, path: &str) -> Option<Value>;
    fn set_field(&self, path: &str, value: Value);
    fn unset_field(&self, path: &str);

    fn initial_field(&self, path: &str) -> Option<Value>;
    fn set_initial_field(&self, path: &str, value: Value);

    fn is_touched(&self, path: &str) -> bool;
    fn set_touched(&self, path: &str);

    fn error_entry(&self, path: &str) -> Option<ErrorEntry>;
    fn error_keys(&self) -> Vec<String>;
    /// Run the form's validation pass and publish its errors.
    fn run_validate(&self);

    fn waiting_for_error_focus(&self) -> bool;
    fn cancel_wait_for_error_focus(&self);
}
