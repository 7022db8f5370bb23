use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("invalid form state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{what}` must be a JSON object, found {found}")]
    NotAnObject {
        what: &'static str,
        found: &'static str,
    },
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
