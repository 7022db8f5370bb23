use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::is_truthy;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTarget {
    #[serde(default)]
    pub value: Option<Value>,
}

/// Input event as delivered by a host element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub target: EventTarget,
}

impl InputEvent {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            target: EventTarget {
                value: Some(value.into()),
            },
        }
    }
}

/// Argument of `on_input`: an event carrying `target.value`, or the value
/// itself (`None` is "undefined").
#[derive(Clone, Debug, PartialEq)]
pub enum FieldInput {
    Event(InputEvent),
    Value(Option<Value>),
}

impl FieldInput {
    pub fn into_value(self) -> Option<Value> {
        match self {
            FieldInput::Event(ev) => ev.target.value,
            FieldInput::Value(v) => v,
        }
    }
}

impl From<InputEvent> for FieldInput {
    fn from(ev: InputEvent) -> Self {
        FieldInput::Event(ev)
    }
}

/// A JSON object with a truthy `target` member is read as an event; anything
/// else is taken literally.
impl From<Value> for FieldInput {
    fn from(v: Value) -> Self {
        let target = match &v {
            Value::Object(map) => map.get("target").filter(|t| is_truthy(t)),
            _ => None,
        };
        match target {
            Some(target) => FieldInput::Event(InputEvent {
                target: EventTarget {
                    value: target.get("value").cloned(),
                },
            }),
            None => FieldInput::Value(Some(v)),
        }
    }
}

impl From<Option<Value>> for FieldInput {
    fn from(v: Option<Value>) -> Self {
        match v {
            Some(v) => v.into(),
            None => FieldInput::Value(None),
        }
    }
}

macro_rules! literal_input {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldInput {
                fn from(v: $t) -> Self {
                    FieldInput::Value(Some(Value::from(v)))
                }
            }
        )*
    };
}

literal_input!(&str, String, bool, i64, u64, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_like_json_is_unwrapped() {
        let input: FieldInput = json!({"target": {"value": "x"}}).into();
        assert_eq!(input.into_value(), Some(json!("x")));

        // target without value reads as undefined
        let input: FieldInput = json!({"target": {"checked": true}}).into();
        assert_eq!(input.into_value(), None);
    }

    #[test]
    fn test_falsy_target_is_literal() {
        let v = json!({"target": null, "other": 1});
        let input: FieldInput = v.clone().into();
        assert_eq!(input, FieldInput::Value(Some(v)));
    }

    #[test]
    fn test_literals() {
        assert_eq!(FieldInput::from("a").into_value(), Some(json!("a")));
        assert_eq!(FieldInput::from(0i64).into_value(), Some(json!(0)));
        assert_eq!(FieldInput::from(None).into_value(), None);
        assert_eq!(
            FieldInput::from(InputEvent::new(false)).into_value(),
            Some(json!(false))
        );
    }

    #[test]
    fn test_event_deserializes_from_host_payload() {
        let ev: InputEvent = serde_json::from_str(r#"{"target": {"value": [1, 2]}}"#).unwrap();
        assert_eq!(ev, InputEvent::new(json!([1, 2])));
    }
}
