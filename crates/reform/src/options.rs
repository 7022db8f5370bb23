use std::fmt;
use std::rc::Rc;

use reform_core::{MaybeSignal, Scope};
use serde_json::Value;

use crate::focus::FocusStrategy;

pub type GetValue = Rc<dyn Fn(Option<&Value>) -> Option<Value>>;
pub type SetValue = Rc<dyn Fn(Value) -> Value>;

/// Display/store transforms for [`ValuePolicy::Project`].
#[derive(Clone, Default)]
pub struct Projection {
    pub get_value: Option<GetValue>,
    pub set_value: Option<SetValue>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store value -> value shown by the input.
    pub fn get_value(mut self, f: impl Fn(Option<&Value>) -> Option<Value> + 'static) -> Self {
        self.get_value = Some(Rc::new(f));
        self
    }

    /// Input value -> value written to the store.
    pub fn set_value(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.set_value = Some(Rc::new(f));
        self
    }

    pub(crate) fn display(&self, raw: Option<Value>) -> Option<Value> {
        match &self.get_value {
            Some(f) => f(raw.as_ref()),
            None => raw,
        }
    }

    pub(crate) fn store(&self, input: Value) -> Value {
        match &self.set_value {
            Some(f) => f(input),
            None => input,
        }
    }
}

/// How a binding treats values on their way in and out of the store.
#[derive(Clone)]
pub enum ValuePolicy {
    /// Blank values are stored as `null` (or removed with `unset_if_null`),
    /// and the store is rewritten whenever it holds a non-canonical value.
    Normalize { unset_if_null: bool },
    /// Values pass through the projection untouched by normalization.
    Project(Projection),
}

impl Default for ValuePolicy {
    fn default() -> Self {
        ValuePolicy::Normalize {
            unset_if_null: false,
        }
    }
}

impl fmt::Debug for ValuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuePolicy::Normalize { unset_if_null } => f
                .debug_struct("Normalize")
                .field("unset_if_null", unset_if_null)
                .finish(),
            ValuePolicy::Project(p) => f
                .debug_struct("Project")
                .field("get_value", &p.get_value.is_some())
                .field("set_value", &p.set_value.is_some())
                .finish(),
        }
    }
}

/// Options for `FieldBinding::new`.
///
/// ```rust
/// use reform::{FieldOptions, Projection};
///
/// let opts = FieldOptions::new()
///     .label("E-mail")
///     .project(Projection::new().set_value(|v| v));
/// ```
#[derive(Clone, Default)]
pub struct FieldOptions {
    pub label: Option<MaybeSignal<String>>,
    pub on_focus: Option<Rc<dyn FocusStrategy>>,
    pub on_focus_default: Option<Rc<dyn FocusStrategy>>,
    pub policy: ValuePolicy,
    pub scope: Option<Scope>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<MaybeSignal<String>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn on_focus(mut self, strategy: impl FocusStrategy + 'static) -> Self {
        self.on_focus = Some(Rc::new(strategy));
        self
    }

    /// Host-provided fallback used when no `on_focus` is given.
    pub fn on_focus_default(mut self, strategy: impl FocusStrategy + 'static) -> Self {
        self.on_focus_default = Some(Rc::new(strategy));
        self
    }

    pub fn policy(mut self, policy: ValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn unset_if_null(self, unset_if_null: bool) -> Self {
        self.policy(ValuePolicy::Normalize { unset_if_null })
    }

    pub fn project(self, projection: Projection) -> Self {
        self.policy(ValuePolicy::Project(projection))
    }

    /// Tie the binding's lifetime to `scope` in addition to its own handles.
    pub fn scope(mut self, scope: &Scope) -> Self {
        self.scope = Some(scope.clone());
        self
    }
}
