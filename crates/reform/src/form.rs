use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use reform_core::Reactor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FormError, kind_of};
use crate::path;
use crate::store::{ErrorEntry, ErrorMap, FormStore, FormTopic, Validator};

/// Plain data behind a [`Form`]. Deserializable so a form can be seeded from
/// JSON; every member is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    pub fields: Value,
    pub initial_fields: Value,
    pub errors: ErrorMap,
    pub touched: BTreeSet<String>,
    pub waiting_for_error_focus: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            fields: Value::Object(Map::new()),
            initial_fields: Value::Object(Map::new()),
            errors: ErrorMap::new(),
            touched: BTreeSet::new(),
            waiting_for_error_focus: false,
        }
    }
}

/// In-memory form store.
///
/// Share it as `Rc<Form>` (or `Rc<dyn FormStore>`) between the bindings of
/// one form. Every mutation that changes state notifies the form's reactor.
pub struct Form {
    state: RefCell<FormState>,
    validator: RefCell<Option<Rc<dyn Validator>>>,
    reactor: Reactor<FormTopic>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(FormState::default()),
            validator: RefCell::new(None),
            reactor: Reactor::new(),
        }
    }

    pub fn from_state(mut state: FormState) -> Result<Self, FormError> {
        for (what, value) in [
            ("fields", &mut state.fields),
            ("initial_fields", &mut state.initial_fields),
        ] {
            if value.is_null() {
                *value = Value::Object(Map::new());
            }
            if !value.is_object() {
                return Err(FormError::NotAnObject {
                    what,
                    found: kind_of(value),
                });
            }
        }

        Ok(Self {
            state: RefCell::new(state),
            ..Self::new()
        })
    }

    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Self::from_state(serde_json::from_str(json)?)
    }

    pub fn with_fields(fields: Value) -> Result<Self, FormError> {
        Self::from_state(FormState {
            fields,
            ..FormState::default()
        })
    }

    pub fn snapshot(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn fields(&self) -> Value {
        self.state.borrow().fields.clone()
    }

    pub fn initial_fields(&self) -> Value {
        self.state.borrow().initial_fields.clone()
    }

    pub fn errors(&self) -> ErrorMap {
        self.state.borrow().errors.clone()
    }

    pub fn set_validator(&self, validator: impl Validator + 'static) {
        *self.validator.borrow_mut() = Some(Rc::new(validator));
    }

    pub fn set_errors(&self, errors: ErrorMap) {
        let changed = {
            let mut st = self.state.borrow_mut();
            if st.errors == errors {
                false
            } else {
                st.errors = errors;
                true
            }
        };
        if changed {
            log::debug!("form: errors updated");
            self.reactor.notify(&FormTopic::Errors);
        }
    }

    pub fn set_error(&self, path: &str, entry: impl Into<ErrorEntry>) {
        let mut errors = self.errors();
        errors.insert(path.to_owned(), entry.into());
        self.set_errors(errors);
    }

    pub fn clear_errors(&self) {
        self.set_errors(ErrorMap::new());
    }

    /// Ask the first field with an outstanding error to take focus.
    pub fn wait_for_error_focus(&self) {
        self.set_waiting_for_error_focus(true);
    }

    /// Validate, and request error focus when anything failed. Returns
    /// whether the form is valid.
    pub fn validate_and_focus(&self) -> bool {
        self.run_validate();
        let valid = self.state.borrow().errors.is_empty();
        if !valid {
            self.wait_for_error_focus();
        }
        valid
    }

    pub fn clear_touched(&self) {
        let cleared = std::mem::take(&mut self.state.borrow_mut().touched);
        for path in cleared {
            self.reactor.notify(&FormTopic::Touched(path));
        }
    }

    fn set_waiting_for_error_focus(&self, waiting: bool) {
        let changed = {
            let mut st = self.state.borrow_mut();
            std::mem::replace(&mut st.waiting_for_error_focus, waiting) != waiting
        };
        if changed {
            log::debug!("form: waiting_for_error_focus = {waiting}");
            self.reactor.notify(&FormTopic::ErrorFocus);
        }
    }

    fn notify_field(&self, path: &str) {
        self.reactor
            .notify_where(|t| matches!(t, FormTopic::Field(p) if path::overlaps(p, path)));
    }

    fn notify_initial_field(&self, path: &str) {
        self.reactor
            .notify_where(|t| matches!(t, FormTopic::InitialField(p) if path::overlaps(p, path)));
    }
}

// Writes `value` unless it is already there. Returns whether the tree changed.
fn write(root: &mut Value, at: &str, value: Value) -> bool {
    if path::get(root, at) == Some(&value) {
        return false;
    }
    path::set(root, at, value)
}

impl FormStore for Form {
    fn reactor(&self) -> &Reactor<FormTopic> {
        &self.reactor
    }

    fn field(&self, path: &str) -> Option<Value> {
        path::get(&self.state.borrow().fields, path).cloned()
    }

    fn set_field(&self, path: &str, value: Value) {
        let changed = write(&mut self.state.borrow_mut().fields, path, value);
        if changed {
            log::debug!("form: set field '{path}' = {}", self.field(path).unwrap_or_default());
            self.notify_field(path);
        }
    }

    fn unset_field(&self, path: &str) {
        let changed = path::unset(&mut self.state.borrow_mut().fields, path);
        if changed {
            log::debug!("form: unset field '{path}'");
            self.notify_field(path);
        }
    }

    fn initial_field(&self, path: &str) -> Option<Value> {
        path::get(&self.state.borrow().initial_fields, path).cloned()
    }

    fn set_initial_field(&self, path: &str, value: Value) {
        let changed = write(&mut self.state.borrow_mut().initial_fields, path, value);
        if changed {
            log::debug!(
                "form: set initial field '{path}' = {}",
                self.initial_field(path).unwrap_or_default()
            );
            self.notify_initial_field(path);
        }
    }

    fn is_touched(&self, path: &str) -> bool {
        self.state.borrow().touched.contains(path)
    }

    fn set_touched(&self, path: &str) {
        let inserted = self.state.borrow_mut().touched.insert(path.to_owned());
        if inserted {
            log::debug!("form: touched '{path}'");
            self.reactor.notify(&FormTopic::Touched(path.to_owned()));
        }
    }

    fn error_entry(&self, path: &str) -> Option<ErrorEntry> {
        self.state.borrow().errors.get(path).cloned()
    }

    fn error_keys(&self) -> Vec<String> {
        self.state.borrow().errors.keys().cloned().collect()
    }

    fn run_validate(&self) {
        let validator = self.validator.borrow().clone();
        let Some(validator) = validator else {
            log::trace!("form: no validator installed");
            return;
        };
        let fields = self.fields();
        let errors = validator.validate(&fields);
        log::debug!("form: validation produced {} error(s)", errors.len());
        self.set_errors(errors);
    }

    fn waiting_for_error_focus(&self) -> bool {
        self.state.borrow().waiting_for_error_focus
    }

    fn cancel_wait_for_error_focus(&self) {
        self.set_waiting_for_error_focus(false);
    }
}
