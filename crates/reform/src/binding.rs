//! # Field bindings
//!
//! A [`FieldBinding`] is the live view of one field of a form: its value,
//! baseline, errors, touched/updated state, the listeners an input element
//! needs, and focus control.
//!
//! Every attribute is read from the store on demand. Attributes that are
//! costly or frequently read are cached in [`Derived`] cells; each cell
//! declares the [`FormTopic`]s it depends on and is invalidated as soon as the
//! store notifies one of them, so a read never observes stale state.
//!
//! ```rust
//! use std::rc::Rc;
//! use reform::*;
//! use serde_json::json;
//!
//! let form = Rc::new(Form::with_fields(json!({"email": ""})).unwrap());
//! let email = FieldBinding::new(form.clone(), "email", FieldOptions::new());
//!
//! // "" is normalized away and captured as the baseline
//! assert_eq!(email.value(), Some(json!(null)));
//! assert_eq!(email.initial_value(), json!(null));
//!
//! email.on_input(InputEvent::new("jane@example.com"));
//! assert!(email.is_updated());
//!
//! email.reset();
//! assert!(!email.is_updated());
//! ```
//!
//! Bindings are cheap handles; clones share state. When the last handle is
//! dropped (or [`FieldBinding::dispose`] is called) the binding detaches from
//! the form.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use reform_core::{Derived, Dispose, MaybeSignal, ObserverId, Reactor, Scope, Tracker};
use serde::Serialize;
use serde_json::Value;

use crate::effects;
use crate::focus::FocusStrategy;
use crate::input::FieldInput;
use crate::normalize::{has_zero_length, is_truthy, normalize};
use crate::options::{FieldOptions, ValuePolicy};
use crate::path::is_strict_descendant;
use crate::store::{ErrorEntry, FormStore, FormTopic};

bitflags::bitflags! {
    /// Snapshot of a binding's boolean state, for hosts that style fields.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        const EMPTY = 1 << 0;
        const TOUCHED = 1 << 1;
        const UPDATED = 1 << 2;
        const HAS_ERROR = 1 << 3;
        const HAS_DESCENDENTS_ERROR = 1 << 4;
    }
}

/// Attributes for the host input element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InputProps {
    pub id: String,
    pub name: String,
    pub value: Option<Value>,
}

/// Event handlers for the host input element.
#[derive(Clone)]
pub struct InputListeners {
    pub input: Rc<dyn Fn(FieldInput)>,
    pub blur: Rc<dyn Fn()>,
}

/// What to do with an observer when the binding's name changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OnRename {
    /// Only point its dependencies at the new path.
    Retrack,
    /// Re-point and run it.
    Rerun,
}

struct Attrs {
    value: Derived<Option<Value>>,
    initial_value: Derived<Value>,
    error: Derived<Option<Value>>,
    has_descendents_error: Derived<bool>,
    is_touched: Derived<bool>,
}

impl Attrs {
    fn new(
        form: &Rc<dyn FormStore>,
        current: &Rc<RefCell<String>>,
        observers: &mut Vec<(ObserverId, OnRename)>,
    ) -> Self {
        let reactor = form.reactor();

        let (value, id) = Derived::watched(reactor, on_path(current, FormTopic::Field), {
            let (form, current) = (form.clone(), current.clone());
            move || form.field(&current.borrow())
        });
        observers.push((id, OnRename::Rerun));

        let initial_deps = on_path(current, FormTopic::InitialField);
        let (initial_value, id) = Derived::watched(reactor, initial_deps, {
            let (form, current) = (form.clone(), current.clone());
            move || normalize(form.initial_field(&current.borrow()))
        });
        observers.push((id, OnRename::Rerun));

        let errors_deps = |t: &mut Tracker<FormTopic>| t.track(FormTopic::Errors);

        let (error, id) = Derived::watched(reactor, errors_deps, {
            let (form, current) = (form.clone(), current.clone());
            move || match form.error_entry(&current.borrow()) {
                Some(ErrorEntry::Single(v)) if !is_truthy(&v) => None,
                Some(entry) => entry.first().cloned(),
                None => None,
            }
        });
        observers.push((id, OnRename::Rerun));

        let (has_descendents_error, id) = Derived::watched(reactor, errors_deps, {
            let (form, current) = (form.clone(), current.clone());
            move || {
                let name = current.borrow();
                form.error_keys()
                    .iter()
                    .any(|key| is_strict_descendant(&name, key))
            }
        });
        observers.push((id, OnRename::Rerun));

        let (is_touched, id) = Derived::watched(reactor, on_path(current, FormTopic::Touched), {
            let (form, current) = (form.clone(), current.clone());
            move || form.is_touched(&current.borrow())
        });
        observers.push((id, OnRename::Rerun));

        Self {
            value,
            initial_value,
            error,
            has_descendents_error,
            is_touched,
        }
    }
}

// Tracks `topic(<current name>)`, re-evaluated on every retrack.
fn on_path(
    current: &Rc<RefCell<String>>,
    topic: fn(String) -> FormTopic,
) -> impl Fn(&mut Tracker<FormTopic>) + 'static {
    let current = current.clone();
    move |t| t.track(topic(current.borrow().clone()))
}

struct BindingInner {
    form: Rc<dyn FormStore>,
    reactor: Reactor<FormTopic>,
    name: MaybeSignal<String>,
    current: Rc<RefCell<String>>,
    label: Option<MaybeSignal<String>>,
    on_focus: Option<Rc<dyn FocusStrategy>>,
    on_focus_default: Option<Rc<dyn FocusStrategy>>,
    policy: ValuePolicy,
    attrs: Attrs,
    observers: RefCell<Vec<(ObserverId, OnRename)>>,
    scope: Scope,
}

impl Drop for BindingInner {
    fn drop(&mut self) {
        self.scope.dispose();
    }
}

/// Live view of one form field. See the [module docs](self).
#[derive(Clone)]
pub struct FieldBinding {
    inner: Rc<BindingInner>,
}

#[derive(Clone)]
pub(crate) struct WeakFieldBinding(Weak<BindingInner>);

impl WeakFieldBinding {
    pub(crate) fn upgrade(&self) -> Option<FieldBinding> {
        self.0.upgrade().map(|inner| FieldBinding { inner })
    }
}

impl FieldBinding {
    pub fn new(
        form: Rc<dyn FormStore>,
        name: impl Into<MaybeSignal<String>>,
        options: FieldOptions,
    ) -> Self {
        let FieldOptions {
            label,
            on_focus,
            on_focus_default,
            policy,
            scope,
        } = options;
        let name = name.into();
        let current = Rc::new(RefCell::new(name.get()));
        let scope = scope.as_ref().map(Scope::child).unwrap_or_default();

        let mut observers = Vec::new();
        let attrs = Attrs::new(&form, &current, &mut observers);

        log::debug!("field '{}': binding with {policy:?}", current.borrow());

        let binding = FieldBinding {
            inner: Rc::new(BindingInner {
                reactor: form.reactor().clone(),
                form,
                name,
                current,
                label,
                on_focus,
                on_focus_default,
                policy,
                attrs,
                observers: RefCell::new(Vec::new()),
                scope,
            }),
        };
        for (id, on_rename) in observers {
            binding.register(id, on_rename);
        }

        if let Some(sig) = binding.inner.name.as_signal() {
            let weak = binding.downgrade();
            let sub = sig.subscribe(move |name: &String| {
                if let Some(binding) = weak.upgrade() {
                    binding.rename(name.clone());
                }
            });
            let sig = sig.clone();
            binding.inner.scope.add_disposer(move || sig.unsubscribe(sub));
        }

        effects::install(&binding);
        binding
    }

    pub(crate) fn downgrade(&self) -> WeakFieldBinding {
        WeakFieldBinding(Rc::downgrade(&self.inner))
    }

    pub(crate) fn reactor(&self) -> &Reactor<FormTopic> {
        &self.inner.reactor
    }

    /// Track `id` for renames and remove it from the graph with the binding.
    pub(crate) fn register(&self, id: ObserverId, on_rename: OnRename) -> Dispose {
        self.inner.observers.borrow_mut().push((id, on_rename));
        Dispose::observer(&self.inner.reactor, id).bind_to(&self.inner.scope)
    }

    fn rename(&self, name: String) {
        if *self.inner.current.borrow() == name {
            return;
        }
        log::debug!("field '{}': renamed to '{name}'", self.inner.current.borrow());
        *self.inner.current.borrow_mut() = name;

        let observers = self.inner.observers.borrow().clone();
        for (id, on_rename) in observers {
            match on_rename {
                OnRename::Retrack => self.inner.reactor.retrack(id),
                OnRename::Rerun => self.inner.reactor.run_now(id),
            }
        }
    }

    pub fn form(&self) -> &Rc<dyn FormStore> {
        &self.inner.form
    }

    pub fn policy(&self) -> &ValuePolicy {
        &self.inner.policy
    }

    /// Current resolved path.
    pub fn name(&self) -> String {
        self.inner.current.borrow().clone()
    }

    /// Label, falling back to the name when unset or empty.
    pub fn label(&self) -> String {
        self.inner
            .label
            .as_ref()
            .map(MaybeSignal::get)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.name())
    }

    /// Raw store value at the field's path.
    pub fn value(&self) -> Option<Value> {
        self.inner.attrs.value.get()
    }

    /// Value as shown by the input: projected through `get_value` in
    /// `Project` mode, the raw value otherwise.
    pub fn passed_value(&self) -> Option<Value> {
        match &self.inner.policy {
            ValuePolicy::Project(p) => p.display(self.value()),
            ValuePolicy::Normalize { .. } => self.value(),
        }
    }

    /// Captured baseline, normalized; never absent.
    pub fn initial_value(&self) -> Value {
        self.inner.attrs.initial_value.get()
    }

    /// True only for values whose length is zero (strings, arrays).
    pub fn is_empty(&self) -> bool {
        has_zero_length(self.value().as_ref())
    }

    pub fn error(&self) -> Option<Value> {
        self.inner.attrs.error.get()
    }

    pub fn has_error(&self) -> bool {
        self.error().as_ref().is_some_and(is_truthy)
    }

    pub fn has_descendents_error(&self) -> bool {
        self.inner.attrs.has_descendents_error.get()
    }

    pub fn has_error_or_has_descendents_error(&self) -> bool {
        self.has_error() || self.has_descendents_error()
    }

    pub fn is_touched(&self) -> bool {
        self.inner.attrs.is_touched.get()
    }

    pub fn is_updated(&self) -> bool {
        normalize(Some(self.initial_value())) != normalize(self.value())
    }

    pub fn flags(&self) -> FieldFlags {
        let mut flags = FieldFlags::empty();
        flags.set(FieldFlags::EMPTY, self.is_empty());
        flags.set(FieldFlags::TOUCHED, self.is_touched());
        flags.set(FieldFlags::UPDATED, self.is_updated());
        flags.set(FieldFlags::HAS_ERROR, self.has_error());
        flags.set(
            FieldFlags::HAS_DESCENDENTS_ERROR,
            self.has_descendents_error(),
        );
        flags
    }

    pub fn input_props(&self) -> InputProps {
        let name = self.name();
        InputProps {
            id: name.clone(),
            name,
            value: self.passed_value(),
        }
    }

    pub fn input_listeners(&self) -> InputListeners {
        let input = {
            let weak = self.downgrade();
            move |input: FieldInput| {
                if let Some(binding) = weak.upgrade() {
                    binding.on_input(input);
                }
            }
        };
        let blur = {
            let weak = self.downgrade();
            move || {
                if let Some(binding) = weak.upgrade() {
                    binding.on_blur();
                }
            }
        };
        InputListeners {
            input: Rc::new(input),
            blur: Rc::new(blur),
        }
    }

    /// Write an input event or literal value to the store, applying the
    /// binding's value policy.
    pub fn on_input(&self, input: impl Into<FieldInput>) {
        let value = input.into().into_value();
        let name = self.name();
        let value = match &self.inner.policy {
            ValuePolicy::Normalize { .. } => normalize(value),
            ValuePolicy::Project(p) => p.store(value.unwrap_or(Value::Null)),
        };
        self.inner.form.set_field(&name, value);
    }

    pub fn on_blur(&self) {
        self.inner.form.run_validate();
        self.inner.form.set_touched(&self.name());
    }

    /// Restore the captured baseline.
    pub fn reset(&self) {
        self.on_input(FieldInput::Value(Some(self.initial_value())));
    }

    pub fn focus(&self) {
        let strategy = self
            .inner
            .on_focus
            .as_ref()
            .or(self.inner.on_focus_default.as_ref());
        if let Some(strategy) = strategy {
            strategy.focus();
        }
    }

    /// Call `f` whenever the store changes something this binding reads.
    pub fn watch(&self, f: impl Fn() + 'static) -> Dispose {
        let current = self.inner.current.clone();
        let id = self.inner.reactor.watch(
            move |t| {
                let name = current.borrow().clone();
                t.track(FormTopic::Field(name.clone()));
                t.track(FormTopic::InitialField(name.clone()));
                t.track(FormTopic::Touched(name));
                t.track(FormTopic::Errors);
            },
            f,
        );
        self.register(id, OnRename::Rerun)
    }

    /// Detach from the form. Effects stop and cached attributes are no longer
    /// refreshed.
    pub fn dispose(&self) {
        self.inner.scope.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.scope.is_disposed()
    }
}

impl fmt::Debug for FieldBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name())
            .field("policy", &self.inner.policy)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
