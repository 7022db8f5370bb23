//! Effects a binding installs on its form.
//!
//! Each effect is a reactor watcher that runs once at creation and again when
//! one of its topics is notified. All of them hold the binding weakly.

use serde_json::Value;

use crate::binding::{FieldBinding, OnRename};
use crate::normalize::normalize;
use crate::options::ValuePolicy;
use crate::store::FormTopic;

pub(crate) fn install(binding: &FieldBinding) {
    error_focus(binding);
    initial_capture(binding);
    if let ValuePolicy::Normalize { unset_if_null } = *binding.policy() {
        write_back(binding, unset_if_null);
    }
}

fn spawn(
    binding: &FieldBinding,
    topic: Option<fn(&FieldBinding) -> FormTopic>,
    on_rename: OnRename,
    run: impl Fn(&FieldBinding) + 'static,
) {
    let reactor = binding.reactor();
    let deps = {
        let weak = binding.downgrade();
        move |t: &mut reform_core::Tracker<FormTopic>| {
            if let (Some(topic), Some(binding)) = (topic, weak.upgrade()) {
                t.track(topic(&binding));
            }
        }
    };
    let body = {
        let weak = binding.downgrade();
        move || {
            if let Some(binding) = weak.upgrade() {
                run(&binding);
            }
        }
    };
    let id = reactor.watch(deps, body);
    binding.register(id, on_rename);
    reactor.run_now(id);
}

// The flag is consumed by the innermost erroneous field: bindings with an
// erroneous descendant focus but leave the flag for the descendant.
fn error_focus(binding: &FieldBinding) {
    spawn(
        binding,
        Some(|_| FormTopic::ErrorFocus),
        OnRename::Retrack,
        |binding| {
            let form = binding.form();
            if !form.waiting_for_error_focus() || !binding.has_error_or_has_descendents_error() {
                return;
            }
            log::debug!("field '{}': taking error focus", binding.name());
            binding.focus();
            if !binding.has_descendents_error() {
                form.cancel_wait_for_error_focus();
            }
        },
    );
}

fn initial_capture(binding: &FieldBinding) {
    spawn(binding, None, OnRename::Rerun, |binding| {
        let name = binding.name();
        let form = binding.form();
        let baseline = normalize(form.field(&name));
        log::trace!("field '{name}': baseline {baseline}");
        form.set_initial_field(&name, baseline);
    });
}

fn write_back(binding: &FieldBinding, unset_if_null: bool) {
    spawn(
        binding,
        Some(|binding| FormTopic::Field(binding.name())),
        OnRename::Rerun,
        move |binding| settle(binding, unset_if_null),
    );
}

// Rewrites the stored value into canonical form. A no-op once settled.
fn settle(binding: &FieldBinding, unset_if_null: bool) {
    let name = binding.name();
    let form = binding.form();
    let raw = form.field(&name);
    let normalized = normalize(raw.clone());

    if normalized == Value::Null && unset_if_null {
        if raw.is_some() {
            log::trace!("field '{name}': unset blank value");
            form.unset_field(&name);
        }
    } else if raw.as_ref() != Some(&normalized) {
        log::trace!("field '{name}': normalized to {normalized}");
        form.set_field(&name, normalized);
    }
}
