#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use serde_json::{Value, json};

    use crate::prelude::*;

    fn form(json: &str) -> Rc<Form> {
        Rc::new(Form::from_json(json).unwrap())
    }

    fn bind(form: &Rc<Form>, name: &str, options: FieldOptions) -> FieldBinding {
        FieldBinding::new(form.clone(), name, options)
    }

    fn hits() -> (Rc<Cell<usize>>, impl Fn() + 'static) {
        let hits = Rc::new(Cell::new(0));
        let bump = {
            let hits = hits.clone();
            move || hits.set(hits.get() + 1)
        };
        (hits, bump)
    }

    #[test]
    fn test_email_capture_input_reset() {
        let form = form(r#"{"fields": {"email": ""}, "initial_fields": {}}"#);
        let email = bind(&form, "email", FieldOptions::new());

        assert_eq!(form.initial_fields(), json!({"email": null}));
        assert_eq!(email.value(), Some(Value::Null));
        assert_eq!(email.initial_value(), Value::Null);
        assert!(!email.is_updated());
        // `null` has no length
        assert!(!email.is_empty());

        email.on_input(json!({"target": {"value": "x"}}));
        assert_eq!(email.value(), Some(json!("x")));
        assert!(email.is_updated());

        email.reset();
        assert_eq!(email.value(), Some(email.initial_value()));
        assert!(!email.is_updated());
    }

    #[test]
    fn test_project_mode_leaves_values_alone() {
        let form = form(r#"{"fields": {"email": ""}}"#);
        let email = bind(&form, "email", FieldOptions::new().project(Projection::new()));

        assert_eq!(email.value(), Some(json!("")));
        assert!(email.is_empty());
        assert!(!email.is_updated());
        assert_eq!(form.initial_fields(), json!({"email": null}));
        assert!(email.flags().contains(FieldFlags::EMPTY));
    }

    #[test]
    fn test_projection_transforms() {
        let form = form(r#"{"fields": {"price": 1250}}"#);
        let cents = Projection::new()
            .get_value(|v| v.and_then(Value::as_i64).map(|c| json!(c as f64 / 100.0)))
            .set_value(|v| {
                v.as_f64()
                    .map(|d| json!((d * 100.0).round() as i64))
                    .unwrap_or(Value::Null)
            });
        let price = bind(&form, "price", FieldOptions::new().project(cents));

        assert_eq!(price.passed_value(), Some(json!(12.5)));
        assert_eq!(price.input_props().value, Some(json!(12.5)));

        price.on_input(3.5);
        assert_eq!(price.value(), Some(json!(350)));
        assert!(price.is_updated());
    }

    #[test]
    fn test_unset_if_null_removes_blank_values() {
        let form = form(r#"{"fields": {"nick": ""}}"#);
        let nick = bind(&form, "nick", FieldOptions::new().unset_if_null(true));

        assert_eq!(nick.value(), None);
        assert_eq!(form.fields(), json!({}));
        assert_eq!(nick.initial_value(), Value::Null);

        nick.on_input("bob");
        assert_eq!(form.fields(), json!({"nick": "bob"}));

        nick.on_input("");
        assert_eq!(form.fields(), json!({}));
        assert!(!nick.is_updated());
    }

    #[test]
    fn test_write_back_settles_after_one_write() {
        let form = form(r#"{"fields": {"name": ""}}"#);
        let (writes, bump) = hits();
        form.reactor()
            .watch(|t| t.track(FormTopic::Field("name".into())), bump);

        let name = bind(&form, "name", FieldOptions::new());
        assert_eq!(writes.get(), 1);

        name.on_input("a");
        assert_eq!(writes.get(), 2);
        name.on_input("a");
        assert_eq!(writes.get(), 2);
        assert!(name.is_updated());

        name.on_input(Value::Array(vec![]));
        assert_eq!(writes.get(), 3);
        assert_eq!(name.value(), Some(Value::Null));
        assert!(!name.is_updated());
    }

    #[test]
    fn test_errors_and_descendents() {
        let form = form(
            r#"{
                "fields": {"address": {"city": "", "zip": ""}, "addr": null},
                "errors": {"address.city": ["required", "too short"], "address.zip": ""}
            }"#,
        );
        let address = bind(&form, "address", FieldOptions::new());
        let city = bind(&form, "address.city", FieldOptions::new());
        let zip = bind(&form, "address.zip", FieldOptions::new());
        let addr = bind(&form, "addr", FieldOptions::new());

        assert_eq!(city.error(), Some(json!("required")));
        assert!(city.has_error());
        assert!(!city.has_descendents_error());

        assert_eq!(address.error(), None);
        assert!(address.has_descendents_error());
        assert!(address.has_error_or_has_descendents_error());

        // blank entries are not errors
        assert_eq!(zip.error(), None);
        assert!(!zip.has_error());

        // a shared name prefix is not nesting
        assert!(!addr.has_descendents_error());

        form.clear_errors();
        assert!(!city.has_error());
        assert!(!address.has_descendents_error());
    }

    #[test]
    fn test_error_focus_outer_defers_to_inner() {
        let form = form(r#"{"fields": {"a": {"b": "x"}}}"#);
        let (outer_hits, outer_focus) = hits();
        let (inner_hits, inner_focus) = hits();
        let _a = bind(&form, "a", FieldOptions::new().on_focus(outer_focus));
        let _ab = bind(&form, "a.b", FieldOptions::new().on_focus(inner_focus));

        form.set_error("a", "required");
        form.set_error("a.b", "invalid");
        form.wait_for_error_focus();

        assert_eq!(outer_hits.get(), 1);
        assert_eq!(inner_hits.get(), 1);
        assert!(!form.waiting_for_error_focus());
    }

    #[test]
    fn test_error_focus_is_consumed_once() {
        let form = form(r#"{"fields": {"a": {"b": "x"}, "c": "y"}}"#);
        let (a_hits, a_focus) = hits();
        let (ab_hits, ab_focus) = hits();
        let (c_hits, c_focus) = hits();
        let _a = bind(&form, "a", FieldOptions::new().on_focus(a_focus));
        let _ab = bind(&form, "a.b", FieldOptions::new().on_focus(ab_focus));
        let _c = bind(&form, "c", FieldOptions::new().on_focus(c_focus));

        form.set_error("a.b", "invalid");
        form.set_error("c", "required");
        form.wait_for_error_focus();

        assert_eq!((a_hits.get(), ab_hits.get(), c_hits.get()), (1, 1, 0));
        assert!(!form.waiting_for_error_focus());
    }

    #[test]
    fn test_error_focus_evaluated_at_creation() {
        let form = form(
            r#"{"fields": {"x": 1}, "errors": {"x": "bad"}, "waiting_for_error_focus": true}"#,
        );
        let (focused, focus) = hits();
        let _x = bind(&form, "x", FieldOptions::new().on_focus(focus));

        assert_eq!(focused.get(), 1);
        assert!(!form.waiting_for_error_focus());
    }

    #[test]
    fn test_focus_strategy_resolution() {
        let form = form("{}");
        let (explicit_hits, explicit) = hits();
        let (default_hits, default) = hits();

        let both = bind(
            &form,
            "a",
            FieldOptions::new().on_focus(explicit).on_focus_default(default),
        );
        both.focus();
        assert_eq!((explicit_hits.get(), default_hits.get()), (1, 0));

        let (fallback_hits, fallback) = hits();
        let fallback_only = bind(&form, "b", FieldOptions::new().on_focus_default(fallback));
        fallback_only.focus();
        assert_eq!(fallback_hits.get(), 1);

        // nothing to call
        bind(&form, "c", FieldOptions::new().on_focus(NoFocus)).focus();
        bind(&form, "d", FieldOptions::new()).focus();
    }

    #[test]
    fn test_blur_validates_and_touches() {
        let form = form(r#"{"fields": {"email": ""}}"#);
        form.set_validator(|fields: &Value| {
            let mut errors = ErrorMap::new();
            if fields["email"].is_null() {
                errors.insert("email".into(), "required".into());
            }
            errors
        });
        let email = bind(&form, "email", FieldOptions::new());
        assert!(!email.is_touched());
        assert!(!email.has_error());

        let listeners = email.input_listeners();
        (listeners.blur)();
        assert!(email.is_touched());
        assert_eq!(email.error(), Some(json!("required")));
        assert_eq!(email.flags(), FieldFlags::TOUCHED | FieldFlags::HAS_ERROR);

        (listeners.input)(FieldInput::from("a@b"));
        (listeners.blur)();
        assert!(!email.has_error());
        assert_eq!(email.flags(), FieldFlags::TOUCHED | FieldFlags::UPDATED);
    }

    #[test]
    fn test_listeners_do_not_keep_binding_alive() {
        let form = form(r#"{"fields": {"a": "x"}}"#);
        let listeners = bind(&form, "a", FieldOptions::new()).input_listeners();

        assert!(form.reactor().is_empty());
        (listeners.input)(FieldInput::from("y"));
        (listeners.blur)();
        assert_eq!(form.fields(), json!({"a": "x"}));
        assert!(!form.is_touched("a"));
    }

    #[test]
    fn test_input_props_snapshot() {
        let form = form(r#"{"fields": {"user": {"email": "a@b"}}}"#);
        let email = bind(&form, "user.email", FieldOptions::new());

        insta::assert_json_snapshot!(email.input_props(), @r#"
        {
          "id": "user.email",
          "name": "user.email",
          "value": "a@b"
        }
        "#);
    }

    #[test]
    fn test_label_falls_back_to_name() {
        let form = form("{}");
        assert_eq!(bind(&form, "email", FieldOptions::new()).label(), "email");
        assert_eq!(bind(&form, "email", FieldOptions::new().label("")).label(), "email");

        let label = signal("E-mail".to_string());
        let email = bind(&form, "email", FieldOptions::new().label(label.clone()));
        assert_eq!(email.label(), "E-mail");
        label.set("Address".into());
        assert_eq!(email.label(), "Address");
    }

    #[test]
    fn test_dynamic_name_follows_renames() {
        let form = form(r#"{"fields": {"items": ["a", "b"]}}"#);
        let name = signal("items.0".to_string());
        let item = FieldBinding::new(form.clone(), name.clone(), FieldOptions::new());

        assert_eq!(item.value(), Some(json!("a")));
        assert_eq!(form.initial_fields(), json!({"items": ["a"]}));

        name.set("items.1".into());
        assert_eq!(item.name(), "items.1");
        assert_eq!(item.value(), Some(json!("b")));
        assert_eq!(form.initial_fields(), json!({"items": ["a", "b"]}));
        assert!(!item.is_updated());

        // dependencies moved with the name
        form.set_field("items.0", json!(""));
        assert_eq!(form.field("items.0"), Some(json!("")));
        form.set_field("items.1", json!(""));
        assert_eq!(form.field("items.1"), Some(Value::Null));
        assert_eq!(item.value(), Some(Value::Null));
    }

    #[test]
    fn test_watch_until_disposed() {
        let form = form(r#"{"fields": {"name": "x"}}"#);
        let name = bind(&form, "name", FieldOptions::new());
        let (seen, bump) = hits();
        let watching = name.watch(bump);

        name.on_input("y");
        form.set_touched("name");
        form.set_error("name", "taken");
        assert_eq!(seen.get(), 3);

        watching.run();
        name.on_input("z");
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn test_dispose_detaches_from_form() {
        let form = form(r#"{"fields": {"name": "x"}}"#);
        let name = bind(&form, "name", FieldOptions::new());
        assert!(!form.reactor().is_empty());

        name.dispose();
        assert!(name.is_disposed());
        assert!(form.reactor().is_empty());

        // no more write-back
        form.set_field("name", json!(""));
        assert_eq!(form.field("name"), Some(json!("")));

        let other = bind(&form, "other", FieldOptions::new());
        drop(other);
        assert!(form.reactor().is_empty());
    }

    #[test]
    fn test_parent_scope_disposes_bindings() {
        let form = form("{}");
        let scope = Scope::new();
        let a = bind(&form, "a", FieldOptions::new().scope(&scope));
        let b = bind(&form, "b", FieldOptions::new().scope(&scope));

        scope.dispose();
        assert!(a.is_disposed() && b.is_disposed());
        assert!(form.reactor().is_empty());
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let form = form(r#"{"fields": {"list": []}}"#);
        let item = bind(&form, "list.18446744073709551615", FieldOptions::new());

        assert_eq!(item.value(), None);
        assert_eq!(item.initial_value(), Value::Null);
        item.on_input("x");
        item.reset();
        assert_eq!(form.fields(), json!({"list": []}));
        assert_eq!(form.initial_fields(), json!({}));
    }

    #[test]
    fn test_dropped_bindings_release_name_subscriptions() {
        let form = form(r#"{"fields": {"items": ["a"]}}"#);
        let name = signal("items.0".to_string());
        for _ in 0..100 {
            let item = FieldBinding::new(form.clone(), name.clone(), FieldOptions::new());
            assert_eq!(name.subscriber_count(), 1);
            drop(item);
        }
        assert_eq!(name.subscriber_count(), 0);
        assert!(form.reactor().is_empty());
    }
}
