use std::rc::Rc;

use reform::prelude::*;
use reform_core::LastRequest;
use serde_json::{Value, json};

const INITIAL: &str = r#"{
    "fields": {
        "user": {"name": "", "email": ""},
        "newsletter": false
    }
}"#;

fn validate(fields: &Value) -> ErrorMap {
    let mut errors = ErrorMap::new();
    let user = &fields["user"];
    if user["name"].is_null() {
        errors.insert("user.name".into(), "required".into());
    }
    match user["email"].as_str() {
        None => {
            errors.insert("user.email".into(), "required".into());
        }
        Some(email) if !email.contains('@') => {
            errors.insert(
                "user.email".into(),
                vec![json!("invalid address"), json!("missing '@'")].into(),
            );
        }
        Some(_) => {}
    }
    errors
}

fn field(form: &Rc<Form>, name: &str, label: &str) -> FieldBinding {
    let focus = {
        let name = name.to_owned();
        move || log::info!("focus -> {name}")
    };
    FieldBinding::new(
        form.clone(),
        name,
        FieldOptions::new().label(label).on_focus(focus),
    )
}

fn report(fields: &[&FieldBinding]) {
    for f in fields {
        println!(
            "{:<12} value={:<22} error={:<18} flags={:?}",
            f.label(),
            f.value().map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
            f.error().map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
            f.flags(),
        );
    }
}

// Stand-in for a remote uniqueness check; only the latest lookup reports.
async fn email_available(email: String) -> Result<bool, anyhow::Error> {
    Ok(!email.starts_with("taken@"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let form = Rc::new(Form::from_json(INITIAL)?);
    form.set_validator(validate);

    let user = field(&form, "user", "Account");
    let name = field(&form, "user.name", "Name");
    let email = field(&form, "user.email", "E-mail");
    let newsletter = FieldBinding::new(
        form.clone(),
        "newsletter",
        FieldOptions::new().label("Newsletter").unset_if_null(true),
    );
    let all = [&user, &name, &email, &newsletter];

    println!("-- initial");
    report(&all);

    let listeners = email.input_listeners();
    (listeners.input)(InputEvent::new("jane.example.com").into());
    (listeners.blur)();
    println!("-- after e-mail blur");
    report(&all);

    if !form.validate_and_focus() {
        println!("-- submit rejected");
        report(&all);
    }

    name.on_input("Jane");
    email.on_input("jane@example.com");
    newsletter.on_input(true);

    let address = email
        .value()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();
    let lookups = LastRequest::with_on_cancel(|| log::debug!("stale lookup dropped"));
    let stale = lookups.run(email_available("taken@example.com".into()));
    let latest = lookups.run(email_available(address));
    if pollster::block_on(stale)?.is_none() {
        log::info!("first lookup superseded");
    }
    if let Some(available) = pollster::block_on(latest)? {
        println!("-- e-mail available: {available}");
    }

    if form.validate_and_focus() {
        println!("-- submitted {}", serde_json::to_string_pretty(&form.fields())?);
    }
    report(&all);

    name.reset();
    println!("-- name reset, updated: {}", name.is_updated());
    Ok(())
}
