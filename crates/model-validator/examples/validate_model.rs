//! Model Validation Example
//!
//! Validates a sign-up form with built-in and custom rules, then shows how
//! failures are reported.
//!
//! Run with:
//! ```bash
//! RUST_LOG=model_validator=debug cargo run -p model-validator --example validate_model
//! ```

use model_validator::{
    Attributes, FnCustomRule, ModelValidator, RuleSet, Schema, SyncCustomRule, ValidatorConfig,
    Value,
};
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("Model Validation Example");
    println!("========================\n");

    demonstrate_success().await;
    demonstrate_failures().await;
    demonstrate_json().await;

    println!("Summary:");
    println!("  - Built-in rules check the sanitized text of each value");
    println!("  - Custom rules run concurrently and may rewrite the value");
    println!("  - Every failed rule of every attribute is reported at once");
}

fn signup_schema() -> Schema {
    Schema::new()
        .attribute(
            "username",
            RuleSet::new()
                .rule("isAlphanumeric")
                .rule_with("len", vec![3, 16])
                .custom(
                    "available",
                    FnCustomRule::new(|slot| {
                        Box::pin(async move {
                            // Simulated lookup
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(slot.get().to_text() != "admin")
                        })
                    }),
                )
                .message("available", "Username is taken"),
        )
        .attribute(
            "email",
            RuleSet::new().rule("isEmail").custom(
                "lowercase",
                SyncCustomRule::new(|slot| {
                    slot.update(|value| {
                        if let Value::String(s) = value {
                            *s = s.to_lowercase();
                        }
                    });
                    Ok(true)
                }),
            ),
        )
        .attribute("age", RuleSet::new().required(false).rule("isInt").rule_with("min", 13))
}

async fn demonstrate_success() {
    println!("1. Valid Input");
    println!("--------------");

    let mut attributes = Attributes::new();
    attributes.insert("username".into(), Value::from("  ada "));
    attributes.insert("email".into(), Value::from("Ada@Example.COM"));

    match ModelValidator::new().validate(&attributes, &signup_schema()).await {
        Ok(values) => {
            let mut names: Vec<_> = values.keys().collect();
            names.sort();
            for name in names {
                println!("  {}: {:?}", name, values[name]);
            }
        }
        Err(err) => println!("  unexpected error: {}", err),
    }
    println!();
}

async fn demonstrate_failures() {
    println!("2. Invalid Input");
    println!("----------------");

    let mut attributes = Attributes::new();
    attributes.insert("username".into(), Value::from("admin"));
    attributes.insert("email".into(), Value::from("not-an-email"));
    attributes.insert("age".into(), Value::from(9));

    let validator = ModelValidator::new().with_config(ValidatorConfig::default().log_values(true));
    match validator.validate(&attributes, &signup_schema()).await {
        Ok(_) => println!("  unexpectedly valid"),
        Err(err) => {
            println!("  {}", err);
            if let Some(invalid) = err.as_invalid() {
                for (attribute, failure) in invalid.failures() {
                    println!("    {}.{}", attribute, failure);
                }
            }
        }
    }
    println!();
}

async fn demonstrate_json() {
    println!("3. JSON Schemas");
    println!("---------------");

    let result = ModelValidator::new()
        .validate_json(
            &json!({"aString": "abc", "aNumber": 123, "aStringWithWrongValue": 123}),
            &json!({
                "aString": {"notEmpty": null},
                "aNumber": {"isInt": null},
                "aStringWithWrongValue": {
                    "isAlpha": null,
                    "_messages": {"isAlpha": "Letters only"}
                }
            }),
        )
        .await;

    match result {
        Ok(values) => println!("  valid: {}", serde_json::to_string(&values).unwrap_or_default()),
        Err(err) => match err.as_invalid() {
            Some(invalid) => println!("  errors: {}", invalid.to_json()),
            None => println!("  schema error: {}", err),
        },
    }
    println!();
}
