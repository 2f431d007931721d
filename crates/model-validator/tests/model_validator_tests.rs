//! Model validation tests

use model_validator::custom::{FnCustomRule, SyncCustomRule};
use model_validator::{
    Attributes, ModelValidator, RuleSet, SanitizeMode, Schema, ValidatorConfig, ValidatorError,
    Value,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

fn attributes(pairs: &[(&str, Value)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn scenario_attributes() -> Attributes {
    attributes(&[
        ("aString", Value::from("abc")),
        ("aNumber", Value::Int(123)),
        ("aStringWithWrongValue", Value::Int(123)),
    ])
}

// ============================================================================
// Selection and Aggregation
// ============================================================================

#[tokio::test]
async fn test_validates_all_properties_with_rules() {
    let schema = Schema::new()
        .attribute("aString", RuleSet::new().rule("notEmpty"))
        .attribute("aNumber", RuleSet::new().rule("isInt"))
        .attribute("aStringWithWrongValue", RuleSet::new().rule("isAlpha"));

    let err = ModelValidator::new()
        .validate(&scenario_attributes(), &schema)
        .await
        .unwrap_err();

    let invalid = err.as_invalid().expect("validation failure");
    assert_eq!(invalid.len(), 1);
    assert!(!invalid.multiple());
    assert!(invalid.contains("aStringWithWrongValue"));
    assert_eq!(
        invalid.get("aStringWithWrongValue").unwrap().get("isAlpha").map(String::as_str),
        Some("Invalid characters")
    );
    assert_eq!(invalid.message(), "1 properties invalid: aStringWithWrongValue");
}

#[tokio::test]
async fn test_skips_optional_absent_attribute() {
    let schema = Schema::new()
        .attribute("aString", RuleSet::new().rule("notEmpty"))
        .attribute("aNumber", RuleSet::new().required(true).rule("isInt"))
        .attribute(
            "aStringWithWrongValue",
            RuleSet::new().required(false).rule("isAlpha"),
        );

    let values = ModelValidator::new()
        .validate(
            &attributes(&[("aString", Value::from("abc")), ("aNumber", Value::Int(123))]),
            &schema,
        )
        .await
        .unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values.get("aString"), Some(&Value::from("abc")));
    assert_eq!(values.get("aNumber"), Some(&Value::Int(123)));
    assert!(!values.contains_key("aStringWithWrongValue"));
}

#[tokio::test]
async fn test_presence_overrides_optional() {
    let schema = Schema::new()
        .attribute("aString", RuleSet::new().rule("notEmpty"))
        .attribute("aNumber", RuleSet::new().required(true).rule("isInt"))
        .attribute(
            "aStringWithWrongValue",
            RuleSet::new().required(false).rule("isAlpha"),
        );

    let err = ModelValidator::new()
        .validate(&scenario_attributes(), &schema)
        .await
        .unwrap_err();

    let invalid = err.into_invalid().unwrap();
    assert!(invalid.get("aStringWithWrongValue").unwrap().contains_key("isAlpha"));
}

#[tokio::test]
async fn test_required_missing_attribute_is_validated() {
    let schema = Schema::new().attribute("name", RuleSet::new().rule("notEmpty"));

    let err = ModelValidator::new()
        .validate(&Attributes::new(), &schema)
        .await
        .unwrap_err();

    assert_eq!(
        err.as_invalid().unwrap().to_json(),
        json!({"name": {"notEmpty": "String is whitespace"}})
    );
}

#[tokio::test]
async fn test_every_failing_attribute_is_reported() {
    let schema = Schema::new()
        .attribute("name", RuleSet::new().rule("notEmpty"))
        .attribute("email", RuleSet::new().rule("isEmail").rule_with("len", vec![8, 64]))
        .attribute("age", RuleSet::new().rule("isInt"));

    let err = ModelValidator::new()
        .validate(
            &attributes(&[
                ("name", Value::from("   ")),
                ("email", Value::from("test")),
                ("age", Value::Int(30)),
            ]),
            &schema,
        )
        .await
        .unwrap_err();

    let invalid = err.as_invalid().unwrap();
    assert!(invalid.multiple());
    assert_eq!(invalid.message(), "2 properties invalid: email, name");
    assert_eq!(
        serde_json::to_value(invalid).unwrap(),
        json!({
            "email": {"isEmail": "Invalid email", "len": "String is too small"},
            "name": {"notEmpty": "String is whitespace"}
        })
    );
    assert!(!invalid.contains("age"));
}

#[tokio::test]
async fn test_success_xor_error_membership() {
    let schema = Schema::new()
        .attribute("passes", RuleSet::new().rule("isAlpha"))
        .attribute("fails", RuleSet::new().rule("isInt"))
        .attribute("optionalAbsent", RuleSet::new().required(false).rule("isInt"))
        .attribute("optionalNull", RuleSet::new().required(false).rule("isInt"))
        .attribute("optionalPresent", RuleSet::new().required(false).rule("isInt"))
        .attribute("requiredAbsent", RuleSet::new().rule("notNull"));
    let input = attributes(&[
        ("passes", Value::from("abc")),
        ("fails", Value::from("abc")),
        ("optionalNull", Value::Null),
        ("optionalPresent", Value::Int(7)),
        ("notInSchema", Value::from("x")),
    ]);

    let invalid = ModelValidator::new()
        .validate(&input, &schema)
        .await
        .unwrap_err()
        .into_invalid()
        .unwrap();
    let failed: HashSet<&str> = invalid.errors().keys().map(String::as_str).collect();
    assert_eq!(failed, HashSet::from(["fails", "requiredAbsent"]));

    // Same schema without the failing attributes succeeds with exactly the selected ones
    let schema = schema
        .update("fails", |_| RuleSet::new())
        .update("requiredAbsent", |_| RuleSet::new().required(false));
    let values = ModelValidator::new().validate(&input, &schema).await.unwrap();
    let passed: HashSet<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(passed, HashSet::from(["passes", "fails", "optionalPresent"]));
}

// ============================================================================
// Sanitization
// ============================================================================

#[tokio::test]
async fn test_values_are_sanitized() {
    let schema = Schema::new()
        .attribute("bio", RuleSet::new().rule("notEmpty"))
        .attribute("age", RuleSet::new().rule("isInt"));

    let values = ModelValidator::new()
        .validate(
            &attributes(&[("bio", Value::from("  <b>hi</b>  ")), ("age", Value::Int(3))]),
            &schema,
        )
        .await
        .unwrap();

    assert_eq!(values.get("bio"), Some(&Value::from("&lt;b&gt;hi&lt;/b&gt;")));
    assert_eq!(values.get("age"), Some(&Value::Int(3)));
}

#[tokio::test]
async fn test_legacy_sanitize_stringifies_every_value() {
    let schema = Schema::new()
        .attribute("age", RuleSet::new().rule("isInt"))
        .attribute("raw", RuleSet::new().sanitize(SanitizeMode::Off));
    let validator = ModelValidator::new().with_config(ValidatorConfig::new().legacy_sanitize());

    let values = validator
        .validate(
            &attributes(&[("age", Value::Int(3)), ("raw", Value::from(" <x> "))]),
            &schema,
        )
        .await
        .unwrap();

    assert_eq!(values.get("age"), Some(&Value::from("3")));
    assert_eq!(values.get("raw"), Some(&Value::from(" <x> ")));
}

#[tokio::test]
async fn test_non_ascii_digits_fail_date_rule() {
    let schema = Schema::new().attribute("d", RuleSet::new().rule("isDate"));
    let validator = ModelValidator::new();

    for text in ["٢٠٢٤-٠١-١٩T١٢:٠٠:٠٠Z", "٢٠٢٤-٠١-١٩", "2024-01-19T١٢:٠٠:٠٠Z"] {
        let err = validator
            .validate(&attributes(&[("d", Value::from(text))]), &schema)
            .await
            .unwrap_err();
        assert_eq!(
            err.as_invalid().unwrap().to_json(),
            json!({"d": {"isDate": "Not a date"}})
        );
    }

    let values = validator
        .validate(&attributes(&[("d", Value::from("2024-01-19T12:00:00Z"))]), &schema)
        .await
        .unwrap();
    assert_eq!(values.get("d"), Some(&Value::from("2024-01-19T12:00:00Z")));
}

// ============================================================================
// Custom Rules
// ============================================================================

#[tokio::test]
async fn test_custom_rule_mutation_reaches_result() {
    let schema = Schema::new().attribute(
        "name",
        RuleSet::new().rule("notEmpty").custom(
            "upper",
            SyncCustomRule::new(|slot| {
                slot.update(|v| *v = Value::String(v.to_text().to_uppercase()));
                Ok(true)
            }),
        ),
    );

    let values = ModelValidator::new()
        .validate(&attributes(&[("name", Value::from(" ada "))]), &schema)
        .await
        .unwrap();

    assert_eq!(values.get("name"), Some(&Value::from("ADA")));
}

#[tokio::test]
async fn test_custom_failures_at_model_level() {
    let schema = Schema::new()
        .attribute(
            "returnsFalse",
            RuleSet::new().custom("custom", SyncCustomRule::new(|_| Ok(false))),
        )
        .attribute(
            "throws",
            RuleSet::new().custom(
                "custom",
                SyncCustomRule::new(|_| Err(anyhow::anyhow!("TESTERROR"))),
            ),
        );
    let input = attributes(&[
        ("returnsFalse", Value::from("test")),
        ("throws", Value::from("test")),
    ]);

    let invalid = ModelValidator::new()
        .validate(&input, &schema)
        .await
        .unwrap_err()
        .into_invalid()
        .unwrap();

    assert_eq!(
        invalid.to_json(),
        json!({"returnsFalse": {"custom": ""}, "throws": {"custom": "TESTERROR"}})
    );
}

#[tokio::test]
async fn test_attributes_are_validated_concurrently() {
    // Both rules wait on the same barrier; sequential validation would never finish
    let barrier = Arc::new(Barrier::new(2));
    let rule = |barrier: Arc<Barrier>| {
        FnCustomRule::new(move |_slot| {
            let barrier = barrier.clone();
            Box::pin(async move {
                barrier.wait().await;
                Ok(true)
            })
        })
    };
    let schema = Schema::new()
        .attribute("a", RuleSet::new().custom("meet", rule(barrier.clone())))
        .attribute("b", RuleSet::new().custom("meet", rule(barrier.clone())));
    let input = attributes(&[("a", Value::Int(1)), ("b", Value::Int(2))]);

    let validator = ModelValidator::new();
    let values = tokio::time::timeout(Duration::from_secs(5), validator.validate(&input, &schema))
        .await
        .expect("attributes should be validated concurrently")
        .unwrap();
    assert_eq!(values.len(), 2);
}

#[tokio::test]
async fn test_no_fail_fast() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();
    let schema = Schema::new()
        .attribute("fast", RuleSet::new().rule("isInt"))
        .attribute(
            "slow",
            RuleSet::new().custom(
                "slow",
                FnCustomRule::new(move |_slot| {
                    let flag = flag.clone();
                    Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        flag.store(true, Ordering::SeqCst);
                        Ok(false)
                    })
                }),
            ),
        );
    let input = attributes(&[("fast", Value::from("abc")), ("slow", Value::from("x"))]);

    let invalid = ModelValidator::new()
        .validate(&input, &schema)
        .await
        .unwrap_err()
        .into_invalid()
        .unwrap();

    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(invalid.len(), 2);
}

#[tokio::test]
async fn test_caller_imposed_timeout() {
    let schema = Schema::new().attribute(
        "slow",
        RuleSet::new().custom(
            "slow",
            FnCustomRule::new(|_slot| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(true)
                })
            }),
        ),
    );
    let input = attributes(&[("slow", Value::from("x"))]);
    let validator = ModelValidator::new();

    let result =
        tokio::time::timeout(Duration::from_millis(20), validator.validate(&input, &schema)).await;
    assert!(result.is_err());
}

// ============================================================================
// JSON Entry Point
// ============================================================================

#[tokio::test]
async fn test_validate_json_scenarios() {
    let schema = json!({
        "aString": {"notEmpty": null},
        "aNumber": {"required": true, "isInt": null},
        "aStringWithWrongValue": {
            "required": false,
            "isAlpha": null,
            "_messages": {"isAlpha": "letters only"}
        }
    });
    let validator = ModelValidator::new();

    let values = validator
        .validate_json(&json!({"aString": "abc", "aNumber": 123}), &schema)
        .await
        .unwrap();
    assert_eq!(serde_json::to_value(&values).unwrap(), json!({"aString": "abc", "aNumber": 123}));

    let err = validator
        .validate_json(
            &json!({"aString": "abc", "aNumber": 123, "aStringWithWrongValue": 123}),
            &schema,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.as_invalid().unwrap().to_json(),
        json!({"aStringWithWrongValue": {"isAlpha": "letters only"}})
    );
}

#[tokio::test]
async fn test_validate_json_non_true_required_is_optional() {
    let schema = json!({
        "a": {"required": null, "isInt": null},
        "b": {"required": "yes", "isInt": null},
        "c": {"required": 1, "isInt": null},
        "d": {"required": true, "isInt": null}
    });
    let validator = ModelValidator::new();

    let err = validator.validate_json(&json!({}), &schema).await.unwrap_err();
    let invalid = err.as_invalid().expect("only the required attribute fails");
    assert_eq!(invalid.len(), 1);
    assert!(invalid.contains("d"));

    let values = validator
        .validate_json(&json!({"a": 1, "d": 2}), &schema)
        .await
        .unwrap();
    assert_eq!(serde_json::to_value(&values).unwrap(), json!({"a": 1, "d": 2}));
}

#[tokio::test]
async fn test_validate_json_schema_errors_are_defects() {
    let err = ModelValidator::new()
        .validate_json(&json!({"a": 1}), &json!({"a": {"_messages": "oops"}}))
        .await
        .unwrap_err();
    assert!(matches!(err, ValidatorError::Schema(_)));
    assert!(!err.is_invalid());
}

#[tokio::test]
async fn test_compiled_schema_reuse() {
    let validator = ModelValidator::new();
    let compiled = validator
        .compile(&Schema::new().attribute("n", RuleSet::new().rule("isInt")))
        .unwrap();

    for (input, ok) in [(Value::Int(1), true), (Value::from("x"), false), (Value::from("42"), true)] {
        let result = validator
            .validate_compiled(&attributes(&[("n", input)]), &compiled)
            .await;
        assert_eq!(result.is_ok(), ok);
    }
}
