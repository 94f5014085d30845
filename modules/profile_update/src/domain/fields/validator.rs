//! Pure validation of raw additional-field input against a [`FieldRegistry`].

use serde_json::{Number, Value};
use validator::ValidateEmail;

use super::{FieldDefinition, FieldKind, FieldRegistry, FieldRule};
use crate::contract::error::{FieldError, ValidationErrors};
use crate::contract::model::AdditionalFields;

/// Validate a partial update of additional fields.
///
/// Returns the coerced values for every key that passed, plus every problem
/// found. A required field is only reported missing when it is absent from
/// both `input` and `existing`.
pub fn validate(
    input: &AdditionalFields,
    existing: &AdditionalFields,
    registry: &FieldRegistry,
) -> (AdditionalFields, ValidationErrors) {
    let mut clean = AdditionalFields::new();
    let mut errors = ValidationErrors::new();

    for (name, raw) in input {
        let Some(def) = registry.get(name) else {
            errors.add(name.as_str(), FieldError::UnknownField);
            continue;
        };
        match coerce(def, raw) {
            Ok(value) => {
                clean.insert(name.clone(), value);
            }
            Err(e) => errors.add(name.as_str(), e),
        }
    }

    for def in registry.required() {
        let present = |fields: &AdditionalFields| {
            fields.get(def.name()).is_some_and(|v| !v.is_null())
        };
        if !input.contains_key(def.name()) && !present(existing) {
            errors.add(def.name(), FieldError::MissingRequired);
        }
    }

    (clean, errors)
}

/// Validate a full field set, as supplied on registration.
pub fn validate_complete(
    input: &AdditionalFields,
    registry: &FieldRegistry,
) -> (AdditionalFields, ValidationErrors) {
    validate(input, &AdditionalFields::new(), registry)
}

/// Blank or malformed addresses are rejected, as are host-only domains
/// (`user@localhost`) and domains without an alphabetic top-level label.
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.trim().is_empty() || !email.validate_email() || !has_public_domain(email) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

fn has_public_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let mut labels = domain.rsplit('.');
    let tld = labels.next().unwrap_or_default();
    labels.next().is_some_and(|l| !l.is_empty())
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

fn coerce(def: &FieldDefinition, raw: &Value) -> Result<Value, FieldError> {
    if raw.is_null() {
        return if def.is_required() {
            Err(FieldError::invalid_value("must not be null"))
        } else {
            Ok(Value::Null)
        };
    }

    let value = match def.kind() {
        FieldKind::String => {
            let s = raw
                .as_str()
                .ok_or_else(|| FieldError::invalid_value("expected a string"))?;
            let s = s.trim();
            if def.is_required() && s.is_empty() {
                return Err(FieldError::invalid_value("must not be blank"));
            }
            Value::String(s.to_string())
        }
        FieldKind::Number => Value::Number(coerce_number(raw)?),
        FieldKind::Boolean => Value::Bool(coerce_bool(raw)?),
        FieldKind::Enum(values) => {
            let s = raw
                .as_str()
                .filter(|s| values.iter().any(|v| v == s))
                .ok_or_else(|| {
                    FieldError::invalid_value(format!("expected one of: {}", values.join(", ")))
                })?;
            Value::String(s.to_string())
        }
    };

    for rule in def.rules() {
        apply_rule(rule, &value)?;
    }
    Ok(value)
}

fn coerce_number(raw: &Value) -> Result<Number, FieldError> {
    match raw {
        Value::Number(n) => Ok(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Number::from(i));
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| FieldError::invalid_value("expected a number"))
        }
        _ => Err(FieldError::invalid_value("expected a number")),
    }
}

fn coerce_bool(raw: &Value) -> Result<bool, FieldError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(FieldError::invalid_value("expected a boolean")),
    }
}

fn apply_rule(rule: &FieldRule, value: &Value) -> Result<(), FieldError> {
    match rule {
        FieldRule::Length { min, max } => {
            let len = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
            if let Some(min) = min {
                if len < *min {
                    return Err(FieldError::invalid_value(format!(
                        "must be at least {min} characters"
                    )));
                }
            }
            if let Some(max) = max {
                if len > *max {
                    return Err(FieldError::invalid_value(format!(
                        "must be at most {max} characters"
                    )));
                }
            }
        }
        FieldRule::Range { min, max } => {
            let n = value
                .as_f64()
                .ok_or_else(|| FieldError::invalid_value("expected a number"))?;
            if let Some(min) = min {
                if n < *min {
                    return Err(FieldError::invalid_value(format!("must be >= {min}")));
                }
            }
            if let Some(max) = max {
                if n > *max {
                    return Err(FieldError::invalid_value(format!("must be <= {max}")));
                }
            }
        }
        FieldRule::Pattern(re) => {
            if !value.as_str().is_some_and(|s| re.is_match(s)) {
                return Err(FieldError::invalid_value("does not match the expected format"));
            }
        }
        FieldRule::Email => {
            if !value.as_str().is_some_and(|s| validate_email(s).is_ok()) {
                return Err(FieldError::invalid_value("must be an email address"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> FieldRegistry {
        let mut r = FieldRegistry::new();
        r.register(
            FieldDefinition::new("display_name", FieldKind::String)
                .required()
                .with_rule(FieldRule::Length {
                    min: Some(2),
                    max: Some(20),
                }),
        )
        .unwrap();
        r.register(FieldDefinition::new("age", FieldKind::Number).with_rule(FieldRule::Range {
            min: Some(0.0),
            max: Some(150.0),
        }))
        .unwrap();
        r.register(FieldDefinition::new("newsletter", FieldKind::Boolean))
            .unwrap();
        r.register(FieldDefinition::new(
            "plan",
            FieldKind::Enum(vec!["free".into(), "pro".into()]),
        ))
        .unwrap();
        r.register(
            FieldDefinition::new("handle", FieldKind::String)
                .with_rule(FieldRule::pattern("[a-z0-9_]+").unwrap()),
        )
        .unwrap();
        r.register(FieldDefinition::new("backup_email", FieldKind::String).with_rule(FieldRule::Email))
            .unwrap();
        r
    }

    fn fields(v: Value) -> AdditionalFields {
        serde_json::from_value(v).unwrap()
    }

    fn existing() -> AdditionalFields {
        fields(json!({ "display_name": "Alice" }))
    }

    #[test]
    fn valid_input_is_coerced() {
        let input = fields(json!({
            "age": "42",
            "newsletter": "TRUE",
            "plan": "pro",
            "handle": "alice_1",
        }));
        let (clean, errors) = validate(&input, &existing(), &registry());

        assert!(errors.is_empty(), "unexpected errors: {errors}");
        assert_eq!(clean["age"], json!(42));
        assert_eq!(clean["newsletter"], json!(true));
        assert_eq!(clean["plan"], json!("pro"));
        assert_eq!(clean["handle"], json!("alice_1"));
    }

    #[test]
    fn unknown_key_is_reported() {
        let input = fields(json!({ "nickname": "bob" }));
        let (clean, errors) = validate(&input, &existing(), &registry());

        assert!(clean.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("nickname"), Some(&FieldError::UnknownField));
    }

    #[test]
    fn all_errors_are_collected() {
        let input = fields(json!({
            "age": 200,
            "plan": "enterprise",
            "handle": "Not Valid",
            "newsletter": 3,
            "nickname": "bob",
        }));
        let (clean, errors) = validate(&input, &existing(), &registry());

        assert!(clean.is_empty());
        assert_eq!(errors.len(), 5);
        for key in ["age", "plan", "handle", "newsletter"] {
            assert!(
                matches!(errors.get(key), Some(FieldError::InvalidValue { .. })),
                "expected InvalidValue for {key}"
            );
        }
        assert_eq!(errors.get("nickname"), Some(&FieldError::UnknownField));
    }

    #[test]
    fn valid_keys_survive_next_to_invalid_ones() {
        let input = fields(json!({ "age": 30, "plan": "gold" }));
        let (clean, errors) = validate(&input, &existing(), &registry());

        assert_eq!(clean.get("age"), Some(&json!(30)));
        assert!(errors.contains("plan"));
        assert!(!errors.contains("age"));
    }

    #[test]
    fn required_field_rules() {
        let r = registry();

        // satisfied by the stored value
        let (_, errors) = validate(&AdditionalFields::new(), &existing(), &r);
        assert!(errors.is_empty());

        // absent everywhere
        let (_, errors) = validate(&AdditionalFields::new(), &AdditionalFields::new(), &r);
        assert_eq!(errors.get("display_name"), Some(&FieldError::MissingRequired));

        // blank or null
        let (_, errors) = validate(&fields(json!({ "display_name": "  " })), &existing(), &r);
        assert!(matches!(errors.get("display_name"), Some(FieldError::InvalidValue { .. })));
        let (_, errors) = validate(&fields(json!({ "display_name": null })), &existing(), &r);
        assert!(matches!(errors.get("display_name"), Some(FieldError::InvalidValue { .. })));

        // too short
        let (_, errors) = validate(&fields(json!({ "display_name": "A" })), &existing(), &r);
        assert!(matches!(errors.get("display_name"), Some(FieldError::InvalidValue { .. })));
    }

    #[test]
    fn strings_are_trimmed_before_length_check_and_storage() {
        let r = registry();
        let (clean, errors) =
            validate(&fields(json!({ "display_name": "   Bob   " })), &existing(), &r);
        assert!(errors.is_empty());
        assert_eq!(clean["display_name"], json!("Bob"));

        let padded = format!("  {}  ", "x".repeat(20));
        let (clean, errors) = validate(&fields(json!({ "display_name": padded })), &existing(), &r);
        assert!(errors.is_empty());
        assert_eq!(clean["display_name"].as_str().map(str::len), Some(20));
    }

    #[test]
    fn null_clears_optional_field() {
        let (clean, errors) = validate(&fields(json!({ "age": null })), &existing(), &registry());
        assert!(errors.is_empty());
        assert_eq!(clean.get("age"), Some(&Value::Null));
    }

    #[test]
    fn validate_complete_requires_all_required_fields() {
        let r = registry();
        let (_, errors) = validate_complete(&fields(json!({ "age": 1 })), &r);
        assert_eq!(errors.get("display_name"), Some(&FieldError::MissingRequired));

        let (clean, errors) = validate_complete(&fields(json!({ "display_name": "Bob" })), &r);
        assert!(errors.is_empty());
        assert_eq!(clean.len(), 1);
    }

    #[test]
    fn email_rule_and_builtin_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert_eq!(validate_email(""), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("   "), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("not-an-email"), Err(FieldError::InvalidEmail));
        assert!(validate_email("first.last@mail.example.co").is_ok());
        for host_only in ["a@b", "user@localhost", "x@y.c", "x@y.123", "x@.com", "x@[10.0.0.1]"] {
            assert_eq!(
                validate_email(host_only),
                Err(FieldError::InvalidEmail),
                "{host_only} should be rejected"
            );
        }

        let (_, errors) = validate(
            &fields(json!({ "backup_email": "nope" })),
            &existing(),
            &registry(),
        );
        assert!(matches!(errors.get("backup_email"), Some(FieldError::InvalidValue { .. })));
    }
}
