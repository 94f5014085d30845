use uuid::Uuid;

use profile_update::config::ProfileUpdateConfig;
use profile_update::contract::error::{FieldError, ProfileError, ValidationErrors};
use profile_update::contract::model::ProfilePatch;
use profile_update::domain::error::DomainError;
use profile_update::domain::fields::{FieldKindSpec, FieldRegistry, RegistryError};
use profile_update::ProfileModule;
// Note: These internal module imports are only for testing
// External consumers should only use the `contract` module

#[test]
fn test_profile_patch_default() {
    let patch = ProfilePatch::default();
    assert_eq!(patch.email, None);
    assert!(patch.additional_fields.is_empty());
    assert!(patch.is_empty());

    let patch = ProfilePatch {
        email: Some("a@b.com".to_string()),
        ..Default::default()
    };
    assert!(!patch.is_empty());
}

#[test]
fn test_validation_errors_keep_first_per_field() {
    let mut errors = ValidationErrors::new();
    errors.add("age", FieldError::invalid_value("too small"));
    errors.add("age", FieldError::UnknownField);
    errors.add("email", FieldError::InvalidEmail);

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.get("age"), Some(&FieldError::invalid_value("too small")));
    assert_eq!(
        errors.to_string(),
        "age: invalid value: too small; email: invalid email"
    );

    let codes: Vec<_> = errors.iter().map(|(f, e)| (f.as_str(), e.code())).collect();
    assert_eq!(codes, vec![("age", "invalid_value"), ("email", "invalid_email")]);

    assert!(ValidationErrors::new().into_result().is_ok());
    assert!(errors.into_result().is_err());
}

#[test]
fn test_contract_error_mapping() {
    let id = Uuid::new_v4();
    match ProfileError::from(DomainError::user_not_found(id)) {
        ProfileError::NotFound { id: error_id } => assert_eq!(error_id, id),
        other => panic!("Expected NotFound error, got {other:?}"),
    }

    match ProfileError::from(DomainError::email_not_available("x@y.com".to_string())) {
        ProfileError::Conflict { email } => assert_eq!(email, "x@y.com"),
        other => panic!("Expected Conflict error, got {other:?}"),
    }

    let mut errors = ValidationErrors::new();
    errors.add("nickname", FieldError::UnknownField);
    match ProfileError::from(DomainError::validation_failed(errors.clone())) {
        ProfileError::Validation { errors: mapped } => assert_eq!(mapped, errors),
        other => panic!("Expected Validation error, got {other:?}"),
    }

    // storage details never cross the contract boundary
    let err = ProfileError::from(DomainError::database("connection reset"));
    assert!(matches!(err, ProfileError::Internal));
    assert_eq!(err.to_string(), "Internal error");
}

#[test]
fn test_profile_update_config() {
    let config = ProfileUpdateConfig::default();
    assert!(config.fields.is_empty());
    assert_eq!(config.max_fields_per_update, 64);

    let json_config = serde_json::json!({
        "max_fields_per_update": 8,
        "fields": [
            { "name": "nickname", "kind": "string", "max_length": 32 },
            { "name": "plan", "kind": "enum", "values": ["free", "pro"], "required": true }
        ]
    });
    let config = ProfileModule::config_from_value(Some(&json_config)).expect("Should deserialize");
    assert_eq!(config.max_fields_per_update, 8);
    assert_eq!(config.fields.len(), 2);
    assert_eq!(config.fields[1].kind, FieldKindSpec::Enum);

    let registry = FieldRegistry::from_specs(config.fields).unwrap();
    assert!(registry.get("plan").unwrap().is_required());

    let defaults = ProfileModule::config_from_value(None).unwrap();
    assert_eq!(defaults.max_fields_per_update, 64);

    let bad = serde_json::json!({ "page_size": 10 });
    assert!(ProfileModule::config_from_value(Some(&bad)).is_err());
}

#[test]
fn test_config_field_cannot_shadow_email() {
    let json_config = serde_json::json!({
        "fields": [
            { "name": "nickname", "kind": "string" },
            { "name": "email", "kind": "number" }
        ]
    });
    let config = ProfileModule::config_from_value(Some(&json_config)).unwrap();

    let err = FieldRegistry::from_specs(config.fields).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidDefinition { ref name, .. } if name == "email"));
}
