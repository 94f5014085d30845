use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Why a single field was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown field")]
    UnknownField,

    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },

    #[error("required field is missing")]
    MissingRequired,

    #[error("invalid email")]
    InvalidEmail,
}

impl FieldError {
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownField => "unknown_field",
            Self::InvalidValue { .. } => "invalid_value",
            Self::MissingRequired => "missing_required",
            Self::InvalidEmail => "invalid_email",
        }
    }
}

/// Every field-level problem found while validating one request.
///
/// Keyed by field name; only the first problem per field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` for `field` unless that field already has one.
    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.0.entry(field.into()).or_insert(error);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        for (field, error) in other.0 {
            self.add(field, error);
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldError> {
        self.0.iter()
    }

    /// `Err(self)` when anything was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = (String, FieldError);
    type IntoIter = btree_map::IntoIter<String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = (&'a String, &'a FieldError);
    type IntoIter = btree_map::Iter<'a, String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum ProfileError {
    #[error("User not found: {id}")]
    NotFound { id: Uuid },

    #[error("Validation failed: {errors}")]
    Validation { errors: ValidationErrors },

    #[error("Email '{email}' is not available")]
    Conflict { email: String },

    #[error("Internal error")]
    Internal,
}

impl ProfileError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation { errors }
    }

    pub fn conflict(email: String) -> Self {
        Self::Conflict { email }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for ProfileError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } => Self::not_found(id),
            ValidationFailed { errors } => Self::validation(errors),
            EmailNotAvailable { email } => Self::conflict(email),
            Database { .. } => Self::internal(),
        }
    }
}
