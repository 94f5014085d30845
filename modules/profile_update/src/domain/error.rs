use thiserror::Error;
use uuid::Uuid;

use crate::contract::error::ValidationErrors;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("Validation failed: {errors}")]
    ValidationFailed { errors: ValidationErrors },

    #[error("Email '{email}' is not available")]
    EmailNotAvailable { email: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn validation_failed(errors: ValidationErrors) -> Self {
        Self::ValidationFailed { errors }
    }

    pub fn email_not_available(email: String) -> Self {
        Self::EmailNotAvailable { email }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
