use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::error::{FieldError, ValidationErrors};
use crate::contract::model::{NewUser, ProfilePatch, User};
use crate::domain::error::DomainError;
use crate::domain::events::ProfileDomainEvent;
use crate::domain::fields::{self, FieldRegistry};
use crate::domain::ports::EventPublisher;
use crate::domain::repo::{RepoError, UsersRepository};

/// Domain service with business rules for profile updates.
/// Depends only on the repository port and the field registry, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    registry: Arc<FieldRegistry>,
    events: Arc<dyn EventPublisher<ProfileDomainEvent>>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_fields_per_update: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_fields_per_update: 64,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repo: Arc<dyn UsersRepository>,
        registry: Arc<FieldRegistry>,
        events: Arc<dyn EventPublisher<ProfileDomainEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            registry,
            events,
            config,
        }
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.registry
    }

    #[instrument(name = "profile_update.service.get_profile", skip(self), fields(user_id = %id))]
    pub async fn get_profile(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting profile by id");
        self.load(id).await
    }

    #[instrument(
        name = "profile_update.service.update_profile",
        skip(self, patch),
        fields(user_id = %id, email_present = patch.email.is_some(), field_count = patch.additional_fields.len())
    )]
    pub async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<User, DomainError> {
        info!("Updating profile");

        let mut current = self.load(id).await?;

        // Structural validation: nothing below runs unless all of it passes
        let mut errors = ValidationErrors::new();
        if let Some(ref email) = patch.email {
            if let Err(e) = fields::validate_email(email) {
                errors.add("email", e);
            }
        }
        let clean = if patch.additional_fields.len() > self.config.max_fields_per_update {
            errors.add(
                "additional_fields",
                FieldError::invalid_value(format!(
                    "at most {} fields per update",
                    self.config.max_fields_per_update
                )),
            );
            Default::default()
        } else {
            let (clean, field_errors) = fields::validate(
                &patch.additional_fields,
                &current.additional_fields,
                &self.registry,
            );
            errors.extend(field_errors);
            clean
        };
        if !errors.is_empty() {
            debug!(error_count = errors.len(), "Profile patch rejected");
            return Err(DomainError::validation_failed(errors));
        }

        // Uniqueness for email change
        let new_email = patch.email.filter(|e| e != &current.email);
        if let Some(ref email) = new_email {
            if self.repo.email_exists(email).await.map_err(repo_error)? {
                return Err(DomainError::email_not_available(email.clone()));
            }
        }

        // Apply patch
        let email_changed = new_email.is_some();
        if let Some(email) = new_email.clone() {
            current.email = email;
        }
        let changed: Vec<String> = clean.keys().cloned().collect();
        current.additional_fields.extend(clean);
        current.updated_at = Utc::now();

        // Persist; the unique index is authoritative if another request won the race
        self.repo
            .update(current.clone())
            .await
            .map_err(|e| match (e, new_email) {
                (RepoError::EmailTaken, Some(email)) => {
                    warn!("Email was taken between check and write");
                    DomainError::email_not_available(email)
                }
                (e, _) => repo_error(e),
            })?;

        self.events.publish(&ProfileDomainEvent::Updated {
            id: current.id,
            at: current.updated_at,
            email_changed,
            fields: changed,
        });

        info!("Successfully updated profile");
        Ok(current)
    }

    #[instrument(
        name = "profile_update.service.register_user",
        skip(self, new_user),
        fields(email = %new_user.email)
    )]
    pub async fn register_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new user");

        let (clean, mut errors) = fields::validate_complete(&new_user.additional_fields, &self.registry);
        if let Err(e) = fields::validate_email(&new_user.email) {
            errors.add("email", e);
        }
        if !errors.is_empty() {
            return Err(DomainError::validation_failed(errors));
        }

        if self
            .repo
            .email_exists(&new_user.email)
            .await
            .map_err(repo_error)?
        {
            return Err(DomainError::email_not_available(new_user.email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            additional_fields: clean,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(user.clone())
            .await
            .map_err(|e| match e {
                RepoError::EmailTaken => DomainError::email_not_available(user.email.clone()),
                e => repo_error(e),
            })?;

        self.events.publish(&ProfileDomainEvent::Created {
            id: user.id,
            at: user.created_at,
        });

        info!("Successfully registered user with id={}", user.id);
        Ok(user)
    }

    async fn load(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(repo_error)?
            .ok_or_else(|| DomainError::user_not_found(id))
    }
}

fn repo_error(e: RepoError) -> DomainError {
    DomainError::database(e.to_string())
}
