use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::User;

/// Failures surfaced by a persistence adapter.
#[derive(Error, Debug)]
pub enum RepoError {
    /// The write hit the unique constraint on `email`.
    #[error("email is already taken")]
    EmailTaken,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    /// Check uniqueness by email.
    async fn email_exists(&self, email: &str) -> Result<bool, RepoError>;
    /// Insert a fully-formed domain user.
    ///
    /// Service computes id/timestamps/validation; repo persists.
    async fn insert(&self, u: User) -> Result<(), RepoError>;
    /// Overwrite an existing user (by primary key in `u.id`) in one write.
    async fn update(&self, u: User) -> Result<(), RepoError>;
}
