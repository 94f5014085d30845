use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::ProfileError,
    model::{NewUser, ProfilePatch, User},
};

/// Public API trait for the profile_update module that other modules can use
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Get a profile by user ID
    async fn get_profile(&self, id: Uuid) -> Result<User, ProfileError>;

    /// Apply a partial update to the profile of `id`
    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<User, ProfileError>;

    /// Register a new user with a complete set of required fields
    async fn register_user(&self, new_user: NewUser) -> Result<User, ProfileError>;
}
