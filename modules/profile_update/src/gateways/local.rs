use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::ProfileApi,
    error::ProfileError,
    model::{NewUser, ProfilePatch, User},
};
use crate::domain::service::Service;

/// Local implementation of the ProfileApi trait that delegates to the domain service
pub struct ProfileLocalClient {
    service: Arc<Service>,
}

impl ProfileLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ProfileApi for ProfileLocalClient {
    async fn get_profile(&self, id: Uuid) -> Result<User, ProfileError> {
        self.service.get_profile(id).await.map_err(Into::into)
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<User, ProfileError> {
        self.service
            .update_profile(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn register_user(&self, new_user: NewUser) -> Result<User, ProfileError> {
        self.service.register_user(new_user).await.map_err(Into::into)
    }
}
