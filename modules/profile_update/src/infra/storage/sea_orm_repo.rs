//! SeaORM-backed repository implementation for the domain port.
//!
//! This struct is generic over `C: ConnectionTrait`, so you can construct it
//! with a `DatabaseConnection` **or** a transactional connection.

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use crate::contract::User;
use crate::domain::repo::{RepoError, UsersRepository};
use crate::infra::storage::entity::{Column, Entity as UserEntity};
use crate::infra::storage::mapper::{contract_to_active, entity_to_contract};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Unique-index hits become [`RepoError::EmailTaken`]; `email` is the only
/// unique column besides the primary key.
fn write_error(e: DbErr, what: &'static str) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
        tracing::debug!(%detail, "unique constraint violated on {what}");
        return RepoError::EmailTaken;
    }
    RepoError::Backend(anyhow::Error::new(e).context(what))
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(entity_to_contract).transpose()?)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, u: User) -> Result<(), RepoError> {
        let _ = contract_to_active(u)
            .insert(&self.conn)
            .await
            .map_err(|e| write_error(e, "insert failed"))?;
        Ok(())
    }

    async fn update(&self, u: User) -> Result<(), RepoError> {
        let _ = contract_to_active(u)
            .update(&self.conn)
            .await
            .map_err(|e| write_error(e, "update failed"))?;
        Ok(())
    }
}
