use anyhow::Context;
use sea_orm::Set;
use serde_json::Value;

use crate::contract::model::User;
use crate::infra::storage::entity::{ActiveModel, Model};

/// Convert a database row to a contract model.
///
/// Fails when the stored `additional_fields` is not a JSON object.
pub fn entity_to_contract(entity: Model) -> anyhow::Result<User> {
    let additional_fields = serde_json::from_value(entity.additional_fields)
        .with_context(|| format!("user {} has malformed additional_fields", entity.id))?;
    Ok(User {
        id: entity.id,
        email: entity.email,
        additional_fields,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    })
}

/// Fully-populated active model, every column marked as set.
pub fn contract_to_active(u: User) -> ActiveModel {
    ActiveModel {
        id: Set(u.id),
        email: Set(u.email),
        additional_fields: Set(Value::Object(u.additional_fields.into_iter().collect())),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}
