use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Additional profile fields keyed by their registered name.
pub type AdditionalFields = BTreeMap<String, serde_json::Value>;

/// Pure user model for inter-module communication (no serde/schemars)
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub additional_fields: AdditionalFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for registering a new user
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewUser {
    pub email: String,
    pub additional_fields: AdditionalFields,
}

/// Partial update of a profile.
///
/// `email: None` leaves the email alone; additional fields are merged by key,
/// keys absent from the patch keep their stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub additional_fields: AdditionalFields,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.additional_fields.is_empty()
    }
}
