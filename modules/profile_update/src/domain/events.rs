use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Transport-agnostic domain event.
#[derive(Debug, Clone)]
pub enum ProfileDomainEvent {
    Created {
        id: Uuid,
        at: DateTime<Utc>,
    },
    Updated {
        id: Uuid,
        at: DateTime<Utc>,
        email_changed: bool,
        fields: Vec<String>,
    },
}
