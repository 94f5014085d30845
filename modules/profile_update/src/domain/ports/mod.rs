use tracing::info;

use crate::domain::events::ProfileDomainEvent;

/// Output port: publish domain events (no knowledge of transport).
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// Publishes profile events as structured log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl EventPublisher<ProfileDomainEvent> for TracingEventPublisher {
    fn publish(&self, event: &ProfileDomainEvent) {
        match event {
            ProfileDomainEvent::Created { id, at } => {
                info!(user_id = %id, at = %at, "profile created");
            }
            ProfileDomainEvent::Updated {
                id,
                at,
                email_changed,
                fields,
            } => {
                info!(
                    user_id = %id,
                    at = %at,
                    email_changed,
                    fields = ?fields,
                    "profile updated"
                );
            }
        }
    }
}
