#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use uuid::Uuid;

use profile_update::contract::model::{AdditionalFields, User};
use profile_update::domain::events::ProfileDomainEvent;
use profile_update::domain::fields::{FieldDefinition, FieldKind, FieldRegistry, FieldRule};
use profile_update::domain::ports::EventPublisher;
use profile_update::domain::repo::{RepoError, UsersRepository};
use profile_update::domain::service::{Service, ServiceConfig};

pub const ALICE_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const BOB_ID: &str = "550e8400-e29b-41d4-a716-446655440001";

pub fn alice_id() -> Uuid {
    Uuid::parse_str(ALICE_ID).unwrap()
}

pub fn bob_id() -> Uuid {
    Uuid::parse_str(BOB_ID).unwrap()
}

pub fn fields(v: serde_json::Value) -> AdditionalFields {
    serde_json::from_value(v).unwrap()
}

/// In-memory repository that counts calls and enforces email uniqueness on writes.
#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: Mutex<HashMap<Uuid, User>>,
    pub email_checks: AtomicUsize,
    pub writes: AtomicUsize,
    /// Make `email_exists` always answer `false`, as if a concurrent writer
    /// had not committed yet.
    pub stale_email_check: AtomicBool,
    /// Fail every write with a backend error.
    pub broken: AtomicBool,
}

impl InMemoryUsersRepository {
    /// Alice (`old@x.com`) and Bob (`taken@x.com`).
    pub fn seeded() -> Self {
        let repo = Self::default();
        let now = Utc::now();
        repo.put(User {
            id: alice_id(),
            email: "old@x.com".to_string(),
            additional_fields: fields(json!({
                "display_name": "Alice",
                "legacy_flag": true,
            })),
            created_at: now,
            updated_at: now,
        });
        repo.put(User {
            id: bob_id(),
            email: "taken@x.com".to_string(),
            additional_fields: fields(json!({ "display_name": "Bob" })),
            created_at: now,
            updated_at: now,
        });
        repo
    }

    pub fn put(&self, user: User) {
        self.users.lock().insert(user.id, user);
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().get(&id).cloned()
    }

    pub fn email_checks(&self) -> usize {
        self.email_checks.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn store(&self, u: User, must_exist: bool) -> Result<(), RepoError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(RepoError::Backend(anyhow::anyhow!("disk full")));
        }
        let mut users = self.users.lock();
        if must_exist && !users.contains_key(&u.id) {
            return Err(RepoError::Backend(anyhow::anyhow!("no such row")));
        }
        if users.values().any(|o| o.id != u.id && o.email == u.email) {
            return Err(RepoError::EmailTaken);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        users.insert(u.id, u);
        Ok(())
    }
}

#[async_trait::async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.get(id))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError> {
        self.email_checks.fetch_add(1, Ordering::SeqCst);
        if self.stale_email_check.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.users.lock().values().any(|u| u.email == email))
    }

    async fn insert(&self, u: User) -> Result<(), RepoError> {
        self.store(u, false)
    }

    async fn update(&self, u: User) -> Result<(), RepoError> {
        self.store(u, true)
    }
}

/// Keeps every published event for inspection.
#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<ProfileDomainEvent>>,
}

impl EventPublisher<ProfileDomainEvent> for RecordingPublisher {
    fn publish(&self, event: &ProfileDomainEvent) {
        self.events.lock().push(event.clone());
    }
}

/// `display_name` (required string), `age` (0..=150), `newsletter` (bool),
/// `plan` (free|pro).
pub fn registry() -> FieldRegistry {
    let mut r = FieldRegistry::new();
    r.register(
        FieldDefinition::new("display_name", FieldKind::String)
            .required()
            .with_rule(FieldRule::Length {
                min: Some(1),
                max: Some(50),
            }),
    )
    .unwrap();
    r.register(
        FieldDefinition::new("age", FieldKind::Number).with_rule(FieldRule::Range {
            min: Some(0.0),
            max: Some(150.0),
        }),
    )
    .unwrap();
    r.register(FieldDefinition::new("newsletter", FieldKind::Boolean))
        .unwrap();
    r.register(FieldDefinition::new(
        "plan",
        FieldKind::Enum(vec!["free".to_string(), "pro".to_string()]),
    ))
    .unwrap();
    r
}

pub struct Harness {
    pub repo: Arc<InMemoryUsersRepository>,
    pub events: Arc<RecordingPublisher>,
    pub service: Service,
}

pub fn harness() -> Harness {
    harness_with(ServiceConfig::default())
}

pub fn harness_with(config: ServiceConfig) -> Harness {
    let repo = Arc::new(InMemoryUsersRepository::seeded());
    let events = Arc::new(RecordingPublisher::default());
    let service = Service::new(repo.clone(), Arc::new(registry()), events.clone(), config);
    Harness {
        repo,
        events,
        service,
    }
}
