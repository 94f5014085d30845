use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::config::ProfileUpdateConfig;
use crate::contract::client::ProfileApi;
use crate::domain::events::ProfileDomainEvent;
use crate::domain::fields::FieldRegistry;
use crate::domain::ports::{EventPublisher, TracingEventPublisher};
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::ProfileLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmUsersRepository;

/// Module name used as the key of its section in the app config bag.
pub const MODULE_NAME: &str = "profile_update";

/// Wired profile_update module: registry, storage and domain service.
#[derive(Clone)]
pub struct ProfileModule {
    service: Arc<Service>,
}

impl ProfileModule {
    /// Parse the module's config section; a missing section means defaults.
    pub fn config_from_value(raw: Option<&serde_json::Value>) -> anyhow::Result<ProfileUpdateConfig> {
        match raw {
            Some(v) => serde_json::from_value(v.clone())
                .with_context(|| format!("invalid '{MODULE_NAME}' module config")),
            None => Ok(ProfileUpdateConfig::default()),
        }
    }

    /// Run migrations, build the field registry and wire the service.
    pub async fn init(cfg: ProfileUpdateConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        Self::init_with_events(cfg, db, Arc::new(TracingEventPublisher)).await
    }

    pub async fn init_with_events(
        cfg: ProfileUpdateConfig,
        db: DatabaseConnection,
        events: Arc<dyn EventPublisher<ProfileDomainEvent>>,
    ) -> anyhow::Result<Self> {
        info!("Initializing profile_update module");

        info!("Running profile_update database migrations");
        Migrator::up(&db, None)
            .await
            .context("profile_update migrations failed")?;

        let registry = FieldRegistry::from_specs(cfg.fields).context("invalid field definitions")?;
        debug!(
            "Loaded profile_update config: fields={}, max_fields_per_update={}",
            registry.len(),
            cfg.max_fields_per_update
        );

        // Wire repository (infra) to domain service (port)
        let repo = SeaOrmUsersRepository::new(db);
        let service_config = ServiceConfig {
            max_fields_per_update: cfg.max_fields_per_update,
        };
        let service = Service::new(Arc::new(repo), Arc::new(registry), events, service_config);

        info!("profile_update module initialized");
        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Local in-process client.
    pub fn client(&self) -> Arc<dyn ProfileApi> {
        Arc::new(ProfileLocalClient::new(self.service.clone()))
    }
}
