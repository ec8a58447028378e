//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::CrmConfig;
use crate::core::{DataService, SavedFilterService};
use crate::entities::{Activity, Contact, Deal, Task};
use crate::storage::{FileSavedFilterStore, InMemoryDataService, InMemorySavedFilterStore, SeedData};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the CRM HTTP server
///
/// Services that are not set explicitly default to empty in-memory stores.
///
/// ```rust,ignore
/// let app = ServerBuilder::new()
///     .with_config(config)
///     .with_seed(seed)
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: CrmConfig,
    contacts: Option<Arc<dyn DataService<Contact>>>,
    deals: Option<Arc<dyn DataService<Deal>>>,
    tasks: Option<Arc<dyn DataService<Task>>>,
    activities: Option<Arc<dyn DataService<Activity>>>,
    saved_filters: Option<Arc<dyn SavedFilterService>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: CrmConfig::default_config(),
            contacts: None,
            deals: None,
            tasks: None,
            activities: None,
            saved_filters: None,
            custom_routes: Vec::new(),
        }
    }

    /// Prepare a builder from configuration
    ///
    /// Loads the seed file and opens the file-backed saved-filter store when
    /// their paths are configured.
    pub async fn from_config(config: CrmConfig) -> Result<Self> {
        let mut builder = Self::new();

        if let Some(path) = &config.storage.seed_path {
            let seed = SeedData::from_json_file(path).await?;
            tracing::info!(path = %path.display(), records = seed.len(), "Loaded seed data");
            builder = builder.with_seed(seed);
        }

        if let Some(path) = &config.storage.saved_filters_path {
            builder = builder.with_saved_filter_service(FileSavedFilterStore::open(path).await);
        }

        Ok(builder.with_config(config))
    }

    pub fn with_config(mut self, config: CrmConfig) -> Self {
        self.config = config;
        self
    }

    /// Use in-memory services holding the seed records
    pub fn with_seed(self, seed: SeedData) -> Self {
        self.with_contact_service(InMemoryDataService::with_records(seed.contacts))
            .with_deal_service(InMemoryDataService::with_records(seed.deals))
            .with_task_service(InMemoryDataService::with_records(seed.tasks))
            .with_activity_service(InMemoryDataService::with_records(seed.activities))
    }

    pub fn with_contact_service(mut self, service: impl DataService<Contact> + 'static) -> Self {
        self.contacts = Some(Arc::new(service));
        self
    }

    pub fn with_deal_service(mut self, service: impl DataService<Deal> + 'static) -> Self {
        self.deals = Some(Arc::new(service));
        self
    }

    pub fn with_task_service(mut self, service: impl DataService<Task> + 'static) -> Self {
        self.tasks = Some(Arc::new(service));
        self
    }

    pub fn with_activity_service(mut self, service: impl DataService<Activity> + 'static) -> Self {
        self.activities = Some(Arc::new(service));
        self
    }

    pub fn with_saved_filter_service(mut self, service: impl SavedFilterService + 'static) -> Self {
        self.saved_filters = Some(Arc::new(service));
        self
    }

    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    pub fn build_host(self) -> Result<ServerHost> {
        self.config.validate()?;

        Ok(ServerHost {
            contacts: self
                .contacts
                .unwrap_or_else(|| Arc::new(InMemoryDataService::<Contact>::new())),
            deals: self
                .deals
                .unwrap_or_else(|| Arc::new(InMemoryDataService::<Deal>::new())),
            tasks: self
                .tasks
                .unwrap_or_else(|| Arc::new(InMemoryDataService::<Task>::new())),
            activities: self
                .activities
                .unwrap_or_else(|| Arc::new(InMemoryDataService::<Activity>::new())),
            saved_filters: self
                .saved_filters
                .unwrap_or_else(|| Arc::new(InMemorySavedFilterStore::new())),
            config: Arc::new(self.config),
        })
    }

    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve on the configured address
    pub async fn serve_configured(self) -> Result<()> {
        let addr = self.config.server.address();
        self.serve(&addr).await
    }

    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;

    #[test]
    fn test_build_host_defaults_to_empty_stores() {
        let host = ServerBuilder::new().build_host().unwrap();
        assert_eq!(host.config.server.port, 3000);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = CrmConfig::default_config();
        config.query = QueryConfig {
            default_limit: 0,
            max_limit: 10,
        };
        assert!(ServerBuilder::new().with_config(config).build().is_err());
    }

    #[tokio::test]
    async fn test_seeded_services_are_used() {
        let seed = SeedData {
            contacts: vec![Contact::new("Ann", "ann@acme.com")],
            ..Default::default()
        };
        let host = ServerBuilder::new().with_seed(seed).build_host().unwrap();
        assert_eq!(host.contacts.list().await.unwrap().len(), 1);
        assert!(host.deals.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_config_opens_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CrmConfig::default_config();
        config.storage.saved_filters_path = Some(dir.path().join("filters.json"));

        let host = ServerBuilder::from_config(config)
            .await
            .unwrap()
            .build_host()
            .unwrap();
        assert!(host.saved_filters.list_all().await.unwrap().is_empty());
    }
}
