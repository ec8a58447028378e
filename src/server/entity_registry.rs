//! Entity registry for managing entity descriptors and auto-generating CRUD routes

use crate::config::QueryConfig;
use crate::core::{Data, DataService};
use crate::server::exposure::rest::entities::{self, EntityState};
use axum::Router;
use axum::routing::{get, post};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Trait that describes how to build routes for an entity
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "contact")
    fn entity_type(&self) -> &str;

    /// The plural form (e.g., "contacts")
    fn plural(&self) -> &str;

    /// Build the routes for this entity
    ///
    /// Should return a Router with routes like:
    /// - GET/POST /{plural}
    /// - GET/PUT/DELETE /{plural}/{id}
    /// - POST /{plural}/filter
    /// - GET /schemas/{plural}
    fn build_routes(&self) -> Router;
}

/// Descriptor for any `Data` entity backed by a `DataService`
pub struct DataDescriptor<T: Data> {
    service: Arc<dyn DataService<T>>,
    query: QueryConfig,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Data> DataDescriptor<T> {
    pub fn new(service: Arc<dyn DataService<T>>, query: QueryConfig) -> Self {
        Self {
            service,
            query,
            _entity: PhantomData,
        }
    }
}

impl<T: Data> EntityDescriptor for DataDescriptor<T> {
    fn entity_type(&self) -> &str {
        T::resource_name_singular()
    }

    fn plural(&self) -> &str {
        T::resource_name()
    }

    fn build_routes(&self) -> Router {
        let state = EntityState::new(self.service.clone(), self.query.clone());
        let plural = T::resource_name();

        Router::new()
            .route(
                &format!("/{}", plural),
                get(entities::list_records::<T>).post(entities::create_record::<T>),
            )
            .route(
                &format!("/{}/filter", plural),
                post(entities::filter_records::<T>),
            )
            .route(
                &format!("/{}/{{id}}", plural),
                get(entities::get_record::<T>)
                    .put(entities::update_record::<T>)
                    .delete(entities::delete_record::<T>),
            )
            .route(
                &format!("/schemas/{}", plural),
                get(entities::describe_schema::<T>),
            )
            .with_state(state)
    }
}

/// Registry for all entities in the application
///
/// Descriptors are keyed by entity type; registering a type twice replaces
/// the earlier descriptor.
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity descriptor
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Register the standard routes of a `Data` entity
    pub fn register_data<T: Data>(&mut self, service: Arc<dyn DataService<T>>, query: QueryConfig) {
        self.register(Box::new(DataDescriptor::new(service, query)));
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Registered entity types, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Contact, Deal};
    use crate::storage::InMemoryDataService;

    struct MockDescriptor {
        entity_type: String,
        plural: String,
    }

    impl EntityDescriptor for MockDescriptor {
        fn entity_type(&self) -> &str {
            &self.entity_type
        }

        fn plural(&self) -> &str {
            &self.plural
        }

        fn build_routes(&self) -> Router {
            Router::new()
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        assert!(EntityRegistry::new().entity_types().is_empty());
    }

    #[test]
    fn test_register_data_entities() {
        let mut registry = EntityRegistry::new();
        registry.register_data::<Contact>(
            Arc::new(InMemoryDataService::<Contact>::new()),
            QueryConfig::default(),
        );
        registry.register_data::<Deal>(
            Arc::new(InMemoryDataService::<Deal>::new()),
            QueryConfig::default(),
        );
        assert_eq!(registry.entity_types(), vec!["contact", "deal"]);
        let _router = registry.build_routes();
    }

    #[test]
    fn test_register_duplicate_replaces() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor {
            entity_type: "contact".to_string(),
            plural: "contacts".to_string(),
        }));
        registry.register(Box::new(MockDescriptor {
            entity_type: "contact".to_string(),
            plural: "people".to_string(),
        }));
        assert_eq!(registry.entity_types().len(), 1);
    }
}
