//! Server host: the transport-agnostic state behind every exposure
//!
//! The host owns the record services, the saved-filter store and the
//! configuration. Exposures (REST today) hold it behind an `Arc`.

use crate::config::CrmConfig;
use crate::core::condition::{EntityKind, FilterSpec};
use crate::core::entity::Data;
use crate::core::error::Result;
use crate::core::evaluator::{CompiledFilter, Evaluator};
use crate::core::{DataService, SavedFilterService};
use crate::entities::{Activity, Contact, Deal, Task};
use crate::server::entity_registry::EntityRegistry;
use serde::Serialize;
use std::sync::Arc;

/// Host structure containing all CRM state
#[derive(Clone)]
pub struct ServerHost {
    pub contacts: Arc<dyn DataService<Contact>>,
    pub deals: Arc<dyn DataService<Deal>>,
    pub tasks: Arc<dyn DataService<Task>>,
    pub activities: Arc<dyn DataService<Activity>>,
    pub saved_filters: Arc<dyn SavedFilterService>,
    pub config: Arc<CrmConfig>,
}

/// Records matched by a filter, typed by the filter's entity
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FilterResults {
    Contacts(Vec<Contact>),
    Deals(Vec<Deal>),
}

impl FilterResults {
    pub fn len(&self) -> usize {
        match self {
            FilterResults::Contacts(records) => records.len(),
            FilterResults::Deals(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ServerHost {
    /// Evaluator pinned to the current time, one per request
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::at_current_time()
    }

    /// Descriptors for every entity the host serves
    pub fn entity_registry(&self) -> EntityRegistry {
        let query = self.config.query.clone();
        let mut registry = EntityRegistry::new();
        registry.register_data(self.contacts.clone(), query.clone());
        registry.register_data(self.deals.clone(), query.clone());
        registry.register_data(self.tasks.clone(), query.clone());
        registry.register_data(self.activities.clone(), query);
        registry
    }

    /// Apply a filter to a snapshot of its entity collection
    ///
    /// Invalid conditions are dropped before evaluation.
    pub async fn apply_filter(&self, spec: &FilterSpec) -> Result<FilterResults> {
        let evaluator = self.evaluator();
        let requested = spec.conditions.len();
        let spec = spec.without_invalid_conditions();
        if spec.conditions.len() < requested {
            tracing::warn!(
                kind = %spec.kind,
                dropped = requested - spec.conditions.len(),
                "Dropped invalid conditions"
            );
        }

        Ok(match spec.kind {
            EntityKind::Contacts => FilterResults::Contacts(
                run_filter(self.contacts.as_ref(), &spec, &evaluator).await?,
            ),
            EntityKind::Deals => {
                FilterResults::Deals(run_filter(self.deals.as_ref(), &spec, &evaluator).await?)
            }
        })
    }
}

async fn run_filter<T: Data>(
    service: &dyn DataService<T>,
    spec: &FilterSpec,
    evaluator: &Evaluator,
) -> Result<Vec<T>> {
    let records = service.list().await?;
    Ok(CompiledFilter::<T>::compile(&spec.conditions).apply(&records, evaluator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::condition::Condition;
    use crate::storage::{InMemoryDataService, InMemorySavedFilterStore};

    fn make_host() -> ServerHost {
        ServerHost {
            contacts: Arc::new(InMemoryDataService::with_records(vec![
                Contact::new("John Smith", "john@acme.com").with_company("Acme Corp"),
                Contact::new("Sarah Johnson", "sarah@techstart.io").with_company("TechStart"),
            ])),
            deals: Arc::new(InMemoryDataService::with_records(vec![
                Deal::new("Small", 500.0),
                Deal::new("Large", 5000.0),
            ])),
            tasks: Arc::new(InMemoryDataService::<Task>::new()),
            activities: Arc::new(InMemoryDataService::<Activity>::new()),
            saved_filters: Arc::new(InMemorySavedFilterStore::new()),
            config: Arc::new(CrmConfig::default_config()),
        }
    }

    #[tokio::test]
    async fn test_apply_filter_targets_the_spec_entity() {
        let host = make_host();
        let spec = FilterSpec::ephemeral(
            EntityKind::Deals,
            vec![Condition::new("value", "greater", "1000")],
        );
        match host.apply_filter(&spec).await.unwrap() {
            FilterResults::Deals(deals) => {
                assert_eq!(deals.len(), 1);
                assert_eq!(deals[0].title, "Large");
            }
            other => panic!("expected deals, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_apply_filter_drops_invalid_conditions() {
        let host = make_host();
        let spec = FilterSpec::ephemeral(
            EntityKind::Contacts,
            vec![
                Condition::new("company", "starts_with", "ac"),
                Condition::new("name", "equals", ""),
            ],
        );
        let results = host.apply_filter(&spec).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
