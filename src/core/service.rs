//! Service traits for records and saved filters

use crate::core::Data;
use crate::core::condition::{EntityKind, FilterSpec, SavedFilter};
use crate::core::error::Result;
use async_trait::async_trait;

/// Service trait for managing records of one entity type
///
/// Implementations provide CRUD operations for a specific entity type.
/// The CRM is agnostic to the underlying storage mechanism.
#[async_trait]
pub trait DataService<T: Data>: Send + Sync {
    /// Create a new record; the store assigns its id
    async fn create(&self, entity: T) -> Result<T>;

    /// Get a record by ID
    async fn get(&self, id: u64) -> Result<Option<T>>;

    /// List all records in insertion order
    async fn list(&self) -> Result<Vec<T>>;

    /// Replace an existing record, keeping its id
    ///
    /// Fails with `EntityError::NotFound` when the id is absent.
    async fn update(&self, id: u64, entity: T) -> Result<T>;

    /// Delete a record
    ///
    /// Fails with `EntityError::NotFound` when the id is absent.
    async fn delete(&self, id: u64) -> Result<()>;

    /// Case-insensitive substring search over the entity's indexed fields
    async fn search(&self, query: &str) -> Result<Vec<T>> {
        let records = self.list().await?;
        Ok(records
            .into_iter()
            .filter(|record| record.matches_search(query))
            .collect())
    }
}

/// Service trait for persisted filters
///
/// The store is responsible for validating names and conditions; the
/// evaluator never sees an invalid saved filter.
#[async_trait]
pub trait SavedFilterService: Send + Sync {
    /// Saved filters targeting `kind`, in creation order
    async fn list(&self, kind: EntityKind) -> Result<Vec<SavedFilter>>;

    /// Every saved filter, in creation order
    async fn list_all(&self) -> Result<Vec<SavedFilter>>;

    /// Fails with `FilterError::NotFound` when the id is absent
    async fn get(&self, id: u64) -> Result<SavedFilter>;

    /// Persist a new filter under the next sequential id
    async fn create(&self, spec: FilterSpec) -> Result<SavedFilter>;

    /// Replace a filter's name, type and conditions
    async fn update(&self, id: u64, spec: FilterSpec) -> Result<SavedFilter>;

    /// Permanently remove a filter
    async fn delete(&self, id: u64) -> Result<()>;
}
