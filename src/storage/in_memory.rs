//! In-memory implementation of DataService for testing and development

use crate::core::error::{EntityError, Result, StorageError};
use crate::core::{Data, DataService};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock};

struct Table<T> {
    records: Vec<T>,
    last_id: u64,
}

/// In-memory record service
///
/// Keeps insertion order and hands out increasing ids that are never reused.
/// Uses RwLock for thread-safe access.
pub struct InMemoryDataService<T> {
    table: Arc<RwLock<Table<T>>>,
}

impl<T> Clone for InMemoryDataService<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<T: Data> InMemoryDataService<T> {
    /// Create an empty service
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a service holding `records`
    ///
    /// Records without an id (0) are numbered after the largest seeded id.
    pub fn with_records(mut records: Vec<T>) -> Self {
        let mut last_id = records.iter().map(|r| r.id()).max().unwrap_or(0);
        for record in records.iter_mut().filter(|r| r.id() == 0) {
            last_id += 1;
            record.set_id(last_id);
        }

        Self {
            table: Arc::new(RwLock::new(Table { records, last_id })),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Table<T>) -> R) -> Result<R> {
        let table = self.table.read().map_err(|_| StorageError::LockPoisoned {
            resource: T::resource_name(),
            mode: "read",
        })?;
        Ok(f(&table))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Table<T>) -> Result<R>) -> Result<R> {
        let mut table = self.table.write().map_err(|_| StorageError::LockPoisoned {
            resource: T::resource_name(),
            mode: "write",
        })?;
        f(&mut table)
    }
}

impl<T: Data> Default for InMemoryDataService<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Data> DataService<T> for InMemoryDataService<T> {
    async fn create(&self, mut entity: T) -> Result<T> {
        entity.validate()?;

        let created = self.write(|table| {
            table.last_id += 1;
            entity.set_id(table.last_id);
            entity.on_create(Utc::now());
            table.records.push(entity.clone());
            Ok(entity)
        })?;

        tracing::debug!(entity = T::resource_name_singular(), id = created.id(), "Created record");
        Ok(created)
    }

    async fn get(&self, id: u64) -> Result<Option<T>> {
        self.read(|table| table.records.iter().find(|r| r.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>> {
        self.read(|table| table.records.clone())
    }

    async fn update(&self, id: u64, mut entity: T) -> Result<T> {
        entity.validate()?;

        let updated = self.write(|table| {
            let slot = table
                .records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| EntityError::not_found(T::resource_name_singular(), id))?;

            entity.set_id(id);
            entity.on_update(slot, Utc::now());
            *slot = entity.clone();
            Ok(entity)
        })?;

        tracing::debug!(entity = T::resource_name_singular(), id, "Updated record");
        Ok(updated)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.write(|table| {
            let position = table
                .records
                .iter()
                .position(|r| r.id() == id)
                .ok_or_else(|| EntityError::not_found(T::resource_name_singular(), id))?;
            table.records.remove(position);
            Ok(())
        })?;

        tracing::debug!(entity = T::resource_name_singular(), id, "Deleted record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CrmError;
    use crate::entities::{Contact, Deal};

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let service = InMemoryDataService::<Contact>::new();
        let a = service.create(Contact::new("Ann", "ann@acme.com")).await.unwrap();
        let b = service.create(Contact::new("Bob", "bob@acme.com")).await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert!(a.created_at.is_some());
        assert!(a.last_activity.is_some());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let service = InMemoryDataService::<Deal>::new();
        let first = service.create(Deal::new("A", 10.0)).await.unwrap();
        service.delete(first.id).await.unwrap();
        let second = service.create(Deal::new("B", 10.0)).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_seeded_records_keep_ids() {
        let mut seeded = Deal::new("Seeded", 100.0);
        seeded.id = 7;
        let service = InMemoryDataService::with_records(vec![seeded, Deal::new("New", 1.0)]);

        let ids: Vec<u64> = service.list().await.unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![7, 8]);

        let next = service.create(Deal::new("Next", 5.0)).await.unwrap();
        assert_eq!(next.id, 9);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_record() {
        let service = InMemoryDataService::<Deal>::new();
        let err = service.create(Deal::new("Free", 0.0)).await.unwrap_err();
        assert!(matches!(err, CrmError::Validation(_)));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_record() {
        let service = InMemoryDataService::<Contact>::new();
        let err = service
            .update(42, Contact::new("Ann", "ann@acme.com"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(service.delete(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_created_at() {
        let service = InMemoryDataService::<Contact>::new();
        let created = service.create(Contact::new("Ann", "ann@acme.com")).await.unwrap();

        let mut edited = created.clone().with_company("Globex");
        edited.id = 99;
        edited.created_at = None;
        let updated = service.update(created.id, edited).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(service.get(created.id).await.unwrap().unwrap().company, "Globex");
    }

    #[tokio::test]
    async fn test_search_over_indexed_fields() {
        let service = InMemoryDataService::with_records(vec![
            Contact::new("John Smith", "john@acme.com").with_company("Acme Corp"),
            Contact::new("Sarah Johnson", "sarah@techstart.io").with_company("TechStart"),
        ]);

        let hits = service.search("techstart").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sarah Johnson");
    }
}
