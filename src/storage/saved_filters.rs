//! Saved-filter stores
//!
//! [`InMemorySavedFilterStore`] keeps filters in creation order behind a
//! lock. [`FileSavedFilterStore`] wraps it and mirrors every mutation to a
//! JSON file holding the filters and the last issued id. Persistence
//! failures are logged and never fail the mutation.

use crate::core::condition::{EntityKind, FilterSpec, SavedFilter};
use crate::core::error::{FieldValidationError, FilterError, Result, StorageError, ValidationError};
use crate::core::service::SavedFilterService;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

struct FilterTable {
    filters: Vec<SavedFilter>,
    last_id: u64,
}

/// Check a filter before it is stored and return its trimmed name
fn validate_spec(spec: &FilterSpec) -> std::result::Result<String, ValidationError> {
    let name = spec.name.as_deref().map(str::trim).unwrap_or_default();
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push(FieldValidationError::new("name", "'name' is required"));
    }
    if spec.conditions.is_empty() {
        errors.push(FieldValidationError::new(
            "conditions",
            "at least one condition is required",
        ));
    }
    for (index, condition) in spec.conditions.iter().enumerate() {
        if !condition.is_valid() {
            errors.push(FieldValidationError::new(
                format!("conditions[{}]", index),
                "field, operator and value are required",
            ));
        }
    }

    ValidationError::from_field_errors(errors)?;
    Ok(name.to_string())
}

/// In-memory saved-filter store
///
/// Ids increase monotonically and are never reused, even after deletion.
#[derive(Clone)]
pub struct InMemorySavedFilterStore {
    table: Arc<RwLock<FilterTable>>,
}

impl InMemorySavedFilterStore {
    pub fn new() -> Self {
        Self::with_filters(Vec::new())
    }

    /// Create a store holding previously saved filters
    pub fn with_filters(filters: Vec<SavedFilter>) -> Self {
        Self::with_last_id(filters, 0)
    }

    /// Create a store that continues numbering after `last_id`
    ///
    /// The counter never starts below the largest id in `filters`.
    pub fn with_last_id(filters: Vec<SavedFilter>, last_id: u64) -> Self {
        let highest = filters.iter().map(|f| f.id).max().unwrap_or(0);
        Self {
            table: Arc::new(RwLock::new(FilterTable {
                filters,
                last_id: last_id.max(highest),
            })),
        }
    }

    /// Copy of every stored filter, in creation order
    pub fn snapshot(&self) -> Result<Vec<SavedFilter>> {
        self.read(|table| table.filters.clone())
    }

    /// The most recently issued id, 0 before the first create
    pub fn last_id(&self) -> Result<u64> {
        self.read(|table| table.last_id)
    }

    fn read<R>(&self, f: impl FnOnce(&FilterTable) -> R) -> Result<R> {
        let table = self.table.read().map_err(|_| StorageError::LockPoisoned {
            resource: "saved filters",
            mode: "read",
        })?;
        Ok(f(&table))
    }

    fn write<R>(&self, f: impl FnOnce(&mut FilterTable) -> Result<R>) -> Result<R> {
        let mut table = self.table.write().map_err(|_| StorageError::LockPoisoned {
            resource: "saved filters",
            mode: "write",
        })?;
        f(&mut table)
    }
}

impl Default for InMemorySavedFilterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SavedFilterService for InMemorySavedFilterStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<SavedFilter>> {
        self.read(|table| {
            table
                .filters
                .iter()
                .filter(|f| f.kind == kind)
                .cloned()
                .collect()
        })
    }

    async fn list_all(&self) -> Result<Vec<SavedFilter>> {
        self.snapshot()
    }

    async fn get(&self, id: u64) -> Result<SavedFilter> {
        self.read(|table| table.filters.iter().find(|f| f.id == id).cloned())?
            .ok_or_else(|| FilterError::NotFound { id }.into())
    }

    async fn create(&self, spec: FilterSpec) -> Result<SavedFilter> {
        let name = validate_spec(&spec)?;

        let saved = self.write(|table| {
            table.last_id += 1;
            let saved = SavedFilter {
                id: table.last_id,
                name,
                kind: spec.kind,
                conditions: spec.conditions,
                created_at: Utc::now(),
                updated_at: None,
            };
            table.filters.push(saved.clone());
            Ok(saved)
        })?;

        tracing::debug!(id = saved.id, kind = %saved.kind, "Saved filter created");
        Ok(saved)
    }

    async fn update(&self, id: u64, spec: FilterSpec) -> Result<SavedFilter> {
        let name = validate_spec(&spec)?;

        let saved = self.write(|table| {
            let existing = table
                .filters
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or(FilterError::NotFound { id })?;

            existing.name = name;
            existing.kind = spec.kind;
            existing.conditions = spec.conditions;
            existing.updated_at = Some(Utc::now());
            Ok(existing.clone())
        })?;

        tracing::debug!(id, kind = %saved.kind, "Saved filter updated");
        Ok(saved)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.write(|table| {
            let position = table
                .filters
                .iter()
                .position(|f| f.id == id)
                .ok_or(FilterError::NotFound { id })?;
            table.filters.remove(position);
            Ok(())
        })?;

        tracing::debug!(id, "Saved filter deleted");
        Ok(())
    }
}

/// On-disk layout of the saved-filters file
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum FilterFile {
    Table {
        #[serde(rename = "lastId")]
        last_id: u64,
        filters: Vec<SavedFilter>,
    },
    // Files written before the counter was stored
    Filters(Vec<SavedFilter>),
}

impl FilterFile {
    fn into_parts(self) -> (Vec<SavedFilter>, u64) {
        match self {
            FilterFile::Table { last_id, filters } => (filters, last_id),
            FilterFile::Filters(filters) => (filters, 0),
        }
    }
}

/// Saved-filter store persisted as a JSON document on disk
#[derive(Clone)]
pub struct FileSavedFilterStore {
    inner: InMemorySavedFilterStore,
    path: PathBuf,
    // Serializes file writes so the file always reflects the latest snapshot
    write_guard: Arc<tokio::sync::Mutex<()>>,
}

impl FileSavedFilterStore {
    /// Open the store at `path`
    ///
    /// A missing file starts an empty store. A file that cannot be read or
    /// parsed is logged and also starts an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let (filters, last_id) = match load_filters(&path).await {
            Ok(file) => {
                let (filters, last_id) = file.into_parts();
                tracing::info!(
                    path = %path.display(),
                    count = filters.len(),
                    last_id,
                    "Loaded saved filters"
                );
                (filters, last_id)
            }
            Err(StorageError::Io { message, .. }) if !path.exists() => {
                tracing::debug!(path = %path.display(), %message, "No saved filters file yet");
                (Vec::new(), 0)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load saved filters");
                (Vec::new(), 0)
            }
        };

        Self {
            inner: InMemorySavedFilterStore::with_last_id(filters, last_id),
            path,
            write_guard: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) {
        let _guard = self.write_guard.lock().await;
        let file = match self.inner.snapshot().and_then(|filters| {
            let last_id = self.inner.last_id()?;
            Ok(FilterFile::Table { last_id, filters })
        }) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(error = %e, "Failed to snapshot saved filters");
                return;
            }
        };
        if let Err(e) = write_filters(&self.path, &file).await {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist saved filters"
            );
        }
    }
}

async fn load_filters(path: &Path) -> std::result::Result<FilterFile, StorageError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    if raw.trim().is_empty() {
        return Ok(FilterFile::Filters(Vec::new()));
    }
    serde_json::from_str(&raw).map_err(|e| StorageError::Serialization {
        message: e.to_string(),
    })
}

async fn write_filters(path: &Path, file: &FilterFile) -> std::result::Result<(), StorageError> {
    let body = serde_json::to_string_pretty(file).map_err(|e| StorageError::Serialization {
        message: e.to_string(),
    })?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| StorageError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

#[async_trait]
impl SavedFilterService for FileSavedFilterStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<SavedFilter>> {
        self.inner.list(kind).await
    }

    async fn list_all(&self) -> Result<Vec<SavedFilter>> {
        self.inner.list_all().await
    }

    async fn get(&self, id: u64) -> Result<SavedFilter> {
        self.inner.get(id).await
    }

    async fn create(&self, spec: FilterSpec) -> Result<SavedFilter> {
        let saved = self.inner.create(spec).await?;
        self.persist().await;
        Ok(saved)
    }

    async fn update(&self, id: u64, spec: FilterSpec) -> Result<SavedFilter> {
        let saved = self.inner.update(id, spec).await?;
        self.persist().await;
        Ok(saved)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.inner.delete(id).await?;
        self.persist().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CrmError;
    use crate::core::condition::Condition;

    fn hot_leads() -> FilterSpec {
        FilterSpec::named(
            "Hot leads",
            EntityKind::Contacts,
            vec![Condition::new("status", "in", "new,contacted")],
        )
    }

    #[tokio::test]
    async fn test_create_stamps_id_and_created_at() {
        let store = InMemorySavedFilterStore::new();
        let saved = store.create(hot_leads()).await.unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(saved.name, "Hot leads");
        assert!(saved.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_validation_errors_are_collected() {
        let store = InMemorySavedFilterStore::new();
        let spec = FilterSpec {
            name: Some("   ".to_string()),
            kind: EntityKind::Deals,
            conditions: vec![Condition::new("value", "greater", "")],
        };
        match store.create(spec).await {
            Err(CrmError::Validation(ValidationError::FieldErrors(errors))) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "conditions[0]"]);
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_created_at() {
        let store = InMemorySavedFilterStore::new();
        let saved = store.create(hot_leads()).await.unwrap();

        let mut spec = hot_leads();
        spec.name = Some("Warm leads".to_string());
        let updated = store.update(saved.id, spec).await.unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(updated.name, "Warm leads");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found() {
        let store = InMemorySavedFilterStore::new();
        assert!(store.get(5).await.unwrap_err().is_not_found());
        assert!(store.delete(5).await.unwrap_err().is_not_found());
        assert!(store.update(5, hot_leads()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");

        let store = FileSavedFilterStore::open(&path).await;
        let saved = store.create(hot_leads()).await.unwrap();
        assert!(path.exists());

        let reopened = FileSavedFilterStore::open(&path).await;
        let all = reopened.list_all().await.unwrap();
        assert_eq!(all, vec![saved]);

        let next = reopened.create(hot_leads()).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_deleted_highest_id_is_not_reissued_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");

        let store = FileSavedFilterStore::open(&path).await;
        store.create(hot_leads()).await.unwrap();
        let second = store.create(hot_leads()).await.unwrap();
        store.delete(second.id).await.unwrap();

        let reopened = FileSavedFilterStore::open(&path).await;
        let next = reopened.create(hot_leads()).await.unwrap();
        assert_eq!(next.id, 3);
    }

    #[tokio::test]
    async fn test_bare_array_file_is_still_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        let legacy = vec![SavedFilter {
            id: 4,
            name: "Hot leads".to_string(),
            kind: EntityKind::Contacts,
            conditions: vec![Condition::new("status", "equals", "new")],
            created_at: Utc::now(),
            updated_at: None,
        }];
        std::fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

        let store = FileSavedFilterStore::open(&path).await;
        assert_eq!(store.list_all().await.unwrap(), legacy);
        assert_eq!(store.create(hot_leads()).await.unwrap().id, 5);
    }

    #[test]
    fn test_last_id_never_trails_loaded_filters() {
        let store = InMemorySavedFilterStore::new();
        assert_eq!(store.last_id().unwrap(), 0);

        let loaded = InMemorySavedFilterStore::with_last_id(Vec::new(), 9);
        assert_eq!(loaded.last_id().unwrap(), 9);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileSavedFilterStore::open(&path).await;
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_does_not_fail_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("filters.json");

        let store = FileSavedFilterStore::open(&path).await;
        let saved = store.create(hot_leads()).await.unwrap();
        assert_eq!(store.get(saved.id).await.unwrap(), saved);
    }
}
