//! Seed data loaded at start-up

use crate::core::error::StorageError;
use crate::entities::{Activity, Contact, Deal, Task};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial records for every collection
///
/// ```json
/// { "contacts": [...], "deals": [...], "tasks": [...], "activities": [...] }
/// ```
/// Every collection is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub contacts: Vec<Contact>,
    pub deals: Vec<Deal>,
    pub tasks: Vec<Task>,
    pub activities: Vec<Activity>,
}

impl SeedData {
    pub fn from_json_str(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_json_str(&raw)
    }

    /// Total number of records across collections
    pub fn len(&self) -> usize {
        self.contacts.len() + self.deals.len() + self.tasks.len() + self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_seed() {
        let seed = SeedData::from_json_str(
            r#"{"contacts": [{"Id": 1, "name": "John Smith", "email": "john@acme.com"}]}"#,
        )
        .unwrap();
        assert_eq!(seed.contacts.len(), 1);
        assert_eq!(seed.contacts[0].id, 1);
        assert!(seed.deals.is_empty());
        assert_eq!(seed.len(), 1);
    }

    #[test]
    fn test_invalid_seed() {
        assert!(matches!(
            SeedData::from_json_str("[1, 2]"),
            Err(StorageError::Serialization { .. })
        ));
    }
}
