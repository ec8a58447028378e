//! Entity traits defining the core abstraction for CRM records

use crate::core::error::ValidationError;
use crate::core::record::Record;
use crate::core::schema::EntitySchema;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Base trait for all stored records.
///
/// All entities have:
/// - Id: integer identifier assigned by the store
/// - createdAt: creation timestamp (stamped by the store)
///
/// Lifecycle hooks let each entity stamp its own timestamps; stores call
/// them and never touch entity fields directly.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name used in URLs (e.g., "contacts", "deals")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "contact", "deal")
    fn resource_name_singular() -> &'static str;

    /// Get the identifier of this record
    fn id(&self) -> u64;

    /// Set the identifier (used by stores on create and update)
    fn set_id(&mut self, id: u64);

    /// Get the creation timestamp
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Stamp a record that is about to be inserted
    fn on_create(&mut self, now: DateTime<Utc>);

    /// Stamp a record that replaces `previous`
    ///
    /// The default leaves the incoming record untouched.
    fn on_update(&mut self, _previous: &Self, _now: DateTime<Utc>) {}

    /// Check the record before it is stored
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Trait for records that can be searched and filtered.
///
/// Data entities extend the base Entity with:
/// - indexed_fields: Fields that free-text search looks at
/// - schema: Typed field accessors for condition evaluation
pub trait Data: Entity + Record {
    /// List of fields that free-text search matches against
    fn indexed_fields() -> &'static [&'static str];

    /// Filterable fields of this entity
    fn schema() -> &'static EntitySchema<Self>;

    /// Whether any indexed field contains `query`, ignoring case
    fn matches_search(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        Self::indexed_fields().iter().any(|field| {
            self.field(field)
                .filter(|value| !value.is_null())
                .map(|value| value.to_text().to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}
