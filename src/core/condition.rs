//! Conditions, filter specifications and saved filters

use crate::core::operator::Operator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One field/operator/value triple used to test a record
///
/// `value` is always text; operators coerce it as needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// A condition is valid only when field, operator and value are all non-empty
    pub fn is_valid(&self) -> bool {
        !self.field.is_empty() && !self.operator.as_str().is_empty() && !self.value.is_empty()
    }
}

/// Keep only the valid conditions, in their original order
pub fn valid_conditions(conditions: &[Condition]) -> Vec<Condition> {
    conditions.iter().filter(|c| c.is_valid()).cloned().collect()
}

/// Entity collection a filter targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Contacts,
    Deals,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Contacts => "contacts",
            EntityKind::Deals => "deals",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contacts" => Ok(EntityKind::Contacts),
            "deals" => Ok(EntityKind::Deals),
            other => Err(format!("unknown filter type '{}'", other)),
        }
    }
}

/// A named or ephemeral set of conditions for one entity type
///
/// `name` is only present on filters meant to be saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub kind: EntityKind,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl FilterSpec {
    /// Create an ephemeral (apply-only) filter
    pub fn ephemeral(kind: EntityKind, conditions: Vec<Condition>) -> Self {
        Self {
            name: None,
            kind,
            conditions,
        }
    }

    /// Create a filter meant to be saved under `name`
    pub fn named(name: impl Into<String>, kind: EntityKind, conditions: Vec<Condition>) -> Self {
        Self {
            name: Some(name.into()),
            kind,
            conditions,
        }
    }

    /// Copy of this filter without its invalid conditions
    pub fn without_invalid_conditions(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            conditions: valid_conditions(&self.conditions),
        }
    }
}

/// A persisted filter
///
/// Serialized as `{ "Id", "name", "type", "conditions", "createdAt", "updatedAt"? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    #[serde(rename = "Id")]
    pub id: u64,

    pub name: String,

    #[serde(rename = "type")]
    pub kind: EntityKind,

    pub conditions: Vec<Condition>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavedFilter {
    /// The filter as an applicable specification
    pub fn spec(&self) -> FilterSpec {
        FilterSpec::named(self.name.clone(), self.kind, self.conditions.clone())
    }
}
