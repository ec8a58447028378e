//! Deal entity

use crate::core::entity::{Data, Entity};
use crate::core::error::ValidationError;
use crate::core::field::{FieldCategory, FieldValue};
use crate::core::schema::{EntitySchema, FieldDef};
use crate::core::validation::{FieldRules, in_range, positive, required};
use crate::entities::{date_value, id_value};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stage of a deal, in kanban order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DealStage {
    #[default]
    Prospecting,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

crate::string_enum!(DealStage {
    Prospecting => "prospecting",
    Proposal => "proposal",
    Negotiation => "negotiation",
    ClosedWon => "closed-won",
    ClosedLost => "closed-lost",
});

impl DealStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            DealStage::Prospecting => "Prospecting",
            DealStage::Proposal => "Proposal",
            DealStage::Negotiation => "Negotiation",
            DealStage::ClosedWon => "Closed Won",
            DealStage::ClosedLost => "Closed Lost",
        }
    }

    /// Won and lost deals are out of the active pipeline
    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

/// A sales opportunity with a monetary value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    #[serde(rename = "Id", default)]
    pub id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub value: f64,

    #[serde(default)]
    pub stage: DealStage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<u64>,

    /// Win probability in percent
    #[serde(default)]
    pub probability: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<NaiveDate>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Deal {
    pub fn new(title: impl Into<String>, value: f64) -> Self {
        Self {
            id: 0,
            title: title.into(),
            value,
            stage: DealStage::Prospecting,
            contact_id: None,
            probability: 0,
            close_date: None,
            tags: Vec::new(),
            created_at: None,
        }
    }

    pub fn with_stage(mut self, stage: DealStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_contact(mut self, contact_id: u64) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    pub fn is_active(&self) -> bool {
        !self.stage.is_closed()
    }
}

impl Entity for Deal {
    crate::entity_identity!("deals", "deal");

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
    }

    fn on_update(&mut self, previous: &Self, _now: DateTime<Utc>) {
        self.created_at = previous.created_at;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        FieldRules::new()
            .check("title", self.title.as_str(), required())
            .check("value", self.value, positive())
            .check(
                "probability",
                self.probability as i64,
                in_range(0.0, 100.0),
            )
            .finish()
    }
}

crate::impl_schema_record!(Deal);

static DEAL_SCHEMA: EntitySchema<Deal> = EntitySchema {
    resource: "deals",
    fields: &[
        FieldDef {
            name: "title",
            label: "Title",
            category: FieldCategory::Text,
            options: &[],
            accessor: |d: &Deal| Some(FieldValue::from(d.title.as_str())),
        },
        FieldDef {
            name: "stage",
            label: "Stage",
            category: FieldCategory::Enumeration,
            options: DealStage::NAMES,
            accessor: |d: &Deal| Some(FieldValue::from(d.stage.as_str())),
        },
        FieldDef {
            name: "value",
            label: "Value",
            category: FieldCategory::Numeric,
            options: &[],
            accessor: |d: &Deal| Some(FieldValue::Float(d.value)),
        },
        FieldDef {
            name: "probability",
            label: "Probability",
            category: FieldCategory::Numeric,
            options: &[],
            accessor: |d: &Deal| Some(FieldValue::Integer(d.probability as i64)),
        },
        FieldDef {
            name: "closeDate",
            label: "Close Date",
            category: FieldCategory::Date,
            options: &[],
            accessor: |d: &Deal| date_value(d.close_date),
        },
        FieldDef {
            name: "createdAt",
            label: "Created Date",
            category: FieldCategory::Date,
            options: &[],
            accessor: |d: &Deal| d.created_at.map(FieldValue::DateTime),
        },
        FieldDef {
            name: "contactId",
            label: "Contact",
            category: FieldCategory::Text,
            options: &[],
            accessor: |d: &Deal| id_value(d.contact_id),
        },
        FieldDef {
            name: "tags",
            label: "Tags",
            category: FieldCategory::TagList,
            options: &[],
            accessor: |d: &Deal| Some(FieldValue::List(d.tags.clone())),
        },
    ],
};

impl Data for Deal {
    fn indexed_fields() -> &'static [&'static str] {
        &["title"]
    }

    fn schema() -> &'static EntitySchema<Self> {
        &DEAL_SCHEMA
    }
}
