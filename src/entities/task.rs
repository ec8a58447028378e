//! Task entity

use crate::core::entity::{Data, Entity};
use crate::core::error::ValidationError;
use crate::core::field::{FieldCategory, FieldValue};
use crate::core::schema::{EntitySchema, FieldDef};
use crate::core::validation::{FieldRules, required};
use crate::entities::{date_value, id_value};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

crate::string_enum!(TaskStatus {
    Pending => "pending",
    Completed => "completed",
});

impl TaskStatus {
    pub fn toggled(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

/// A follow-up item with a due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "Id", default)]
    pub id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<u64>,

    #[serde(default)]
    pub assigned_to: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: String::new(),
            due_date: Some(due_date),
            status: TaskStatus::Pending,
            contact_id: None,
            assigned_to: String::new(),
            created_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Pending with a due date strictly before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_pending()
            && self
                .due_date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .is_some_and(|due| due.and_utc() < now)
    }
}

impl Entity for Task {
    crate::entity_identity!("tasks", "task");

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
        let due_date = self
            .due_date
            .map(|d| FieldValue::from(d.to_string()))
            .unwrap_or(FieldValue::Null);

        FieldRules::new()
            .check("title", self.title.as_str(), required())
            .check("dueDate", due_date, required())
            .finish()
    }
}

crate::impl_schema_record!(Task);

static TASK_SCHEMA: EntitySchema<Task> = EntitySchema {
    resource: "tasks",
    fields: &[
        FieldDef {
            name: "title",
            label: "Title",
            category: FieldCategory::Text,
            options: &[],
            accessor: |t: &Task| Some(FieldValue::from(t.title.as_str())),
        },
        FieldDef {
            name: "description",
            label: "Description",
            category: FieldCategory::Text,
            options: &[],
            accessor: |t: &Task| Some(FieldValue::from(t.description.as_str())),
        },
        FieldDef {
            name: "status",
            label: "Status",
            category: FieldCategory::Enumeration,
            options: TaskStatus::NAMES,
            accessor: |t: &Task| Some(FieldValue::from(t.status.as_str())),
        },
        FieldDef {
            name: "dueDate",
            label: "Due Date",
            category: FieldCategory::Date,
            options: &[],
            accessor: |t: &Task| date_value(t.due_date),
        },
        FieldDef {
            name: "contactId",
            label: "Contact",
            category: FieldCategory::Text,
            options: &[],
            accessor: |t: &Task| id_value(t.contact_id),
        },
        FieldDef {
            name: "assignedTo",
            label: "Assigned To",
            category: FieldCategory::Text,
            options: &[],
            accessor: |t: &Task| Some(FieldValue::from(t.assigned_to.as_str())),
        },
        FieldDef {
            name: "createdAt",
            label: "Created Date",
            category: FieldCategory::Date,
            options: &[],
            accessor: |t: &Task| t.created_at.map(FieldValue::DateTime),
        },
    ],
};

impl Data for Task {
    fn indexed_fields() -> &'static [&'static str] {
        &["title", "description", "assignedTo"]
    }

    fn schema() -> &'static EntitySchema<Self> {
        &TASK_SCHEMA
    }
}
