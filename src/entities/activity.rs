//! Activity entity: timeline entries logged against contacts

use crate::core::entity::{Data, Entity};
use crate::core::field::{FieldCategory, FieldValue};
use crate::core::schema::{EntitySchema, FieldDef};
use crate::entities::id_value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Email,
    Call,
    Meeting,
    #[default]
    Note,
    Task,
}

crate::string_enum!(ActivityType {
    Email => "email",
    Call => "call",
    Meeting => "meeting",
    Note => "note",
    Task => "task",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "Id", default)]
    pub id: u64,

    #[serde(rename = "type", default)]
    pub kind: ActivityType,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn new(kind: ActivityType, description: impl Into<String>, contact_id: u64) -> Self {
        Self {
            id: 0,
            kind,
            description: description.into(),
            contact_id: Some(contact_id),
            deal_id: None,
            timestamp: None,
        }
    }
}

impl Entity for Activity {
    crate::entity_identity!("activities", "activity");

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.timestamp = Some(now);
    }

    fn on_update(&mut self, previous: &Self, _now: DateTime<Utc>) {
        self.timestamp = previous.timestamp;
    }
}

crate::impl_schema_record!(Activity);

static ACTIVITY_SCHEMA: EntitySchema<Activity> = EntitySchema {
    resource: "activities",
    fields: &[
        FieldDef {
            name: "type",
            label: "Type",
            category: FieldCategory::Enumeration,
            options: ActivityType::NAMES,
            accessor: |a: &Activity| Some(FieldValue::from(a.kind.as_str())),
        },
        FieldDef {
            name: "description",
            label: "Description",
            category: FieldCategory::Text,
            options: &[],
            accessor: |a: &Activity| Some(FieldValue::from(a.description.as_str())),
        },
        FieldDef {
            name: "contactId",
            label: "Contact",
            category: FieldCategory::Text,
            options: &[],
            accessor: |a: &Activity| id_value(a.contact_id),
        },
        FieldDef {
            name: "dealId",
            label: "Deal",
            category: FieldCategory::Text,
            options: &[],
            accessor: |a: &Activity| id_value(a.deal_id),
        },
        FieldDef {
            name: "timestamp",
            label: "Timestamp",
            category: FieldCategory::Date,
            options: &[],
            accessor: |a: &Activity| a.timestamp.map(FieldValue::DateTime),
        },
    ],
};

impl Data for Activity {
    fn indexed_fields() -> &'static [&'static str] {
        &["description"]
    }

    fn schema() -> &'static EntitySchema<Self> {
        &ACTIVITY_SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;
    use serde_json::json;

    #[test]
    fn test_type_is_serialized_as_type() {
        let activity: Activity = serde_json::from_value(json!({
            "type": "call",
            "description": "Discussed pricing",
            "contactId": 2,
            "dealId": 5
        }))
        .unwrap();

        assert_eq!(activity.kind, ActivityType::Call);
        assert_eq!(activity.field("type"), Some(FieldValue::from("call")));
        assert_eq!(activity.field("dealId"), Some(FieldValue::Integer(5)));

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "call");
        assert!(json.get("timestamp").is_none());
    }
}
