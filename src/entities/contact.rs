//! Contact entity

use crate::core::entity::{Data, Entity};
use crate::core::error::ValidationError;
use crate::core::field::{FieldCategory, FieldFormat, FieldValue};
use crate::core::schema::{EntitySchema, FieldDef};
use crate::core::validation::{FieldRules, format, required};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a contact stands in the sales funnel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
}

crate::string_enum!(ContactStatus {
    New => "new",
    Contacted => "contacted",
    Qualified => "qualified",
    Lost => "lost",
});

/// A person the sales team talks to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "Id", default)]
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub company: String,

    #[serde(default)]
    pub status: ContactStatus,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub notes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            company: String::new(),
            status: ContactStatus::New,
            tags: Vec::new(),
            notes: String::new(),
            created_at: None,
            last_activity: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_status(mut self, status: ContactStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

impl Entity for Contact {
    crate::entity_identity!("contacts", "contact");

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.last_activity = Some(now);
    }

    fn on_update(&mut self, previous: &Self, now: DateTime<Utc>) {
        self.created_at = previous.created_at;
        self.last_activity = Some(now);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        FieldRules::new()
            .check("name", self.name.as_str(), required())
            .check("email", self.email.as_str(), required())
            .check("email", self.email.as_str(), format(FieldFormat::Email))
            .check("phone", self.phone.as_str(), format(FieldFormat::Phone))
            .finish()
    }
}

crate::impl_schema_record!(Contact);

static CONTACT_SCHEMA: EntitySchema<Contact> = EntitySchema {
    resource: "contacts",
    fields: &[
        FieldDef {
            name: "name",
            label: "Name",
            category: FieldCategory::Text,
            options: &[],
            accessor: |c: &Contact| Some(FieldValue::from(c.name.as_str())),
        },
        FieldDef {
            name: "email",
            label: "Email",
            category: FieldCategory::Text,
            options: &[],
            accessor: |c: &Contact| Some(FieldValue::from(c.email.as_str())),
        },
        FieldDef {
            name: "company",
            label: "Company",
            category: FieldCategory::Text,
            options: &[],
            accessor: |c: &Contact| Some(FieldValue::from(c.company.as_str())),
        },
        FieldDef {
            name: "status",
            label: "Status",
            category: FieldCategory::Enumeration,
            options: ContactStatus::NAMES,
            accessor: |c: &Contact| Some(FieldValue::from(c.status.as_str())),
        },
        FieldDef {
            name: "phone",
            label: "Phone",
            category: FieldCategory::Text,
            options: &[],
            accessor: |c: &Contact| Some(FieldValue::from(c.phone.as_str())),
        },
        FieldDef {
            name: "createdAt",
            label: "Created Date",
            category: FieldCategory::Date,
            options: &[],
            accessor: |c: &Contact| c.created_at.map(FieldValue::DateTime),
        },
        FieldDef {
            name: "lastActivity",
            label: "Last Activity",
            category: FieldCategory::Date,
            options: &[],
            accessor: |c: &Contact| c.last_activity.map(FieldValue::DateTime),
        },
        FieldDef {
            name: "tags",
            label: "Tags",
            category: FieldCategory::TagList,
            options: &[],
            accessor: |c: &Contact| Some(FieldValue::List(c.tags.clone())),
        },
        FieldDef {
            name: "notes",
            label: "Notes",
            category: FieldCategory::Text,
            options: &[],
            accessor: |c: &Contact| Some(FieldValue::from(c.notes.as_str())),
        },
    ],
};

impl Data for Contact {
    fn indexed_fields() -> &'static [&'static str] {
        &["name", "email", "company"]
    }

    fn schema() -> &'static EntitySchema<Self> {
        &CONTACT_SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_contact_json_shape() {
        let contact: Contact = serde_json::from_value(json!({
            "name": "John Smith",
            "email": "john@acme.com",
            "company": "Acme Corp",
            "status": "qualified",
            "tags": ["enterprise", "hot-lead"]
        }))
        .unwrap();

        assert_eq!(contact.id, 0);
        assert_eq!(contact.status, ContactStatus::Qualified);

        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["Id"], 0);
        assert_eq!(json["status"], "qualified");
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_record_fields_follow_schema() {
        let mut contact = Contact::new("Ann", "ann@acme.com").with_tags(&["vip"]);
        contact.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());

        assert_eq!(contact.field("name"), Some(FieldValue::from("Ann")));
        assert_eq!(contact.field("status"), Some(FieldValue::from("new")));
        assert_eq!(
            contact.field("tags"),
            Some(FieldValue::List(vec!["vip".to_string()]))
        );
        assert!(matches!(contact.field("createdAt"), Some(FieldValue::DateTime(_))));
        assert_eq!(contact.field("lastActivity"), None);
        assert_eq!(contact.field("salary"), None);
    }

    #[test]
    fn test_validation_requires_name_and_email() {
        assert!(Contact::new("Ann", "ann@acme.com").validate().is_ok());

        match Contact::new("", "not-an-email").validate() {
            Err(ValidationError::FieldErrors(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email"]);
            }
            other => panic!("expected two field errors, got {:?}", other),
        }
    }

    #[test]
    fn test_update_keeps_created_at_and_bumps_activity() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let mut original = Contact::new("Ann", "ann@acme.com");
        original.on_create(created);

        let mut edited = original.clone().with_company("Globex");
        edited.created_at = None;
        edited.on_update(&original, later);

        assert_eq!(edited.created_at, Some(created));
        assert_eq!(edited.last_activity, Some(later));
    }

    #[test]
    fn test_search_matches_indexed_fields_only() {
        let mut contact = Contact::new("Ann", "ann@acme.com").with_company("Globex");
        contact.notes = "met at the zebra conference".to_string();

        assert!(contact.matches_search("GLOB"));
        assert!(contact.matches_search("acme.com"));
        assert!(!contact.matches_search("zebra"));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("lost".parse::<ContactStatus>(), Ok(ContactStatus::Lost));
        assert!("archived".parse::<ContactStatus>().is_err());
    }
}
