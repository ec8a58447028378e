//! Per-entity field schemas
//!
//! A schema maps each filterable field name to a typed accessor and a
//! [`FieldCategory`]. Field names are resolved once, when a filter is
//! compiled or a condition is built, instead of on every record.

use crate::core::condition::{Condition, FilterSpec};
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::field::{FieldCategory, FieldValue};
use crate::core::operator::Operator;
use serde::Serialize;

/// Reads one field from a typed record
pub type Accessor<T> = fn(&T) -> Option<FieldValue>;

static TEXT_OPERATORS: [Operator; 5] = [
    Operator::Contains,
    Operator::Equals,
    Operator::NotEquals,
    Operator::StartsWith,
    Operator::EndsWith,
];

static NUMERIC_OPERATORS: [Operator; 4] = [
    Operator::Equals,
    Operator::Greater,
    Operator::Less,
    Operator::Between,
];

static DATE_OPERATORS: [Operator; 6] = [
    Operator::After,
    Operator::Before,
    Operator::Between,
    Operator::Today,
    Operator::ThisWeek,
    Operator::ThisMonth,
];

static ENUMERATION_OPERATORS: [Operator; 3] =
    [Operator::Equals, Operator::NotEquals, Operator::In];

static TAG_LIST_OPERATORS: [Operator; 3] =
    [Operator::Contains, Operator::NotContains, Operator::Equals];

impl FieldCategory {
    /// Operators a condition builder allows for this category
    pub fn operators(&self) -> &'static [Operator] {
        match self {
            FieldCategory::Text => &TEXT_OPERATORS,
            FieldCategory::Numeric => &NUMERIC_OPERATORS,
            FieldCategory::Date => &DATE_OPERATORS,
            FieldCategory::Enumeration => &ENUMERATION_OPERATORS,
            FieldCategory::TagList => &TAG_LIST_OPERATORS,
        }
    }

    pub fn allows(&self, operator: &Operator) -> bool {
        self.operators().contains(operator)
    }
}

/// One filterable field of an entity
pub struct FieldDef<T: 'static> {
    pub name: &'static str,
    pub label: &'static str,
    pub category: FieldCategory,
    /// Allowed values for enumeration fields, empty otherwise
    pub options: &'static [&'static str],
    pub accessor: Accessor<T>,
}

impl<T> FieldDef<T> {
    pub fn read(&self, record: &T) -> Option<FieldValue> {
        (self.accessor)(record)
    }
}

/// Field schema of one entity type
pub struct EntitySchema<T: 'static> {
    /// Plural resource name (e.g. "contacts")
    pub resource: &'static str,
    pub fields: &'static [FieldDef<T>],
}

/// Serializable view of a field for builder UIs
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescription {
    pub name: &'static str,
    pub label: &'static str,
    pub category: FieldCategory,
    pub operators: Vec<OperatorDescription>,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorDescription {
    pub value: String,
    pub label: String,
}

impl<T> EntitySchema<T> {
    /// Look up a field definition by name
    pub fn field(&self, name: &str) -> Option<&FieldDef<T>> {
        self.fields.iter().find(|def| def.name == name)
    }

    /// Read a field from a record; unknown names read as absent
    pub fn value(&self, record: &T, name: &str) -> Option<FieldValue> {
        self.field(name).and_then(|def| def.read(record))
    }

    /// Build a condition, enforcing the operator whitelist of the field's category
    ///
    /// The value must be non-empty, so a built condition is always valid.
    pub fn condition(
        &self,
        field: &str,
        operator: impl Into<Operator>,
        value: impl Into<String>,
    ) -> Result<Condition, ValidationError> {
        let condition = Condition::new(field, operator, value);
        self.check(&condition)?;
        Ok(condition)
    }

    /// Check one condition against this schema
    pub fn check(&self, condition: &Condition) -> Result<(), ValidationError> {
        let def = self
            .field(&condition.field)
            .ok_or_else(|| ValidationError::FieldError {
                field: condition.field.clone(),
                message: format!("unknown field for {}", self.resource),
            })?;

        if !def.category.allows(&condition.operator) {
            return Err(ValidationError::FieldError {
                field: condition.field.clone(),
                message: format!(
                    "operator '{}' is not allowed for {:?} fields",
                    condition.operator, def.category
                ),
            });
        }

        if condition.value.is_empty() {
            return Err(ValidationError::FieldError {
                field: condition.field.clone(),
                message: "value is required".to_string(),
            });
        }

        Ok(())
    }

    /// Check every condition, collecting all failures
    pub fn validate_conditions(&self, conditions: &[Condition]) -> Result<(), ValidationError> {
        let errors: Vec<FieldValidationError> = conditions
            .iter()
            .filter_map(|condition| match self.check(condition) {
                Ok(()) => None,
                Err(ValidationError::FieldError { field, message }) => {
                    Some(FieldValidationError { field, message })
                }
                Err(other) => Some(FieldValidationError {
                    field: condition.field.clone(),
                    message: other.to_string(),
                }),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }

    /// Check a filter specification so it can be saved
    pub fn validate_spec(&self, spec: &FilterSpec) -> Result<(), ValidationError> {
        self.validate_conditions(&spec.conditions)
    }

    /// Describe the filterable fields with their allowed operators
    pub fn describe(&self) -> Vec<FieldDescription> {
        self.fields
            .iter()
            .map(|def| FieldDescription {
                name: def.name,
                label: def.label,
                category: def.category,
                operators: def
                    .category
                    .operators()
                    .iter()
                    .map(|op| OperatorDescription {
                        value: op.as_str().to_string(),
                        label: op.label().to_string(),
                    })
                    .collect(),
                options: def.options,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lead {
        name: String,
        score: f64,
        status: &'static str,
    }

    static LEAD_SCHEMA: EntitySchema<Lead> = EntitySchema {
        resource: "leads",
        fields: &[
            FieldDef {
                name: "name",
                label: "Name",
                category: FieldCategory::Text,
                options: &[],
                accessor: |lead: &Lead| Some(FieldValue::String(lead.name.clone())),
            },
            FieldDef {
                name: "score",
                label: "Score",
                category: FieldCategory::Numeric,
                options: &[],
                accessor: |lead: &Lead| Some(FieldValue::Float(lead.score)),
            },
            FieldDef {
                name: "status",
                label: "Status",
                category: FieldCategory::Enumeration,
                options: &["open", "closed"],
                accessor: |lead: &Lead| Some(FieldValue::from(lead.status)),
            },
        ],
    };

    fn lead() -> Lead {
        Lead {
            name: "Acme".to_string(),
            score: 7.5,
            status: "open",
        }
    }

    #[test]
    fn test_value_lookup() {
        let record = lead();
        assert_eq!(LEAD_SCHEMA.value(&record, "score"), Some(FieldValue::Float(7.5)));
        assert_eq!(LEAD_SCHEMA.value(&record, "missing"), None);
    }

    #[test]
    fn test_condition_builder_accepts_whitelisted_operator() {
        let condition = LEAD_SCHEMA.condition("score", "between", "1,10").unwrap();
        assert_eq!(condition.operator, Operator::Between);
        assert!(condition.is_valid());
    }

    #[test]
    fn test_condition_builder_rejects_operator_outside_category() {
        let err = LEAD_SCHEMA.condition("status", "starts_with", "o").unwrap_err();
        assert!(err.to_string().contains("starts_with"));
    }

    #[test]
    fn test_condition_builder_rejects_unknown_field_and_empty_value() {
        assert!(LEAD_SCHEMA.condition("owner", "equals", "x").is_err());
        assert!(LEAD_SCHEMA.condition("name", "equals", "").is_err());
        assert!(LEAD_SCHEMA.condition("name", "xyz", "a").is_err());
    }

    #[test]
    fn test_validate_conditions_collects_all_errors() {
        let conditions = vec![
            Condition::new("name", "contains", "a"),
            Condition::new("score", "in", "1,2"),
            Condition::new("owner", "equals", "x"),
        ];
        match LEAD_SCHEMA.validate_conditions(&conditions) {
            Err(ValidationError::FieldErrors(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "score");
                assert_eq!(errors[1].field, "owner");
            }
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn test_describe_lists_operators() {
        let fields = LEAD_SCHEMA.describe();
        assert_eq!(fields.len(), 3);
        let status = &fields[2];
        let ops: Vec<&str> = status.operators.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(ops, vec!["equals", "not_equals", "in"]);
        assert_eq!(status.options, &["open", "closed"]);
    }
}
