//! Reusable field validators
//!
//! Validators are closures over a field name and value. [`FieldRules`]
//! runs them and collects one error per field.

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::field::{FieldFormat, FieldValue};

/// Validator: field is present and, for text, not blank
pub fn required() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &FieldValue| match value {
        FieldValue::Null => Err(format!("'{}' is required", field)),
        FieldValue::String(s) if s.trim().is_empty() => Err(format!("'{}' is required", field)),
        _ => Ok(()),
    }
}

/// Validator: number must be strictly positive
pub fn positive() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &FieldValue| {
        let number = match value {
            FieldValue::Integer(i) => *i as f64,
            FieldValue::Float(f) => *f,
            _ => return Ok(()), // Not a number; another validator reports it
        };
        if number > 0.0 {
            Ok(())
        } else {
            Err(format!("'{}' must be greater than 0 (value: {})", field, number))
        }
    }
}

/// Validator: number must lie within `[min, max]`
pub fn in_range(
    min: f64,
    max: f64,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| {
        let number = match value {
            FieldValue::Integer(i) => *i as f64,
            FieldValue::Float(f) => *f,
            _ => return Ok(()),
        };
        if (min..=max).contains(&number) {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be between {} and {} (value: {})",
                field, min, max, number
            ))
        }
    }
}

/// Validator: string matches a format; empty strings are left to `required`
pub fn format(
    format: FieldFormat,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| match value {
        FieldValue::String(s) if s.is_empty() => Ok(()),
        FieldValue::String(_) if format.validate(value) => Ok(()),
        FieldValue::String(_) => Err(format!("'{}' has an invalid format", field)),
        _ => Ok(()),
    }
}

/// Collects validation failures for one record
#[derive(Debug, Default)]
pub struct FieldRules {
    errors: Vec<FieldValidationError>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `rule` on a field, unless that field already failed
    pub fn check(
        mut self,
        field: &str,
        value: impl Into<FieldValue>,
        rule: impl Fn(&str, &FieldValue) -> Result<(), String>,
    ) -> Self {
        if self.errors.iter().any(|e| e.field == field) {
            return self;
        }
        if let Err(message) = rule(field, &value.into()) {
            self.errors.push(FieldValidationError::new(field, message));
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        ValidationError::from_field_errors(self.errors)
    }
}
