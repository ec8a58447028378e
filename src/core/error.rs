//! Typed error handling for the CRM
//!
//! Services return [`CrmError`] so callers can match on specific failures
//! instead of inspecting strings. Each category maps to an HTTP status and a
//! stable error code.
//!
//! # Error Categories
//!
//! - [`EntityError`]: record CRUD failures
//! - [`FilterError`]: saved-filter lookups
//! - [`ValidationError`]: rejected input
//! - [`ConfigError`]: configuration loading
//! - [`StorageError`]: storage backends
//!
//! The condition evaluator itself never produces an error.
//!
//! ```rust,ignore
//! match store.delete(42).await {
//!     Ok(()) => {}
//!     Err(CrmError::Filter(FilterError::NotFound { id })) => println!("no filter {}", id),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type used by services and stores
pub type Result<T> = std::result::Result<T, CrmError>;

/// The main error type of the CRM
#[derive(Debug, Error)]
pub enum CrmError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CrmError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrmError::Entity(e) => e.status_code(),
            CrmError::Filter(e) => e.status_code(),
            CrmError::Validation(_) => StatusCode::BAD_REQUEST,
            CrmError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrmError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrmError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CrmError::Entity(e) => e.error_code(),
            CrmError::Filter(e) => e.error_code(),
            CrmError::Validation(_) => "VALIDATION_ERROR",
            CrmError::Config(_) => "CONFIG_ERROR",
            CrmError::Storage(_) => "STORAGE_ERROR",
            CrmError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this is a not-found error of any category
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CrmError::Entity(EntityError::NotFound { .. })
                | CrmError::Filter(FilterError::NotFound { .. })
        )
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CrmError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({ "entity_type": entity_type, "id": id }))
            }
            CrmError::Filter(FilterError::NotFound { id }) => Some(serde_json::json!({ "id": id })),
            CrmError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            CrmError::Validation(ValidationError::FieldError { field, message }) => {
                Some(serde_json::json!({ "fields": [{ "field": field, "message": message }] }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for CrmError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to record operations
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: u64 },
}

impl EntityError {
    pub fn not_found(entity_type: impl Into<String>, id: u64) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.into(),
            id,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
        }
    }
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors related to saved filters
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Filter with id '{id}' not found")]
    NotFound { id: u64 },

    #[error("Unknown filter type: {kind}")]
    UnknownType { kind: String },
}

impl FilterError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FilterError::NotFound { .. } => StatusCode::NOT_FOUND,
            FilterError::UnknownType { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FilterError::NotFound { .. } => "FILTER_NOT_FOUND",
            FilterError::UnknownType { .. } => "UNKNOWN_FILTER_TYPE",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Missing required argument: {argument}")]
    MissingArgument { argument: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Collapse a list of field errors, `Ok` when the list is empty
    pub fn from_field_errors(
        mut errors: Vec<FieldValidationError>,
    ) -> std::result::Result<(), ValidationError> {
        match errors.len() {
            0 => Ok(()),
            1 => {
                let FieldValidationError { field, message } = errors.remove(0);
                Err(ValidationError::FieldError { field, message })
            }
            _ => Err(ValidationError::FieldErrors(errors)),
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config file '{file}': {message}")]
    ParseError { file: String, message: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to acquire {mode} lock on {resource}")]
    LockPoisoned {
        resource: &'static str,
        mode: &'static str,
    },

    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}
