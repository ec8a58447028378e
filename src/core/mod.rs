//! Core module containing the condition model, the evaluator and service traits

pub mod compare;
pub mod condition;
pub mod entity;
pub mod error;
pub mod evaluator;
pub mod field;
pub mod operator;
pub mod query;
pub mod record;
pub mod schema;
pub mod service;
pub mod validation;

pub use compare::Outcome;
pub use condition::{Condition, EntityKind, FilterSpec, SavedFilter, valid_conditions};
pub use entity::{Data, Entity};
pub use error::{CrmError, Result};
pub use evaluator::{CompiledFilter, Evaluator};
pub use field::{FieldCategory, FieldFormat, FieldValue};
pub use operator::Operator;
pub use query::{PaginatedResponse, PaginationMeta, QueryParams, SortSpec};
pub use record::Record;
pub use schema::{EntitySchema, FieldDef, FieldDescription};
pub use service::{DataService, SavedFilterService};
