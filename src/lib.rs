//! # Pipeline CRM
//!
//! A sales CRM back end built around a condition-based filter engine.
//!
//! ## Features
//!
//! - **Condition Evaluator**: AND-combined `{field, operator, value}` predicates over
//!   text, numbers, dates, enumerations and tag lists
//! - **Typed Schemas**: Per-entity field accessors resolved once per filter
//! - **Saved Filters**: Named condition sets, in memory or persisted to JSON
//! - **CRM Workflows**: Dashboard metrics, deal pipeline, task views, activity timeline
//! - **REST API**: CRUD, filtering and saved filters over Axum
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crm::prelude::*;
//!
//! let deals = vec![Deal::new("Starter", 500.0), Deal::new("Enterprise", 5000.0)];
//! let conditions = vec![Condition::new("value", "greater", "1000")];
//!
//! let evaluator = Evaluator::at_current_time();
//! let matched = CompiledFilter::<Deal>::compile(&conditions).apply(&deals, &evaluator);
//! assert_eq!(matched.len(), 1);
//!
//! // Untyped records work too
//! let record = serde_json::json!({ "company": "Acme Corp" });
//! assert!(evaluator.matches(&record, &[Condition::new("company", "starts_with", "ac")]));
//! ```

pub mod config;
pub mod core;
pub mod crm;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        CompiledFilter, Condition, CrmError, Data, DataService, Entity, EntityKind,
        EntitySchema, Evaluator, FieldCategory, FieldValue, FilterSpec, Operator, Outcome,
        Record, SavedFilter, SavedFilterService, valid_conditions,
    };
    pub use crate::core::evaluator::{filter, matches};

    // === Entities ===
    pub use crate::entities::{
        Activity, ActivityType, Contact, ContactStatus, Deal, DealStage, Task, TaskStatus,
    };

    // === Workflows ===
    pub use crate::crm::{DashboardMetrics, PipelineStage, TaskCounts, TaskView};

    // === Storage ===
    pub use crate::storage::{
        FileSavedFilterStore, InMemoryDataService, InMemorySavedFilterStore, SeedData,
    };

    // === Config ===
    pub use crate::config::CrmConfig;

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
}
