//! Server module for building the CRM HTTP server
//!
//! This module provides a `ServerBuilder` that registers:
//! - CRUD, filter and schema routes for every entity
//! - Saved-filter routes
//! - Workflow routes (dashboard, pipeline, tasks, activities)

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use entity_registry::{DataDescriptor, EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use host::{FilterResults, ServerHost};
