//! CRM workflows built on the record services and the condition evaluator

pub mod activities;
pub mod dashboard;
pub mod pipeline;
pub mod tasks;

pub use dashboard::DashboardMetrics;
pub use pipeline::PipelineStage;
pub use tasks::{TaskCounts, TaskView};
