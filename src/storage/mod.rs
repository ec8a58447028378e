//! Storage implementations for records and saved filters

pub mod in_memory;
pub mod saved_filters;
pub mod seed;

pub use in_memory::InMemoryDataService;
pub use saved_filters::{FileSavedFilterStore, InMemorySavedFilterStore};
pub use seed::SeedData;
