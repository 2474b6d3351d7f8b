//! Configuration management for the refactor workflow

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::WorkflowConfig;
