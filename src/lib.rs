pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::config::Config;
pub use crate::core::errors::CarebookError;
pub use crate::core::services::CarebookService;
pub use crate::infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage};

#[cfg(test)]
mod tests; // Include integration tests
