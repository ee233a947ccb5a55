pub mod config;
pub mod email;
pub mod error;
pub mod event_log;
pub mod executor;
pub mod orchestrator;
pub mod registry;
pub mod reporter;
pub mod service;
pub mod types;

pub use error::{PlugError, Result};
