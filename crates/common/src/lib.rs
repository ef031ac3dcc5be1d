//! Redscope Common Library
//!
//! Shared code for the Redscope dashboard including:
//! - Dataset loading and post records
//! - Pagination and per-session state
//! - Media classification for attached URLs
//! - Query context retrieval and prompt building
//! - Reasoning agent abstraction (hosted LLM)
//! - Error types, configuration, metrics

pub mod agent;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod dataset;
pub mod errors;
pub mod media;
pub mod metrics;
pub mod pagination;
pub mod qa;
pub mod session;

// Re-export commonly used types
pub use agent::ReasoningAgent;
pub use config::AppConfig;
pub use dataset::{Dataset, DatasetLoader, PostRecord};
pub use errors::{AppError, Result};
pub use session::{ChatScope, SessionContext, SessionStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default reasoning model
pub const DEFAULT_AGENT_MODEL: &str = "gemini-2.0-flash";

/// Default page size for the post list
pub const DEFAULT_PAGE_SIZE: usize = 1000;
