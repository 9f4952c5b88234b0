//! Tag-Harvest: a polite question harvester
//!
//! This crate pages through the Stack Exchange question listing for a single
//! tag, honoring server-issued backoff and retrying transient failures, and
//! appends the harvested questions to a local SQLite store.

pub mod config;
pub mod crawler;
pub mod model;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Tag-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page {page} failed after {attempts} attempts (status {status}): {body}")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        status: u16,
        body: String,
    },

    #[error("HTTP error for page {page}: {source}")]
    Http { page: u32, source: reqwest::Error },

    #[error("Malformed payload for page {page}: {source}")]
    MalformedPayload {
        page: u32,
        source: serde_json::Error,
    },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Tag-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{ApiKey, Config};
pub use crawler::{Harvest, Pager};
pub use model::{Question, QuestionsPage, Quota};
pub use state::ClientState;
