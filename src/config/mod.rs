//! Configuration module for Tag-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so a harvest can run without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use tag_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvesting tag: {}", config.crawl.tag);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, ApiKey, Config, CrawlConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_content, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
