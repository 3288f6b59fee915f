//! Configuration module for Brickscout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a minimal file only names the store:
//!
//! ```toml
//! [output]
//! store-path = "./data/deals.json"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use brickscout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("brickscout.toml")).unwrap();
//! println!("Retrying up to {} times", config.retry.max_attempts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BackoffStrategy, BrowserConfig, Config, ExtractionConfig, OutputConfig, RetryConfig,
    SchedulerConfig, SiteAlias, StoreBackend,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
