//! Brickscout: a LEGO deal aggregator
//!
//! This crate scrapes promotional listings from a fixed set of sites, extracts
//! structured deal records from their markup and merges them into a persisted
//! catalog without duplicating or regressing previously collected data.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod sites;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Brickscout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("No deals extracted from listing page {url}")]
    ZeroResults { url: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScoutError {
    /// Builds a navigation error for the given URL
    pub fn navigation(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Returns true if another attempt may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Navigation { .. } | Self::ZeroResults { .. })
    }
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

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Unknown site: {0}")]
    UnknownSite(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Brickscout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Coordinator;
pub use model::{DealRecord, PageKind, Provenance};
pub use sites::SiteId;
