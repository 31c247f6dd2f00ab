//! Listing Harvester: a proxied listings crawler
//!
//! This crate crawls a listings website through a rotating-proxy gateway,
//! extracts structured records (search results and per-listing reviews),
//! deduplicates them, and persists them incrementally to delimited files.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod gateway;
pub mod output;
pub mod pipeline;
pub mod records;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] gateway::GatewayError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Retries exhausted for {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("Batch file {path} is missing required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{Extractor, HtmlExtractor};
pub use gateway::{FetchOptions, Gateway, ProxyGateway};
pub use pipeline::Pipeline;
pub use records::{Record, ReviewRecord, SearchRecord};
