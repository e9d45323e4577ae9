//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Import error
    #[error(transparent)]
    Import(#[from] lodestar_importer::ImportError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] lodestar_store::StoreError),

    /// Fetcher setup error
    #[error("Fetcher error: {0}")]
    Fetch(#[from] lodestar_graph::FetchError),

    /// Mapping error
    #[error("Mapping error: {0}")]
    Mapping(#[from] lodestar_mapping::MappingError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Nothing matches the lookup
    #[error("Not found: {0}")]
    NotFound(String),
}
