//! Error types for mapping configuration and extraction

use thiserror::Error;

/// Errors in a mapping configuration
///
/// All of these are detected when a registry is built, before any graph is
/// fetched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// CURIE with an undeclared prefix
    #[error("Unknown prefix '{0}'")]
    UnknownPrefix(String),

    /// Malformed property path or query
    #[error("Invalid path '{path}': {message}")]
    InvalidPath {
        /// Path text
        path: String,
        /// What is wrong with it
        message: String,
    },

    /// Malformed filter constraint
    #[error("Invalid filter constraint '{0}'")]
    InvalidConstraint(String),

    /// Unknown name for a field, relation, target, source or coercion
    #[error("Unknown {what} '{name}'")]
    UnknownName {
        /// Kind of name
        what: &'static str,
        /// The name as written
        name: String,
    },

    /// A config that parses but cannot be used
    #[error("Invalid config for {target} from {origin}: {message}")]
    InvalidConfig {
        /// Config target
        target: String,
        /// Source the config reads from
        origin: String,
        /// What is wrong with it
        message: String,
    },

    /// TOML syntax or shape error
    #[error("TOML error: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for MappingError {
    fn from(e: toml::de::Error) -> Self {
        MappingError::Toml(e.to_string())
    }
}

/// Errors while applying a config to a fetched graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// More than one subject satisfies the filters
    #[error("Ambiguous description: {} subjects match ({})", subjects.len(), subjects.join(", "))]
    Ambiguous {
        /// The matching subjects
        subjects: Vec<String>,
    },
}
