//! Configuration for the Importer

use serde::{Deserialize, Serialize};

/// Deepest relation recursion a config may ask for
pub const MAX_DEPTH_LIMIT: usize = 4;

/// What happens when a relation target cannot be imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationPolicy {
    /// Log the failure, record it in the report and drop the relation
    #[default]
    Skip,
    /// Roll the whole import back and return the failure
    Abort,
}

/// Configuration for the Importer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Handling of relation targets that fail to import
    pub relation_policy: RelationPolicy,

    /// How many levels of relations are followed from the subject
    ///
    /// With the default of 1 the subject's targets are imported, but their
    /// own relations are not.
    pub max_depth: usize,

    /// Transaction attempts before a write conflict becomes a hard failure
    pub persist_attempts: u32,

    /// Fetch vocabulary terms given only as URIs to learn their labels
    pub lookup_vocabulary: bool,
}

impl ImporterConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.persist_attempts == 0 {
            return Err("persist_attempts must be greater than 0".to_string());
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(format!("max_depth cannot exceed {}", MAX_DEPTH_LIMIT));
        }
        Ok(())
    }

    /// Strict preset: any relation target failure aborts the import
    pub fn strict() -> Self {
        Self {
            relation_policy: RelationPolicy::Abort,
            ..Self::default()
        }
    }

    /// Shallow preset: import the subject only, no relations, no lookups
    pub fn shallow() -> Self {
        Self {
            max_depth: 0,
            lookup_vocabulary: false,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            relation_policy: RelationPolicy::Skip,
            max_depth: 1,
            persist_attempts: 3,
            lookup_vocabulary: true,
        }
    }
}
