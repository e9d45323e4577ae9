//! Error types for the Importer

use lodestar_domain::{EntityId, EntityKind, RelationKind};
use lodestar_graph::{FetchError, Source};
use std::fmt;
use thiserror::Error;

/// An identifier involved in an identity conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictingIdentifier {
    /// Registered URI
    pub uri: String,

    /// Record it is registered to
    pub owner: EntityId,

    /// Kind of that record, if it could be read
    pub owner_kind: Option<EntityKind>,
}

impl fmt::Display for ConflictingIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner_kind {
            Some(kind) => write!(f, "{} -> {} {}", self.uri, kind.as_str(), self.owner),
            None => write!(f, "{} -> {}", self.uri, self.owner),
        }
    }
}

/// Errors that can occur during an import
#[derive(Error, Debug)]
pub enum ImportError {
    /// The URI belongs to no supported source
    #[error("Unsupported URI: {0}")]
    UnsupportedUri(String),

    /// The description could not be fetched or parsed
    #[error("Fetch failed for {uri}: {source}")]
    Fetch {
        /// Canonical URI being imported
        uri: String,
        /// Underlying error
        #[source]
        source: FetchError,
    },

    /// More than one subject in the description matches the filters
    #[error("Ambiguous description at {uri}: {} subjects match ({})", subjects.len(), subjects.join(", "))]
    Ambiguous {
        /// Canonical URI being imported
        uri: String,
        /// The matching subjects
        subjects: Vec<String>,
    },

    /// The description holds no subject the config applies to
    #[error("No applicable description at {0}")]
    NoDescription(String),

    /// No extraction config for the requested kind and source
    #[error("No {} config for source {origin}", kind.as_str())]
    NoConfig {
        /// Requested kind
        kind: EntityKind,
        /// Source of the URI
        origin: Source,
    },

    /// The identifiers of one description belong to different records
    #[error("Identity conflict for {uri}: {}", describe(identifiers))]
    IdentityConflict {
        /// Canonical URI being imported
        uri: String,
        /// Every registered identifier involved
        identifiers: Vec<ConflictingIdentifier>,
    },

    /// A relation target failed under the abort policy
    #[error("Relation '{kind}' to {target} failed: {source}")]
    RelationTarget {
        /// Kind of relation
        kind: RelationKind,
        /// Target URI as stated by the source
        target: String,
        /// Why the target could not be imported
        #[source]
        source: Box<ImportError>,
    },

    /// Storage failure, including exhausted write retries
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ImportError {
    /// Whether retrying the same import could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ImportError::Fetch { source, .. } => source.is_retryable(),
            ImportError::RelationTarget { source, .. } => source.is_retryable(),
            ImportError::Persistence(_) => true,
            _ => false,
        }
    }

    /// Whether a failure of a dependent (relation target, vocabulary term)
    /// must fail the whole import regardless of policy
    pub(crate) fn is_hard(&self) -> bool {
        matches!(
            self,
            ImportError::IdentityConflict { .. } | ImportError::Persistence(_)
        )
    }
}

fn describe(identifiers: &[ConflictingIdentifier]) -> String {
    identifiers
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// An import failure, or a store failure still to be classified
///
/// Store errors are kept typed until the transaction loop can tell a
/// uniqueness violation (retry) from any other failure.
#[derive(Debug)]
pub(crate) enum StepError<E> {
    Store(E),
    Import(ImportError),
}

impl<E> From<ImportError> for StepError<E> {
    fn from(e: ImportError) -> Self {
        StepError::Import(e)
    }
}

impl<E: fmt::Display> StepError<E> {
    pub(crate) fn into_import(self) -> ImportError {
        match self {
            StepError::Store(e) => ImportError::Persistence(e.to_string()),
            StepError::Import(e) => e,
        }
    }
}
