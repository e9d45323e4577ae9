//! External identifiers - remote URIs registered against internal records

use crate::entity::EntityId;

/// A remote URI that denotes an internal record
///
/// URIs are globally unique in the registry; several identifiers may share
/// one owner (an alias cluster).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalIdentifier {
    /// Canonical URI
    pub uri: String,

    /// Record the URI resolves to
    pub owner: EntityId,
}

impl ExternalIdentifier {
    /// Create a new identifier
    pub fn new(uri: impl Into<String>, owner: EntityId) -> Self {
        Self {
            uri: uri.into(),
            owner,
        }
    }
}
