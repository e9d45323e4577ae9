//! Trait definitions for external interactions
//!
//! These traits define the boundary between the importer and the record store.
//! The SQLite implementation lives in `lodestar-store`.

use crate::{
    EntityId, EntityKind, EntityRecord, ExternalIdentifier, RelationEdge, Vocabulary,
    VocabularyEntry,
};

/// Read access to records, identifiers and relations
///
/// Implemented both by the store and by an open transaction, so reads inside a
/// transaction observe its uncommitted writes.
pub trait RecordReader {
    /// Error type for store operations
    type Error;

    /// Get a record by id, including its vocabulary labels
    fn get_entity(&self, id: EntityId) -> Result<Option<EntityRecord>, Self::Error>;

    /// Owner of a registered identifier
    fn owner_of(&self, uri: &str) -> Result<Option<EntityId>, Self::Error>;

    /// All identifiers registered against a record, ordered by URI
    fn identifiers_of(&self, id: EntityId) -> Result<Vec<ExternalIdentifier>, Self::Error>;

    /// Outgoing relations of a record
    fn relations_of(&self, id: EntityId) -> Result<Vec<RelationEdge>, Self::Error>;

    /// Vocabulary entries attached to a record
    fn vocabulary_of(&self, id: EntityId) -> Result<Vec<VocabularyEntry>, Self::Error>;

    /// Number of records, optionally restricted to one kind
    fn count_entities(&self, kind: Option<EntityKind>) -> Result<usize, Self::Error>;
}

/// A unit of work covering all writes of one import
///
/// Dropping a transaction without calling [`ImportTransaction::commit`] rolls
/// every write back.
pub trait ImportTransaction: RecordReader {
    /// Insert a new record with its plain attributes
    ///
    /// Vocabulary labels carried in the record data are not written; use
    /// [`ImportTransaction::attach_vocabulary`].
    fn insert_entity(&mut self, record: &EntityRecord) -> Result<(), Self::Error>;

    /// Get-or-create a vocabulary entry by normalized label and attach it
    fn attach_vocabulary(
        &mut self,
        entity: EntityId,
        vocabulary: Vocabulary,
        label: &str,
        uri: Option<&str>,
    ) -> Result<VocabularyEntry, Self::Error>;

    /// Get-or-create an edge keyed on `(subject, object, kind)`
    ///
    /// Returns `true` if a new edge was written.
    fn get_or_create_relation(&mut self, edge: &RelationEdge) -> Result<bool, Self::Error>;

    /// Register an identifier
    ///
    /// Fails with a constraint violation if the URI is already registered.
    fn register_identifier(&mut self, identifier: &ExternalIdentifier) -> Result<(), Self::Error>;

    /// Commit all writes
    fn commit(self) -> Result<(), Self::Error>
    where
        Self: Sized;
}

/// A record store that can open import transactions
pub trait RecordStore: RecordReader {
    /// Transaction type
    type Transaction<'a>: ImportTransaction<Error = Self::Error>
    where
        Self: 'a;

    /// Open a write transaction
    fn begin(&mut self) -> Result<Self::Transaction<'_>, Self::Error>;
}

/// Errors that can report a uniqueness constraint violation
///
/// The importer turns such violations into a retry of identity resolution.
pub trait ConstraintViolation {
    /// Whether the error was caused by a uniqueness constraint
    fn is_constraint_violation(&self) -> bool;
}
