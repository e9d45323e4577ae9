//! Lodestar Storage Layer
//!
//! Implements the record store traits on SQLite.
//!
//! # Architecture
//!
//! - One `entities` table holding the plain attributes of every record kind
//! - `identifiers` maps each external URI to exactly one owning record
//! - `relations` is keyed on `(subject, object, kind)`
//! - `vocabulary` deduplicates labels by their normalized form
//!
//! Import transactions are opened `IMMEDIATE`, so two importers never both
//! hold a read snapshot that is about to be invalidated by the other's write.
//!
//! # Examples
//!
//! ```no_run
//! use lodestar_store::SqliteStore;
//!
//! let store = SqliteStore::new("lodestar.db").unwrap();
//! // Store is now ready for imports
//! ```

#![warn(missing_docs)]

mod queries;

use lodestar_domain::traits::{ConstraintViolation, ImportTransaction, RecordReader, RecordStore};
use lodestar_domain::{
    EntityId, EntityKind, EntityRecord, ExternalIdentifier, RelationEdge, Vocabulary,
    VocabularyEntry,
};
use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The identifier is already registered to a record
    #[error("Identifier already registered: {0}")]
    DuplicateIdentifier(String),
}

impl ConstraintViolation for StoreError {
    fn is_constraint_violation(&self) -> bool {
        match self {
            StoreError::DuplicateIdentifier(_) => true,
            StoreError::Database(rusqlite::Error::SqliteFailure(e, _)) => {
                e.code == rusqlite::ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }
}

/// How long a writer waits for a competing importer's lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based record store
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread (or each concurrent
/// importer) should open its own `SqliteStore` on the same database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lodestar_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("lodestar.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open a private in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Records of a kind whose label matches exactly
    pub fn find_by_label(&self, kind: EntityKind, label: &str) -> Result<Vec<EntityRecord>, StoreError> {
        queries::find_by_label(&self.conn, kind, label)
    }

    /// All entries of a vocabulary, ordered by label
    pub fn vocabulary_entries(&self, vocabulary: Vocabulary) -> Result<Vec<VocabularyEntry>, StoreError> {
        queries::vocabulary_entries(&self.conn, vocabulary)
    }

    /// Get a record by id, failing if it does not exist
    pub fn require_entity(&self, id: EntityId) -> Result<EntityRecord, StoreError> {
        queries::get_entity(&self.conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl RecordReader for SqliteStore {
    type Error = StoreError;

    fn get_entity(&self, id: EntityId) -> Result<Option<EntityRecord>, Self::Error> {
        queries::get_entity(&self.conn, id)
    }

    fn owner_of(&self, uri: &str) -> Result<Option<EntityId>, Self::Error> {
        queries::owner_of(&self.conn, uri)
    }

    fn identifiers_of(&self, id: EntityId) -> Result<Vec<ExternalIdentifier>, Self::Error> {
        queries::identifiers_of(&self.conn, id)
    }

    fn relations_of(&self, id: EntityId) -> Result<Vec<RelationEdge>, Self::Error> {
        queries::relations_of(&self.conn, id)
    }

    fn vocabulary_of(&self, id: EntityId) -> Result<Vec<VocabularyEntry>, Self::Error> {
        queries::vocabulary_of(&self.conn, id)
    }

    fn count_entities(&self, kind: Option<EntityKind>) -> Result<usize, Self::Error> {
        queries::count_entities(&self.conn, kind)
    }
}

impl RecordStore for SqliteStore {
    type Transaction<'a> = SqliteTransaction<'a>;

    fn begin(&mut self) -> Result<Self::Transaction<'_>, Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("Opened import transaction");
        Ok(SqliteTransaction { tx })
    }
}

/// An open import transaction
///
/// Rolls back on drop unless committed.
pub struct SqliteTransaction<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl RecordReader for SqliteTransaction<'_> {
    type Error = StoreError;

    fn get_entity(&self, id: EntityId) -> Result<Option<EntityRecord>, Self::Error> {
        queries::get_entity(&self.tx, id)
    }

    fn owner_of(&self, uri: &str) -> Result<Option<EntityId>, Self::Error> {
        queries::owner_of(&self.tx, uri)
    }

    fn identifiers_of(&self, id: EntityId) -> Result<Vec<ExternalIdentifier>, Self::Error> {
        queries::identifiers_of(&self.tx, id)
    }

    fn relations_of(&self, id: EntityId) -> Result<Vec<RelationEdge>, Self::Error> {
        queries::relations_of(&self.tx, id)
    }

    fn vocabulary_of(&self, id: EntityId) -> Result<Vec<VocabularyEntry>, Self::Error> {
        queries::vocabulary_of(&self.tx, id)
    }

    fn count_entities(&self, kind: Option<EntityKind>) -> Result<usize, Self::Error> {
        queries::count_entities(&self.tx, kind)
    }
}

impl ImportTransaction for SqliteTransaction<'_> {
    fn insert_entity(&mut self, record: &EntityRecord) -> Result<(), Self::Error> {
        queries::insert_entity(&self.tx, record)
    }

    fn attach_vocabulary(
        &mut self,
        entity: EntityId,
        vocabulary: Vocabulary,
        label: &str,
        uri: Option<&str>,
    ) -> Result<VocabularyEntry, Self::Error> {
        queries::attach_vocabulary(&self.tx, entity, vocabulary, label, uri)
    }

    fn get_or_create_relation(&mut self, edge: &RelationEdge) -> Result<bool, Self::Error> {
        queries::get_or_create_relation(&self.tx, edge)
    }

    fn register_identifier(&mut self, identifier: &ExternalIdentifier) -> Result<(), Self::Error> {
        queries::register_identifier(&self.tx, identifier)
    }

    fn commit(self) -> Result<(), Self::Error> {
        self.tx.commit()?;
        debug!("Committed import transaction");
        Ok(())
    }
}
