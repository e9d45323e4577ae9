//! Lodestar Domain Layer
//!
//! Core model for the authority-record importer: the records it creates, the
//! relations between them, the external identifiers that point at them, and the
//! trait boundaries the importer talks to.
//!
//! ## Key Concepts
//!
//! - **EntityRecord**: the internal canonical record (person, place, institution,
//!   event, work)
//! - **ExternalIdentifier**: a remote URI registered against exactly one record
//! - **RelationEdge**: a typed, directed link between two records
//! - **FuzzyDate**: a date that keeps its precision (year, month, day or range)
//! - **Vocabulary**: shared, deduplicated reference values such as professions
//!
//! ## Architecture
//!
//! - Pure model and trait definitions only
//! - Storage and network implementations live in other crates
//! - The only dependencies are primitives (UUIDv7, Unicode normalization)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod date;
pub mod entity;
pub mod identifier;
pub mod relation;
pub mod traits;
pub mod vocabulary;

// Re-exports for convenience
pub use date::{DatePrecision, FuzzyDate};
pub use entity::{
    EntityData, EntityId, EntityKind, EntityRecord, Event, Gender, Institution, Person, Place,
    Prize, Work,
};
pub use identifier::ExternalIdentifier;
pub use relation::{RelationEdge, RelationKind};
pub use vocabulary::{normalize_label, Vocabulary, VocabularyEntry};
