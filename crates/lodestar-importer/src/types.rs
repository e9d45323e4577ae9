//! Outcome and report types

use lodestar_domain::{EntityId, EntityRecord, RelationKind, Vocabulary};
use std::fmt;

/// Result of importing one URI
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The URI (or one of its aliases) was already registered; nothing written
    Existing(EntityRecord),

    /// A new record was created
    Created {
        /// The record as stored
        record: EntityRecord,
        /// What else the import did or skipped
        report: ImportReport,
    },

    /// The description holds no subject the config applies to
    NotFound,
}

impl ImportOutcome {
    /// The resolved record, if any
    pub fn record(&self) -> Option<&EntityRecord> {
        match self {
            ImportOutcome::Existing(record) | ImportOutcome::Created { record, .. } => Some(record),
            ImportOutcome::NotFound => None,
        }
    }

    /// Consume the outcome, keeping the resolved record
    pub fn into_record(self) -> Option<EntityRecord> {
        match self {
            ImportOutcome::Existing(record) | ImportOutcome::Created { record, .. } => Some(record),
            ImportOutcome::NotFound => None,
        }
    }

    /// Whether a new record was created
    pub fn is_created(&self) -> bool {
        matches!(self, ImportOutcome::Created { .. })
    }

    /// The report of a creating import
    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            ImportOutcome::Created { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Something an import left out instead of failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippedItem {
    /// A relation whose target could not be imported
    Relation {
        /// Subject URI
        subject: String,
        /// Kind of relation
        kind: RelationKind,
        /// Target URI as stated by the source
        target: String,
        /// Why it was skipped
        reason: String,
    },

    /// A vocabulary value whose label could not be determined
    Vocabulary {
        /// Subject URI
        subject: String,
        /// Vocabulary of the value
        vocabulary: Vocabulary,
        /// The value (usually a term URI)
        value: String,
        /// Why it was skipped
        reason: String,
    },
}

impl fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkippedItem::Relation {
                kind,
                target,
                reason,
                ..
            } => write!(f, "{} {}: {}", kind, target, reason),
            SkippedItem::Vocabulary {
                vocabulary,
                value,
                reason,
                ..
            } => write!(f, "{} {}: {}", vocabulary, value, reason),
        }
    }
}

/// What a creating import did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Records created, the subject first
    pub records_created: Vec<EntityId>,

    /// Relations written
    pub relations_created: usize,

    /// Identifiers registered
    pub identifiers_registered: usize,

    /// Relations and vocabulary values left out
    pub skipped: Vec<SkippedItem>,

    /// Transaction attempts used
    pub attempts: u32,
}

impl ImportReport {
    /// Skipped relations only
    pub fn skipped_relations(&self) -> impl Iterator<Item = &SkippedItem> {
        self.skipped
            .iter()
            .filter(|s| matches!(s, SkippedItem::Relation { .. }))
    }

    /// Skipped vocabulary values only
    pub fn skipped_vocabulary(&self) -> impl Iterator<Item = &SkippedItem> {
        self.skipped
            .iter()
            .filter(|s| matches!(s, SkippedItem::Vocabulary { .. }))
    }
}
