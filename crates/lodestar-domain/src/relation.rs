//! Relation module - typed, directed edges between records

use crate::date::FuzzyDate;
use crate::entity::{EntityId, EntityKind};
use std::fmt;

/// Kind of relation between two records
///
/// Each kind fixes the kind of its subject and its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    /// Person was born in place
    BornIn,

    /// Person died in place
    DiedIn,

    /// Institution is located in place
    LocatedIn,

    /// Event took place in place
    TookPlaceIn,

    /// Person worked at or for institution
    WorkedAt,
}

impl RelationKind {
    /// All kinds, in declaration order
    pub const ALL: [RelationKind; 5] = [
        RelationKind::BornIn,
        RelationKind::DiedIn,
        RelationKind::LocatedIn,
        RelationKind::TookPlaceIn,
        RelationKind::WorkedAt,
    ];

    /// Get the kind as its stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::BornIn => "born_in",
            RelationKind::DiedIn => "died_in",
            RelationKind::LocatedIn => "located_in",
            RelationKind::TookPlaceIn => "took_place_in",
            RelationKind::WorkedAt => "worked_at",
        }
    }

    /// Parse a stored kind string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "born_in" => Some(RelationKind::BornIn),
            "died_in" => Some(RelationKind::DiedIn),
            "located_in" => Some(RelationKind::LocatedIn),
            "took_place_in" => Some(RelationKind::TookPlaceIn),
            "worked_at" => Some(RelationKind::WorkedAt),
            _ => None,
        }
    }

    /// Kind of record allowed as subject
    pub fn subject_kind(&self) -> EntityKind {
        match self {
            RelationKind::BornIn | RelationKind::DiedIn | RelationKind::WorkedAt => {
                EntityKind::Person
            }
            RelationKind::LocatedIn => EntityKind::Institution,
            RelationKind::TookPlaceIn => EntityKind::Event,
        }
    }

    /// Kind of record allowed as object
    pub fn object_kind(&self) -> EntityKind {
        match self {
            RelationKind::BornIn
            | RelationKind::DiedIn
            | RelationKind::LocatedIn
            | RelationKind::TookPlaceIn => EntityKind::Place,
            RelationKind::WorkedAt => EntityKind::Institution,
        }
    }

    /// Display name, read from subject to object
    pub fn name(&self) -> &'static str {
        match self {
            RelationKind::BornIn => "wurde geboren in",
            RelationKind::DiedIn => "starb in",
            RelationKind::LocatedIn => "liegt in",
            RelationKind::TookPlaceIn => "fand statt in",
            RelationKind::WorkedAt => "war tätig für",
        }
    }

    /// Display name, read from object to subject
    pub fn reverse_name(&self) -> &'static str {
        match self {
            RelationKind::BornIn => "war Geburtsort von",
            RelationKind::DiedIn => "war Sterbeort von",
            RelationKind::LocatedIn => "ist Ort von",
            RelationKind::TookPlaceIn => "war Ort von",
            RelationKind::WorkedAt => "war Wirkungseinrichtung von",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid relation kind: {}", s))
    }
}

/// A directed, typed relation between two records
///
/// Identity of an edge is the `(subject, object, kind)` tuple; the store
/// creates at most one edge per tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationEdge {
    /// Subject record
    pub subject: EntityId,

    /// Object record
    pub object: EntityId,

    /// Kind of relation
    pub kind: RelationKind,

    /// Start of temporal validity
    pub start: Option<FuzzyDate>,

    /// End of temporal validity
    pub end: Option<FuzzyDate>,

    /// Provenance notes (which source asserted the relation)
    pub notes: Option<String>,
}

impl RelationEdge {
    /// Create an undated edge without notes
    pub fn new(subject: EntityId, object: EntityId, kind: RelationKind) -> Self {
        Self {
            subject,
            object,
            kind,
            start: None,
            end: None,
            notes: None,
        }
    }

    /// Set the temporal validity
    pub fn with_interval(mut self, start: Option<FuzzyDate>, end: Option<FuzzyDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set provenance notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_kind_round_trip() {
        for kind in RelationKind::ALL {
            assert_eq!(RelationKind::parse(kind.as_str()), Some(kind));
        }
        assert!(RelationKind::parse("married_to").is_none());
    }

    #[test]
    fn test_relation_kind_endpoints() {
        assert_eq!(RelationKind::BornIn.subject_kind(), EntityKind::Person);
        assert_eq!(RelationKind::BornIn.object_kind(), EntityKind::Place);
        assert_eq!(RelationKind::LocatedIn.subject_kind(), EntityKind::Institution);
        assert_eq!(RelationKind::WorkedAt.object_kind(), EntityKind::Institution);
    }
}
