//! Compiled mapping rules
//!
//! An [`ExtractionConfig`] describes how one kind of record is read from one
//! source: which subject in the fetched graph is the record ([`Filter`]),
//! which values fill which fields ([`Attribute`]), and which links become
//! relations ([`RelationRule`]).

use crate::error::MappingError;
use crate::path::Query;
use lodestar_domain::{EntityKind, RelationKind, Vocabulary};
use lodestar_graph::{Graph, Source, Term};
use std::fmt;

/// What a config produces: a record, or the label of a vocabulary term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    /// A record of the given kind
    Entity(EntityKind),

    /// A term of the given vocabulary
    Term(Vocabulary),
}

impl Target {
    /// Parse a target name (`person`, `place`, ..., `profession`, `title`)
    pub fn parse(s: &str) -> Option<Self> {
        EntityKind::parse(s)
            .map(Target::Entity)
            .or_else(|| Vocabulary::parse(&s.to_lowercase()).map(Target::Term))
    }

    /// Get the target name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Entity(kind) => kind.as_str(),
            Target::Term(vocabulary) => vocabulary.as_str(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The internal field an attribute fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Name or label (places, institutions, events, works, terms)
    Name,
    /// Given name
    Forename,
    /// Family name
    Surname,
    /// Start of the record's interval
    Start,
    /// End of the record's interval
    End,
    /// Gender of a person
    Gender,
    /// Professions of a person
    Profession,
    /// Titles of a person
    Title,
    /// WGS84 latitude
    Latitude,
    /// WGS84 longitude
    Longitude,
    /// Feature class of a place
    FeatureClass,
    /// Equivalent URIs in other sources
    SameAs,
}

impl Field {
    /// All fields
    pub const ALL: [Field; 12] = [
        Field::Name,
        Field::Forename,
        Field::Surname,
        Field::Start,
        Field::End,
        Field::Gender,
        Field::Profession,
        Field::Title,
        Field::Latitude,
        Field::Longitude,
        Field::FeatureClass,
        Field::SameAs,
    ];

    /// Get the field name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Forename => "forename",
            Field::Surname => "surname",
            Field::Start => "start",
            Field::End => "end",
            Field::Gender => "gender",
            Field::Profession => "profession",
            Field::Title => "title",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::FeatureClass => "feature_class",
            Field::SameAs => "same_as",
        }
    }

    /// Parse a field name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// Whether the field keeps every value of the winning alternative
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Field::Profession | Field::Title | Field::SameAs)
    }

    /// Whether a config for `target` may fill this field
    pub fn applies_to(&self, target: Target) -> bool {
        if *self == Field::SameAs {
            return true;
        }
        match target {
            Target::Entity(EntityKind::Person) => matches!(
                self,
                Field::Forename
                    | Field::Surname
                    | Field::Start
                    | Field::End
                    | Field::Gender
                    | Field::Profession
                    | Field::Title
            ),
            Target::Entity(EntityKind::Place) => matches!(
                self,
                Field::Name | Field::Latitude | Field::Longitude | Field::FeatureClass
            ),
            Target::Entity(EntityKind::Institution) | Target::Entity(EntityKind::Event) => {
                matches!(self, Field::Name | Field::Start | Field::End)
            }
            Target::Entity(EntityKind::Work) | Target::Entity(EntityKind::Prize) => {
                matches!(self, Field::Name | Field::Start)
            }
            Target::Term(_) => *self == Field::Name,
        }
    }

    /// Coercion used when the rule names none
    pub fn default_coercion(&self) -> Coercion {
        match self {
            Field::Name | Field::Forename | Field::Surname => Coercion::Text,
            Field::Start | Field::End => Coercion::Date,
            Field::Gender => Coercion::Gender,
            Field::Profession | Field::Title => Coercion::Vocabulary,
            Field::Latitude | Field::Longitude => Coercion::Float,
            Field::FeatureClass => Coercion::LocalName,
            Field::SameAs => Coercion::Uri,
        }
    }

    /// Whether `coercion` produces a value this field can hold
    pub fn accepts(&self, coercion: Coercion) -> bool {
        match self {
            Field::Latitude => matches!(coercion, Coercion::Float | Coercion::WktLatitude),
            Field::Longitude => matches!(coercion, Coercion::Float | Coercion::WktLongitude),
            Field::FeatureClass => matches!(coercion, Coercion::LocalName | Coercion::Text),
            Field::Name | Field::Forename | Field::Surname => {
                matches!(coercion, Coercion::Text | Coercion::LocalName)
            }
            other => other.default_coercion() == coercion,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a raw graph value becomes a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coercion {
    /// Trimmed literal text
    Text,
    /// Fuzzy date
    Date,
    /// Decimal number
    Float,
    /// Longitude of a WKT `Point(lon lat)`
    WktLongitude,
    /// Latitude of a WKT `Point(lon lat)`
    WktLatitude,
    /// Gender from a vocabulary URI or Q-item
    Gender,
    /// Vocabulary term, as a label or a URI
    Vocabulary,
    /// Last segment of an IRI
    LocalName,
    /// Any IRI
    Uri,
}

impl Coercion {
    /// All coercions
    pub const ALL: [Coercion; 9] = [
        Coercion::Text,
        Coercion::Date,
        Coercion::Float,
        Coercion::WktLongitude,
        Coercion::WktLatitude,
        Coercion::Gender,
        Coercion::Vocabulary,
        Coercion::LocalName,
        Coercion::Uri,
    ];

    /// Get the coercion name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Coercion::Text => "text",
            Coercion::Date => "date",
            Coercion::Float => "float",
            Coercion::WktLongitude => "wkt_longitude",
            Coercion::WktLatitude => "wkt_latitude",
            Coercion::Gender => "gender",
            Coercion::Vocabulary => "vocabulary",
            Coercion::LocalName => "local_name",
            Coercion::Uri => "uri",
        }
    }

    /// Parse a coercion name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// One `(predicate, object)` test; `object: None` means "has any value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// Predicate IRI
    pub predicate: String,

    /// Required object
    pub object: Option<Term>,
}

/// A conjunction of constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Constraints that must all hold
    pub constraints: Vec<Constraint>,
}

impl Filter {
    /// Whether `subject` satisfies every constraint
    pub fn matches(&self, graph: &Graph, subject: &Term) -> bool {
        !self.constraints.is_empty()
            && self
                .constraints
                .iter()
                .all(|c| graph.has(subject, &c.predicate, c.object.as_ref()))
    }
}

/// Ordered alternatives filling one field
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Field to fill
    pub field: Field,

    /// Coercion of raw values
    pub coercion: Coercion,

    /// Alternatives, tried in order
    pub alternatives: Vec<Query>,
}

/// A qualified statement pattern
///
/// Reads `subject --statement--> node`, the target from
/// `node --value--> target` and the validity from the `start`/`end`
/// qualifiers on the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementPattern {
    /// Predicate from subject to statement node
    pub statement: String,

    /// Predicate from statement node to target
    pub value: String,

    /// Query from the statement node to the start date
    pub start: Option<Query>,

    /// Query from the statement node to the end date
    pub end: Option<Query>,

    /// Text form, for provenance notes
    pub text: String,
}

/// Where relation targets are read from
#[derive(Debug, Clone, PartialEq)]
pub enum RelationSource {
    /// Every IRI reached by a query
    Path(Query),

    /// Targets of qualified statements
    Statement(StatementPattern),
}

impl fmt::Display for RelationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationSource::Path(query) => write!(f, "{}", query),
            RelationSource::Statement(pattern) => f.write_str(&pattern.text),
        }
    }
}

/// Ordered alternatives producing relations of one kind
#[derive(Debug, Clone, PartialEq)]
pub struct RelationRule {
    /// Kind of the relations
    pub kind: RelationKind,

    /// Alternatives, tried in order
    pub sources: Vec<RelationSource>,
}

impl RelationRule {
    /// Kind of record a target is imported as
    pub fn target_kind(&self) -> EntityKind {
        self.kind.object_kind()
    }
}

/// Mapping from one source to one target
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// What the config produces
    pub target: Target,

    /// Source the config reads
    pub source: Source,

    /// Subject selection; a subject qualifies if any filter matches
    pub filters: Vec<Filter>,

    /// Field extraction
    pub attributes: Vec<Attribute>,

    /// Relation extraction
    pub relations: Vec<RelationRule>,
}

impl ExtractionConfig {
    /// Check the config is usable for its target
    pub fn validate(&self) -> Result<(), MappingError> {
        let invalid = |message: String| MappingError::InvalidConfig {
            target: self.target.to_string(),
            origin: self.source.to_string(),
            message,
        };

        if self.filters.is_empty() {
            return Err(invalid("at least one filter is required".to_string()));
        }
        if self.filters.iter().any(|f| f.constraints.is_empty()) {
            return Err(invalid("a filter has no constraints".to_string()));
        }

        let mut seen = Vec::new();
        for attribute in &self.attributes {
            if !attribute.field.applies_to(self.target) {
                return Err(invalid(format!("field '{}' does not apply", attribute.field)));
            }
            if !attribute.field.accepts(attribute.coercion) {
                return Err(invalid(format!(
                    "field '{}' cannot hold '{}' values",
                    attribute.field,
                    attribute.coercion.as_str()
                )));
            }
            if attribute.alternatives.is_empty() {
                return Err(invalid(format!("field '{}' has no alternatives", attribute.field)));
            }
            if seen.contains(&attribute.field) {
                return Err(invalid(format!("field '{}' is declared twice", attribute.field)));
            }
            seen.push(attribute.field);
        }

        for relation in &self.relations {
            match self.target {
                Target::Entity(kind) if kind == relation.kind.subject_kind() => {}
                _ => {
                    return Err(invalid(format!(
                        "relation '{}' does not start at {}",
                        relation.kind, self.target
                    )))
                }
            }
            if relation.sources.is_empty() {
                return Err(invalid(format!("relation '{}' has no alternatives", relation.kind)));
            }
        }

        Ok(())
    }

    /// The attribute filling `field`, if any
    pub fn attribute(&self, field: Field) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.field == field)
    }
}
