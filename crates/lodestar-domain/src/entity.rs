//! Entity module - the internal canonical records the importer creates

use crate::date::FuzzyDate;
use std::fmt;

/// Unique identifier for an entity record based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time and needs no
/// coordination between concurrent importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u128);

impl EntityId {
    /// Generate a new UUIDv7-based EntityId
    ///
    /// # Examples
    ///
    /// ```
    /// use lodestar_domain::EntityId;
    ///
    /// let id = EntityId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an EntityId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an EntityId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid entity id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// The kinds of records the importer can materialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// A natural person
    Person,

    /// A geographic place
    Place,

    /// A corporate body, organisation or institution
    Institution,

    /// A historic event, conference or era
    Event,

    /// A work (book, composition, artwork)
    Work,

    /// A prize, award or honour
    Prize,
}

impl EntityKind {
    /// All kinds, in declaration order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Person,
        EntityKind::Place,
        EntityKind::Institution,
        EntityKind::Event,
        EntityKind::Work,
        EntityKind::Prize,
    ];

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Place => "place",
            EntityKind::Institution => "institution",
            EntityKind::Event => "event",
            EntityKind::Work => "work",
            EntityKind::Prize => "prize",
        }
    }

    /// Parse a kind from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "person" => Some(EntityKind::Person),
            "place" => Some(EntityKind::Place),
            "institution" => Some(EntityKind::Institution),
            "event" => Some(EntityKind::Event),
            "work" => Some(EntityKind::Work),
            "prize" => Some(EntityKind::Prize),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid entity kind: {}", s))
    }
}

/// Gender of a person, as recorded by the authority files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    /// Female
    Female,

    /// Male
    Male,

    /// Neither female nor male
    Third,
}

impl Gender {
    /// Get the gender as its stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Third => "third gender",
        }
    }

    /// Parse a stored gender string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "female" => Some(Gender::Female),
            "male" => Some(Gender::Male),
            "third gender" => Some(Gender::Third),
            _ => None,
        }
    }
}

/// Person attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    /// Given name(s)
    pub forename: Option<String>,

    /// Family name
    pub surname: Option<String>,

    /// Date of birth
    pub start: Option<FuzzyDate>,

    /// Date of death
    pub end: Option<FuzzyDate>,

    /// Gender
    pub gender: Option<Gender>,

    /// Profession labels (vocabulary entries), sorted
    pub professions: Vec<String>,

    /// Title labels (vocabulary entries), sorted
    pub titles: Vec<String>,
}

/// Place attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Place {
    /// Preferred name
    pub label: Option<String>,

    /// WGS84 latitude
    pub latitude: Option<f64>,

    /// WGS84 longitude
    pub longitude: Option<f64>,

    /// Feature class as stated by the source (e.g. `P.PPLC`)
    pub kind: Option<String>,
}

/// Institution attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Institution {
    /// Preferred name
    pub name: Option<String>,

    /// Date of establishment
    pub start: Option<FuzzyDate>,

    /// Date of termination
    pub end: Option<FuzzyDate>,
}

/// Event attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Preferred name
    pub name: Option<String>,

    /// Start (or the whole span, for ranges)
    pub start: Option<FuzzyDate>,

    /// End
    pub end: Option<FuzzyDate>,
}

/// Work attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Work {
    /// Preferred title
    pub name: Option<String>,

    /// Date of publication or production
    pub start: Option<FuzzyDate>,
}

/// Prize attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prize {
    /// Preferred name
    pub name: Option<String>,

    /// Date the prize was established
    pub start: Option<FuzzyDate>,
}

/// Kind-specific attributes of a record
///
/// A closed union: every consumer matches exhaustively on the kind instead of
/// looking record types up by name.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityData {
    /// Person record
    Person(Person),
    /// Place record
    Place(Place),
    /// Institution record
    Institution(Institution),
    /// Event record
    Event(Event),
    /// Work record
    Work(Work),
    /// Prize record
    Prize(Prize),
}

impl EntityData {
    /// Empty attributes for the given kind
    pub fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Person => EntityData::Person(Person::default()),
            EntityKind::Place => EntityData::Place(Place::default()),
            EntityKind::Institution => EntityData::Institution(Institution::default()),
            EntityKind::Event => EntityData::Event(Event::default()),
            EntityKind::Work => EntityData::Work(Work::default()),
            EntityKind::Prize => EntityData::Prize(Prize::default()),
        }
    }

    /// The kind of record
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityData::Person(_) => EntityKind::Person,
            EntityData::Place(_) => EntityKind::Place,
            EntityData::Institution(_) => EntityKind::Institution,
            EntityData::Event(_) => EntityKind::Event,
            EntityData::Work(_) => EntityKind::Work,
            EntityData::Prize(_) => EntityKind::Prize,
        }
    }

    /// Human-readable label
    ///
    /// Persons render as "Surname, Forename"; other kinds use their name.
    pub fn label(&self) -> String {
        match self {
            EntityData::Person(p) => match (&p.surname, &p.forename) {
                (Some(surname), Some(forename)) => format!("{}, {}", surname, forename),
                (Some(surname), None) => surname.clone(),
                (None, Some(forename)) => forename.clone(),
                (None, None) => String::new(),
            },
            EntityData::Place(p) => p.label.clone().unwrap_or_default(),
            EntityData::Institution(i) => i.name.clone().unwrap_or_default(),
            EntityData::Event(e) => e.name.clone().unwrap_or_default(),
            EntityData::Work(w) => w.name.clone().unwrap_or_default(),
            EntityData::Prize(p) => p.name.clone().unwrap_or_default(),
        }
    }

    /// Start and end of the record's own interval
    pub fn interval(&self) -> (Option<&FuzzyDate>, Option<&FuzzyDate>) {
        match self {
            EntityData::Person(p) => (p.start.as_ref(), p.end.as_ref()),
            EntityData::Place(_) => (None, None),
            EntityData::Institution(i) => (i.start.as_ref(), i.end.as_ref()),
            EntityData::Event(e) => (e.start.as_ref(), e.end.as_ref()),
            EntityData::Work(w) => (w.start.as_ref(), None),
            EntityData::Prize(p) => (p.start.as_ref(), None),
        }
    }
}

/// An internal canonical record
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Unique identifier
    pub id: EntityId,

    /// Kind-specific attributes
    pub data: EntityData,

    /// When this record was created (seconds since Unix epoch)
    pub created_at: u64,
}

impl EntityRecord {
    /// Create a new record with a fresh id
    pub fn new(data: EntityData, created_at: u64) -> Self {
        Self {
            id: EntityId::new(),
            data,
            created_at,
        }
    }

    /// The kind of record
    pub fn kind(&self) -> EntityKind {
        self.data.kind()
    }

    /// Human-readable label
    pub fn label(&self) -> String {
        self.data.label()
    }
}
