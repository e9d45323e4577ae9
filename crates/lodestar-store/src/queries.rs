//! SQL shared by the store and its transactions
//!
//! Every function takes a plain `&Connection`; a `rusqlite::Transaction`
//! dereferences to one, so reads inside a transaction see its own writes.

use crate::StoreError;
use lodestar_domain::{
    normalize_label, EntityData, EntityId, EntityKind, EntityRecord, Event, ExternalIdentifier,
    FuzzyDate, Gender, Institution, Person, Place, RelationEdge, RelationKind, Vocabulary,
    VocabularyEntry, Prize, Work,
};
use rusqlite::{params, Connection, OptionalExtension};

/// Convert EntityId to bytes for storage
pub(crate) fn id_to_bytes(id: EntityId) -> Vec<u8> {
    id.value().to_be_bytes().to_vec()
}

/// Convert bytes to EntityId
pub(crate) fn bytes_to_id(bytes: &[u8]) -> Result<EntityId, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for EntityId, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(EntityId::from_value(u128::from_be_bytes(arr)))
}

fn parse_date(text: Option<String>) -> Result<Option<FuzzyDate>, StoreError> {
    text.map(|t| FuzzyDate::parse(&t).ok_or_else(|| StoreError::InvalidData(format!("Invalid date: {}", t))))
        .transpose()
}

/// Raw `entities` row, converted outside the rusqlite row closure
struct EntityRow {
    id: Vec<u8>,
    kind: String,
    forename: Option<String>,
    surname: Option<String>,
    name: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    gender: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    place_kind: Option<String>,
    created_at: i64,
}

const ENTITY_COLUMNS: &str = "id, kind, forename, surname, name, start_date, end_date, gender, \
                              latitude, longitude, place_kind, created_at";

impl EntityRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            forename: row.get(2)?,
            surname: row.get(3)?,
            name: row.get(4)?,
            start_date: row.get(5)?,
            end_date: row.get(6)?,
            gender: row.get(7)?,
            latitude: row.get(8)?,
            longitude: row.get(9)?,
            place_kind: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn into_record(self, vocabulary: &[VocabularyEntry]) -> Result<EntityRecord, StoreError> {
        let id = bytes_to_id(&self.id)?;
        let kind = EntityKind::parse(&self.kind)
            .ok_or_else(|| StoreError::InvalidData(format!("Unknown entity kind: {}", self.kind)))?;
        let start = parse_date(self.start_date)?;
        let end = parse_date(self.end_date)?;

        let data = match kind {
            EntityKind::Person => {
                let gender = match self.gender {
                    Some(g) => Some(
                        Gender::parse(&g)
                            .ok_or_else(|| StoreError::InvalidData(format!("Unknown gender: {}", g)))?,
                    ),
                    None => None,
                };
                EntityData::Person(Person {
                    forename: self.forename,
                    surname: self.surname,
                    start,
                    end,
                    gender,
                    professions: labels_of(vocabulary, Vocabulary::Profession),
                    titles: labels_of(vocabulary, Vocabulary::Title),
                })
            }
            EntityKind::Place => EntityData::Place(Place {
                label: self.name,
                latitude: self.latitude,
                longitude: self.longitude,
                kind: self.place_kind,
            }),
            EntityKind::Institution => EntityData::Institution(Institution {
                name: self.name,
                start,
                end,
            }),
            EntityKind::Event => EntityData::Event(Event {
                name: self.name,
                start,
                end,
            }),
            EntityKind::Work => EntityData::Work(Work {
                name: self.name,
                start,
            }),
            EntityKind::Prize => EntityData::Prize(Prize {
                name: self.name,
                start,
            }),
        };

        Ok(EntityRecord {
            id,
            data,
            created_at: self.created_at as u64,
        })
    }
}

fn labels_of(entries: &[VocabularyEntry], vocabulary: Vocabulary) -> Vec<String> {
    let mut labels: Vec<String> = entries
        .iter()
        .filter(|e| e.vocabulary == vocabulary)
        .map(|e| e.label.clone())
        .collect();
    labels.sort();
    labels
}

pub(crate) fn get_entity(conn: &Connection, id: EntityId) -> Result<Option<EntityRecord>, StoreError> {
    let id_bytes = id_to_bytes(id);
    let row = conn
        .query_row(
            &format!("SELECT {} FROM entities WHERE id = ?1", ENTITY_COLUMNS),
            params![&id_bytes],
            EntityRow::from_row,
        )
        .optional()?;

    match row {
        Some(row) => {
            let vocabulary = vocabulary_of(conn, id)?;
            Ok(Some(row.into_record(&vocabulary)?))
        }
        None => Ok(None),
    }
}

pub(crate) fn find_by_label(
    conn: &Connection,
    kind: EntityKind,
    label: &str,
) -> Result<Vec<EntityRecord>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM entities WHERE kind = ?1 AND label = ?2 ORDER BY id",
        ENTITY_COLUMNS
    ))?;
    let rows = stmt
        .query_map(params![kind.as_str(), label], EntityRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let id = bytes_to_id(&row.id)?;
        let vocabulary = vocabulary_of(conn, id)?;
        records.push(row.into_record(&vocabulary)?);
    }
    Ok(records)
}

pub(crate) fn owner_of(conn: &Connection, uri: &str) -> Result<Option<EntityId>, StoreError> {
    let owner: Option<Vec<u8>> = conn
        .query_row(
            "SELECT owner FROM identifiers WHERE uri = ?1",
            params![uri],
            |row| row.get(0),
        )
        .optional()?;
    owner.map(|bytes| bytes_to_id(&bytes)).transpose()
}

pub(crate) fn identifiers_of(
    conn: &Connection,
    id: EntityId,
) -> Result<Vec<ExternalIdentifier>, StoreError> {
    let mut stmt = conn.prepare("SELECT uri FROM identifiers WHERE owner = ?1 ORDER BY uri")?;
    let uris = stmt
        .query_map(params![id_to_bytes(id)], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(uris
        .into_iter()
        .map(|uri| ExternalIdentifier::new(uri, id))
        .collect())
}

pub(crate) fn relations_of(conn: &Connection, id: EntityId) -> Result<Vec<RelationEdge>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT subject, object, kind, start_date, end_date, notes
         FROM relations WHERE subject = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![id_to_bytes(id)], |row| {
            Ok((
                row.get::<_, Vec<u8>>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(subject, object, kind, start, end, notes)| {
            let kind = RelationKind::parse(&kind)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown relation kind: {}", kind)))?;
            Ok(RelationEdge {
                subject: bytes_to_id(&subject)?,
                object: bytes_to_id(&object)?,
                kind,
                start: parse_date(start)?,
                end: parse_date(end)?,
                notes,
            })
        })
        .collect()
}

pub(crate) fn vocabulary_of(conn: &Connection, id: EntityId) -> Result<Vec<VocabularyEntry>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT v.id, v.vocabulary, v.label, v.uri
         FROM vocabulary v JOIN entity_vocabulary ev ON ev.vocabulary_id = v.id
         WHERE ev.entity = ?1 ORDER BY v.vocabulary, v.label",
    )?;
    let rows = stmt
        .query_map(params![id_to_bytes(id)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, vocabulary, label, uri)| {
            let vocabulary = Vocabulary::parse(&vocabulary)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown vocabulary: {}", vocabulary)))?;
            Ok(VocabularyEntry {
                id,
                vocabulary,
                label,
                uri,
            })
        })
        .collect()
}

pub(crate) fn vocabulary_entries(
    conn: &Connection,
    vocabulary: Vocabulary,
) -> Result<Vec<VocabularyEntry>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, label, uri FROM vocabulary WHERE vocabulary = ?1 ORDER BY label",
    )?;
    let entries = stmt
        .query_map(params![vocabulary.as_str()], |row| {
            Ok(VocabularyEntry {
                id: row.get(0)?,
                vocabulary,
                label: row.get(1)?,
                uri: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

pub(crate) fn count_entities(conn: &Connection, kind: Option<EntityKind>) -> Result<usize, StoreError> {
    let count: i64 = match kind {
        Some(kind) => conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))?,
    };
    Ok(count as usize)
}

pub(crate) fn insert_entity(conn: &Connection, record: &EntityRecord) -> Result<(), StoreError> {
    let mut forename = None;
    let mut surname = None;
    let mut name = None;
    let mut gender = None;
    let mut latitude = None;
    let mut longitude = None;
    let mut place_kind = None;

    match &record.data {
        EntityData::Person(p) => {
            forename = p.forename.as_deref();
            surname = p.surname.as_deref();
            gender = p.gender.map(|g| g.as_str());
        }
        EntityData::Place(p) => {
            name = p.label.as_deref();
            latitude = p.latitude;
            longitude = p.longitude;
            place_kind = p.kind.as_deref();
        }
        EntityData::Institution(i) => name = i.name.as_deref(),
        EntityData::Event(e) => name = e.name.as_deref(),
        EntityData::Work(w) => name = w.name.as_deref(),
        EntityData::Prize(p) => name = p.name.as_deref(),
    }
    let (start, end) = record.data.interval();

    conn.execute(
        "INSERT INTO entities (id, kind, label, forename, surname, name, start_date, end_date,
                               gender, latitude, longitude, place_kind, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            id_to_bytes(record.id),
            record.kind().as_str(),
            record.label(),
            forename,
            surname,
            name,
            start.map(|d| d.as_str()),
            end.map(|d| d.as_str()),
            gender,
            latitude,
            longitude,
            place_kind,
            record.created_at as i64,
        ],
    )?;
    Ok(())
}

pub(crate) fn attach_vocabulary(
    conn: &Connection,
    entity: EntityId,
    vocabulary: Vocabulary,
    label: &str,
    uri: Option<&str>,
) -> Result<VocabularyEntry, StoreError> {
    let label = label.trim();
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return Err(StoreError::InvalidData("Vocabulary label is empty".to_string()));
    }

    conn.execute(
        "INSERT INTO vocabulary (vocabulary, label, normalized, uri) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(vocabulary, normalized) DO UPDATE SET uri = COALESCE(vocabulary.uri, excluded.uri)",
        params![vocabulary.as_str(), label, &normalized, uri],
    )?;

    let entry = conn.query_row(
        "SELECT id, label, uri FROM vocabulary WHERE vocabulary = ?1 AND normalized = ?2",
        params![vocabulary.as_str(), &normalized],
        |row| {
            Ok(VocabularyEntry {
                id: row.get(0)?,
                vocabulary,
                label: row.get(1)?,
                uri: row.get(2)?,
            })
        },
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO entity_vocabulary (entity, vocabulary_id) VALUES (?1, ?2)",
        params![id_to_bytes(entity), entry.id],
    )?;

    Ok(entry)
}

pub(crate) fn get_or_create_relation(conn: &Connection, edge: &RelationEdge) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "INSERT INTO relations (subject, object, kind, start_date, end_date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(subject, object, kind) DO NOTHING",
        params![
            id_to_bytes(edge.subject),
            id_to_bytes(edge.object),
            edge.kind.as_str(),
            edge.start.as_ref().map(|d| d.as_str()),
            edge.end.as_ref().map(|d| d.as_str()),
            edge.notes.as_deref(),
        ],
    )?;
    Ok(changed == 1)
}

pub(crate) fn register_identifier(
    conn: &Connection,
    identifier: &ExternalIdentifier,
) -> Result<(), StoreError> {
    match conn.execute(
        "INSERT INTO identifiers (uri, owner) VALUES (?1, ?2)",
        params![&identifier.uri, id_to_bytes(identifier.owner)],
    ) {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Err(StoreError::DuplicateIdentifier(identifier.uri.clone()))
        }
        Err(e) => Err(e.into()),
    }
}
