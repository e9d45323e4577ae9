//! Show command implementation.

use crate::cli::ShowArgs;
use crate::error::{CliError, Result};
use crate::output::{Formatter, RecordDetails};
use lodestar_domain::traits::RecordReader;
use lodestar_domain::EntityId;
use lodestar_graph::canonicalize;
use lodestar_store::SqliteStore;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let details = details(store, &args.target)?;
    println!("{}", formatter.format_record(&details)?);
    Ok(())
}

/// Look a record up by id or registered URI and gather its surroundings.
pub fn details(store: &SqliteStore, target: &str) -> Result<RecordDetails> {
    let id = match EntityId::from_string(target.trim()) {
        Ok(id) => id,
        Err(_) => store
            .owner_of(&canonicalize(target))?
            .ok_or_else(|| CliError::NotFound(format!("no record for {}", target.trim())))?,
    };

    let record = store
        .get_entity(id)?
        .ok_or_else(|| CliError::NotFound(format!("no record {}", id)))?;

    let mut identifiers: Vec<String> = store
        .identifiers_of(id)?
        .into_iter()
        .map(|identifier| identifier.uri)
        .collect();
    identifiers.sort();

    let mut relations = Vec::new();
    for edge in store.relations_of(id)? {
        let label = store
            .get_entity(edge.object)?
            .map(|object| object.label())
            .unwrap_or_default();
        relations.push((edge, label));
    }

    Ok(RecordDetails {
        record,
        identifiers,
        relations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestar_domain::traits::{ImportTransaction, RecordStore};
    use lodestar_domain::{
        EntityData, EntityRecord, ExternalIdentifier, Place, RelationEdge, RelationKind,
    };

    fn store_with_place() -> (SqliteStore, EntityRecord) {
        let mut store = SqliteStore::in_memory().unwrap();
        let wien = EntityRecord::new(
            EntityData::Place(Place {
                label: Some("Wien".to_string()),
                ..Default::default()
            }),
            0,
        );
        let mut tx = store.begin().unwrap();
        tx.insert_entity(&wien).unwrap();
        tx.register_identifier(&ExternalIdentifier::new("https://d-nb.info/gnd/4066009-6", wien.id))
            .unwrap();
        tx.commit().unwrap();
        (store, wien)
    }

    #[test]
    fn test_lookup_by_any_uri_form() {
        let (store, wien) = store_with_place();
        for target in [
            "https://d-nb.info/gnd/4066009-6",
            "http://d-nb.info/gnd/4066009-6/about/lds.ttl",
        ] {
            assert_eq!(details(&store, target).unwrap().record.id, wien.id);
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let (store, wien) = store_with_place();
        let found = details(&store, &wien.id.to_string()).unwrap();
        assert_eq!(found.identifiers, vec!["https://d-nb.info/gnd/4066009-6"]);
    }

    #[test]
    fn test_relation_labels() {
        let (mut store, wien) = store_with_place();
        let event = EntityRecord::new(EntityData::empty(lodestar_domain::EntityKind::Event), 0);
        let mut tx = store.begin().unwrap();
        tx.insert_entity(&event).unwrap();
        tx.get_or_create_relation(&RelationEdge::new(event.id, wien.id, RelationKind::TookPlaceIn))
            .unwrap();
        tx.commit().unwrap();

        let found = details(&store, &event.id.to_string()).unwrap();
        assert_eq!(found.relations.len(), 1);
        assert_eq!(found.relations[0].1, "Wien");
    }

    #[test]
    fn test_unknown_target() {
        let (store, _) = store_with_place();
        assert!(matches!(
            details(&store, "https://d-nb.info/gnd/118566512"),
            Err(CliError::NotFound(_))
        ));
    }
}
