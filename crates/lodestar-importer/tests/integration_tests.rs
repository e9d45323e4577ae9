//! Integration tests for lodestar-importer
//!
//! These tests run whole imports against recorded GND, Wikidata and GeoNames
//! documents and a real SQLite store.

use lodestar_domain::traits::{ImportTransaction, RecordReader, RecordStore};
use lodestar_domain::{
    DatePrecision, EntityData, EntityId, EntityKind, EntityRecord, ExternalIdentifier, FuzzyDate,
    Gender, Person, RelationKind, Vocabulary,
};
use lodestar_graph::{FetchError, Graph, GraphFetcher, MockFetcher, RdfFormat, SourceUri};
use lodestar_importer::{
    ImportError, ImportOutcome, Importer, ImporterConfig, RelationPolicy, SkippedItem,
};
use lodestar_mapping::ConfigRegistry;
use lodestar_store::SqliteStore;
use std::cell::Cell;
use std::path::PathBuf;

const KREISKY_GND: &str = "https://d-nb.info/gnd/118566512";
const KREISKY_WIKIDATA: &str = "http://www.wikidata.org/entity/Q44517";
const KREISKY_VIAF: &str = "http://viaf.org/viaf/7393720";
const WIEN_GND: &str = "https://d-nb.info/gnd/4066009-6";
const WIEN_WIKIDATA: &str = "http://www.wikidata.org/entity/Q1741";
const WIEN_GEONAMES: &str = "https://sws.geonames.org/2761369/";
const OEAW_GND: &str = "https://d-nb.info/gnd/35077-1";
const OEAW_WIKIDATA: &str = "http://www.wikidata.org/entity/Q299015";
const SUESS_WIKIDATA: &str = "http://www.wikidata.org/entity/Q83158";
const UNIVERSITY_WIKIDATA: &str = "http://www.wikidata.org/entity/Q165980";
const PRIZE_GND: &str = "https://d-nb.info/gnd/4800556-1";
const PRIZE_WIKIDATA: &str = "http://www.wikidata.org/entity/Q1352396";

const FIXTURES: &[(&str, RdfFormat, &str)] = &[
    (
        KREISKY_GND,
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/118566512.ttl"),
    ),
    (
        WIEN_GND,
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/4066009-6.ttl"),
    ),
    (
        "https://d-nb.info/gnd/4028781-1",
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/4028781-1.ttl"),
    ),
    (
        "https://d-nb.info/gnd/4046517-2",
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/4046517-2.ttl"),
    ),
    (
        OEAW_GND,
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/35077-1.ttl"),
    ),
    (
        "https://d-nb.info/gnd/4171931-1",
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/4171931-1.ttl"),
    ),
    (
        "https://d-nb.info/gnd/4189552-6",
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/4189552-6.ttl"),
    ),
    (
        "https://d-nb.info/gnd/4135124-1",
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/4135124-1.ttl"),
    ),
    (
        PRIZE_GND,
        RdfFormat::Turtle,
        include_str!("fixtures/gnd/4800556-1.ttl"),
    ),
    (
        KREISKY_WIKIDATA,
        RdfFormat::Turtle,
        include_str!("fixtures/wikidata/Q44517.ttl"),
    ),
    (
        WIEN_WIKIDATA,
        RdfFormat::Turtle,
        include_str!("fixtures/wikidata/Q1741.ttl"),
    ),
    (
        OEAW_WIKIDATA,
        RdfFormat::Turtle,
        include_str!("fixtures/wikidata/Q299015.ttl"),
    ),
    (
        SUESS_WIKIDATA,
        RdfFormat::Turtle,
        include_str!("fixtures/wikidata/Q83158.ttl"),
    ),
    (
        "http://www.wikidata.org/entity/Q193391",
        RdfFormat::Turtle,
        include_str!("fixtures/wikidata/Q193391.ttl"),
    ),
    (
        "http://www.wikidata.org/entity/Q1350157",
        RdfFormat::Turtle,
        include_str!("fixtures/wikidata/Q1350157.ttl"),
    ),
    (
        "http://www.wikidata.org/entity/Q82955",
        RdfFormat::Turtle,
        include_str!("fixtures/wikidata/Q82955.ttl"),
    ),
    (
        PRIZE_WIKIDATA,
        RdfFormat::Turtle,
        include_str!("fixtures/wikidata/Q1352396.ttl"),
    ),
    (
        WIEN_GEONAMES,
        RdfFormat::RdfXml,
        include_str!("fixtures/geonames/2761369.rdf"),
    ),
];

fn fetcher() -> MockFetcher {
    let mut fetcher = MockFetcher::new();
    for (uri, format, document) in FIXTURES {
        fetcher.add_document(uri, *format, document).unwrap();
    }
    fetcher
}

fn importer_with(config: ImporterConfig) -> Importer<SqliteStore, MockFetcher> {
    Importer::new(
        SqliteStore::in_memory().unwrap(),
        fetcher(),
        ConfigRegistry::builtin().unwrap(),
        config,
    )
}

fn importer() -> Importer<SqliteStore, MockFetcher> {
    importer_with(ImporterConfig::default())
}

fn created(outcome: ImportOutcome) -> EntityRecord {
    match outcome {
        ImportOutcome::Created { record, .. } => record,
        other => panic!("Expected a new record, got {:?}", other),
    }
}

fn person(record: &EntityRecord) -> &Person {
    match &record.data {
        EntityData::Person(person) => person,
        other => panic!("Expected a person, got {:?}", other),
    }
}

fn identifiers(store: &SqliteStore, id: EntityId) -> Vec<String> {
    let mut uris: Vec<String> = store
        .identifiers_of(id)
        .unwrap()
        .into_iter()
        .map(|i| i.uri)
        .collect();
    uris.sort();
    uris
}

fn coordinates(record: &EntityRecord) -> (f64, f64) {
    match &record.data {
        EntityData::Place(place) => (place.latitude.unwrap(), place.longitude.unwrap()),
        other => panic!("Expected a place, got {:?}", other),
    }
}

#[test]
fn test_import_gnd_person() {
    let mut importer = importer();
    let outcome = importer.import(KREISKY_GND, EntityKind::Person).unwrap();

    let report = outcome.report().unwrap().clone();
    let record = created(outcome);
    let kreisky = person(&record);
    assert_eq!(kreisky.forename.as_deref(), Some("Bruno"));
    assert_eq!(kreisky.surname.as_deref(), Some("Kreisky"));
    assert_eq!(kreisky.start.as_ref().unwrap().as_str(), "1911-01-22");
    assert_eq!(kreisky.end.as_ref().unwrap().as_str(), "1990-07-29");
    assert_eq!(kreisky.gender, Some(Gender::Male));
    assert_eq!(kreisky.professions, vec!["Jurist", "Politiker"]);
    assert_eq!(kreisky.titles, vec!["Dr. jur."]);

    assert_eq!(report.records_created.len(), 2);
    assert_eq!(report.records_created[0], record.id);
    assert_eq!(report.relations_created, 2);
    assert_eq!(report.identifiers_registered, 6);
    assert!(report.skipped.is_empty());
    assert_eq!(report.attempts, 1);

    let store = importer.store();
    assert_eq!(
        identifiers(store, record.id),
        vec![KREISKY_VIAF, KREISKY_WIKIDATA, KREISKY_GND]
    );

    let relations = store.relations_of(record.id).unwrap();
    let kinds: Vec<RelationKind> = relations.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![RelationKind::BornIn, RelationKind::DiedIn]);
    assert_eq!(relations[0].object, relations[1].object);
    let notes = relations[0].notes.as_deref().unwrap();
    assert!(notes.starts_with("Imported from https://d-nb.info/gnd/118566512"));
    assert!(notes.contains("gndo:placeOfBirth"));

    let wien = store.get_entity(relations[0].object).unwrap().unwrap();
    assert_eq!(wien.label(), "Wien");
    assert_eq!(coordinates(&wien), (48.208199, 16.37169));
    assert_eq!(
        identifiers(store, wien.id),
        vec![WIEN_WIKIDATA, WIEN_GND, WIEN_GEONAMES]
    );
}

#[test]
fn test_target_documents_fetched_once() {
    let mut importer = importer();
    importer.import(KREISKY_GND, EntityKind::Person).unwrap();

    let fetcher = importer.fetcher();
    assert_eq!(fetcher.fetch_count(KREISKY_GND), 1);
    assert_eq!(fetcher.fetch_count(WIEN_GND), 1);
    assert_eq!(fetcher.fetch_count("https://d-nb.info/gnd/4046517-2"), 1);
}

#[test]
fn test_reimport_is_idempotent() {
    let mut importer = importer();
    let first = created(importer.import(KREISKY_GND, EntityKind::Person).unwrap());
    let count = importer.store().count_entities(None).unwrap();
    importer.fetcher().reset_calls();

    for uri in [KREISKY_GND, "http://d-nb.info/gnd/118566512/about/lds.ttl"] {
        match importer.import(uri, EntityKind::Person).unwrap() {
            ImportOutcome::Existing(record) => assert_eq!(record, first),
            other => panic!("Expected the existing record, got {:?}", other),
        }
    }
    assert_eq!(importer.store().count_entities(None).unwrap(), count);
    assert_eq!(importer.fetcher().call_count(), 0);
}

#[test]
fn test_alias_converges_across_sources() {
    let mut importer = importer();
    let from_wikidata = created(importer.import(KREISKY_WIKIDATA, EntityKind::Person).unwrap());

    let from_gnd = importer
        .resolve_or_import(KREISKY_GND, EntityKind::Person)
        .unwrap()
        .unwrap();
    assert_eq!(from_gnd.id, from_wikidata.id);
    assert_eq!(importer.fetcher().fetch_count(KREISKY_GND), 0);
    assert_eq!(
        importer.store().count_entities(Some(EntityKind::Person)).unwrap(),
        1
    );
    assert_eq!(
        identifiers(importer.store(), from_wikidata.id),
        vec![KREISKY_VIAF, KREISKY_WIKIDATA, KREISKY_GND]
    );
}

#[test]
fn test_wikidata_place_resolves_through_any_alias() {
    let mut importer = importer();
    let wien = EntityRecord::new(EntityData::empty(EntityKind::Place), 0);
    {
        let store = importer.store_mut();
        let mut tx = store.begin().unwrap();
        tx.insert_entity(&wien).unwrap();
        tx.register_identifier(&ExternalIdentifier::new(WIEN_GND, wien.id))
            .unwrap();
        tx.commit().unwrap();
    }

    match importer.import(WIEN_WIKIDATA, EntityKind::Place).unwrap() {
        ImportOutcome::Existing(record) => assert_eq!(record.id, wien.id),
        other => panic!("Expected the GND record, got {:?}", other),
    }
    assert_eq!(importer.store().count_entities(None).unwrap(), 1);
    assert_eq!(importer.store().owner_of(WIEN_WIKIDATA).unwrap(), None);
}

#[test]
fn test_place_converges_across_three_sources() {
    let mut importer = importer();
    let wien = created(importer.import(WIEN_GND, EntityKind::Place).unwrap());

    for uri in ["https://www.wikidata.org/wiki/Q1741", WIEN_GEONAMES] {
        let outcome = importer.import(uri, EntityKind::Place).unwrap();
        assert!(!outcome.is_created());
        assert_eq!(outcome.record().unwrap().id, wien.id);
    }
    assert_eq!(importer.store().count_entities(None).unwrap(), 1);
}

#[test]
fn test_import_wikidata_person() {
    let mut importer = importer();
    let record = created(importer.import(KREISKY_WIKIDATA, EntityKind::Person).unwrap());

    let kreisky = person(&record);
    assert_eq!(kreisky.forename.as_deref(), Some("Bruno"));
    assert_eq!(kreisky.surname.as_deref(), Some("Kreisky"));
    assert_eq!(kreisky.start.as_ref().unwrap().as_str(), "1911-01-22");
    assert_eq!(kreisky.gender, Some(Gender::Male));
    assert_eq!(
        kreisky.professions,
        vec!["Diplomat", "Kriegsreporter", "Politiker"]
    );

    let store = importer.store();
    let wien_id = store.owner_of(WIEN_WIKIDATA).unwrap().unwrap();
    assert_eq!(store.owner_of(WIEN_GEONAMES).unwrap(), Some(wien_id));
    assert_eq!(store.owner_of(WIEN_GND).unwrap(), Some(wien_id));
    assert_eq!(
        identifiers(store, wien_id),
        vec![
            "http://id.loc.gov/authorities/names/n79018895",
            "http://viaf.org/viaf/155870729",
            WIEN_WIKIDATA,
            WIEN_GND,
            WIEN_GEONAMES,
        ]
    );

    let professions = store.vocabulary_entries(Vocabulary::Profession).unwrap();
    let politician = professions.iter().find(|e| e.label == "Politiker").unwrap();
    assert_eq!(
        politician.uri.as_deref(),
        Some("http://www.wikidata.org/entity/Q82955")
    );
}

#[test]
fn test_place_coordinates_per_source() {
    for (uri, expected) in [
        (WIEN_GND, (48.208199, 16.37169)),
        (WIEN_WIKIDATA, (48.208333333333, 16.3725)),
        (WIEN_GEONAMES, (48.20849, 16.37208)),
    ] {
        let mut importer = importer();
        let record = created(importer.import(uri, EntityKind::Place).unwrap());
        assert_eq!(coordinates(&record), expected, "coordinates of {}", uri);
    }
}

#[test]
fn test_geonames_feature_code() {
    let mut importer = importer();
    let record = created(importer.import(WIEN_GEONAMES, EntityKind::Place).unwrap());
    match record.data {
        EntityData::Place(place) => {
            assert_eq!(place.label.as_deref(), Some("Wien"));
            assert_eq!(place.kind.as_deref(), Some("P.PPLC"));
        }
        other => panic!("Expected a place, got {:?}", other),
    }
    assert_eq!(
        identifiers(importer.store(), record.id),
        vec![
            "https://dbpedia.org/resource/Vienna",
            "https://de.wikipedia.org/wiki/Wien",
            "https://en.wikipedia.org/wiki/Vienna",
            WIEN_GEONAMES,
        ]
    );
}

#[test]
fn test_import_institutions() {
    let mut importer = importer();
    let gnd = created(importer.import(OEAW_GND, EntityKind::Institution).unwrap());
    match &gnd.data {
        EntityData::Institution(institution) => {
            assert_eq!(
                institution.name.as_deref(),
                Some("Österreichische Akademie der Wissenschaften")
            );
            assert_eq!(institution.start.as_ref().unwrap().as_str(), "1947");
        }
        other => panic!("Expected an institution, got {:?}", other),
    }
    let relations = importer.store().relations_of(gnd.id).unwrap();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].kind, RelationKind::LocatedIn);

    let mut wikidata_importer = crate::importer();
    let wikidata = created(
        wikidata_importer
            .import(OEAW_WIKIDATA, EntityKind::Institution)
            .unwrap(),
    );
    match &wikidata.data {
        EntityData::Institution(institution) => {
            assert_eq!(institution.start.as_ref().unwrap().as_str(), "1847-05-14");
        }
        other => panic!("Expected an institution, got {:?}", other),
    }
    let relations = wikidata_importer.store().relations_of(wikidata.id).unwrap();
    let wien = wikidata_importer
        .store()
        .get_entity(relations[0].object)
        .unwrap()
        .unwrap();
    assert_eq!(wien.label(), "Wien");
}

#[test]
fn test_import_prizes() {
    let mut importer = importer();
    let gnd = created(importer.import(PRIZE_GND, EntityKind::Prize).unwrap());
    assert_eq!(gnd.label(), "Wittgenstein-Preis");
    assert!(gnd.data.interval().0.is_none());
    assert_eq!(
        identifiers(importer.store(), gnd.id),
        vec![PRIZE_WIKIDATA, PRIZE_GND]
    );

    match importer.import(PRIZE_WIKIDATA, EntityKind::Prize).unwrap() {
        ImportOutcome::Existing(record) => assert_eq!(record.id, gnd.id),
        other => panic!("Expected the GND prize, got {:?}", other),
    }

    let mut wikidata_importer = crate::importer();
    let wikidata = created(
        wikidata_importer
            .import(PRIZE_WIKIDATA, EntityKind::Prize)
            .unwrap(),
    );
    match &wikidata.data {
        EntityData::Prize(prize) => {
            assert_eq!(prize.name.as_deref(), Some("Wittgenstein-Preis"));
            assert_eq!(prize.start, Some(FuzzyDate::year(1996)));
        }
        other => panic!("Expected a prize, got {:?}", other),
    }
    assert_eq!(
        wikidata_importer.store().owner_of(PRIZE_GND).unwrap(),
        Some(wikidata.id)
    );
}

#[test]
fn test_import_events() {
    let mut importer = importer();
    let novara = created(
        importer
            .import("https://d-nb.info/gnd/4171931-1", EntityKind::Event)
            .unwrap(),
    );
    assert_eq!(novara.label(), "Novara-Expedition");
    assert_eq!(novara.data.interval().0.unwrap().as_str(), "1857-1859");

    let expo = created(
        importer
            .import("https://d-nb.info/gnd/4189552-6", EntityKind::Event)
            .unwrap(),
    );
    assert_eq!(expo.data.interval().0.unwrap().as_str(), "1873");
    let relations = importer.store().relations_of(expo.id).unwrap();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].kind, RelationKind::TookPlaceIn);
}

#[test]
fn test_import_work() {
    let mut importer = importer();
    let work = created(
        importer
            .import("https://d-nb.info/gnd/4135124-1", EntityKind::Work)
            .unwrap(),
    );
    assert_eq!(work.label(), "Das Antlitz der Erde");
    assert_eq!(work.data.interval().0.unwrap().as_str(), "1883");
    assert!(importer.store().relations_of(work.id).unwrap().is_empty());
}

#[test]
fn test_relation_depth_is_bounded() {
    let mut shallow = importer();
    let outcome = shallow.import(SUESS_WIKIDATA, EntityKind::Person).unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.records_created.len(), 3);
    assert_eq!(report.relations_created, 2);

    let oeaw = shallow.store().owner_of(OEAW_WIKIDATA).unwrap().unwrap();
    assert!(shallow.store().relations_of(oeaw).unwrap().is_empty());

    let mut deep = importer_with(ImporterConfig {
        max_depth: 2,
        ..Default::default()
    });
    let outcome = deep.import(SUESS_WIKIDATA, EntityKind::Person).unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.records_created.len(), 3);
    assert_eq!(report.relations_created, 3);

    let oeaw = deep.store().owner_of(OEAW_WIKIDATA).unwrap().unwrap();
    let located = deep.store().relations_of(oeaw).unwrap();
    assert_eq!(located[0].kind, RelationKind::LocatedIn);
    assert_eq!(
        Some(located[0].object),
        deep.store().owner_of(WIEN_WIKIDATA).unwrap()
    );
    assert_eq!(deep.fetcher().fetch_count(WIEN_WIKIDATA), 1);
}

#[test]
fn test_shallow_import_follows_no_relations() {
    let mut importer = importer_with(ImporterConfig::shallow());
    let outcome = importer.import(KREISKY_GND, EntityKind::Person).unwrap();
    assert_eq!(outcome.report().unwrap().records_created.len(), 1);
    assert_eq!(importer.fetcher().fetch_count(WIEN_GND), 0);
}

#[test]
fn test_statement_qualifiers_become_interval() {
    let mut importer = importer();
    let suess = created(importer.import(SUESS_WIKIDATA, EntityKind::Person).unwrap());

    let relations = importer.store().relations_of(suess.id).unwrap();
    let worked_at = relations
        .iter()
        .find(|r| r.kind == RelationKind::WorkedAt)
        .unwrap();
    assert_eq!(worked_at.start, Some(FuzzyDate::year(1898)));
    assert_eq!(worked_at.end, Some(FuzzyDate::year(1911)));
    assert_eq!(worked_at.start.as_ref().unwrap().precision(), DatePrecision::Year);
}

#[test]
fn test_missing_target_is_skipped() {
    let mut importer = importer();
    let outcome = importer.import(SUESS_WIKIDATA, EntityKind::Person).unwrap();
    let report = outcome.report().unwrap();

    let skipped: Vec<&SkippedItem> = report.skipped_relations().collect();
    assert_eq!(skipped.len(), 1);
    match skipped[0] {
        SkippedItem::Relation {
            subject,
            kind,
            target,
            reason,
        } => {
            assert_eq!(subject, SUESS_WIKIDATA);
            assert_eq!(*kind, RelationKind::WorkedAt);
            assert_eq!(target, UNIVERSITY_WIKIDATA);
            assert!(reason.contains("404"), "reason: {}", reason);
        }
        other => panic!("Expected a skipped relation, got {:?}", other),
    }
}

#[test]
fn test_missing_target_aborts_under_strict_policy() {
    let mut importer = importer_with(ImporterConfig::strict());
    assert_eq!(importer.config().relation_policy, RelationPolicy::Abort);

    match importer.import(SUESS_WIKIDATA, EntityKind::Person) {
        Err(ImportError::RelationTarget {
            kind,
            target,
            source,
        }) => {
            assert_eq!(kind, RelationKind::WorkedAt);
            assert_eq!(target, UNIVERSITY_WIKIDATA);
            assert!(matches!(
                *source,
                ImportError::Fetch {
                    source: FetchError::Status { status: 404, .. },
                    ..
                }
            ));
        }
        other => panic!("Expected a relation failure, got {:?}", other),
    }
    assert_eq!(importer.store().count_entities(None).unwrap(), 0);
}

#[test]
fn test_disabled_vocabulary_lookup_skips_terms() {
    let mut importer = importer_with(ImporterConfig {
        lookup_vocabulary: false,
        ..Default::default()
    });
    let outcome = importer.import(KREISKY_GND, EntityKind::Person).unwrap();
    let report = outcome.report().unwrap().clone();
    let record = created(outcome);

    assert!(person(&record).professions.is_empty());
    assert_eq!(person(&record).titles, vec!["Dr. jur."]);
    assert_eq!(report.skipped_vocabulary().count(), 2);
    assert_eq!(importer.fetcher().fetch_count("https://d-nb.info/gnd/4028781-1"), 0);
}

#[test]
fn test_wrong_kind_is_not_found() {
    let mut importer = importer();
    let outcome = importer.import(WIEN_GND, EntityKind::Person).unwrap();
    assert_eq!(outcome, ImportOutcome::NotFound);
    assert_eq!(importer.store().count_entities(None).unwrap(), 0);
}

#[test]
fn test_unsupported_uri() {
    let mut importer = importer();
    match importer.import("https://example.org/person/1", EntityKind::Person) {
        Err(ImportError::UnsupportedUri(uri)) => assert_eq!(uri, "https://example.org/person/1"),
        other => panic!("Expected an unsupported URI, got {:?}", other),
    }
    assert_eq!(importer.fetcher().call_count(), 0);
}

#[test]
fn test_missing_config() {
    let mut importer = importer();
    assert!(matches!(
        importer.import(WIEN_GEONAMES, EntityKind::Person),
        Err(ImportError::NoConfig {
            kind: EntityKind::Person,
            ..
        })
    ));
}

#[test]
fn test_fetch_failure() {
    let mut importer = importer();
    match importer.import("https://d-nb.info/gnd/999999999", EntityKind::Person) {
        Err(error @ ImportError::Fetch { .. }) => assert!(error.is_retryable()),
        other => panic!("Expected a fetch failure, got {:?}", other),
    }
}

#[test]
fn test_ambiguous_description() {
    let mut importer = importer();
    importer
        .fetcher()
        .clone()
        .add_document(
            "https://d-nb.info/gnd/100000001",
            RdfFormat::Turtle,
            r#"
            @prefix gndo: <https://d-nb.info/standards/elementset/gnd#> .
            <https://d-nb.info/gnd/100000001> a gndo:DifferentiatedPerson .
            <https://d-nb.info/gnd/100000002> a gndo:DifferentiatedPerson .
            "#,
        )
        .unwrap();

    match importer.import("https://d-nb.info/gnd/100000001", EntityKind::Person) {
        Err(ImportError::Ambiguous { subjects, .. }) => assert_eq!(subjects.len(), 2),
        other => panic!("Expected an ambiguous description, got {:?}", other),
    }
    assert_eq!(importer.store().count_entities(None).unwrap(), 0);
}

#[test]
fn test_identity_conflict_writes_nothing() {
    let mut importer = importer();
    {
        let store = importer.store_mut();
        let wikidata = EntityRecord::new(EntityData::empty(EntityKind::Person), 0);
        let viaf = EntityRecord::new(EntityData::empty(EntityKind::Person), 0);
        let mut tx = store.begin().unwrap();
        tx.insert_entity(&wikidata).unwrap();
        tx.insert_entity(&viaf).unwrap();
        tx.register_identifier(&ExternalIdentifier::new(KREISKY_WIKIDATA, wikidata.id))
            .unwrap();
        tx.register_identifier(&ExternalIdentifier::new(KREISKY_VIAF, viaf.id))
            .unwrap();
        tx.commit().unwrap();
    }

    match importer.import(KREISKY_GND, EntityKind::Person) {
        Err(ImportError::IdentityConflict { uri, identifiers }) => {
            assert_eq!(uri, KREISKY_GND);
            let uris: Vec<&str> = identifiers.iter().map(|i| i.uri.as_str()).collect();
            assert_eq!(uris, vec![KREISKY_WIKIDATA, KREISKY_VIAF]);
        }
        other => panic!("Expected an identity conflict, got {:?}", other),
    }
    assert_eq!(importer.store().count_entities(None).unwrap(), 2);
    assert_eq!(importer.store().owner_of(KREISKY_GND).unwrap(), None);
    assert_eq!(importer.store().owner_of(WIEN_GND).unwrap(), None);
}

#[test]
fn test_kind_mismatch_is_conflict() {
    let mut importer = importer();
    importer.import(WIEN_GND, EntityKind::Place).unwrap();

    match importer.import(WIEN_GND, EntityKind::Person) {
        Err(ImportError::IdentityConflict { identifiers, .. }) => {
            assert_eq!(identifiers[0].owner_kind, Some(EntityKind::Place));
        }
        other => panic!("Expected an identity conflict, got {:?}", other),
    }
}

/// Registers the subject from a second connection while a target is fetched
struct RacingFetcher {
    inner: MockFetcher,
    database: PathBuf,
    trigger: String,
    subject: String,
    raced: Cell<Option<EntityId>>,
}

impl GraphFetcher for RacingFetcher {
    fn fetch(&self, uri: &SourceUri) -> Result<Graph, FetchError> {
        if uri.canonical == self.trigger && self.raced.get().is_none() {
            let mut other = SqliteStore::new(&self.database).unwrap();
            let record = EntityRecord::new(
                EntityData::Person(Person {
                    surname: Some("Kreisky".to_string()),
                    ..Default::default()
                }),
                0,
            );
            let mut tx = other.begin().unwrap();
            tx.insert_entity(&record).unwrap();
            tx.register_identifier(&ExternalIdentifier::new(self.subject.as_str(), record.id))
                .unwrap();
            tx.commit().unwrap();
            self.raced.set(Some(record.id));
        }
        self.inner.fetch(uri)
    }
}

#[test]
fn test_concurrent_import_of_subject_resolves_to_winner() {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("lodestar.db");
    let fetcher = RacingFetcher {
        inner: fetcher(),
        database: database.clone(),
        trigger: WIEN_GND.to_string(),
        subject: KREISKY_GND.to_string(),
        raced: Cell::new(None),
    };
    let mut importer = Importer::new(
        SqliteStore::new(&database).unwrap(),
        fetcher,
        ConfigRegistry::builtin().unwrap(),
        ImporterConfig::default(),
    );

    let outcome = importer.import(KREISKY_GND, EntityKind::Person).unwrap();
    let winner = importer.fetcher().raced.get().unwrap();
    match outcome {
        ImportOutcome::Existing(record) => assert_eq!(record.id, winner),
        other => panic!("Expected the concurrently imported record, got {:?}", other),
    }
    assert_eq!(importer.store().count_entities(None).unwrap(), 1);
    assert_eq!(importer.store().owner_of(WIEN_GND).unwrap(), None);
}
