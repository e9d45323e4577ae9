//! Integration tests for lodestar-graph
//!
//! Parses recorded source documents in each serialization the sources use.

use lodestar_graph::{parse_graph, GraphFetcher, MockFetcher, RdfFormat, SourceUri, Term};

const GND_KREISKY: &str = include_str!("../../lodestar-importer/tests/fixtures/gnd/118566512.ttl");
const WIKIDATA_WIEN: &str = include_str!("../../lodestar-importer/tests/fixtures/wikidata/Q1741.ttl");
const GEONAMES_WIEN: &str = include_str!("../../lodestar-importer/tests/fixtures/geonames/2761369.rdf");

const GNDO: &str = "https://d-nb.info/standards/elementset/gnd#";

#[test]
fn test_parse_gnd_turtle() {
    let graph = parse_graph(GND_KREISKY.as_bytes(), RdfFormat::Turtle).unwrap();
    let kreisky = Term::iri("https://d-nb.info/gnd/118566512");

    let name_entity = format!("{}preferredNameEntityForThePerson", GNDO);
    let entities: Vec<&Term> = graph.objects(&kreisky, &name_entity).collect();
    assert_eq!(entities.len(), 1);
    assert!(matches!(entities[0], Term::BlankNode(_)));

    let forename = format!("{}forename", GNDO);
    let forenames: Vec<&str> = graph
        .objects(entities[0], &forename)
        .filter_map(|t| t.as_literal())
        .map(|l| l.lexical.as_str())
        .collect();
    assert_eq!(forenames, vec!["Bruno"]);

    let birth = format!("{}dateOfBirth", GNDO);
    let literal = graph.objects(&kreisky, &birth).next().unwrap().as_literal().unwrap();
    assert_eq!(literal.lexical, "1911-01-22");
    assert_eq!(
        literal.datatype.as_deref(),
        Some("http://www.w3.org/2001/XMLSchema#date")
    );
}

#[test]
fn test_parse_wikidata_language_tags() {
    let graph = parse_graph(WIKIDATA_WIEN.as_bytes(), RdfFormat::Turtle).unwrap();
    let wien = Term::iri("http://www.wikidata.org/entity/Q1741");

    let labels: Vec<&str> = graph
        .objects(&wien, "http://www.w3.org/2000/01/rdf-schema#label")
        .filter_map(|t| t.as_literal())
        .filter(|l| l.has_language("de"))
        .map(|l| l.lexical.as_str())
        .collect();
    assert_eq!(labels, vec!["Wien"]);
}

#[test]
fn test_parse_geonames_rdf_xml() {
    let graph = parse_graph(GEONAMES_WIEN.as_bytes(), RdfFormat::RdfXml).unwrap();
    let wien = Term::iri("https://sws.geonames.org/2761369/");

    assert!(graph.has(
        &wien,
        "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
        Some(&Term::iri("http://www.geonames.org/ontology#Feature"))
    ));
    let lat = graph
        .objects(&wien, "http://www.w3.org/2003/01/geo/wgs84_pos#lat")
        .next()
        .and_then(|t| t.as_literal())
        .unwrap();
    assert_eq!(lat.lexical, "48.20849");

    let mut subjects = graph.iri_subjects();
    subjects.sort();
    assert_eq!(
        subjects,
        vec![
            "https://sws.geonames.org/2761369/",
            "https://sws.geonames.org/2761369/about.rdf"
        ]
    );
}

#[test]
fn test_malformed_document() {
    assert!(parse_graph(b"<https://d-nb.info/gnd/1> <p> .", RdfFormat::Turtle).is_err());
}

#[test]
fn test_mock_serves_recorded_documents() {
    let mut fetcher = MockFetcher::new();
    fetcher
        .add_document(
            "https://sws.geonames.org/2761369/",
            RdfFormat::RdfXml,
            GEONAMES_WIEN,
        )
        .unwrap();

    let uri = SourceUri::recognize("http://www.geonames.org/2761369/vienna.html").unwrap();
    let graph = fetcher.fetch(&uri).unwrap();
    assert!(!graph.is_empty());
    assert_eq!(fetcher.fetch_count("https://sws.geonames.org/2761369/"), 1);
}
