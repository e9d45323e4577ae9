//! Coercion of raw graph values into field values

use crate::rule::Coercion;
use lazy_static::lazy_static;
use lodestar_domain::{FuzzyDate, Gender};
use lodestar_graph::{Graph, Term};
use regex::Regex;

lazy_static! {
    // Point(16.3725 48.208333333333), Point ( +016.371690 +048.208199 )
    static ref WKT_POINT: Regex = Regex::new(
        r"(?i)^\s*(?:<[^>]*>\s*)?point\s*\(\s*([+-]?\d+(?:\.\d+)?)\s+([+-]?\d+(?:\.\d+)?)\s*\)\s*$"
    ).unwrap();
}

/// A vocabulary value: a label, a term URI, or both
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermValue {
    /// Label, if the graph states one
    pub label: Option<String>,

    /// URI of the term, if given as a node
    pub uri: Option<String>,
}

/// A coerced field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Short text
    Text(String),
    /// Fuzzy date
    Date(FuzzyDate),
    /// Decimal number
    Float(f64),
    /// Gender
    Gender(Gender),
    /// IRI
    Uri(String),
    /// Vocabulary term
    Term(TermValue),
}

/// Coerce one raw value; `None` if it does not fit
pub fn coerce(coercion: Coercion, term: &Term) -> Option<Value> {
    match coercion {
        Coercion::Text => literal_text(term).map(Value::Text),
        Coercion::Date => literal_text(term)
            .and_then(|t| FuzzyDate::parse(&t))
            .map(Value::Date),
        Coercion::Float => literal_text(term)
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|f| f.is_finite())
            .map(Value::Float),
        Coercion::WktLongitude => wkt_point(term).map(|(lon, _)| Value::Float(lon)),
        Coercion::WktLatitude => wkt_point(term).map(|(_, lat)| Value::Float(lat)),
        Coercion::Gender => gender(term).map(Value::Gender),
        Coercion::Vocabulary => match term {
            Term::Iri(iri) => Some(Value::Term(TermValue {
                label: None,
                uri: Some(iri.clone()),
            })),
            Term::Literal(_) => literal_text(term).map(|label| {
                Value::Term(TermValue {
                    label: Some(label),
                    uri: None,
                })
            }),
            Term::BlankNode(_) => None,
        },
        Coercion::LocalName => term.as_iri().and_then(local_name).map(Value::Text),
        Coercion::Uri => term.as_iri().map(|iri| Value::Uri(iri.to_string())),
    }
}

/// Coerce a value that may be a node in `graph`
///
/// Dates given as Wikidata time value nodes keep the precision the node
/// states; every other value goes through [`coerce`].
pub fn coerce_in(graph: &Graph, coercion: Coercion, term: &Term) -> Option<Value> {
    if coercion == Coercion::Date && term.is_node() {
        return time_value(graph, term).map(Value::Date);
    }
    coerce(coercion, term)
}

const TIME_VALUE: &str = "http://wikiba.se/ontology#timeValue";
const TIME_PRECISION: &str = "http://wikiba.se/ontology#timePrecision";

/// Read a Wikidata time value node into a date of the stated precision
///
/// Precision 9 is a year, 10 a month, 11 and finer a day. Coarser
/// precisions (decades, centuries) are not representable and give `None`.
pub fn time_value(graph: &Graph, node: &Term) -> Option<FuzzyDate> {
    let lexical = graph.objects(node, TIME_VALUE).find_map(literal_text)?;
    let precision: u8 = graph
        .objects(node, TIME_PRECISION)
        .find_map(|t| literal_text(t)?.parse().ok())?;
    let (year, month, day) = FuzzyDate::parse(&lexical)?.earliest();
    match precision {
        9 => Some(FuzzyDate::year(year)),
        10 => FuzzyDate::month(year, month),
        11.. => FuzzyDate::day(year, month, day),
        _ => None,
    }
}

/// Parse a WKT point into `(longitude, latitude)`
///
/// # Examples
///
/// ```
/// use lodestar_mapping::coerce::parse_wkt_point;
///
/// assert_eq!(parse_wkt_point("Point ( +016.371690 +048.208199 )"), Some((16.37169, 48.208199)));
/// assert_eq!(parse_wkt_point("Polygon((0 0, 1 1))"), None);
/// ```
pub fn parse_wkt_point(text: &str) -> Option<(f64, f64)> {
    let captures = WKT_POINT.captures(text)?;
    let lon = captures.get(1)?.as_str().parse().ok()?;
    let lat = captures.get(2)?.as_str().parse().ok()?;
    Some((lon, lat))
}

fn wkt_point(term: &Term) -> Option<(f64, f64)> {
    term.as_literal().and_then(|l| parse_wkt_point(&l.lexical))
}

fn literal_text(term: &Term) -> Option<String> {
    let text = term.as_literal()?.lexical.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn local_name(iri: &str) -> Option<String> {
    let local = iri.trim_end_matches(['/', '#']).rsplit(['#', '/']).next()?;
    if local.is_empty() {
        None
    } else {
        Some(local.to_string())
    }
}

fn gender(term: &Term) -> Option<Gender> {
    let key = match term {
        Term::Iri(iri) => match iri.as_str() {
            "http://www.wikidata.org/entity/Q6581072" => return Some(Gender::Female),
            "http://www.wikidata.org/entity/Q6581097" => return Some(Gender::Male),
            "http://www.wikidata.org/entity/Q1097630" | "http://www.wikidata.org/entity/Q48270" => {
                return Some(Gender::Third)
            }
            other => local_name(other)?,
        },
        Term::Literal(_) => literal_text(term)?,
        Term::BlankNode(_) => return None,
    };
    match key.to_lowercase().as_str() {
        "female" | "weiblich" => Some(Gender::Female),
        "male" | "männlich" => Some(Gender::Male),
        "divers" | "third gender" => Some(Gender::Third),
        _ => None,
    }
}
