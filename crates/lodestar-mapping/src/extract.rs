//! Attribute and relation extraction

use crate::coerce::{coerce_in, TermValue, Value};
use crate::error::ExtractError;
use crate::filter::select_subject;
use crate::path::Query;
use crate::rule::{Attribute, Coercion, ExtractionConfig, Field, RelationRule, RelationSource, StatementPattern};
use lodestar_domain::{normalize_label, FuzzyDate, Gender, RelationKind};
use lodestar_graph::{Graph, Term};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A relation target found in the subject's description
#[derive(Debug, Clone, PartialEq)]
pub struct RelationTarget {
    /// Kind of relation
    pub kind: RelationKind,

    /// URI of the target as stated by the source
    pub uri: String,

    /// Start of validity
    pub start: Option<FuzzyDate>,

    /// End of validity
    pub end: Option<FuzzyDate>,

    /// Provenance
    pub notes: String,
}

/// Everything read from one subject
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    /// The selected subject IRI
    pub subject: String,

    /// Coerced values per field
    pub values: BTreeMap<Field, Vec<Value>>,

    /// Relation targets, in rule order
    pub relations: Vec<RelationTarget>,
}

impl Extraction {
    /// Values of a field
    pub fn values(&self, field: Field) -> &[Value] {
        self.values.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First text value of a field
    pub fn text(&self, field: Field) -> Option<&str> {
        self.values(field).iter().find_map(|v| match v {
            Value::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }

    /// First date value of a field
    pub fn date(&self, field: Field) -> Option<&FuzzyDate> {
        self.values(field).iter().find_map(|v| match v {
            Value::Date(d) => Some(d),
            _ => None,
        })
    }

    /// First number of a field
    pub fn float(&self, field: Field) -> Option<f64> {
        self.values(field).iter().find_map(|v| match v {
            Value::Float(f) => Some(*f),
            _ => None,
        })
    }

    /// Gender, if extracted
    pub fn gender(&self) -> Option<Gender> {
        self.values(Field::Gender).iter().find_map(|v| match v {
            Value::Gender(g) => Some(*g),
            _ => None,
        })
    }

    /// All URIs of a field
    pub fn uris(&self, field: Field) -> Vec<&str> {
        self.values(field)
            .iter()
            .filter_map(|v| match v {
                Value::Uri(u) => Some(u.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All vocabulary terms of a field
    pub fn terms(&self, field: Field) -> Vec<&TermValue> {
        self.values(field)
            .iter()
            .filter_map(|v| match v {
                Value::Term(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl ExtractionConfig {
    /// Select the subject and extract it
    ///
    /// `Ok(None)` means the graph holds no description this config applies to.
    pub fn apply(&self, graph: &Graph) -> Result<Option<Extraction>, ExtractError> {
        match select_subject(graph, &self.filters)? {
            Some(subject) => Ok(Some(extract(self, graph, &subject))),
            None => Ok(None),
        }
    }
}

/// Extract fields and relation targets of `subject`
pub fn extract(config: &ExtractionConfig, graph: &Graph, subject: &str) -> Extraction {
    let node = Term::iri(subject);
    let mut extraction = Extraction {
        subject: subject.to_string(),
        ..Default::default()
    };

    for attribute in &config.attributes {
        let values = extract_attribute(attribute, graph, &node);
        if !values.is_empty() {
            extraction.values.insert(attribute.field, values);
        }
    }

    let interval = (
        extraction.date(Field::Start).cloned(),
        extraction.date(Field::End).cloned(),
    );
    for rule in &config.relations {
        extraction
            .relations
            .extend(extract_relation(rule, graph, &node, &interval));
    }

    debug!(
        "Extracted {} fields and {} relation targets from {}",
        extraction.values.len(),
        extraction.relations.len(),
        subject
    );
    extraction
}

fn extract_attribute(attribute: &Attribute, graph: &Graph, subject: &Term) -> Vec<Value> {
    for alternative in &attribute.alternatives {
        let raw = alternative.evaluate(graph, subject);
        if raw.is_empty() {
            continue;
        }

        let mut values = Vec::new();
        for term in &raw {
            match coerce_in(graph, attribute.coercion, term) {
                Some(value) => values.push(value),
                None => warn!(
                    "Cannot read {} as {} for field '{}'",
                    term,
                    attribute.coercion.as_str(),
                    attribute.field
                ),
            }
        }
        if values.is_empty() {
            continue;
        }

        debug!("Field '{}' taken from {}", attribute.field, alternative);
        if !attribute.field.is_multi_valued() {
            values.truncate(1);
        } else if attribute.coercion == Coercion::Vocabulary {
            values = dedup_terms(values);
        } else {
            let mut unique: Vec<Value> = Vec::with_capacity(values.len());
            for value in values {
                if !unique.contains(&value) {
                    unique.push(value);
                }
            }
            values = unique;
        }
        return values;
    }
    Vec::new()
}

/// Deduplicate terms by normalized label, or by URI when no label is known
fn dedup_terms(values: Vec<Value>) -> Vec<Value> {
    let mut seen = Vec::new();
    let mut unique = Vec::new();
    for value in values {
        let key = match &value {
            Value::Term(TermValue { label: Some(label), .. }) => format!("label:{}", normalize_label(label)),
            Value::Term(TermValue { uri: Some(uri), .. }) => format!("uri:{}", uri),
            _ => continue,
        };
        if !seen.contains(&key) {
            seen.push(key);
            unique.push(value);
        }
    }
    unique
}

fn extract_relation(
    rule: &RelationRule,
    graph: &Graph,
    subject: &Term,
    interval: &(Option<FuzzyDate>, Option<FuzzyDate>),
) -> Vec<RelationTarget> {
    for source in &rule.sources {
        let notes = format!("Imported from {} ({})", subject_iri(subject), source);
        let mut targets: Vec<RelationTarget> = Vec::new();

        match source {
            RelationSource::Path(query) => {
                for term in query.evaluate(graph, subject) {
                    match term {
                        Term::Iri(uri) => targets.push(RelationTarget {
                            kind: rule.kind,
                            uri,
                            start: interval.0.clone(),
                            end: interval.1.clone(),
                            notes: notes.clone(),
                        }),
                        other => debug!("Ignoring non-IRI target {} for '{}'", other, rule.kind),
                    }
                }
            }
            RelationSource::Statement(pattern) => {
                targets.extend(statement_targets(rule.kind, pattern, graph, subject, interval, &notes));
            }
        }

        targets.dedup_by(|a, b| a.uri == b.uri);
        if !targets.is_empty() {
            return targets;
        }
    }
    Vec::new()
}

fn statement_targets(
    kind: RelationKind,
    pattern: &StatementPattern,
    graph: &Graph,
    subject: &Term,
    interval: &(Option<FuzzyDate>, Option<FuzzyDate>),
    notes: &str,
) -> Vec<RelationTarget> {
    let qualifier = |node: &Term, query: &Option<Query>| -> Option<FuzzyDate> {
        query
            .as_ref()?
            .evaluate(graph, node)
            .iter()
            .find_map(|t| match coerce_in(graph, Coercion::Date, t) {
                Some(Value::Date(d)) => Some(d),
                _ => None,
            })
    };

    let mut targets = Vec::new();
    for statement in graph.objects(subject, &pattern.statement) {
        let start = qualifier(statement, &pattern.start);
        let end = qualifier(statement, &pattern.end);
        let (start, end) = if start.is_none() && end.is_none() {
            interval.clone()
        } else {
            (start, end)
        };

        for value in graph.objects(statement, &pattern.value) {
            if let Some(uri) = value.as_iri() {
                if !targets.iter().any(|t: &RelationTarget| t.uri == uri) {
                    targets.push(RelationTarget {
                        kind,
                        uri: uri.to_string(),
                        start: start.clone(),
                        end: end.clone(),
                        notes: notes.to_string(),
                    });
                }
            }
        }
    }
    targets
}

fn subject_iri(subject: &Term) -> &str {
    subject.as_iri().unwrap_or_default()
}
