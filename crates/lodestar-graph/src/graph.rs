//! In-memory triple graph

use std::collections::HashMap;
use std::fmt;

/// A literal value with its optional language tag or datatype
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    /// Lexical form
    pub lexical: String,

    /// Language tag (e.g. `de`), lowercased
    pub language: Option<String>,

    /// Datatype IRI
    pub datatype: Option<String>,
}

impl Literal {
    /// A plain literal without language or datatype
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype: None,
        }
    }

    /// A language-tagged literal
    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: Some(language.into().to_lowercase()),
            datatype: None,
        }
    }

    /// A typed literal
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype: Some(datatype.into()),
        }
    }

    /// Whether the language tag matches `lang` or one of its subtags
    ///
    /// `de` matches `de` and `de-at`.
    pub fn has_language(&self, lang: &str) -> bool {
        let lang = lang.to_lowercase();
        match &self.language {
            Some(tag) => {
                let tag = tag.to_lowercase();
                tag == lang || tag.strip_prefix(&lang).is_some_and(|rest| rest.starts_with('-'))
            }
            None => false,
        }
    }
}

/// A node or value in the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Named node
    Iri(String),

    /// Blank node, by its document-local label
    BlankNode(String),

    /// Literal value
    Literal(Literal),
}

impl Term {
    /// Named node
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Plain literal
    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(lexical))
    }

    /// The IRI, if this is a named node
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// The literal, if this is one
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Whether this term can appear as a subject
    pub fn is_node(&self) -> bool {
        !matches!(self, Term::Literal(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "_:{}", id),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", lit.lexical)?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A single statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    /// Subject (named or blank node)
    pub subject: Term,

    /// Predicate IRI
    pub predicate: String,

    /// Object
    pub object: Term,
}

/// An indexed set of triples
///
/// Keeps insertion order; duplicate triples are stored once.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    by_subject: HashMap<Term, Vec<usize>>,
    by_object: HashMap<Term, Vec<usize>>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple; returns `false` if it was already present
    pub fn insert(&mut self, subject: Term, predicate: impl Into<String>, object: Term) -> bool {
        let predicate = predicate.into();
        if self.contains(&subject, &predicate, &object) {
            return false;
        }
        let index = self.triples.len();
        self.by_subject.entry(subject.clone()).or_default().push(index);
        self.by_object.entry(object.clone()).or_default().push(index);
        self.triples.push(Triple {
            subject,
            predicate,
            object,
        });
        true
    }

    /// Add every triple of another graph
    pub fn extend(&mut self, other: Graph) {
        for triple in other.triples {
            self.insert(triple.subject, triple.predicate, triple.object);
        }
    }

    /// Number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph has no triples
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// All triples in insertion order
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Whether the exact triple is present
    pub fn contains(&self, subject: &Term, predicate: &str, object: &Term) -> bool {
        self.outgoing(subject)
            .any(|t| t.predicate == predicate && &t.object == object)
    }

    /// Objects of `(subject, predicate, ?)`
    pub fn objects<'a>(&'a self, subject: &Term, predicate: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.outgoing(subject)
            .filter(move |t| t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Subjects of `(?, predicate, object)`
    pub fn subjects<'a>(&'a self, predicate: &'a str, object: &Term) -> impl Iterator<Item = &'a Term> + 'a {
        self.incoming(object)
            .filter(move |t| t.predicate == predicate)
            .map(|t| &t.subject)
    }

    /// Whether `subject` has `predicate`, optionally with exactly `object`
    pub fn has(&self, subject: &Term, predicate: &str, object: Option<&Term>) -> bool {
        match object {
            Some(object) => self.contains(subject, predicate, object),
            None => self.objects(subject, predicate).next().is_some(),
        }
    }

    /// Distinct named subjects in order of first appearance
    pub fn iri_subjects(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.triples
            .iter()
            .filter_map(|t| t.subject.as_iri())
            .filter(|iri| seen.insert(*iri))
            .collect()
    }

    fn outgoing<'a>(&'a self, subject: &Term) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .map(move |&i| &self.triples[i])
    }

    fn incoming<'a>(&'a self, object: &Term) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_object
            .get(object)
            .into_iter()
            .flatten()
            .map(move |&i| &self.triples[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    fn sample() -> Graph {
        let mut graph = Graph::new();
        let wien = Term::iri("https://d-nb.info/gnd/4066009-6");
        graph.insert(wien.clone(), TYPE, Term::iri("https://d-nb.info/standards/elementset/gnd#PlaceOrGeographicName"));
        graph.insert(
            wien.clone(),
            "https://d-nb.info/standards/elementset/gnd#preferredNameForThePlaceOrGeographicName",
            Term::literal("Wien"),
        );
        graph.insert(
            Term::iri("https://d-nb.info/gnd/118566512"),
            "https://d-nb.info/standards/elementset/gnd#placeOfBirth",
            wien,
        );
        graph
    }

    #[test]
    fn test_duplicate_triples_stored_once() {
        let mut graph = sample();
        assert_eq!(graph.len(), 3);
        assert!(!graph.insert(
            Term::iri("https://d-nb.info/gnd/4066009-6"),
            "https://d-nb.info/standards/elementset/gnd#preferredNameForThePlaceOrGeographicName",
            Term::literal("Wien"),
        ));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_objects_and_subjects() {
        let graph = sample();
        let wien = Term::iri("https://d-nb.info/gnd/4066009-6");
        let names: Vec<_> = graph
            .objects(&wien, "https://d-nb.info/standards/elementset/gnd#preferredNameForThePlaceOrGeographicName")
            .collect();
        assert_eq!(names, vec![&Term::literal("Wien")]);

        let born: Vec<_> = graph
            .subjects("https://d-nb.info/standards/elementset/gnd#placeOfBirth", &wien)
            .collect();
        assert_eq!(born, vec![&Term::iri("https://d-nb.info/gnd/118566512")]);
    }

    #[test]
    fn test_has_any_value() {
        let graph = sample();
        let wien = Term::iri("https://d-nb.info/gnd/4066009-6");
        assert!(graph.has(&wien, TYPE, None));
        assert!(!graph.has(&wien, "http://www.w3.org/2002/07/owl#sameAs", None));
    }

    #[test]
    fn test_iri_subjects_in_order() {
        let graph = sample();
        assert_eq!(
            graph.iri_subjects(),
            vec!["https://d-nb.info/gnd/4066009-6", "https://d-nb.info/gnd/118566512"]
        );
    }

    #[test]
    fn test_language_subtags() {
        let lit = Literal::tagged("Wien", "de-AT");
        assert!(lit.has_language("de"));
        assert!(lit.has_language("DE-at"));
        assert!(!lit.has_language("d"));
        assert!(!Literal::plain("Wien").has_language("de"));
    }
}
