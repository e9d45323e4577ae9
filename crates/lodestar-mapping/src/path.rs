//! Property paths and queries
//!
//! The mapping language is deliberately small:
//!
//! ```text
//! query := path | ("coalesce" | "union") "(" path ("|" path)* ")"
//! path  := step ("/" step)* ["@" lang ("," lang)*]
//! step  := ["^"] (CURIE | "<" IRI ">")
//! lang  := language tag | "*"
//! ```
//!
//! A path walks the graph from the subject one predicate at a time; `^`
//! walks a predicate backwards. The language list keeps only literals in the
//! first listed language that has any, `*` accepting everything.
//! `coalesce` yields the first path with a result, `union` the values of all
//! paths.

use crate::error::MappingError;
use crate::prefixes::PrefixMap;
use lodestar_graph::{Graph, Term};
use std::fmt;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Predicate IRI
    pub predicate: String,

    /// Follow the predicate from object to subject
    pub inverse: bool,
}

/// A sequence of steps with an optional language preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    text: String,
    steps: Vec<Step>,
    languages: Vec<String>,
}

impl PropertyPath {
    /// Parse a path, expanding CURIEs with `prefixes`
    pub fn parse(text: &str, prefixes: &PrefixMap) -> Result<Self, MappingError> {
        let text = text.trim();
        let invalid = |message: &str| MappingError::InvalidPath {
            path: text.to_string(),
            message: message.to_string(),
        };

        let (steps_text, languages) = match split_outside_brackets(text, '@').as_slice() {
            [steps] => (*steps, Vec::new()),
            [steps, langs] => (*steps, parse_languages(langs).ok_or_else(|| invalid("invalid language list"))?),
            _ => return Err(invalid("more than one '@'")),
        };

        let mut steps = Vec::new();
        for step in split_outside_brackets(steps_text, '/') {
            let step = step.trim();
            let (inverse, name) = match step.strip_prefix('^') {
                Some(rest) => (true, rest.trim()),
                None => (false, step),
            };
            if name.is_empty() {
                return Err(invalid("empty step"));
            }
            steps.push(Step {
                predicate: prefixes.expand(name)?,
                inverse,
            });
        }

        Ok(Self {
            text: text.to_string(),
            steps,
            languages,
        })
    }

    /// The steps of the path
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Language preference list, empty if none
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Values reached from `subject`, in graph order without duplicates
    pub fn evaluate(&self, graph: &Graph, subject: &Term) -> Vec<Term> {
        let mut current = vec![subject.clone()];
        for step in &self.steps {
            let mut next: Vec<Term> = Vec::new();
            for node in &current {
                let reached: Vec<&Term> = if step.inverse {
                    graph.subjects(&step.predicate, node).collect()
                } else {
                    graph.objects(node, &step.predicate).collect()
                };
                for term in reached {
                    if !next.contains(term) {
                        next.push(term.clone());
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        self.select_language(current)
    }

    fn select_language(&self, values: Vec<Term>) -> Vec<Term> {
        if self.languages.is_empty() {
            return values;
        }
        for lang in &self.languages {
            if lang == "*" {
                return values;
            }
            let tagged: Vec<Term> = values
                .iter()
                .filter(|v| v.as_literal().is_some_and(|l| l.has_language(lang)))
                .cloned()
                .collect();
            if !tagged.is_empty() {
                return tagged;
            }
        }
        Vec::new()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A path, or an ordered choice of paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// A single path
    Path(PropertyPath),

    /// The first path with a non-empty result
    Coalesce(Vec<PropertyPath>),

    /// Every value of every path, in path order without duplicates
    Union(Vec<PropertyPath>),
}

impl Query {
    /// Parse a query, expanding CURIEs with `prefixes`
    ///
    /// # Examples
    ///
    /// ```
    /// use lodestar_mapping::{PrefixMap, Query};
    ///
    /// let prefixes = PrefixMap::builtin();
    /// let query = Query::parse("coalesce(rdfs:label@de | rdfs:label@en | rdfs:label)", &prefixes).unwrap();
    /// assert!(matches!(query, Query::Coalesce(ref paths) if paths.len() == 3));
    ///
    /// assert!(Query::parse("gndo:forename/", &prefixes).is_err());
    /// ```
    pub fn parse(text: &str, prefixes: &PrefixMap) -> Result<Self, MappingError> {
        let trimmed = text.trim();
        if let Some(paths) = parse_call(trimmed, "coalesce", prefixes)? {
            return Ok(Query::Coalesce(paths));
        }
        if let Some(paths) = parse_call(trimmed, "union", prefixes)? {
            return Ok(Query::Union(paths));
        }
        Ok(Query::Path(PropertyPath::parse(trimmed, prefixes)?))
    }

    /// Evaluate against the graph, starting at `subject`
    pub fn evaluate(&self, graph: &Graph, subject: &Term) -> Vec<Term> {
        match self {
            Query::Path(path) => path.evaluate(graph, subject),
            Query::Coalesce(paths) => paths
                .iter()
                .map(|p| p.evaluate(graph, subject))
                .find(|values| !values.is_empty())
                .unwrap_or_default(),
            Query::Union(paths) => {
                let mut values: Vec<Term> = Vec::new();
                for term in paths.iter().flat_map(|p| p.evaluate(graph, subject)) {
                    if !values.contains(&term) {
                        values.push(term);
                    }
                }
                values
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Path(path) => write!(f, "{}", path),
            Query::Coalesce(paths) | Query::Union(paths) => {
                let name = if matches!(self, Query::Coalesce(_)) { "coalesce" } else { "union" };
                let parts: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
                write!(f, "{}({})", name, parts.join(" | "))
            }
        }
    }
}

/// Paths of `name(path | ...)`; `None` if `text` is not a call of `name`
fn parse_call(
    text: &str,
    name: &str,
    prefixes: &PrefixMap,
) -> Result<Option<Vec<PropertyPath>>, MappingError> {
    let rest = match text.get(..name.len()) {
        Some(head) if head.eq_ignore_ascii_case(name) => text[name.len()..].trim_start(),
        _ => return Ok(None),
    };
    let Some(args) = rest.strip_prefix('(') else {
        return Ok(None);
    };
    let inner = args.strip_suffix(')').ok_or_else(|| MappingError::InvalidPath {
        path: text.to_string(),
        message: format!("expected {}(path | ...)", name),
    })?;
    let paths = split_outside_brackets(inner, '|')
        .into_iter()
        .map(|p| PropertyPath::parse(p, prefixes))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(paths))
}

/// Split on `sep` wherever it is not inside `<...>`
fn split_outside_brackets(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_languages(text: &str) -> Option<Vec<String>> {
    let langs: Vec<String> = text.split(',').map(|l| l.trim().to_lowercase()).collect();
    let valid = langs.iter().all(|l| {
        l == "*" || (!l.is_empty() && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
    });
    valid.then_some(langs)
}
