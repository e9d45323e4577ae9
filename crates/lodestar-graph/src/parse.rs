//! RDF serializations and parsing into a [`Graph`]
//!
//! Parsing goes through `sophia`; its terms are converted via their
//! N-Triples display form so the rest of the workspace never sees sophia types.

use crate::graph::{Graph, Literal, Term};
use serde::{Deserialize, Serialize};
use sophia::api::prelude::*;
use std::fmt;
use thiserror::Error;

/// Supported RDF serializations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RdfFormat {
    /// Turtle
    Turtle,

    /// N-Triples
    NTriples,

    /// RDF/XML
    RdfXml,
}

impl RdfFormat {
    /// Media type used for content negotiation
    pub fn media_type(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::RdfXml => "application/rdf+xml",
        }
    }

    /// Recognise a `Content-Type` header value
    pub fn from_media_type(content_type: &str) -> Option<Self> {
        let media = content_type.split(';').next().unwrap_or("").trim().to_lowercase();
        match media.as_str() {
            "text/turtle" | "application/x-turtle" => Some(RdfFormat::Turtle),
            "application/n-triples" => Some(RdfFormat::NTriples),
            "application/rdf+xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    /// Guess the serialization from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdfFormat::Turtle => "Turtle",
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::RdfXml => "RDF/XML",
        };
        f.write_str(name)
    }
}

/// A document could not be parsed
#[derive(Debug, Error)]
#[error("Failed to parse {format}: {message}")]
pub struct ParseError {
    /// Serialization that was attempted
    pub format: RdfFormat,

    /// Parser message
    pub message: String,
}

#[derive(Debug, Error)]
#[error("{0}")]
struct SinkError(String);

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Parse a document into a graph
///
/// # Examples
///
/// ```
/// use lodestar_graph::{parse_graph, RdfFormat, Term};
///
/// let doc = br#"<https://d-nb.info/gnd/4066009-6> <http://www.w3.org/2000/01/rdf-schema#label> "Wien"@de ."#;
/// let graph = parse_graph(doc, RdfFormat::NTriples).unwrap();
/// assert_eq!(graph.len(), 1);
/// ```
pub fn parse_graph(bytes: &[u8], format: RdfFormat) -> Result<Graph, ParseError> {
    let reader = std::io::BufReader::new(std::io::Cursor::new(bytes));
    let mut graph = Graph::new();

    let mut sink = |s: String, p: String, o: String| -> Result<(), SinkError> {
        let subject = parse_term(&s)?;
        let predicate = match parse_term(&p)? {
            Term::Iri(iri) => iri,
            _ => return Ok(()),
        };
        let object = parse_term(&o)?;
        if subject.is_node() {
            graph.insert(subject, predicate, object);
        }
        Ok(())
    };

    let result = match format {
        RdfFormat::Turtle => sophia::turtle::parser::turtle::parse_bufread(reader)
            .try_for_each_triple(|t| sink(t.s().to_string(), t.p().to_string(), t.o().to_string()))
            .map_err(|e| e.to_string()),
        RdfFormat::NTriples => sophia::turtle::parser::nt::parse_bufread(reader)
            .try_for_each_triple(|t| sink(t.s().to_string(), t.p().to_string(), t.o().to_string()))
            .map_err(|e| e.to_string()),
        RdfFormat::RdfXml => sophia::xml::parser::parse_bufread(reader)
            .try_for_each_triple(|t| sink(t.s().to_string(), t.p().to_string(), t.o().to_string()))
            .map_err(|e| e.to_string()),
    };

    result.map_err(|message| ParseError { format, message })?;
    Ok(graph)
}

/// Convert an N-Triples display form (`<iri>`, `_:b0`, `"lex"@de`, `"lex"^^<dt>`)
fn parse_term(text: &str) -> Result<Term, SinkError> {
    let s = text.trim();

    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Term::Iri(iri.to_string()));
    }

    if let Some(id) = s.strip_prefix("_:") {
        return Ok(Term::BlankNode(id.to_string()));
    }

    if s.starts_with('"') {
        let end = closing_quote(s).ok_or_else(|| SinkError(format!("Unterminated literal: {}", s)))?;
        let lexical = unescape(&s[1..end]);
        let rest = s[end + 1..].trim();

        if let Some(lang) = rest.strip_prefix('@') {
            return Ok(Term::Literal(Literal::tagged(lexical, lang)));
        }
        if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            let dt = dt
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .unwrap_or(dt);
            if dt == XSD_STRING {
                return Ok(Term::Literal(Literal::plain(lexical)));
            }
            return Ok(Term::Literal(Literal::typed(lexical, dt)));
        }
        return Ok(Term::Literal(Literal::plain(lexical)));
    }

    Err(SinkError(format!("Unsupported term: {}", s)))
}

fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(u @ ('u' | 'U')) => {
                let len = if u == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(len).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(u);
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
