//! Namespace prefixes for CURIEs in mapping rules

use crate::error::MappingError;
use std::collections::BTreeMap;

/// Prefixes every registry starts with
pub const BUILTIN_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("schema", "http://schema.org/"),
    ("geo", "http://www.opengis.net/ont/geosparql#"),
    ("wgs84_pos", "http://www.w3.org/2003/01/geo/wgs84_pos#"),
    ("gnd", "https://d-nb.info/gnd/"),
    ("gndo", "https://d-nb.info/standards/elementset/gnd#"),
    ("gndsc", "https://d-nb.info/standards/vocab/gnd/gnd-sc#"),
    ("gndgender", "https://d-nb.info/standards/vocab/gnd/gender#"),
    ("wd", "http://www.wikidata.org/entity/"),
    ("wdt", "http://www.wikidata.org/prop/direct/"),
    ("wdtn", "http://www.wikidata.org/prop/direct-normalized/"),
    ("p", "http://www.wikidata.org/prop/"),
    ("ps", "http://www.wikidata.org/prop/statement/"),
    ("pq", "http://www.wikidata.org/prop/qualifier/"),
    ("psv", "http://www.wikidata.org/prop/statement/value/"),
    ("pqv", "http://www.wikidata.org/prop/qualifier/value/"),
    ("wikibase", "http://wikiba.se/ontology#"),
    ("gn", "http://www.geonames.org/ontology#"),
];

/// Maps prefix names to namespace IRIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMap {
    prefixes: BTreeMap<String, String>,
}

impl PrefixMap {
    /// An empty map
    pub fn empty() -> Self {
        Self {
            prefixes: BTreeMap::new(),
        }
    }

    /// The built-in prefixes
    pub fn builtin() -> Self {
        let mut map = Self::empty();
        for (prefix, namespace) in BUILTIN_PREFIXES {
            map.insert(*prefix, *namespace);
        }
        map
    }

    /// Declare (or redeclare) a prefix
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Namespace of a prefix
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Expand a CURIE (`gndo:forename`) or an `<iri>` to a full IRI
    ///
    /// `a` is accepted as shorthand for `rdf:type`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lodestar_mapping::PrefixMap;
    ///
    /// let prefixes = PrefixMap::builtin();
    /// assert_eq!(
    ///     prefixes.expand("wdt:P31").unwrap(),
    ///     "http://www.wikidata.org/prop/direct/P31"
    /// );
    /// assert!(prefixes.expand("nope:x").is_err());
    /// ```
    pub fn expand(&self, text: &str) -> Result<String, MappingError> {
        let text = text.trim();
        if let Some(iri) = text.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            if iri.is_empty() || iri.contains(char::is_whitespace) {
                return Err(MappingError::InvalidPath {
                    path: text.to_string(),
                    message: "invalid IRI".to_string(),
                });
            }
            return Ok(iri.to_string());
        }
        if text == "a" {
            return self.expand("rdf:type");
        }

        let (prefix, local) = text.split_once(':').ok_or_else(|| MappingError::InvalidPath {
            path: text.to_string(),
            message: "expected a CURIE or <iri>".to_string(),
        })?;
        if local.is_empty() || local.contains(char::is_whitespace) {
            return Err(MappingError::InvalidPath {
                path: text.to_string(),
                message: "empty or invalid local name".to_string(),
            });
        }
        let namespace = self
            .namespace(prefix)
            .ok_or_else(|| MappingError::UnknownPrefix(prefix.to_string()))?;
        Ok(format!("{}{}", namespace, local))
    }

    /// Shorten an IRI to a CURIE if a prefix covers it
    pub fn compact(&self, iri: &str) -> String {
        self.prefixes
            .iter()
            .filter(|(_, namespace)| iri.starts_with(namespace.as_str()) && iri.len() > namespace.len())
            .max_by_key(|(_, namespace)| namespace.len())
            .map(|(prefix, namespace)| format!("{}:{}", prefix, &iri[namespace.len()..]))
            .unwrap_or_else(|| format!("<{}>", iri))
    }
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self::builtin()
    }
}
