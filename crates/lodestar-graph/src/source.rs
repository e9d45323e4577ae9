//! Linked-data sources and URI canonicalisation

use crate::parse::RdfFormat;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    // https://d-nb.info/gnd/118566512, .../about/lds.ttl
    static ref GND_PATTERN: Regex =
        Regex::new(r"^https?://d-nb\.info/gnd/([0-9]+[0-9X-]*)(?:/.*)?$").unwrap();

    // http://www.wikidata.org/entity/Q44517, https://www.wikidata.org/wiki/Q44517,
    // https://www.wikidata.org/wiki/Special:EntityData/Q44517.ttl
    static ref WIKIDATA_PATTERN: Regex = Regex::new(
        r"^https?://(?:www\.|m\.)?wikidata\.org/(?:wiki/(?:Special:EntityData/)?|entity/)(Q[0-9]+)(?:\.[a-z]+)?/?$"
    ).unwrap();

    // https://sws.geonames.org/2761369/, https://www.geonames.org/2761369/vienna.html
    static ref GEONAMES_PATTERN: Regex =
        Regex::new(r"^https?://(?:sws\.|www\.)?geonames\.org/([0-9]+)(?:/.*)?$").unwrap();
}

/// A remote authority source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Gemeinsame Normdatei of the German National Library
    Gnd,

    /// Wikidata knowledge graph
    Wikidata,

    /// GeoNames gazetteer
    GeoNames,
}

impl Source {
    /// All sources, in recognition order
    pub const ALL: [Source; 3] = [Source::Gnd, Source::Wikidata, Source::GeoNames];

    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Gnd => "gnd",
            Source::Wikidata => "wikidata",
            Source::GeoNames => "geonames",
        }
    }

    /// Parse a source name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gnd" => Some(Source::Gnd),
            "wikidata" => Some(Source::Wikidata),
            "geonames" => Some(Source::GeoNames),
            _ => None,
        }
    }

    /// Serialization the source's documents are fetched in
    pub fn format(&self) -> RdfFormat {
        match self {
            Source::Gnd | Source::Wikidata => RdfFormat::Turtle,
            Source::GeoNames => RdfFormat::RdfXml,
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Source::Gnd => &*GND_PATTERN,
            Source::Wikidata => &*WIKIDATA_PATTERN,
            Source::GeoNames => &*GEONAMES_PATTERN,
        }
    }

    fn canonical(&self, id: &str) -> String {
        match self {
            Source::Gnd => format!("https://d-nb.info/gnd/{}", id),
            Source::Wikidata => format!("http://www.wikidata.org/entity/{}", id),
            Source::GeoNames => format!("https://sws.geonames.org/{}/", id),
        }
    }

    fn document(&self, id: &str) -> String {
        match self {
            Source::Gnd => format!("https://d-nb.info/gnd/{}/about/lds.ttl", id),
            Source::Wikidata => format!("https://www.wikidata.org/wiki/Special:EntityData/{}.ttl", id),
            Source::GeoNames => format!("https://sws.geonames.org/{}/about.rdf", id),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid source: {}", s))
    }
}

/// A URI recognised as belonging to a source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceUri {
    /// Source the URI belongs to
    pub source: Source,

    /// Local identifier within the source (e.g. `Q44517`)
    pub local_id: String,

    /// Canonical URI, as stored in the identifier registry
    pub canonical: String,

    /// URL of the document describing the resource
    pub document: String,
}

impl SourceUri {
    /// Recognise a URI; `None` if no source claims it
    ///
    /// # Examples
    ///
    /// ```
    /// use lodestar_graph::{Source, SourceUri};
    ///
    /// let uri = SourceUri::recognize("https://www.wikidata.org/wiki/Q44517").unwrap();
    /// assert_eq!(uri.source, Source::Wikidata);
    /// assert_eq!(uri.canonical, "http://www.wikidata.org/entity/Q44517");
    /// ```
    pub fn recognize(uri: &str) -> Option<Self> {
        let uri = uri.trim();
        Source::ALL.iter().find_map(|source| {
            let captures = source.pattern().captures(uri)?;
            let id = captures.get(1)?.as_str();
            Some(Self {
                source: *source,
                local_id: id.to_string(),
                canonical: source.canonical(id),
                document: source.document(id),
            })
        })
    }

    /// Serialization of the document
    pub fn format(&self) -> RdfFormat {
        self.source.format()
    }
}

/// Canonical form of a URI, or the trimmed URI itself if no source claims it
pub fn canonicalize(uri: &str) -> String {
    match SourceUri::recognize(uri) {
        Some(recognized) => recognized.canonical,
        None => uri.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gnd_forms() {
        for uri in [
            "https://d-nb.info/gnd/118566512",
            "http://d-nb.info/gnd/118566512",
            "https://d-nb.info/gnd/118566512/about/lds.ttl",
        ] {
            let recognized = SourceUri::recognize(uri).unwrap();
            assert_eq!(recognized.source, Source::Gnd);
            assert_eq!(recognized.canonical, "https://d-nb.info/gnd/118566512");
            assert_eq!(recognized.document, "https://d-nb.info/gnd/118566512/about/lds.ttl");
            assert_eq!(recognized.format(), RdfFormat::Turtle);
        }
    }

    #[test]
    fn test_gnd_hyphenated_id() {
        let recognized = SourceUri::recognize("https://d-nb.info/gnd/4066009-6").unwrap();
        assert_eq!(recognized.local_id, "4066009-6");
    }

    #[test]
    fn test_wikidata_forms() {
        for uri in [
            "http://www.wikidata.org/entity/Q44517",
            "https://www.wikidata.org/wiki/Q44517",
            "https://m.wikidata.org/wiki/Q44517",
            "https://www.wikidata.org/wiki/Special:EntityData/Q44517.ttl",
        ] {
            let recognized = SourceUri::recognize(uri).unwrap();
            assert_eq!(recognized.source, Source::Wikidata);
            assert_eq!(recognized.canonical, "http://www.wikidata.org/entity/Q44517");
        }
    }

    #[test]
    fn test_geonames_forms() {
        for uri in [
            "https://sws.geonames.org/2761369/",
            "http://sws.geonames.org/2761369",
            "https://sws.geonames.org/2761369/about.rdf",
            "https://www.geonames.org/2761369/vienna.html",
        ] {
            let recognized = SourceUri::recognize(uri).unwrap();
            assert_eq!(recognized.source, Source::GeoNames);
            assert_eq!(recognized.canonical, "https://sws.geonames.org/2761369/");
            assert_eq!(recognized.format(), RdfFormat::RdfXml);
        }
    }

    #[test]
    fn test_unknown_uri() {
        assert!(SourceUri::recognize("http://viaf.org/viaf/39388329").is_none());
        assert!(SourceUri::recognize("https://www.wikidata.org/wiki/Property:P31").is_none());
        assert_eq!(
            canonicalize(" http://viaf.org/viaf/39388329 "),
            "http://viaf.org/viaf/39388329"
        );
    }

    #[test]
    fn test_source_parse() {
        for source in Source::ALL {
            assert_eq!(Source::parse(source.as_str()), Some(source));
        }
        assert!("dbpedia".parse::<Source>().is_err());
    }
}
