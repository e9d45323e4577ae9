//! Lodestar Graph Layer
//!
//! Fetches linked-data descriptions of authority records and parses them into
//! an in-memory triple [`Graph`].
//!
//! # Architecture
//!
//! ```text
//! URI → SourceUri::recognize → GraphFetcher::fetch → parse_graph → Graph
//! ```
//!
//! # Fetchers
//!
//! - `HttpFetcher`: content-negotiated HTTP GET against the source's document URL
//! - `MockFetcher`: serves recorded documents for offline tests
//!
//! # Examples
//!
//! ```
//! use lodestar_graph::{GraphFetcher, MockFetcher, RdfFormat, SourceUri};
//!
//! let mut fetcher = MockFetcher::new();
//! fetcher
//!     .add_document(
//!         "https://d-nb.info/gnd/4066009-6",
//!         RdfFormat::NTriples,
//!         r#"<https://d-nb.info/gnd/4066009-6> <http://www.w3.org/2000/01/rdf-schema#label> "Wien" ."#,
//!     )
//!     .unwrap();
//!
//! let uri = SourceUri::recognize("https://d-nb.info/gnd/4066009-6").unwrap();
//! let graph = fetcher.fetch(&uri).unwrap();
//! assert_eq!(graph.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod graph;
pub mod http;
pub mod mock;
pub mod parse;
pub mod source;

pub use graph::{Graph, Literal, Term, Triple};
pub use http::{FetcherConfig, HttpFetcher};
pub use mock::MockFetcher;
pub use parse::{parse_graph, ParseError, RdfFormat};
pub use source::{canonicalize, Source, SourceUri};

use thiserror::Error;

/// Errors that can occur while fetching a description
///
/// Every variant except `UnsupportedUri` is transient from the caller's
/// point of view and may succeed when retried.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URI belongs to no supported source
    #[error("Unsupported URI: {0}")]
    UnsupportedUri(String),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Network or connection failure
    #[error("Request to {url} failed: {message}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying error
        message: String,
    },

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// The payload could not be parsed
    #[error("Invalid document at {url}: {source}")]
    Parse {
        /// Requested URL
        url: String,
        /// Parser error
        #[source]
        source: ParseError,
    },
}

impl FetchError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::UnsupportedUri(_) | FetchError::Client(_))
    }
}

/// Retrieves the description of a recognised URI
///
/// One call makes at most one outbound request and never retries.
pub trait GraphFetcher {
    /// Fetch and parse the document describing `uri`
    fn fetch(&self, uri: &SourceUri) -> Result<Graph, FetchError>;
}

impl<F: GraphFetcher + ?Sized> GraphFetcher for &F {
    fn fetch(&self, uri: &SourceUri) -> Result<Graph, FetchError> {
        (**self).fetch(uri)
    }
}
