//! Offline fetcher serving recorded documents

use crate::graph::Graph;
use crate::parse::{parse_graph, ParseError, RdfFormat};
use crate::source::{canonicalize, SourceUri};
use crate::{FetchError, GraphFetcher};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum MockResponse {
    Graph(Graph),
    Status(u16),
    Failure(String),
}

/// Mock fetcher for deterministic testing
///
/// Responses are keyed by canonical URI. Unknown URIs answer with HTTP 404.
/// Clones share their responses and call log.
///
/// # Examples
///
/// ```
/// use lodestar_graph::{GraphFetcher, MockFetcher, SourceUri};
///
/// let mut fetcher = MockFetcher::new();
/// fetcher.add_failure("https://d-nb.info/gnd/118566512", "connection reset");
///
/// let uri = SourceUri::recognize("https://d-nb.info/gnd/118566512").unwrap();
/// assert!(fetcher.fetch(&uri).is_err());
/// assert_eq!(fetcher.call_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockFetcher {
    /// Create a fetcher with no responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a prepared graph for a URI
    pub fn add_graph(&mut self, uri: &str, graph: Graph) {
        lock(&self.responses).insert(canonicalize(uri), MockResponse::Graph(graph));
    }

    /// Serve a recorded document for a URI
    pub fn add_document(&mut self, uri: &str, format: RdfFormat, document: &str) -> Result<(), ParseError> {
        let graph = parse_graph(document.as_bytes(), format)?;
        self.add_graph(uri, graph);
        Ok(())
    }

    /// Answer requests for a URI with an HTTP status
    pub fn add_status(&mut self, uri: &str, status: u16) {
        lock(&self.responses).insert(canonicalize(uri), MockResponse::Status(status));
    }

    /// Answer requests for a URI with a network failure
    pub fn add_failure(&mut self, uri: &str, message: impl Into<String>) {
        lock(&self.responses).insert(canonicalize(uri), MockResponse::Failure(message.into()));
    }

    /// Canonical URIs requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Get the number of times fetch was called
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of requests for one URI
    pub fn fetch_count(&self, uri: &str) -> usize {
        let canonical = canonicalize(uri);
        lock(&self.calls).iter().filter(|c| **c == canonical).count()
    }

    /// Reset the call log
    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }
}

impl GraphFetcher for MockFetcher {
    fn fetch(&self, uri: &SourceUri) -> Result<Graph, FetchError> {
        lock(&self.calls).push(uri.canonical.clone());

        let response = lock(&self.responses).get(&uri.canonical).cloned();
        match response {
            Some(MockResponse::Graph(graph)) => Ok(graph),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: uri.document.clone(),
                status,
            }),
            Some(MockResponse::Failure(message)) => Err(FetchError::Request {
                url: uri.document.clone(),
                message,
            }),
            None => Err(FetchError::Status {
                url: uri.document.clone(),
                status: 404,
            }),
        }
    }
}
