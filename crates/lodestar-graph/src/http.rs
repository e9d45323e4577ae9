//! HTTP fetcher for linked-data documents
//!
//! # Examples
//!
//! ```no_run
//! use lodestar_graph::{FetcherConfig, GraphFetcher, HttpFetcher, SourceUri};
//!
//! let fetcher = HttpFetcher::new(FetcherConfig::default()).unwrap();
//! let uri = SourceUri::recognize("https://d-nb.info/gnd/118566512").unwrap();
//! let graph = fetcher.fetch(&uri).unwrap();
//! println!("{} triples", graph.len());
//! ```

use crate::parse::{parse_graph, RdfFormat};
use crate::source::SourceUri;
use crate::{FetchError, GraphFetcher};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default timeout for one document request (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = concat!("lodestar/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`HttpFetcher`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Maximum time for one request (seconds)
    pub timeout_secs: u64,

    /// `User-Agent` sent with every request
    pub user_agent: String,
}

impl FetcherConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches documents over HTTP with content negotiation
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher from its configuration
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        config.validate().map_err(FetchError::Client)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl GraphFetcher for HttpFetcher {
    fn fetch(&self, uri: &SourceUri) -> Result<crate::Graph, FetchError> {
        let url = uri.document.as_str();
        debug!("GET {} ({})", url, uri.format().media_type());

        let response = self
            .client
            .get(url)
            .header(ACCEPT, uri.format().media_type())
            .send()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Servers may answer with a different serialization than requested
        let format = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(RdfFormat::from_media_type)
            .unwrap_or_else(|| uri.format());

        let body = response.bytes().map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let graph = parse_graph(&body, format).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })?;
        debug!("Parsed {} triples from {}", graph.len(), url);
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FetcherConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let config = FetcherConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(matches!(HttpFetcher::new(config), Err(FetchError::Client(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FetcherConfig = toml::from_str("timeout_secs = 5").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
