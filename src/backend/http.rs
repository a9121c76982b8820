//! HTTP/HTTPS storage backend (read-only).
//!
//! Fetches the dataset document from a public web server.

use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::Client;

use super::StorageBackend;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("scrollgrid/", env!("CARGO_PKG_VERSION"));

/// A read-only storage backend using HTTP/HTTPS.
///
/// Keys are appended to the base URL. The blocking client is built per
/// request on the calling thread, so the backend itself can be created and
/// dropped from async code; requests must run off the async executor.
///
/// # Example
///
/// ```no_run
/// use scrollgrid::backend::{HttpBackend, StorageBackend};
///
/// let backend = HttpBackend::new("https://microsoftedge.github.io/Demos/json-dummy-data").unwrap();
/// let data = backend.get("5MB.json").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpBackend {
    /// Creates a new HTTP backend with the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an `http://` or `https://` URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::invalid_config(format!(
                "HTTP backend needs an http(s) URL, got '{base_url}'"
            )));
        }
        Ok(Self {
            base_url,
            timeout: None,
        })
    }

    /// Creates a new HTTP backend with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an `http://` or `https://` URL.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut backend = Self::new(base_url)?;
        backend.timeout = Some(timeout);
        Ok(backend)
    }

    /// Splits a full document URL into a backend and the key to fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no path segment to use as key.
    pub fn for_document(url: &str, timeout: Option<Duration>) -> Result<(Self, String)> {
        let scheme_end = url.find("://").map_or(0, |i| i + 3);
        let (base, key) = url
            .rsplit_once('/')
            .filter(|(base, key)| base.len() >= scheme_end && !key.is_empty())
            .ok_or_else(|| Error::invalid_config(format!("No document path in URL '{url}'")))?;
        let mut backend = Self::new(base)?;
        backend.timeout = timeout;
        Ok((backend, key.to_string()))
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Constructs the full URL for a key.
    fn url_for(&self, key: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, key)
        } else {
            format!("{}/{}", self.base_url, key)
        }
    }

    fn client(&self) -> Result<Client> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| Error::storage(format!("Failed to create HTTP client: {e}")))
    }
}

impl StorageBackend for HttpBackend {
    fn get(&self, key: &str) -> Result<Bytes> {
        let url = self.url_for(key);
        tracing::debug!(%url, "HTTP GET");

        let response = self
            .client()?
            .get(&url)
            .send()
            .map_err(|e| Error::storage(format!("HTTP GET error for '{}': {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::storage(format!(
                "HTTP GET failed for '{}': status {}",
                url,
                response.status()
            )));
        }

        response
            .bytes()
            .map_err(|e| Error::storage(format!("Failed to read HTTP response body: {e}")))
    }
}
