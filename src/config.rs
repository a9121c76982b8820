//! Table configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Public dataset the table reads by default.
pub const DEFAULT_DATASET_URL: &str =
    "https://microsoftedge.github.io/Demos/json-dummy-data/5MB.json";

/// Rows requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Remaining scroll distance below which the next page is requested.
pub const DEFAULT_FETCH_THRESHOLD: f64 = 500.0;

/// Simulated network latency per page request, in milliseconds.
pub const DEFAULT_LATENCY_MS: u64 = 200;

/// Estimated height of one rendered row.
pub const DEFAULT_ROW_HEIGHT: f64 = 33.0;

/// Rows rendered beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Settings shared by the data source, the fetch controller and the
/// viewport.
///
/// Deserializes from any serde format; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Full URL of the JSON array holding the dataset
    pub dataset_url: String,
    /// Rows per page
    pub page_size: usize,
    /// Near-bottom distance that triggers the next page
    pub fetch_threshold: f64,
    /// Artificial delay added to every page request, in milliseconds
    pub latency_ms: u64,
    /// Estimated row height for windowing
    pub row_height: f64,
    /// Extra rows rendered above and below the viewport
    pub overscan: usize,
    /// HTTP request timeout in seconds; `None` waits indefinitely
    pub http_timeout_secs: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            fetch_threshold: DEFAULT_FETCH_THRESHOLD,
            latency_ms: DEFAULT_LATENCY_MS,
            row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            http_timeout_secs: None,
        }
    }
}

impl TableConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON and a config error for
    /// out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::parse(format!("table config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the dataset URL
    #[must_use]
    pub fn with_dataset_url(mut self, url: impl Into<String>) -> Self {
        self.dataset_url = url.into();
        self
    }

    /// Set rows per page
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the near-bottom threshold
    #[must_use]
    pub fn with_fetch_threshold(mut self, threshold: f64) -> Self {
        self.fetch_threshold = threshold;
        self
    }

    /// Set the simulated latency
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the estimated row height
    #[must_use]
    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    /// Set the overscan row count
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Set the HTTP timeout
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Simulated latency as a duration.
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// HTTP timeout as a duration.
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_config("page_size must be positive"));
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(Error::invalid_config("row_height must be a positive number"));
        }
        if !(self.fetch_threshold.is_finite() && self.fetch_threshold >= 0.0) {
            return Err(Error::invalid_config(
                "fetch_threshold must be a non-negative number",
            ));
        }
        if self.dataset_url.is_empty() {
            return Err(Error::invalid_config("dataset_url must not be empty"));
        }
        Ok(())
    }
}
