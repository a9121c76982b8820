//! Remote data source: the whole dataset, cached once per session, served
//! as sorted pages.
//!
//! The first request pulls the full JSON array from a [`StorageBackend`] and
//! keeps it for the life of the [`RemoteDataSource`]. There is no refresh or
//! invalidation. Every request may re-sort the cached rows in place before
//! slicing, and every request is delayed by a fixed latency to model the
//! network.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
        Arc,
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    backend::StorageBackend,
    config::TableConfig,
    error::{Error, Result},
    person::{Person, PersonField},
};

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

/// A single-column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column to sort by
    pub field: PersonField,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on `field`.
    pub fn ascending(field: PersonField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on `field`.
    pub fn descending(field: PersonField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Returns true for a descending sort.
    pub fn is_descending(&self) -> bool {
        self.direction == SortDirection::Descending
    }

    /// Sorts `rows` in place. Equal keys keep their relative order.
    pub fn apply(&self, rows: &mut [Person]) {
        let field = self.field;
        let descending = self.is_descending();
        rows.sort_by(|a, b| {
            let ord = a.field(field).compare(&b.field(field));
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
}

/// One page of rows plus the size of the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Rows `[start, start + size)` of the sorted dataset
    pub rows: Vec<Person>,
    /// Number of rows in the whole dataset
    pub total_row_count: usize,
}

impl Page {
    /// Number of rows in this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Session-wide owner of the cached dataset.
///
/// Construct one per session and share it by `Arc`. Requests are
/// serialized on an async mutex, so an in-place sort never races a slice.
///
/// # Example
///
/// ```
/// use std::{sync::Arc, time::Duration};
/// use scrollgrid::{backend::MemoryBackend, source::RemoteDataSource};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let backend = MemoryBackend::with_document(
///     "people.json",
///     r#"[{"id":"1","name":"Ann","language":"English","version":1}]"#,
/// );
/// let source = RemoteDataSource::new(Arc::new(backend), "people.json")
///     .with_latency(Duration::ZERO);
/// let page = source.fetch_page(0, 50, None).await.unwrap();
/// assert_eq!(page.total_row_count, 1);
/// # });
/// ```
pub struct RemoteDataSource {
    backend: Arc<dyn StorageBackend>,
    key: String,
    latency: Duration,
    cache: Mutex<Option<Vec<Person>>>,
    retrievals: AtomicUsize,
}

impl std::fmt::Debug for RemoteDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDataSource")
            .field("key", &self.key)
            .field("latency", &self.latency)
            .field("retrievals", &self.retrievals())
            .finish_non_exhaustive()
    }
}

impl RemoteDataSource {
    /// Creates a source reading the document `key` from `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            latency: Duration::from_millis(crate::config::DEFAULT_LATENCY_MS),
            cache: Mutex::new(None),
            retrievals: AtomicUsize::new(0),
        }
    }

    /// Creates an HTTP-backed source for `config.dataset_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or URL is invalid.
    #[cfg(feature = "http")]
    pub fn from_config(config: &TableConfig) -> Result<Self> {
        config.validate()?;
        let (backend, key) =
            crate::backend::HttpBackend::for_document(&config.dataset_url, config.http_timeout())?;
        Ok(Self::new(Arc::new(backend), key).with_latency(config.latency()))
    }

    /// Creates a source over `backend`, taking latency from `config`.
    pub fn with_backend(
        backend: Arc<dyn StorageBackend>,
        key: impl Into<String>,
        config: &TableConfig,
    ) -> Self {
        Self::new(backend, key).with_latency(config.latency())
    }

    /// Sets the simulated per-request latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Simulated per-request latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// How many times the backend has been asked for the dataset.
    pub fn retrievals(&self) -> usize {
        self.retrievals.load(AtomicOrdering::Relaxed)
    }

    /// Returns true once the dataset has been loaded.
    pub async fn is_cached(&self) -> bool {
        self.cache.lock().await.is_some()
    }

    /// Size of the cached dataset, if loaded.
    pub async fn cached_len(&self) -> Option<usize> {
        self.cache.lock().await.as_ref().map(Vec::len)
    }

    /// Returns rows `[start, start + size)` after applying `sort` to the
    /// whole dataset.
    ///
    /// A `start` past the end yields an empty page, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the dataset cannot be retrieved or
    /// decoded (the next call retries), and [`Error::InvalidConfig`] for a
    /// zero `size`.
    pub async fn fetch_page(
        &self,
        start: usize,
        size: usize,
        sort: Option<SortSpec>,
    ) -> Result<Page> {
        if size == 0 {
            return Err(Error::invalid_config("page size must be positive"));
        }

        let page = {
            let mut cache = self.cache.lock().await;
            if cache.is_none() {
                let rows = self.retrieve().await?;
                tracing::debug!(rows = rows.len(), key = %self.key, "dataset cached");
                *cache = Some(rows);
            }
            let rows = cache.get_or_insert_with(Vec::new);

            if let Some(sort) = sort {
                sort.apply(rows);
            }

            let total_row_count = rows.len();
            let begin = start.min(total_row_count);
            let end = start.saturating_add(size).min(total_row_count);
            Page {
                rows: rows[begin..end].to_vec(),
                total_row_count,
            }
        };

        tokio::time::sleep(self.latency).await;

        tracing::debug!(
            start,
            size,
            returned = page.len(),
            total = page.total_row_count,
            ?sort,
            "page served"
        );
        Ok(page)
    }

    async fn retrieve(&self) -> Result<Vec<Person>> {
        self.retrievals.fetch_add(1, AtomicOrdering::Relaxed);
        let backend = Arc::clone(&self.backend);
        let key = self.key.clone();

        let bytes = tokio::task::spawn_blocking(move || backend.get(&key))
            .await
            .map_err(|e| Error::fetch(format!("dataset retrieval task failed: {e}")))?
            .map_err(|e| {
                tracing::warn!(error = %e, "dataset retrieval failed");
                Error::fetch(e.to_string())
            })?;

        parse_dataset(&bytes).map_err(|e| Error::fetch(e.to_string()))
    }
}

/// Decodes a JSON array of person records.
///
/// # Errors
///
/// Returns a parse error if the document is not an array of records.
pub fn parse_dataset(bytes: &[u8]) -> Result<Vec<Person>> {
    serde_json::from_slice(bytes).map_err(|e| Error::parse(format!("dataset: {e}")))
}
