//! Storage backends for the remote dataset.
//!
//! A backend hands back the raw bytes of the dataset document. The
//! [`StorageBackend`] trait is synchronous; async callers run it on the
//! blocking pool (see [`crate::source::RemoteDataSource`]).

#[cfg(feature = "http")]
pub mod http;
pub mod memory;

use bytes::Bytes;
#[cfg(feature = "http")]
pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::error::Result;

/// Read access to stored documents.
pub trait StorageBackend: Send + Sync {
    /// Reads the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or cannot be read.
    fn get(&self, key: &str) -> Result<Bytes>;
}
