//! Error types for scrollgrid.

use crate::validate::ValidationErrors;

/// Result type alias for scrollgrid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, paging, or merging table data.
///
/// None of these are fatal: a fetch can be retried, a rejected edit can be
/// re-entered, and configuration can be corrected.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The remote dataset could not be retrieved or decoded.
    #[error("Failed to fetch data: {message}")]
    Fetch {
        /// Description of the retrieval failure.
        message: String,
    },

    /// Input was rejected by the person schema.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Two rows in the merged view share the same id.
    #[error("Duplicate row id '{id}' in merged view")]
    DuplicateRowId {
        /// The id that appeared more than once.
        id: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Backend storage error.
    #[error("Storage backend error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },
}

impl Error {
    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a duplicate row id error.
    pub fn duplicate_row_id(id: impl Into<String>) -> Self {
        Self::DuplicateRowId { id: id.into() }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Returns true for errors a user can recover from by retrying the fetch.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}
