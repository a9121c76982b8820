//! scrollgrid - data core for an infinite-scroll, editable table
//!
//! Serves a large remote dataset to a virtualized table one page at a time,
//! and layers client-side additions and inline edits on top of it without
//! touching the source data.
//!
//! # Components
//!
//! 1. [`source::RemoteDataSource`] - fetches the dataset once, caches it,
//!    sorts it by one column and serves slices
//! 2. [`validate`] - the person schema used by the add dialog and inline
//!    editors
//! 3. [`controller::PageFetchController`] - sequential page loading driven
//!    by scroll position
//! 4. [`overlay::EditOverlay`] - local additions, per-row edits and the
//!    merged view
//! 5. [`table::DataTable`] - the event-in, snapshot-out surface a UI drives
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use scrollgrid::{DataTable, RemoteDataSource, TableConfig};
//!
//! # async fn run() -> scrollgrid::Result<()> {
//! let config = TableConfig::default();
//! let source = Arc::new(RemoteDataSource::from_config(&config)?);
//! let mut table = DataTable::new(source, &config, 600.0)?;
//!
//! table.load_initial().await;
//! table.on_scroll(1200.0).await;
//!
//! let snapshot = table.snapshot()?;
//! println!("{} rows, {}", snapshot.rows.len(), table.status_line());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::too_many_lines
    )
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod overlay;
pub mod person;
pub mod source;
pub mod table;
pub mod validate;
pub mod viewport;

pub use config::TableConfig;
pub use controller::{FetchOutcome, FetchTicket, PageFetchController};
pub use error::{Error, Result};
pub use overlay::{EditOverlay, EditingCell};
pub use person::{FieldValue, Language, Person, PersonDraft, PersonField, PersonPatch};
pub use source::{Page, RemoteDataSource, SortDirection, SortSpec};
pub use table::{DataTable, PendingFetch, TableSnapshot};
pub use validate::{validate, validate_partial, FieldError, ValidationErrors};
pub use viewport::{ScrollState, ViewportMetrics, VirtualWindow};
