//! Presentation-facing table state.
//!
//! [`DataTable`] ties the remote source, the fetch controller, the edit
//! overlay and the scroll position together. A UI feeds it events (scroll,
//! sort, add, edit) and renders the [`TableSnapshot`] it hands back.
//!
//! Fetches come in two shapes. The async handlers ([`DataTable::on_scroll`]
//! and friends) hold the table until the page lands. A UI that keeps
//! rendering meanwhile uses the split form instead: an event method returns
//! a [`PendingFetch`], the caller awaits [`PendingFetch::fetch`] without
//! borrowing the table, then hands the result to
//! [`DataTable::complete_fetch`]. Snapshots taken in between report
//! `is_loading` or `is_fetching_more`.
//!
//! # Example
//!
//! ```
//! use std::{sync::Arc, time::Duration};
//! use scrollgrid::{backend::MemoryBackend, DataTable, RemoteDataSource, TableConfig};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let backend = MemoryBackend::with_document(
//!     "people.json",
//!     r#"[{"id":"1","name":"Ann","language":"English","version":1}]"#,
//! );
//! let config = TableConfig::new().with_latency(Duration::ZERO);
//! let source = Arc::new(RemoteDataSource::with_backend(Arc::new(backend), "people.json", &config));
//! let mut table = DataTable::new(source, &config, 600.0).unwrap();
//! table.load_initial().await;
//! assert_eq!(table.status_line(), "(1 of 1 rows fetched)");
//! # });
//! ```

use std::{ops::Range, sync::Arc};

use serde_json::Value;

use crate::{
    config::TableConfig,
    controller::{FetchClaim, FetchOutcome, FetchTicket, PageFetchController},
    error::Result,
    overlay::{EditOverlay, EditingCell},
    person::{FieldValue, Person, PersonField},
    source::{Page, RemoteDataSource, SortDirection, SortSpec},
    validate::{validate, ValidationErrors},
    viewport::{ScrollState, VirtualWindow},
};

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    /// Merged rows: local additions, then fetched rows, with edits applied
    pub rows: Vec<Person>,
    /// Dataset size reported by the source
    pub total_row_count: usize,
    /// Rows fetched from the source so far
    pub total_fetched: usize,
    /// First page of the current sort is pending
    pub is_loading: bool,
    /// A follow-up page is pending
    pub is_fetching_more: bool,
    /// Last fetch failure, shown as a loading-error indicator
    pub error: Option<String>,
    /// Cell with an open editor
    pub editing: Option<EditingCell>,
    /// Errors to show next to the open editor
    pub edit_errors: Option<ValidationErrors>,
    /// Rows to render, overscan included
    pub visible: Range<usize>,
    /// Current sort
    pub sort: Option<SortSpec>,
}

/// A page request claimed from a [`DataTable`] and not yet completed.
///
/// Await [`Self::fetch`], then pass the result to
/// [`DataTable::complete_fetch`]. To abandon the request call
/// [`DataTable::cancel_fetch`], or the table will not request another page.
#[derive(Debug)]
#[must_use = "a pending fetch holds the table's only fetch slot"]
pub struct PendingFetch {
    ticket: FetchTicket,
    source: Arc<RemoteDataSource>,
}

impl PendingFetch {
    /// The claimed ticket.
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    /// Requests the claimed page from the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be retrieved or parsed.
    pub async fn fetch(&self) -> Result<Page> {
        self.source
            .fetch_page(self.ticket.start(), self.ticket.size(), self.ticket.sort())
            .await
    }
}

/// Table state driven by UI events.
#[derive(Debug)]
pub struct DataTable {
    source: Arc<RemoteDataSource>,
    controller: PageFetchController,
    overlay: EditOverlay,
    scroll: ScrollState,
    window: VirtualWindow,
}

impl DataTable {
    /// Creates a table over a shared source with a viewport of the given
    /// height. Nothing is fetched until [`Self::load_initial`].
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(
        source: Arc<RemoteDataSource>,
        config: &TableConfig,
        viewport_height: f64,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            controller: PageFetchController::from_config(config),
            overlay: EditOverlay::new(),
            scroll: ScrollState::new(0.0, viewport_height),
            window: VirtualWindow::from_config(config),
        })
    }

    /// The shared data source.
    pub fn source(&self) -> &Arc<RemoteDataSource> {
        &self.source
    }

    /// The fetch controller.
    pub fn controller(&self) -> &PageFetchController {
        &self.controller
    }

    /// The edit overlay.
    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    /// The scroll state.
    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    /// Claims the next page regardless of scroll position.
    ///
    /// Used for the first page of a sort, which loads on mount.
    pub fn begin_fetch(&mut self) -> Option<PendingFetch> {
        let ticket = self.controller.begin_fetch()?;
        Some(PendingFetch {
            ticket,
            source: Arc::clone(&self.source),
        })
    }

    /// Moves the viewport and claims the next page if it is near the
    /// bottom.
    pub fn scroll_to(&mut self, scroll_top: f64) -> Option<PendingFetch> {
        self.scroll.set_offset(scroll_top);
        if self.controller.should_fetch_more(&self.scroll.metrics()) {
            self.begin_fetch()
        } else {
            None
        }
    }

    /// Applies a new sort, scrolls to the top and claims the first page
    /// under the new order. A fetch still pending for the old sort is
    /// discarded when it completes.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> Option<PendingFetch> {
        self.controller.set_sort(sort);
        self.scroll.scroll_to_top();
        self.sync_content_height();
        self.begin_fetch()
    }

    /// Records the result of a [`PendingFetch`].
    pub fn complete_fetch(&mut self, pending: PendingFetch, result: Result<Page>) -> FetchOutcome {
        let outcome = self.controller.complete_fetch(pending.ticket, result);
        self.sync_content_height();
        outcome
    }

    /// Abandons a [`PendingFetch`] and frees the fetch slot.
    pub fn cancel_fetch(&mut self, pending: PendingFetch) {
        self.controller.cancel_fetch(pending.ticket);
    }

    /// Loads the first page of the current sort.
    pub async fn load_initial(&mut self) -> Option<FetchOutcome> {
        let pending = self.begin_fetch()?;
        Some(self.run(pending).await)
    }

    /// Moves the viewport and loads the next page if it is near the bottom.
    ///
    /// After a failed fetch this requests the failed page again.
    pub async fn on_scroll(&mut self, scroll_top: f64) -> Option<FetchOutcome> {
        let pending = self.scroll_to(scroll_top)?;
        Some(self.run(pending).await)
    }

    /// Resizes the viewport.
    pub fn on_resize(&mut self, viewport_height: f64) {
        self.scroll.set_viewport_height(viewport_height);
    }

    /// Applies a new sort: drops loaded pages, scrolls to the top and
    /// loads the first page under the new order.
    pub async fn on_sort_change(&mut self, sort: Option<SortSpec>) -> Option<FetchOutcome> {
        let pending = self.set_sort(sort)?;
        Some(self.run(pending).await)
    }

    /// The sort a header click on `field` switches to: unsorted, then
    /// ascending, then descending, then unsorted again.
    pub fn next_sort_for(&self, field: PersonField) -> Option<SortSpec> {
        match self.controller.sort() {
            Some(current) if current.field == field => match current.direction {
                SortDirection::Ascending => Some(SortSpec::descending(field)),
                SortDirection::Descending => None,
            },
            _ => Some(SortSpec::ascending(field)),
        }
    }

    /// Handles a header click on `field`.
    pub async fn toggle_sort(&mut self, field: PersonField) -> Option<FetchOutcome> {
        let next = self.next_sort_for(field);
        self.on_sort_change(next).await
    }

    /// Clears a fetch error and requests the next page regardless of
    /// scroll position.
    pub async fn retry(&mut self) -> Option<FetchOutcome> {
        self.controller.clear_error();
        self.load_initial().await
    }

    /// Validates the add-dialog values and prepends the new person.
    ///
    /// # Errors
    ///
    /// Returns the validation errors; nothing is added.
    pub fn add_person(&mut self, values: &Value) -> std::result::Result<Person, ValidationErrors> {
        let draft = validate(values)?;
        let person = self.overlay.add_local(draft);
        self.sync_content_height();
        Ok(person)
    }

    /// Opens the editor on a cell and returns the value to seed it with.
    ///
    /// Returns `None` (and opens nothing) for an unknown row or the id
    /// column.
    pub fn begin_edit(&mut self, row_id: &str, field: PersonField) -> Option<FieldValue> {
        if !field.is_editable() {
            return None;
        }
        let value = self
            .overlay
            .find_origin(self.controller.pages(), row_id)
            .map(|row| self.overlay.current_value(row, field))?;
        self.overlay.begin_edit(row_id, field);
        Some(value)
    }

    /// Commits editor values for a row.
    ///
    /// # Errors
    ///
    /// Returns the validation errors; the editor stays open.
    pub fn commit_edit(&mut self, row_id: &str, values: &Value) -> std::result::Result<(), ValidationErrors> {
        self.overlay.commit_edit(row_id, values)
    }

    /// Closes the editor without saving.
    pub fn cancel_edit(&mut self) {
        self.overlay.cancel_edit();
    }

    /// The merged row list.
    ///
    /// # Errors
    ///
    /// Returns an error if two rows share an id.
    pub fn rows(&self) -> Result<Vec<Person>> {
        self.overlay.materialize_view(self.controller.pages())
    }

    /// Number of rows in the merged view.
    pub fn row_count(&self) -> usize {
        self.overlay.local_additions().len() + self.controller.total_fetched()
    }

    /// Builds the renderer's view of the table.
    ///
    /// # Errors
    ///
    /// Returns an error if two rows share an id.
    pub fn snapshot(&self) -> Result<TableSnapshot> {
        let rows = self.rows()?;
        let visible = self.window.visible_range(&self.scroll, rows.len());
        Ok(TableSnapshot {
            total_row_count: self.controller.total_row_count(),
            total_fetched: self.controller.total_fetched(),
            is_loading: self.controller.is_loading(),
            is_fetching_more: self.controller.is_fetching_more(),
            error: self.controller.error().map(str::to_string),
            editing: self.overlay.editing().cloned(),
            edit_errors: self.overlay.errors().cloned(),
            sort: self.controller.sort(),
            visible,
            rows,
        })
    }

    /// Fetch progress line shown above the table.
    pub fn status_line(&self) -> String {
        format!(
            "({} of {} rows fetched)",
            self.controller.total_fetched(),
            self.controller.total_row_count()
        )
    }

    async fn run(&mut self, pending: PendingFetch) -> FetchOutcome {
        let claim = FetchClaim::new(&mut self.controller, pending.ticket);
        let outcome = claim.complete(pending.fetch().await);
        self.sync_content_height();
        outcome
    }

    fn sync_content_height(&mut self) {
        let height = self.window.total_size(self.row_count());
        self.scroll.set_content_height(height);
    }
}
