//! Page fetch controller: sequential infinite-scroll pagination.
//!
//! Pages are requested one at a time, in increasing offset order, for the
//! current sort. Changing the sort starts a new *generation*: loaded pages
//! are dropped, pagination restarts at offset 0, and a response still in
//! flight for the old generation is discarded when it lands.
//!
//! The controller is split into [`PageFetchController::begin_fetch`] and
//! [`PageFetchController::complete_fetch`] so a driver can release it while
//! the request is pending; [`PageFetchController::maybe_fetch_more`] does
//! both around a [`RemoteDataSource`] call. A claimed slot is released by
//! [`PageFetchController::cancel_fetch`], which the async helpers also do
//! when their future is dropped before the page arrives.
//!
//! A failed fetch leaves an error for display but does not lock the
//! controller: the next near-bottom scroll requests the same page again.
//! Nothing retries on its own.

use crate::{
    config::TableConfig,
    error::Result,
    person::Person,
    source::{Page, RemoteDataSource, SortSpec},
    viewport::ViewportMetrics,
};

/// A claim on the single fetch slot.
///
/// Hand it back to [`PageFetchController::complete_fetch`] with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    start: usize,
    size: usize,
    sort: Option<SortSpec>,
}

impl FetchTicket {
    /// Sort generation the request belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// First row requested.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Rows requested.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sort the request was issued under.
    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was appended.
    Appended {
        /// Rows in the appended page
        rows: usize,
    },
    /// The fetch failed; the controller is now in the error state.
    Failed {
        /// Error message for display
        message: String,
    },
    /// The response belonged to an older sort generation and was dropped.
    DiscardedStale,
}

/// Accumulates pages for one sort at a time.
#[derive(Debug, Clone)]
pub struct PageFetchController {
    pages: Vec<Page>,
    sort: Option<SortSpec>,
    in_flight: Option<FetchTicket>,
    total_row_count: usize,
    error: Option<String>,
    generation: u64,
    page_size: usize,
    fetch_threshold: f64,
}

impl Default for PageFetchController {
    fn default() -> Self {
        Self::from_config(&TableConfig::default())
    }
}

impl PageFetchController {
    /// Creates a controller; a zero page size is raised to 1.
    pub fn new(page_size: usize, fetch_threshold: f64) -> Self {
        Self {
            pages: Vec::new(),
            sort: None,
            in_flight: None,
            total_row_count: 0,
            error: None,
            generation: 0,
            page_size: page_size.max(1),
            fetch_threshold,
        }
    }

    /// Creates a controller from the configured page size and threshold.
    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(config.page_size, config.fetch_threshold)
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current sort.
    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    /// Current sort generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pages loaded for the current sort, in offset order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Loaded rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &Person> {
        self.pages.iter().flat_map(|p| p.rows.iter())
    }

    /// Dataset size reported by the most recent page.
    pub fn total_row_count(&self) -> usize {
        self.total_row_count
    }

    /// Number of rows loaded so far.
    pub fn total_fetched(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// The outstanding request, if any.
    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    /// Returns true while a request is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns true while the first page of the current sort is pending.
    pub fn is_loading(&self) -> bool {
        self.is_fetching() && self.pages.is_empty()
    }

    /// Returns true while a follow-up page is pending.
    pub fn is_fetching_more(&self) -> bool {
        self.is_fetching() && !self.pages.is_empty()
    }

    /// Message of the last failed fetch, if not yet cleared.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true once every row of the dataset is loaded.
    pub fn all_loaded(&self) -> bool {
        !self.pages.is_empty() && self.total_fetched() >= self.total_row_count
    }

    /// Replaces the sort and restarts pagination at offset 0.
    ///
    /// Any request in flight becomes stale. The caller is expected to reset
    /// its scroll position to the top.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.generation = self.generation.wrapping_add(1);
        self.sort = sort;
        self.pages.clear();
        self.total_row_count = 0;
        self.in_flight = None;
        self.error = None;
        tracing::debug!(generation = self.generation, ?sort, "sort changed");
    }

    /// Clears the error message.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Whether the viewport is close enough to the end to load more.
    pub fn should_fetch_more(&self, metrics: &ViewportMetrics) -> bool {
        metrics.is_near_bottom(self.fetch_threshold) && self.can_fetch()
    }

    /// Claims the fetch slot for the next page, if one may be requested.
    ///
    /// Returns `None` while a request is outstanding or once everything is
    /// loaded. After a failure the ticket covers the page that failed.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if !self.can_fetch() {
            return None;
        }
        let ticket = FetchTicket {
            generation: self.generation,
            start: self.pages.len() * self.page_size,
            size: self.page_size,
            sort: self.sort,
        };
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Records the result of a request started with [`Self::begin_fetch`].
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<Page>) -> FetchOutcome {
        if ticket.generation != self.generation || self.in_flight != Some(ticket) {
            tracing::warn!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                start = ticket.start,
                "discarding stale page"
            );
            return FetchOutcome::DiscardedStale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                self.error = None;
                let rows = page.len();
                self.total_row_count = page.total_row_count;
                self.pages.push(page);
                tracing::debug!(
                    start = ticket.start,
                    rows,
                    fetched = self.total_fetched(),
                    total = self.total_row_count,
                    "page appended"
                );
                FetchOutcome::Appended { rows }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(start = ticket.start, error = %message, "page fetch failed");
                self.error = Some(message.clone());
                FetchOutcome::Failed { message }
            }
        }
    }

    /// Releases the slot claimed by `ticket` without recording a result.
    ///
    /// Does nothing if `ticket` is no longer the outstanding request.
    pub fn cancel_fetch(&mut self, ticket: FetchTicket) {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            tracing::debug!(start = ticket.start, "fetch cancelled");
        }
    }

    /// Fetches the next page from `source` when the viewport is near the
    /// bottom. Returns `None` if no request was made.
    pub async fn maybe_fetch_more(
        &mut self,
        source: &RemoteDataSource,
        metrics: &ViewportMetrics,
    ) -> Option<FetchOutcome> {
        if !self.should_fetch_more(metrics) {
            return None;
        }
        self.fetch_next(source).await
    }

    /// Fetches the next page regardless of scroll position.
    ///
    /// Used for the first page of a sort, which loads on mount.
    pub async fn fetch_next(&mut self, source: &RemoteDataSource) -> Option<FetchOutcome> {
        let ticket = self.begin_fetch()?;
        let claim = FetchClaim::new(self, ticket);
        let result = source
            .fetch_page(ticket.start, ticket.size, ticket.sort)
            .await;
        Some(claim.complete(result))
    }

    fn can_fetch(&self) -> bool {
        self.in_flight.is_none() && !self.all_loaded()
    }
}

/// Holds a claimed ticket across an await and releases it on drop.
pub(crate) struct FetchClaim<'a> {
    controller: &'a mut PageFetchController,
    ticket: FetchTicket,
}

impl<'a> FetchClaim<'a> {
    pub(crate) fn new(controller: &'a mut PageFetchController, ticket: FetchTicket) -> Self {
        Self { controller, ticket }
    }

    pub(crate) fn complete(mut self, result: Result<Page>) -> FetchOutcome {
        // Drop runs afterwards and finds the slot already released
        self.controller.complete_fetch(self.ticket, result)
    }
}

impl Drop for FetchClaim<'_> {
    fn drop(&mut self) {
        self.controller.cancel_fetch(self.ticket);
    }
}
