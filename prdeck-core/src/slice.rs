//! Resource slices
//!
//! A slice is the client-side state for one backend resource: its data, a
//! loading flag, an error message, and for list resources a sort and a page.
//!
//! Every fetch takes a [`RequestToken`] from the slice before it starts and
//! hands it back with the result. Only the newest token may write, so a slow
//! response for an old query can never overwrite data from a newer one.
//!
//! ## Invariants
//!
//! - `loading` is true only while the newest request is outstanding
//! - new data clears `error` and resets the page to 1
//! - a failed fetch keeps the previous data visible

use std::marker::PhantomData;

use crate::sort::{sort_by_column, SortColumn, SortDirection, SortState, Unsorted};

/// Message used when a failure carries no text of its own
pub const FALLBACK_ERROR: &str = "Request failed";

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Ticket identifying one fetch against a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Loading/error bookkeeping shared by every slice shape.
#[derive(Debug, Clone, Default)]
struct FetchState {
    loading: bool,
    error: Option<String>,
    latest: u64,
}

impl FetchState {
    fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        self.loading = true;
        RequestToken(self.latest)
    }

    /// Orphan any outstanding request.
    fn invalidate(&mut self) {
        self.latest += 1;
        self.loading = false;
        self.error = None;
    }

    fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    fn fail(&mut self, message: &str) {
        let message = message.trim();
        self.error = Some(if message.is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            message.to_string()
        });
        self.loading = false;
    }
}

/// A list resource with optional sorting and pagination.
#[derive(Debug, Clone)]
pub struct ListSlice<T, C = Unsorted> {
    data: Vec<T>,
    fetch: FetchState,
    sort: Option<SortState<C>>,
    current_page: usize,
    page_size: usize,
    _column: PhantomData<C>,
}

impl<T, C> Default for ListSlice<T, C> {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl<T, C> ListSlice<T, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            data: Vec::new(),
            fetch: FetchState::default(),
            sort: None,
            current_page: 1,
            page_size: page_size.max(1),
            _column: PhantomData,
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.fetch.error.as_deref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Replace the data, clearing any error and returning to page 1.
    pub fn set_data(&mut self, items: Vec<T>) {
        self.data = items;
        self.fetch.error = None;
        self.fetch.loading = false;
        self.current_page = 1;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.fetch.loading = loading;
    }

    /// Empty the slice and drop any response still in flight.
    pub fn clear(&mut self) {
        self.fetch.invalidate();
        self.data.clear();
        self.current_page = 1;
    }

    /// Set or clear the error banner. Data is left untouched.
    pub fn set_error(&mut self, message: Option<&str>) {
        match message {
            Some(message) => self.fetch.fail(message),
            None => self.fetch.error = None,
        }
    }

    /// Start a fetch; the returned token must accompany its result.
    pub fn begin(&mut self) -> RequestToken {
        self.fetch.begin()
    }

    /// Drop any outstanding fetch without touching the data.
    pub fn invalidate(&mut self) {
        self.fetch.invalidate();
    }

    /// Apply a fetch result if `token` is still the newest request.
    ///
    /// Returns false when the response was stale and has been dropped.
    pub fn finish<E: ToString>(
        &mut self,
        token: RequestToken,
        result: std::result::Result<Vec<T>, E>,
    ) -> bool {
        if !self.fetch.is_current(token) {
            tracing::debug!(?token, "Discarding stale list response");
            return false;
        }
        match result {
            Ok(items) => self.set_data(items),
            Err(e) => self.fetch.fail(&e.to_string()),
        }
        true
    }

    /// Mutate the stored items in place (optimistic updates).
    ///
    /// The page is kept unless it now lies past the last page.
    pub fn update(&mut self, f: impl FnOnce(&mut Vec<T>)) {
        f(&mut self.data);
        self.current_page = self.current_page.min(self.total_pages());
    }

    /// Number of pages, never less than 1.
    pub fn total_pages(&self) -> usize {
        self.data.len().div_ceil(self.page_size).max(1)
    }

    /// Move to page `n`, clamped to the valid range.
    pub fn set_page(&mut self, n: usize) {
        self.current_page = n.clamp(1, self.total_pages());
    }

    pub fn sort(&self) -> Option<SortState<C>>
    where
        C: Copy,
    {
        self.sort
    }
}

impl<T, C: SortColumn<T>> ListSlice<T, C> {
    /// Toggle sorting on `column`: same column flips, new column starts descending.
    pub fn set_sort(&mut self, column: C) {
        self.sort = Some(SortState::toggled(self.sort, column));
    }

    pub fn set_sort_explicit(&mut self, column: C, direction: SortDirection) {
        self.sort = Some(SortState { column, direction });
    }

    /// All rows in display order.
    pub fn sorted(&self) -> Vec<&T> {
        let mut rows: Vec<&T> = self.data.iter().collect();
        if let Some(state) = self.sort {
            sort_by_column(&mut rows, state);
        }
        rows
    }

    /// Rows of the current page in display order.
    pub fn view(&self) -> Vec<&T> {
        let start = (self.current_page - 1) * self.page_size;
        self.sorted()
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }
}

/// A single-record resource (analytics payloads, lookup maps).
#[derive(Debug, Clone)]
pub struct ValueSlice<T> {
    data: Option<T>,
    fetch: FetchState,
}

impl<T> Default for ValueSlice<T> {
    fn default() -> Self {
        Self {
            data: None,
            fetch: FetchState::default(),
        }
    }
}

impl<T> ValueSlice<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.fetch.error.as_deref()
    }

    pub fn set_data(&mut self, value: T) {
        self.data = Some(value);
        self.fetch.error = None;
        self.fetch.loading = false;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.fetch.loading = loading;
    }

    pub fn set_error(&mut self, message: Option<&str>) {
        match message {
            Some(message) => self.fetch.fail(message),
            None => self.fetch.error = None,
        }
    }

    pub fn clear(&mut self) {
        self.fetch.invalidate();
        self.data = None;
    }

    pub fn begin(&mut self) -> RequestToken {
        self.fetch.begin()
    }

    pub fn finish<E: ToString>(
        &mut self,
        token: RequestToken,
        result: std::result::Result<T, E>,
    ) -> bool {
        if !self.fetch.is_current(token) {
            tracing::debug!(?token, "Discarding stale response");
            return false;
        }
        match result {
            Ok(value) => self.set_data(value),
            Err(e) => self.fetch.fail(&e.to_string()),
        }
        true
    }
}
