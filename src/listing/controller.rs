//! Listing Controller
//!
//! Owns the state of one listing and drives its data provider. Every handler
//! follows the same shape: reduce the state, tell the owner, fetch.

use std::path::PathBuf;

use crossbeam_channel::Sender;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::column::Column;
use super::data_provider::{FetchFuture, ListingDataProvider};
use super::export::{self, ExportFileName};
use super::pagination::Pagination;
use crate::domain::config::{ConsoleConfig, ExportConfig, ListingConfig};
use crate::domain::{DateRange, Filter, ListingRequest, ListingResult, Paginator, SortBy};
use crate::error::{Error, Result};
use crate::eventing::ListingEvent;
use crate::helpers::get_or_create_download_dir;
use crate::state::listing_state::{ListingAction, ListingState};

/// Post-processing applied to filters coming from the filter widget
pub type FilterTransform = Box<dyn Fn(Vec<Filter>) -> Vec<Filter> + Send + Sync>;

/// What happened to a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result replaced the visible listing
    Applied,
    /// A newer fetch was issued first; the result was discarded
    Superseded,
}

/// A fetch that has been issued but not awaited
pub struct PendingFetch<R> {
    generation: u64,
    future: FetchFuture<R>,
}

impl<R> PendingFetch<R> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the provider
    pub async fn resolve(self) -> FetchCompletion<R> {
        FetchCompletion {
            generation: self.generation,
            result: self.future.await,
        }
    }
}

/// A provider response tagged with the fetch it answers
pub struct FetchCompletion<R> {
    pub generation: u64,
    pub result: Result<ListingResult<R>>,
}

/// Listing controller
pub struct ListingController<P: ListingDataProvider> {
    provider: P,
    state: ListingState<P::Row>,
    filter_transform: Option<FilterTransform>,
    events: Option<Sender<ListingEvent>>,
    export: ExportConfig,
    export_file_name: ExportFileName,
}

impl<P: ListingDataProvider> ListingController<P> {
    /// Create a controller with the given listing defaults
    pub fn new(provider: P, listing: &ListingConfig) -> Self {
        let export = ExportConfig::default();
        Self {
            provider,
            state: ListingState::new(listing.paging_mode, listing.page_size),
            filter_transform: None,
            events: None,
            export_file_name: ExportFileName::Static(export.file_name.clone()),
            export,
        }
    }

    /// Create a controller from the console configuration
    pub fn from_config(provider: P, config: &ConsoleConfig) -> Self {
        Self::new(provider, &config.listing).with_export_config(config.export.clone())
    }

    /// Set export settings; resets the file name to the configured one
    pub fn with_export_config(mut self, export: ExportConfig) -> Self {
        self.export_file_name = ExportFileName::Static(export.file_name.clone());
        self.export = export;
        self
    }

    pub fn with_export_file_name(mut self, file_name: ExportFileName) -> Self {
        self.export_file_name = file_name;
        self
    }

    /// Transform applied to filters before they reach the request
    pub fn with_filter_transform(
        mut self,
        transform: impl Fn(Vec<Filter>) -> Vec<Filter> + Send + Sync + 'static,
    ) -> Self {
        self.filter_transform = Some(Box::new(transform));
        self
    }

    /// Send listing events to the owning page
    pub fn with_events(mut self, events: Sender<ListingEvent>) -> Self {
        self.events = Some(events);
        self
    }

    // ==================== Getters ====================

    pub fn state(&self) -> &ListingState<P::Row> {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn request(&self) -> &ListingRequest {
        self.state.request()
    }

    /// Copy of the active filters
    pub fn filters(&self) -> Vec<Filter> {
        self.state.request().filters.clone()
    }

    /// Copy of the paginator
    pub fn paginator(&self) -> Paginator {
        self.state.request().paginator.clone()
    }

    pub fn listing(&self) -> &[P::Row] {
        self.state.listing()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.state.total_pages()
    }

    pub fn has_more_pages(&self) -> bool {
        self.state.has_more_pages()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_state(&self.state)
    }

    /// Owned copy of the selected row, if any
    pub fn selected_item(&self) -> Option<P::Row> {
        self.state.selected_item()
    }

    /// Selected rows
    pub fn selected_items(&self) -> Vec<&P::Row> {
        self.state.selected_items()
    }

    // ==================== Fetch Cycle ====================

    /// Fetch the current page
    ///
    /// Provider errors are returned unchanged; the previous listing stays visible.
    pub async fn fetch_records(&mut self) -> Result<FetchOutcome> {
        let pending = self.start_fetch();
        let completion = pending.resolve().await;
        self.complete_fetch(completion)
    }

    /// Issue a fetch for the current request without waiting for it
    pub fn start_fetch(&mut self) -> PendingFetch<P::Row> {
        self.dispatch(ListingAction::FetchStarted);
        let generation = self.state.generation();
        let request = self.state.request().clone();
        debug!(generation, page = self.state.current_page(), "Fetching listing");

        PendingFetch {
            generation,
            future: self.provider.fetch(request),
        }
    }

    /// Apply a provider response
    pub fn complete_fetch(&mut self, completion: FetchCompletion<P::Row>) -> Result<FetchOutcome> {
        let FetchCompletion { generation, result } = completion;

        if generation != self.state.generation() {
            match &result {
                Ok(_) => debug!(
                    generation,
                    latest = self.state.generation(),
                    "Listing response superseded"
                ),
                Err(e) => debug!(
                    generation,
                    latest = self.state.generation(),
                    "Superseded listing fetch failed: {e}"
                ),
            }
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(result) => {
                self.dispatch(ListingAction::FetchSucceeded { generation, result });
                self.emit(ListingEvent::FetchCompleted {
                    generation,
                    rows: self.state.listing().len(),
                    page: self.state.current_page(),
                });
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                self.dispatch(ListingAction::FetchFailed { generation });
                warn!(generation, "Listing fetch failed: {e}");
                self.emit(ListingEvent::FetchFailed {
                    generation,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Clear rows, selection and paging; always `true` once settled
    pub fn reset_state(&mut self) -> bool {
        self.dispatch(ListingAction::Reset);
        true
    }

    // ==================== Handlers ====================

    /// Apply filters from the filter widget and fetch page one
    pub async fn on_filter(&mut self, filters: Vec<Filter>) -> Result<FetchOutcome> {
        let filters = match &self.filter_transform {
            Some(transform) => transform(filters),
            None => filters,
        };
        self.dispatch(ListingAction::FiltersChanged(filters.clone()));
        self.emit(ListingEvent::FiltersChanged { filters });
        self.fetch_records().await
    }

    /// Move to a 1-based page and fetch it
    pub async fn on_page_change(&mut self, page: usize) -> Result<FetchOutcome> {
        if !self.state.can_go_to_page(page) {
            return Err(Error::invalid(format!(
                "Page {page} is not reachable from page {}",
                self.state.current_page()
            )));
        }
        self.dispatch(ListingAction::PageChanged(page));
        self.emit(ListingEvent::PageChanged { page });
        self.fetch_records().await
    }

    pub async fn next_page(&mut self) -> Result<FetchOutcome> {
        self.on_page_change(self.state.current_page() + 1).await
    }

    pub async fn previous_page(&mut self) -> Result<FetchOutcome> {
        self.on_page_change(self.state.current_page().saturating_sub(1))
            .await
    }

    /// Change ordering and fetch page one
    pub async fn on_sort_change(&mut self, sort_by: Option<SortBy>) -> Result<FetchOutcome> {
        self.dispatch(ListingAction::SortChanged(sort_by.clone()));
        self.emit(ListingEvent::SortChanged { sort_by });
        self.fetch_records().await
    }

    /// Change the date window and fetch page one
    pub async fn on_date_range_change(
        &mut self,
        date_range: Option<DateRange>,
    ) -> Result<FetchOutcome> {
        self.dispatch(ListingAction::DateRangeChanged(date_range.clone()));
        self.emit(ListingEvent::DateRangeChanged { date_range });
        self.fetch_records().await
    }

    /// Change rows per page and fetch page one
    pub async fn on_page_size_change(&mut self, page_size: u32) -> Result<FetchOutcome> {
        if page_size == 0 {
            return Err(Error::invalid("Page size must be positive"));
        }
        self.dispatch(ListingAction::PageSizeChanged(page_size));
        self.emit(ListingEvent::PreferencesChanged { page_size });
        self.fetch_records().await
    }

    /// Replace the row selection
    pub fn on_selection_change(&mut self, indices: Vec<usize>) {
        self.dispatch(ListingAction::SelectionChanged(indices));
        self.emit(ListingEvent::SelectionChanged {
            count: self.state.selection().len(),
        });
    }

    /// Set a pass-through request field; the caller decides when to fetch
    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) {
        let mut extra = self.state.request().extra.clone();
        extra.insert(key.into(), value);
        self.dispatch(ListingAction::ExtraChanged(extra));
    }

    // ==================== Export ====================

    /// Export the exportable columns to a CSV file
    ///
    /// Failures are logged and yield `None`; the owner shows nothing.
    pub async fn export_csv(&self, columns: &[Column<P::Row>]) -> Option<PathBuf> {
        match self.try_export_csv(columns).await {
            Ok((path, rows)) => {
                info!("Exported {rows} rows to {}", path.display());
                self.emit(ListingEvent::Exported {
                    path: path.clone(),
                    rows,
                });
                Some(path)
            }
            Err(e) => {
                error!("CSV export failed: {e}");
                None
            }
        }
    }

    async fn try_export_csv(&self, columns: &[Column<P::Row>]) -> Result<(PathBuf, usize)> {
        let rows =
            export::export_rows(&self.provider, &self.state, self.export.min_page_size).await?;
        let content = export::render_csv(columns, &rows);
        let dir = get_or_create_download_dir(self.export.directory.as_deref())?;
        let path = export::write_csv(&dir, &self.export_file_name.resolve(), &content).await?;
        Ok((path, rows.len()))
    }

    // ==================== Internals ====================

    fn dispatch(&mut self, action: ListingAction<P::Row>) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    fn emit(&self, event: ListingEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        if let Err(e) = tx.send(event) {
            debug!("Listing event dropped, receiver gone: {:?}", e.into_inner());
        }
    }
}
