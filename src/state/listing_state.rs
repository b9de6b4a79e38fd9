//! ListingState - Query, Page and Selection State for One Table
//!
//! Every change goes through [`ListingState::reduce`], which consumes the old
//! state and returns the next one. Nothing outside this module mutates it, so
//! the controller and tests can replay any sequence of actions without a UI.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::constants::DEFAULT_PAGE_SIZE;
use crate::domain::{
    DateRange, Filter, ListingRequest, ListingResult, Paginator, PagingMode, SortBy,
};

/// Everything that can happen to a listing
#[derive(Debug, Clone)]
pub enum ListingAction<T> {
    /// A fetch was issued; bumps the generation
    FetchStarted,
    /// A fetch resolved with rows
    FetchSucceeded {
        generation: u64,
        result: ListingResult<T>,
    },
    /// A fetch was rejected
    FetchFailed { generation: u64 },
    /// Back to page one with nothing loaded
    Reset,
    FiltersChanged(Vec<Filter>),
    DateRangeChanged(Option<DateRange>),
    SortChanged(Option<SortBy>),
    /// Move to a 1-based page
    PageChanged(usize),
    PageSizeChanged(u32),
    /// Pass-through request fields owned by the page
    ExtraChanged(Map<String, Value>),
    /// Indices into the current listing
    SelectionChanged(Vec<usize>),
}

/// State for one listing
#[derive(Debug, Clone)]
pub struct ListingState<T> {
    paging_mode: PagingMode,
    /// Configured page size restored on reset
    default_page_size: u32,
    request: ListingRequest,
    listing: Vec<T>,
    /// Sorted, de-duplicated indices into `listing`
    selection: Vec<usize>,
    loading: bool,
    current_page: usize,
    total_pages: usize,
    /// Id of the latest issued fetch; older responses are discarded
    generation: u64,
    /// Cursor of the page after the current one, from the response to it
    next_cursor: Option<String>,
    /// Page the visible rows were fetched for
    listed_page: Option<usize>,
    /// Cursor used to request page `i + 1`
    cursor_trail: Vec<Option<String>>,
}

impl<T> Default for ListingState<T> {
    fn default() -> Self {
        Self::new(PagingMode::Offset, DEFAULT_PAGE_SIZE)
    }
}

impl<T> ListingState<T> {
    /// Create an empty listing on page one
    pub fn new(paging_mode: PagingMode, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        Self {
            paging_mode,
            default_page_size: page_size,
            request: ListingRequest::with_page_size(page_size),
            listing: Vec::new(),
            selection: Vec::new(),
            loading: false,
            current_page: 1,
            total_pages: 1,
            generation: 0,
            next_cursor: None,
            listed_page: None,
            cursor_trail: vec![None],
        }
    }

    // ==================== Getters ====================

    pub fn paging_mode(&self) -> PagingMode {
        self.paging_mode
    }

    pub fn request(&self) -> &ListingRequest {
        &self.request
    }

    pub fn listing(&self) -> &[T] {
        &self.listing
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Selected rows, in listing order
    pub fn selected_items(&self) -> Vec<&T> {
        self.selection
            .iter()
            .filter_map(|&i| self.listing.get(i))
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page_size(&self) -> u32 {
        self.request.paginator.page_size()
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// Whether a page after the current one is available
    ///
    /// Cursor and open-ended listings only know this once the current page
    /// has been answered.
    pub fn has_more_pages(&self) -> bool {
        match self.paging_mode {
            PagingMode::Offset => self.current_page < self.total_pages,
            PagingMode::Cursor => self.next_cursor.is_some(),
            PagingMode::OpenEnded => {
                self.listed_page == Some(self.current_page)
                    && self.listing.len() >= self.page_size() as usize
            }
        }
    }

    /// Whether `page` can be requested from the current position
    pub fn can_go_to_page(&self, page: usize) -> bool {
        if page == 0 {
            return false;
        }
        let next = page == self.current_page + 1 && self.has_more_pages();
        match self.paging_mode {
            PagingMode::Offset => page <= self.total_pages,
            PagingMode::Cursor => page <= self.cursor_trail.len() || next,
            PagingMode::OpenEnded => page <= self.total_pages || next,
        }
    }

    // ==================== Reducer ====================

    /// Apply an action and return the next state
    pub fn reduce(mut self, action: ListingAction<T>) -> Self {
        match action {
            ListingAction::FetchStarted => {
                self.generation += 1;
                self.loading = true;
            }
            ListingAction::FetchSucceeded { generation, result } => {
                if generation != self.generation {
                    debug!(
                        generation,
                        latest = self.generation,
                        "Discarding superseded listing response"
                    );
                    return self;
                }
                self.apply_result(result);
            }
            ListingAction::FetchFailed { generation } => {
                if generation == self.generation {
                    self.loading = false;
                }
            }
            ListingAction::Reset => {
                self.generation += 1;
                self.loading = false;
                self.request.paginator = Paginator::with_page_size(self.default_page_size);
                self.invalidate();
            }
            ListingAction::FiltersChanged(filters) => {
                let paginator = self.first_page_paginator();
                let request = std::mem::take(&mut self.request);
                self.request = ListingRequest {
                    filters,
                    paginator,
                    ..request
                };
                self.invalidate();
            }
            ListingAction::DateRangeChanged(date_range) => {
                let paginator = self.first_page_paginator();
                let request = std::mem::take(&mut self.request);
                self.request = ListingRequest {
                    date_range,
                    paginator,
                    ..request
                };
                self.invalidate();
            }
            ListingAction::SortChanged(sort_by) => {
                let paginator = self.first_page_paginator();
                let request = std::mem::take(&mut self.request);
                self.request = ListingRequest {
                    sort_by,
                    paginator,
                    ..request
                };
                self.invalidate();
            }
            ListingAction::PageSizeChanged(page_size) => {
                if page_size == 0 {
                    warn!("Ignoring zero page size");
                    return self;
                }
                let request = std::mem::take(&mut self.request);
                self.request = ListingRequest {
                    paginator: Paginator::with_page_size(page_size),
                    ..request
                };
                self.invalidate();
            }
            ListingAction::ExtraChanged(extra) => {
                let paginator = self.first_page_paginator();
                let request = std::mem::take(&mut self.request);
                self.request = ListingRequest {
                    extra,
                    paginator,
                    ..request
                };
                self.invalidate();
            }
            ListingAction::PageChanged(page) => {
                if !self.can_go_to_page(page) {
                    warn!(page, mode = ?self.paging_mode, "Ignoring unreachable page");
                    return self;
                }
                self.move_to_page(page);
            }
            ListingAction::SelectionChanged(mut indices) => {
                indices.retain(|&i| i < self.listing.len());
                indices.sort_unstable();
                indices.dedup();
                self.selection = indices;
            }
        }
        self
    }

    fn apply_result(&mut self, result: ListingResult<T>) {
        let ListingResult {
            listing,
            filters,
            paginator,
            date_range,
        } = result;

        self.listing = listing.unwrap_or_default();
        self.listed_page = Some(self.current_page);
        self.selection.clear();

        if let Some(filters) = filters {
            self.request.filters = filters;
        }
        if let Some(date_range) = date_range {
            self.request.date_range = Some(date_range);
        }

        self.next_cursor = match paginator {
            Some(server) => {
                let mut merged = self.request.paginator.merged_with(&server);
                let next = merged.cursor.take();
                merged.cursor = self.request.paginator.cursor.clone();
                self.request.paginator = merged;
                next
            }
            None => None,
        };

        self.total_pages = match (self.paging_mode, self.request.paginator.total) {
            (PagingMode::Offset, Some(total)) => {
                (total.div_ceil(u64::from(self.page_size())) as usize).max(1)
            }
            _ => self.total_pages.max(self.current_page),
        };
        self.loading = false;
    }

    fn move_to_page(&mut self, page: usize) {
        let page_size = self.page_size();
        let start = (page as u64 - 1) * u64::from(page_size);

        let cursor = match self.paging_mode {
            PagingMode::Cursor => {
                let next = self.next_cursor.take();
                if page > self.cursor_trail.len() {
                    self.cursor_trail.push(next);
                }
                self.cursor_trail.get(page - 1).cloned().flatten()
            }
            PagingMode::Offset | PagingMode::OpenEnded => None,
        };

        let request = std::mem::take(&mut self.request);
        self.request = ListingRequest {
            paginator: Paginator {
                start: Some(start),
                page_size: Some(page_size),
                total: request.paginator.total,
                cursor,
            },
            ..request
        };

        if self.paging_mode != PagingMode::Offset {
            self.total_pages = self.total_pages.max(page);
        }
        self.current_page = page;
        self.selection.clear();
    }

    fn first_page_paginator(&self) -> Paginator {
        Paginator::with_page_size(self.page_size())
    }

    /// Drop everything tied to the current page
    fn invalidate(&mut self) {
        self.listing.clear();
        self.selection.clear();
        self.current_page = 1;
        self.total_pages = 1;
        self.next_cursor = None;
        self.listed_page = None;
        self.cursor_trail = vec![None];
    }
}

impl<T: Clone> ListingState<T> {
    /// Owned copy of the first selected row
    pub fn selected_item(&self) -> Option<T> {
        self.selection
            .first()
            .and_then(|&i| self.listing.get(i))
            .cloned()
    }
}
