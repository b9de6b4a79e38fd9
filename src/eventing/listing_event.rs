//! ListingEvent - Listing Event Enum
//!
//! Events a listing controller re-emits to the page that owns it.

use std::path::PathBuf;

use crate::domain::{DateRange, Filter, SortBy};

/// Listing events for controller -> parent communication
#[derive(Debug, Clone, PartialEq)]
pub enum ListingEvent {
    /// Row selection changed
    SelectionChanged { count: usize },

    /// Sort column or direction changed
    SortChanged { sort_by: Option<SortBy> },

    /// Page navigation
    PageChanged { page: usize },

    /// Filters changed (after any caller transform)
    FiltersChanged { filters: Vec<Filter> },

    /// Date range changed
    DateRangeChanged { date_range: Option<DateRange> },

    /// Table preferences changed
    PreferencesChanged { page_size: u32 },

    /// A fetch was applied to the listing
    FetchCompleted {
        generation: u64,
        rows: usize,
        page: usize,
    },

    /// The latest fetch was rejected
    FetchFailed { generation: u64, message: String },

    /// A CSV export was written
    Exported { path: PathBuf, rows: usize },
}
