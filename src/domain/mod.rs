//! Domain - Pure Data Structures and Wire Types
//!
//! These types carry no controller state and mirror the backend's listing API.

pub mod config;
pub mod filter;
pub mod listing;
pub mod paginator;

pub use filter::Filter;
pub use listing::{DateRange, ListingRequest, ListingResult, SortBy, SortOrder};
pub use paginator::{Paginator, PagingMode};
