//! Listing Component
//!
//! Filter, sort and page state for a table, its data providers and CSV export.

pub mod column;
pub mod controller;
pub mod data_provider;
pub mod export;
pub mod pagination;

pub use column::Column;
pub use controller::{FetchCompletion, FetchOutcome, ListingController, PendingFetch};
pub use data_provider::{FnDataProvider, ListingDataProvider, VecDataProvider};
pub use export::ExportFileName;
pub use pagination::Pagination;
