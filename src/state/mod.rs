//! State - Listing State Modules
//!
//! Plain state containers updated through reducers; nothing here performs I/O.

pub mod listing_state;

pub use listing_state::{ListingAction, ListingState};
