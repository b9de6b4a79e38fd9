//! Eventing - Notifications from a listing to its owner

pub mod listing_event;

pub use listing_event::ListingEvent;
