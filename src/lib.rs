//! Cluster Console Library
//!
//! Headless core of the cluster-management console's table views: listing
//! state, paging, filtering and CSV export over an injected data provider.

pub mod constants;
pub mod domain;
pub mod error;
pub mod eventing;
pub mod helpers;
pub mod listing;
pub mod state;
