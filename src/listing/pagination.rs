//! Pagination Summary
//!
//! Page navigation info for a listing, ready for a pager widget or a status line.

use std::fmt;

use crate::domain::PagingMode;
use crate::state::listing_state::ListingState;

/// Pagination summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    /// Known only in offset paging
    pub total_items: Option<u64>,
    pub can_prev: bool,
    pub can_next: bool,
    /// Whether `total_pages` is only a high-water mark
    pub open_ended: bool,
    items_label: String,
}

impl Pagination {
    /// Summarize a listing state
    pub fn from_state<T>(state: &ListingState<T>) -> Self {
        let total_items = match state.paging_mode() {
            PagingMode::Offset => state.request().paginator.total,
            PagingMode::Cursor | PagingMode::OpenEnded => None,
        };

        Self {
            current_page: state.current_page(),
            total_pages: state.total_pages(),
            total_items,
            can_prev: state.current_page() > 1,
            can_next: state.has_more_pages(),
            open_ended: state.paging_mode() != PagingMode::Offset,
            items_label: "items".to_string(),
        }
    }

    /// Set the items label
    pub fn items_label(mut self, label: impl Into<String>) -> Self {
        self.items_label = label.into();
        self
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(total) = self.total_items {
            write!(f, "{} {} · ", total, self.items_label)?;
        }
        write!(f, "{} / {}", self.current_page, self.total_pages)?;
        if self.open_ended && self.can_next {
            write!(f, "+")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListingResult, Paginator};
    use crate::state::listing_state::ListingAction;
    use serde_json::{Value, json};

    #[test]
    fn test_offset_summary() {
        let result = ListingResult::from_rows(vec![json!({"id": 1}); 30]).with_paginator(Paginator {
            total: Some(95),
            ..Paginator::default()
        });
        let state: ListingState<Value> = ListingState::default()
            .reduce(ListingAction::FetchStarted)
            .reduce(ListingAction::FetchSucceeded {
                generation: 1,
                result,
            });

        let pagination = Pagination::from_state(&state).items_label("jobs");
        assert_eq!(pagination.total_pages, 4);
        assert!(!pagination.can_prev);
        assert!(pagination.can_next);
        assert_eq!(pagination.to_string(), "95 jobs · 1 / 4");
    }

    #[test]
    fn test_open_ended_summary() {
        let state: ListingState<Value> = ListingState::new(PagingMode::OpenEnded, 2)
            .reduce(ListingAction::FetchStarted)
            .reduce(ListingAction::FetchSucceeded {
                generation: 1,
                result: ListingResult::from_rows(vec![json!({}), json!({})]),
            });

        let pagination = Pagination::from_state(&state);
        assert_eq!(pagination.total_items, None);
        assert_eq!(pagination.to_string(), "1 / 1+");
    }
}
