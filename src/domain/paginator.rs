//! Paginator - Page State Descriptor

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PAGE_SIZE;

/// Page-state descriptor exchanged with the backend
///
/// `start` is a zero-based offset and `cursor` an opaque token; which one is
/// meaningful depends on the [`PagingMode`] of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// First page with the given page size
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            start: Some(0),
            page_size: Some(page_size.max(1)),
            total: None,
            cursor: None,
        }
    }

    /// Page size, falling back to the default when absent or zero
    pub fn page_size(&self) -> u32 {
        match self.page_size {
            Some(size) if size > 0 => size,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// Offset of the first row, zero when absent
    pub fn start(&self) -> u64 {
        self.start.unwrap_or(0)
    }

    /// Cursor, treating an empty string as absent
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }

    /// Merge a paginator returned by the server into this one
    ///
    /// Fields the server omitted keep their current value, except `cursor`
    /// which is always taken from the response: a missing cursor means the
    /// server has no further page. A zero page size is never accepted.
    pub fn merged_with(&self, server: &Paginator) -> Paginator {
        Paginator {
            start: server.start.or(self.start),
            page_size: match server.page_size {
                Some(size) if size > 0 => Some(size),
                _ => Some(self.page_size()),
            },
            total: server.total.or(self.total),
            cursor: server.cursor.clone().filter(|c| !c.is_empty()),
        }
    }
}

/// How the listing moves between pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingMode {
    /// `start = (page - 1) * page_size`, total known from the server
    #[default]
    Offset,
    /// Server hands out an opaque token for the next page
    Cursor,
    /// Total unknown; a full page implies another one may follow
    OpenEnded,
}
