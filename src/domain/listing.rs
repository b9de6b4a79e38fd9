//! Listing - Request and Result Shapes
//!
//! The request a table sends to its data provider and the result it gets back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::filter::Filter;
use super::paginator::Paginator;

/// Inclusive time window applied to a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Field the range applies to (e.g., "created_on")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            key: None,
            start,
            end,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Check whether an instant lies in the window
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        &self.start <= instant && instant <= &self.end
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Column the listing is ordered by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub key: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortBy {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Query state for one page of a listing
///
/// Replaced wholesale on every change; never patched in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListingRequest {
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub paginator: Paginator,
    /// Pass-through fields owned by the page composing the request
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListingRequest {
    /// Default request with a custom page size
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            paginator: Paginator::with_page_size(page_size),
            ..Default::default()
        }
    }
}

/// Result returned by a data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingResult<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<Vec<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paginator: Option<Paginator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl<T> Default for ListingResult<T> {
    fn default() -> Self {
        Self {
            listing: None,
            filters: None,
            paginator: None,
            date_range: None,
        }
    }
}

impl<T> ListingResult<T> {
    /// Result carrying only rows
    pub fn from_rows(rows: Vec<T>) -> Self {
        Self {
            listing: Some(rows),
            ..Default::default()
        }
    }

    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = Some(paginator);
        self
    }
}
