//! DataProvider Trait
//!
//! Abstraction over whatever answers a [`ListingRequest`]: a backend API call,
//! a closure, or an in-memory collection.

use std::cmp::Ordering;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::filter::{compare, lookup};
use crate::domain::{
    DateRange, ListingRequest, ListingResult, Paginator, PagingMode, SortBy, SortOrder,
};
use crate::error::{Error, Result};

/// Future resolving to one page of rows
pub type FetchFuture<R> = BoxFuture<'static, Result<ListingResult<R>>>;

/// Future resolving to every row, bypassing pagination
pub type FetchAllFuture<R> = BoxFuture<'static, Result<Vec<R>>>;

/// Trait for providing data to a listing
pub trait ListingDataProvider: Send + Sync + 'static {
    type Row: Clone + Send + Sync + 'static;

    /// Fetch the page described by `request`
    ///
    /// Should resolve with an empty listing rather than none when nothing matches.
    fn fetch(&self, request: ListingRequest) -> FetchFuture<Self::Row>;

    /// Fetch every row for export, if the source supports it
    fn fetch_all(&self) -> Option<FetchAllFuture<Self::Row>> {
        None
    }
}

type FetchAllFn<R> = Box<dyn Fn() -> FetchAllFuture<R> + Send + Sync>;

/// Provider backed by closures
pub struct FnDataProvider<R, F> {
    fetch: F,
    fetch_all: Option<FetchAllFn<R>>,
    _row: PhantomData<fn() -> R>,
}

impl<R, F, Fut> FnDataProvider<R, F>
where
    R: Clone + Send + Sync + 'static,
    F: Fn(ListingRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ListingResult<R>>> + Send + 'static,
{
    /// Create a provider from a fetch closure
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            fetch_all: None,
            _row: PhantomData,
        }
    }

    /// Add an "export all" closure
    pub fn with_fetch_all<A, AFut>(mut self, fetch_all: A) -> Self
    where
        A: Fn() -> AFut + Send + Sync + 'static,
        AFut: Future<Output = Result<Vec<R>>> + Send + 'static,
    {
        self.fetch_all = Some(Box::new(move || fetch_all().boxed()));
        self
    }
}

impl<R, F, Fut> ListingDataProvider for FnDataProvider<R, F>
where
    R: Clone + Send + Sync + 'static,
    F: Fn(ListingRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ListingResult<R>>> + Send + 'static,
{
    type Row = R;

    fn fetch(&self, request: ListingRequest) -> FetchFuture<R> {
        (self.fetch)(request).boxed()
    }

    fn fetch_all(&self) -> Option<FetchAllFuture<R>> {
        self.fetch_all.as_ref().map(|fetch_all| fetch_all())
    }
}

/// In-memory provider that filters, sorts and pages a fixed set of rows
pub struct VecDataProvider<R> {
    rows: Arc<Vec<R>>,
    /// JSON projection of `rows`, same order
    values: Arc<Vec<Value>>,
    paging_mode: PagingMode,
    /// Field a key-less date range applies to
    date_key: Option<String>,
    export_all: bool,
}

impl<R: Serialize + Clone + Send + Sync + 'static> VecDataProvider<R> {
    /// Create a new VecDataProvider
    pub fn new(rows: Vec<R>, paging_mode: PagingMode) -> Self {
        let values = rows
            .iter()
            .map(|row| {
                serde_json::to_value(row).unwrap_or_else(|e| {
                    warn!("Row cannot be projected to JSON, filters will skip it: {e}");
                    Value::Null
                })
            })
            .collect();

        Self {
            rows: Arc::new(rows),
            values: Arc::new(values),
            paging_mode,
            date_key: None,
            export_all: false,
        }
    }

    /// Field that a date range without its own key applies to
    pub fn with_date_key(mut self, key: impl Into<String>) -> Self {
        self.date_key = Some(key.into());
        self
    }

    /// Serve `fetch_all` for exports
    pub fn with_export_all(mut self) -> Self {
        self.export_all = true;
        self
    }

    /// Get all rows
    pub fn all(&self) -> &[R] {
        &self.rows
    }

    /// Answer a request synchronously
    pub fn query(&self, request: &ListingRequest) -> Result<ListingResult<R>> {
        let mut matched: Vec<usize> = (0..self.values.len())
            .filter(|&i| {
                let value = &self.values[i];
                request.filters.iter().all(|f| f.matches(value))
                    && request
                        .date_range
                        .as_ref()
                        .is_none_or(|range| self.in_date_range(value, range))
            })
            .collect();

        if let Some(sort_by) = &request.sort_by {
            self.sort(&mut matched, sort_by);
        }

        let page_size = request.paginator.page_size() as usize;
        let total = matched.len();

        let (start, paginator) = match self.paging_mode {
            PagingMode::Offset => {
                let start = request.paginator.start() as usize;
                let paginator = Paginator {
                    start: Some(start as u64),
                    page_size: Some(page_size as u32),
                    total: Some(total as u64),
                    cursor: None,
                };
                (start, paginator)
            }
            PagingMode::Cursor => {
                let start = match request.paginator.cursor() {
                    Some(cursor) => cursor
                        .parse::<usize>()
                        .map_err(|_| Error::fetch(format!("Unknown cursor: {cursor}")))?,
                    None => 0,
                };
                let end = start + page_size;
                let paginator = Paginator {
                    start: None,
                    page_size: Some(page_size as u32),
                    total: None,
                    cursor: (end < total).then(|| end.to_string()),
                };
                (start, paginator)
            }
            PagingMode::OpenEnded => {
                let start = request.paginator.start() as usize;
                let paginator = Paginator {
                    start: Some(start as u64),
                    page_size: Some(page_size as u32),
                    total: None,
                    cursor: None,
                };
                (start, paginator)
            }
        };

        let listing = matched
            .iter()
            .skip(start)
            .take(page_size)
            .map(|&i| self.rows[i].clone())
            .collect();

        Ok(ListingResult {
            listing: Some(listing),
            filters: None,
            paginator: Some(paginator),
            date_range: None,
        })
    }

    fn in_date_range(&self, value: &Value, range: &DateRange) -> bool {
        let Some(key) = range.key.as_deref().or(self.date_key.as_deref()) else {
            return true;
        };
        lookup(value, key)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .is_some_and(|instant| range.contains(&instant.with_timezone(&Utc)))
    }

    fn sort(&self, indices: &mut [usize], sort_by: &SortBy) {
        indices.sort_by(|&a, &b| {
            let left = lookup(&self.values[a], &sort_by.key);
            let right = lookup(&self.values[b], &sort_by.key);
            let ordering = match (left, right) {
                (Some(l), Some(r)) => compare(l, r).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match sort_by.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }
}

impl<R: Serialize + Clone + Send + Sync + 'static> ListingDataProvider for VecDataProvider<R> {
    type Row = R;

    fn fetch(&self, request: ListingRequest) -> FetchFuture<R> {
        future::ready(self.query(&request)).boxed()
    }

    fn fetch_all(&self) -> Option<FetchAllFuture<R>> {
        if !self.export_all {
            return None;
        }
        let rows = self.rows.as_ref().clone();
        Some(future::ready(Ok(rows)).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Filter;
    use serde_json::json;

    fn jobs() -> Vec<Value> {
        (1..=95)
            .map(|i| {
                json!({
                    "id": i,
                    "name": format!("job-{i:03}"),
                    "queue": if i % 2 == 0 { "high" } else { "normal" },
                    "submitted_on": format!("2024-03-{:02}T12:00:00Z", (i % 28) + 1),
                })
            })
            .collect()
    }

    #[test]
    fn test_offset_query() {
        let provider = VecDataProvider::new(jobs(), PagingMode::Offset);
        let mut request = ListingRequest::default();
        request.paginator.start = Some(90);

        let result = provider.query(&request).expect("query");
        let listing = result.listing.expect("listing");
        assert_eq!(listing.len(), 5);
        assert_eq!(listing[0]["id"], 91);
        assert_eq!(result.paginator.and_then(|p| p.total), Some(95));
    }

    #[test]
    fn test_filter_and_sort() {
        let provider = VecDataProvider::new(jobs(), PagingMode::Offset);
        let request = ListingRequest {
            filters: vec![Filter::eq("queue", "high")],
            sort_by: Some(SortBy::desc("id")),
            ..Default::default()
        };

        let result = provider.query(&request).expect("query");
        let listing = result.listing.expect("listing");
        assert_eq!(listing.len(), 30);
        assert_eq!(listing[0]["id"], 94);
        assert_eq!(result.paginator.and_then(|p| p.total), Some(47));
    }

    #[test]
    fn test_cursor_query_walks_to_the_end() {
        let provider = VecDataProvider::new(jobs(), PagingMode::Cursor);
        let mut request = ListingRequest::default();
        let mut seen = 0;

        loop {
            let result = provider.query(&request).expect("query");
            seen += result.listing.map(|l| l.len()).unwrap_or_default();
            match result.paginator.and_then(|p| p.cursor) {
                Some(cursor) => request.paginator.cursor = Some(cursor),
                None => break,
            }
        }
        assert_eq!(seen, 95);
    }

    #[test]
    fn test_bad_cursor_is_a_fetch_error() {
        let provider = VecDataProvider::new(jobs(), PagingMode::Cursor);
        let mut request = ListingRequest::default();
        request.paginator.cursor = Some("not-a-cursor".to_string());
        assert!(matches!(provider.query(&request), Err(Error::Fetch { .. })));
    }

    #[test]
    fn test_date_range() {
        let provider =
            VecDataProvider::new(jobs(), PagingMode::OpenEnded).with_date_key("submitted_on");
        let start = DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z")
            .expect("parse")
            .with_timezone(&Utc);
        let end = DateTime::parse_from_rfc3339("2024-03-02T23:59:59Z")
            .expect("parse")
            .with_timezone(&Utc);
        let request = ListingRequest {
            date_range: Some(DateRange::new(start, end)),
            ..Default::default()
        };

        let result = provider.query(&request).expect("query");
        // days 1 and 2 of the month come from i % 28 == 0 or 1
        assert_eq!(result.listing.map(|l| l.len()), Some(7));
        assert_eq!(result.paginator.and_then(|p| p.total), None);
    }

    #[tokio::test]
    async fn test_fetch_all_only_when_enabled() {
        let provider = VecDataProvider::new(jobs(), PagingMode::Offset);
        assert!(provider.fetch_all().is_none());

        let provider = provider.with_export_all();
        let rows = provider.fetch_all().expect("fetch_all").await.expect("rows");
        assert_eq!(rows.len(), 95);
    }
}
