//! CSV Export
//!
//! Turns the exportable columns of a listing into a CSV file. Rows come from
//! the provider's "export all" call when it has one, otherwise from a single
//! oversized request built from the current one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use super::column::Column;
use super::data_provider::ListingDataProvider;
use crate::constants::DEFAULT_EXPORT_FILE_NAME;
use crate::domain::{ListingRequest, Paginator, PagingMode};
use crate::error::{Error, Result};
use crate::state::listing_state::ListingState;

/// Name of the exported file
#[derive(Clone)]
pub enum ExportFileName {
    Static(String),
    Generated(Arc<dyn Fn() -> String + Send + Sync>),
}

impl ExportFileName {
    /// `<prefix>-YYYYmmdd-HHMMSS.csv` in local time, evaluated at export
    pub fn timestamped(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        ExportFileName::Generated(Arc::new(move || {
            format!("{}-{}.csv", prefix, Local::now().format("%Y%m%d-%H%M%S"))
        }))
    }

    pub fn resolve(&self) -> String {
        match self {
            ExportFileName::Static(name) => name.clone(),
            ExportFileName::Generated(generate) => generate(),
        }
    }
}

impl Default for ExportFileName {
    fn default() -> Self {
        ExportFileName::Static(DEFAULT_EXPORT_FILE_NAME.to_string())
    }
}

impl fmt::Debug for ExportFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFileName::Static(name) => f.debug_tuple("Static").field(name).finish(),
            ExportFileName::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

/// Quote a cell, doubling inner quotes
pub fn escape_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render rows as CSV text
///
/// Non-exportable columns are skipped. Every cell, header included, is quoted.
pub fn render_csv<R: 'static>(columns: &[Column<R>], rows: &[R]) -> String {
    let exported: Vec<&Column<R>> = columns.iter().filter(|c| c.is_exported()).collect();

    let header = exported
        .iter()
        .map(|c| escape_cell(&c.label))
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header);
    for row in rows {
        lines.push(
            exported
                .iter()
                .map(|c| escape_cell(&c.cell_value(row)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Request for every row matching the current query
pub fn export_request(request: &ListingRequest, min_page_size: u32) -> ListingRequest {
    let total = request.paginator.total.unwrap_or(0);
    let page_size = u32::try_from(total)
        .unwrap_or(u32::MAX)
        .max(min_page_size)
        .max(1);

    ListingRequest {
        paginator: Paginator {
            start: Some(0),
            page_size: Some(page_size),
            total: request.paginator.total,
            cursor: None,
        },
        ..request.clone()
    }
}

/// Whether the loaded page already holds every row
fn loaded_is_complete<T>(state: &ListingState<T>) -> bool {
    state.paging_mode() == PagingMode::Offset
        && state.current_page() == 1
        && state
            .request()
            .paginator
            .total
            .is_some_and(|total| total <= state.listing().len() as u64)
}

/// Gather the rows to export
pub async fn export_rows<P: ListingDataProvider>(
    provider: &P,
    state: &ListingState<P::Row>,
    min_page_size: u32,
) -> Result<Vec<P::Row>> {
    if let Some(fetch_all) = provider.fetch_all() {
        return fetch_all.await;
    }

    if loaded_is_complete(state) {
        return Ok(state.listing().to_vec());
    }

    let request = export_request(state.request(), min_page_size);
    let result = provider.fetch(request).await?;
    Ok(result.listing.unwrap_or_default())
}

/// Write CSV text into `dir`
pub async fn write_csv(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let is_plain_name = Path::new(file_name)
        .file_name()
        .is_some_and(|name| name == file_name);
    if !is_plain_name {
        return Err(Error::Export {
            message: format!("Export file name must not contain a path: {file_name}"),
        });
    }

    let path = dir.join(file_name);
    smol::fs::write(&path, content).await?;
    Ok(path)
}
