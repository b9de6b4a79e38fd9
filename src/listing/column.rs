//! Column Definition
//!
//! Defines table columns with their properties and plain-value accessors.

use serde::Serialize;

use crate::constants::CONNECT_SESSION_COLUMN_ID;
use crate::domain::filter::lookup_text;

type ValueFn<R> = Box<dyn Fn(&R) -> String + Send + Sync>;
type SortValueFn<R> = Box<dyn Fn(&R) -> Option<String> + Send + Sync>;

/// Column definition for a listing
pub struct Column<R> {
    /// Column identifier
    pub id: String,
    /// Column header label
    pub label: String,
    /// Whether the column is sortable
    pub sortable: bool,
    /// Whether the column is written to CSV exports
    pub exportable: bool,
    value: ValueFn<R>,
    sort_value: Option<SortValueFn<R>>,
}

impl<R: 'static> Column<R> {
    /// Create a new column
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        value: impl Fn(&R) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            sortable: false,
            exportable: true,
            value: Box::new(value),
            sort_value: None,
        }
    }

    /// Make the column sortable
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Raw value the column sorts by; preferred over the display value in exports
    pub fn sort_value(
        mut self,
        sort_value: impl Fn(&R) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.sort_value = Some(Box::new(sort_value));
        self
    }

    /// Keep the column out of CSV exports
    pub fn not_exportable(mut self) -> Self {
        self.exportable = false;
        self
    }

    /// Display value of a cell
    pub fn display_value(&self, row: &R) -> String {
        (self.value)(row)
    }

    /// Plain value of a cell for export
    ///
    /// Sort value first, then the display value.
    pub fn cell_value(&self, row: &R) -> String {
        self.sort_value
            .as_ref()
            .and_then(|sort_value| sort_value(row))
            .unwrap_or_else(|| self.display_value(row))
    }

    /// Whether the column appears in CSV exports
    pub fn is_exported(&self) -> bool {
        self.exportable && self.id != CONNECT_SESSION_COLUMN_ID
    }
}

impl<R: Serialize + 'static> Column<R> {
    /// Column reading the row field named by its id
    ///
    /// Dotted ids reach into nested objects. Missing or non-scalar fields
    /// render as an empty string.
    pub fn property(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        let key = id.clone();
        Self::new(id, label, move |row: &R| {
            serde_json::to_value(row)
                .ok()
                .and_then(|value| lookup_text(&value, &key))
                .unwrap_or_default()
        })
    }
}

impl<R> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("exportable", &self.exportable)
            .finish()
    }
}
