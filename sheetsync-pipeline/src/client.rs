//! The spreadsheet service seam.
//!
//! The pipeline only ever talks to a spreadsheet through [`SheetsClient`].
//! Calls are made one after another; timeouts and retries belong to the
//! implementation, not to the pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;

/// Values read from (or written to) a range, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueRange {
    /// The range the values cover, in coordinate notation.
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Grid metadata for one sheet of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: u32,
}

/// Spreadsheet metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SpreadsheetInfo {
    pub spreadsheet_id: String,
    pub sheets: Vec<SheetProperties>,
}

impl SpreadsheetInfo {
    /// Look a sheet up by the title used in a range.
    pub fn sheet(&self, title: &str) -> Option<&SheetProperties> {
        self.sheets.iter().find(|s| sheet_title_matches(&s.title, title))
    }
}

/// Whether a range's sheet title names `title`. A quoted range title
/// (`'Q1 leads'`, with `''` for a literal quote) also matches the bare one.
pub fn sheet_title_matches(title: &str, requested: &str) -> bool {
    if title == requested {
        return true;
    }
    requested
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .is_some_and(|bare| bare.replace("''", "'") == title)
}

/// Result of a successful range write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub updated_range: String,
    pub updated_rows: u32,
    pub updated_cells: u32,
}

/// Read / write access to a spreadsheet.
#[async_trait]
pub trait SheetsClient: Send + Sync {
    /// Read the values of a single range, unformatted.
    async fn read_range(&self, spreadsheet_id: &str, range: &str)
        -> Result<ValueRange, ServiceError>;

    /// Fetch sheet titles, ids and grid sizes.
    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, ServiceError>;

    /// Grow a sheet's grid by `count` rows.
    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        count: u32,
    ) -> Result<(), ServiceError>;

    /// Write row-major `values` into `range`.
    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<WriteSummary, ServiceError>;
}

#[async_trait]
impl<T: SheetsClient + ?Sized> SheetsClient for Arc<T> {
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, ServiceError> {
        (**self).read_range(spreadsheet_id, range).await
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, ServiceError> {
        (**self).get_spreadsheet(spreadsheet_id).await
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        count: u32,
    ) -> Result<(), ServiceError> {
        (**self).append_rows(spreadsheet_id, sheet_id, count).await
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<WriteSummary, ServiceError> {
        (**self).write_range(spreadsheet_id, range, values).await
    }
}
