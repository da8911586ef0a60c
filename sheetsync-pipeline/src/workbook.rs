//! Local workbook: a JSON-file-backed [`SheetsClient`].
//!
//! Persists a [`Workbook`] document at a caller-chosen path. Every mutating
//! call saves the whole document with the atomic `.tmp` + rename pattern.
//! Read / write semantics follow the spreadsheet service: reads stop at the
//! last non-empty row, writes must stay inside the sheet's grid.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use sheetsync_core::SheetRange;

use crate::client::{
    sheet_title_matches, SheetProperties, SheetsClient, SpreadsheetInfo, ValueRange, WriteSummary,
};
use crate::error::{io_err, PipelineError, ServiceError};

/// On-disk workbook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Workbook {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub sheets: Vec<LocalSheet>,
}

/// One sheet: grid size plus row-major cell values starting at row 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSheet {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: u32,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl LocalSheet {
    fn cell(&self, row: u32, column: usize) -> Option<&Value> {
        let row = self.rows.get(usize::try_from(row).ok()?.checked_sub(1)?)?;
        row.get(column).filter(|v| !is_empty_cell(v))
    }

    fn read(&self, range: &SheetRange) -> Vec<Vec<Value>> {
        let column = range.column_index() as usize;
        let mut values: Vec<Vec<Value>> = (range.start_row..=range.end_row)
            .take_while(|row| (*row as usize) <= self.rows.len())
            .map(|row| self.cell(row, column).cloned().into_iter().collect())
            .collect();
        while values.last().is_some_and(|row| row.is_empty()) {
            values.pop();
        }
        values
    }

    fn write(&mut self, range: &SheetRange, values: Vec<Vec<Value>>) -> Result<u32, ServiceError> {
        if range.end_row > self.row_count {
            return Err(ServiceError::new(format!(
                "Range ({range}) exceeds grid limits. Max rows: {}",
                self.row_count
            ))
            .with_details(json!({ "code": 400 })));
        }
        if values.len() > range.row_span() as usize {
            return Err(ServiceError::new(format!(
                "Requested writing within range [{range}], but tried writing to row [{}]",
                range.start_row as usize + values.len() - 1
            ))
            .with_details(json!({ "code": 400 })));
        }

        let column = range.column_index() as usize;
        let mut written = 0;
        for (offset, row_values) in values.into_iter().enumerate() {
            let value = row_values.into_iter().next().unwrap_or(Value::Null);
            let index = range.start_row as usize - 1 + offset;
            if self.rows.len() <= index {
                self.rows.resize_with(index + 1, Vec::new);
            }
            let row = &mut self.rows[index];
            if row.len() <= column {
                row.resize(column + 1, Value::Null);
            }
            row[column] = value;
            written += 1;
        }
        Ok(written)
    }
}

fn is_empty_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Load a workbook JSON document.
pub fn load_workbook(path: &Path) -> Result<Workbook, PipelineError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save a workbook JSON document atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_workbook(path: &Path, workbook: &Workbook) -> Result<(), PipelineError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(workbook)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

/// A [`SheetsClient`] over an in-memory workbook, optionally mirrored to disk.
pub struct LocalWorkbook {
    path: Option<PathBuf>,
    workbook: Mutex<Workbook>,
}

impl LocalWorkbook {
    /// In-memory only; nothing is written to disk.
    pub fn new(workbook: Workbook) -> Self {
        Self {
            path: None,
            workbook: Mutex::new(workbook),
        }
    }

    /// Open the workbook at `path`; mutations are saved back to it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let path = path.into();
        let workbook = load_workbook(&path)?;
        Ok(Self {
            path: Some(path),
            workbook: Mutex::new(workbook),
        })
    }

    /// Current contents.
    pub async fn snapshot(&self) -> Workbook {
        self.workbook.lock().await.clone()
    }

    fn persist(&self, workbook: &Workbook) -> Result<(), ServiceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        save_workbook(path, workbook)
            .map_err(|e| ServiceError::new(format!("failed to persist workbook: {e}")))
    }
}

fn check_spreadsheet(workbook: &Workbook, spreadsheet_id: &str) -> Result<(), ServiceError> {
    if workbook.spreadsheet_id == spreadsheet_id {
        Ok(())
    } else {
        Err(ServiceError::new("Requested entity was not found.")
            .with_details(json!({ "code": 404, "spreadsheet_id": spreadsheet_id })))
    }
}

fn parse_range(range: &str) -> Result<SheetRange, ServiceError> {
    SheetRange::parse(range).map_err(|e| {
        ServiceError::new(format!("Unable to parse range: {range}"))
            .with_details(json!({ "code": 400, "reason": e.to_string() }))
    })
}

fn sheet_mut<'a>(workbook: &'a mut Workbook, title: &str) -> Result<&'a mut LocalSheet, ServiceError> {
    workbook
        .sheets
        .iter_mut()
        .find(|s| sheet_title_matches(&s.title, title))
        .ok_or_else(|| ServiceError::new(format!("Unable to parse range: {title}")))
}

#[async_trait]
impl SheetsClient for LocalWorkbook {
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, ServiceError> {
        let workbook = self.workbook.lock().await;
        check_spreadsheet(&workbook, spreadsheet_id)?;
        let parsed = parse_range(range)?;
        let sheet = workbook
            .sheets
            .iter()
            .find(|s| sheet_title_matches(&s.title, &parsed.sheet_title))
            .ok_or_else(|| ServiceError::new(format!("Unable to parse range: {range}")))?;

        Ok(ValueRange {
            range: parsed.to_string(),
            values: sheet.read(&parsed),
        })
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, ServiceError> {
        let workbook = self.workbook.lock().await;
        check_spreadsheet(&workbook, spreadsheet_id)?;
        Ok(SpreadsheetInfo {
            spreadsheet_id: workbook.spreadsheet_id.clone(),
            sheets: workbook
                .sheets
                .iter()
                .map(|s| SheetProperties {
                    sheet_id: s.sheet_id,
                    title: s.title.clone(),
                    row_count: s.row_count,
                })
                .collect(),
        })
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        count: u32,
    ) -> Result<(), ServiceError> {
        let mut workbook = self.workbook.lock().await;
        check_spreadsheet(&workbook, spreadsheet_id)?;
        let sheet = workbook
            .sheets
            .iter_mut()
            .find(|s| s.sheet_id == sheet_id)
            .ok_or_else(|| ServiceError::new(format!("No grid with id: {sheet_id}")))?;
        sheet.row_count = sheet
            .row_count
            .checked_add(count)
            .ok_or_else(|| ServiceError::new("row count overflow"))?;
        self.persist(&workbook)
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<WriteSummary, ServiceError> {
        let mut workbook = self.workbook.lock().await;
        check_spreadsheet(&workbook, spreadsheet_id)?;
        let parsed = parse_range(range)?;
        let written = sheet_mut(&mut workbook, &parsed.sheet_title)?.write(&parsed, values)?;
        self.persist(&workbook)?;
        Ok(WriteSummary {
            updated_range: parsed.to_string(),
            updated_rows: written,
            updated_cells: written,
        })
    }
}
