//! Spreadsheet coordinate notation (`Sheet1!A1:A10`).
//!
//! Rows are 1-based. Only single-column ranges are accepted; a range whose
//! first and last column differ is rejected rather than guessed at.

use std::fmt;
use std::str::FromStr;

use crate::error::RangeError;

/// A parsed single-column range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet_title: String,
    /// Upper-case column letters, identical for both ends of the range.
    pub column: String,
    pub start_row: u32,
    pub end_row: u32,
    index: u32,
}

impl SheetRange {
    /// Parse `Sheet!A1:A10` (or a single cell, `Sheet!A1`).
    ///
    /// The sheet title is everything before the first `!`. `$` anchors are
    /// ignored.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let (sheet_title, cells) = input
            .split_once('!')
            .ok_or_else(|| RangeError::MissingSheet(input.to_string()))?;
        if sheet_title.is_empty() {
            return Err(RangeError::MissingSheet(input.to_string()));
        }

        let (first, last) = cells.split_once(':').unwrap_or((cells, cells));
        let (start_column, start_row, index) = parse_cell(input, first)?;
        let (end_column, end_row, _) = parse_cell(input, last)?;

        if start_column != end_column {
            return Err(RangeError::MultiColumn {
                range: input.to_string(),
                first: start_column,
                last: end_column,
            });
        }
        if start_row > end_row {
            return Err(RangeError::InvertedRows(input.to_string()));
        }

        Ok(Self {
            sheet_title: sheet_title.to_string(),
            column: end_column,
            start_row,
            end_row,
            index,
        })
    }

    /// Number of rows the range nominally spans.
    pub fn row_span(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    /// 0-based index of the range's column.
    pub fn column_index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{}:{}{}",
            self.sheet_title, self.column, self.start_row, self.column, self.end_row
        )
    }
}

impl FromStr for SheetRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split a cell address into upper-case column letters, its row number and
/// the 0-based column index.
fn parse_cell(range: &str, cell: &str) -> Result<(String, u32, u32), RangeError> {
    let cell: String = cell.trim().chars().filter(|c| *c != '$').collect();
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| RangeError::MissingRow(range.to_string()))?;
    let (letters, digits) = cell.split_at(split);

    let index = column_index(letters)
        .ok_or_else(|| RangeError::InvalidColumn(range.to_string(), cell.clone()))?;
    let row = digits
        .parse::<u32>()
        .ok()
        .filter(|row| *row > 0)
        .ok_or_else(|| RangeError::MissingRow(range.to_string()))?;

    Ok((letters.to_ascii_uppercase(), row, index))
}

/// 0-based column index for column letters: `A` → 0, `Z` → 25, `AA` → 26.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}
