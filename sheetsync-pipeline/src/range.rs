//! Where new rows land.
//!
//! Given the range that was read and how many rows came back, compute the
//! single-column destination range directly below the data and the highest
//! row the sheet must hold. Rows are 1-based.

use serde::Serialize;

use sheetsync_core::{RangeError, SheetRange};

use crate::client::ValueRange;

/// Destination for a batch of new rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertRange {
    /// `<sheet>!<col><start>:<col><end>`
    pub range: String,
    /// Last row written; the sheet grid must have at least this many rows.
    pub max_row: u32,
    pub sheet_title: String,
}

/// Compute the insert range below `occupied_rows` rows of data in `current`.
///
/// The last occupied row is clamped to the declared end of `current`, so a
/// read that returned more rows than the range spans still lands right after
/// the range.
pub fn insert_range(
    current: &SheetRange,
    occupied_rows: usize,
    count: usize,
) -> Result<InsertRange, RangeError> {
    if count == 0 {
        return Err(RangeError::EmptyInsert(current.to_string()));
    }

    let overflow = || RangeError::RowOverflow(current.to_string());
    let occupied = u64::try_from(occupied_rows).map_err(|_| overflow())?;
    let count = u64::try_from(count).map_err(|_| overflow())?;

    // start_row >= 1, so this cannot underflow.
    let occupied_last = (u64::from(current.start_row) + occupied - 1).min(u64::from(current.end_row));
    let insert_start = occupied_last + 1;
    let insert_end = u32::try_from(occupied_last + count).map_err(|_| overflow())?;

    let column = &current.column;
    Ok(InsertRange {
        range: format!(
            "{}!{column}{insert_start}:{column}{insert_end}",
            current.sheet_title
        ),
        max_row: insert_end,
        sheet_title: current.sheet_title.clone(),
    })
}

/// [`insert_range`] for the result of a range read: the occupied row count
/// is the number of rows the read returned.
pub fn map_current_range_to_insert_range(
    current: &ValueRange,
    count: usize,
) -> Result<InsertRange, RangeError> {
    let parsed = SheetRange::parse(&current.range)?;
    insert_range(&parsed, current.values.len(), count)
}
