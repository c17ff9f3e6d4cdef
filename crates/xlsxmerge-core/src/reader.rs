//! Streaming access to the first worksheet of an XLSX workbook
//!
//! Decoding is push-style: the reader opens a workbook, takes its first
//! sheet, and drives a [`SheetHandler`] with one `on_row_start` /
//! `on_cell`* / `on_row_end` sequence per populated row, in increasing row
//! order. Empty cells are not reported; each reported cell carries its A1
//! reference so the handler can place it at the true column.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::error::{Error, Result};

/// Receiver for per-row, per-cell decode events
pub trait SheetHandler {
    /// A new row begins; `row` is the zero-based absolute row index
    fn on_row_start(&mut self, row: u32);

    /// One cell of the current row, with its A1 reference when known
    fn on_cell(&mut self, reference: Option<&str>, value: &str);

    /// The current row is complete
    fn on_row_end(&mut self, row: u32) -> Result<()>;
}

/// Outcome of a per-workbook decoding session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetOutcome {
    /// The first sheet was streamed through the handler
    Streamed,
    /// The workbook exposes no sheet at all
    NoSheet,
}

/// Decode the first worksheet of `path`, pushing its rows into `handler`.
///
/// The workbook is released when this returns, on every path. Decode
/// failures are wrapped with the offending file's path.
pub fn stream_first_sheet<H: SheetHandler>(path: &Path, handler: &mut H) -> Result<SheetOutcome> {
    let workbook_error = |source| Error::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(workbook_error)?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(SheetOutcome::NoSheet);
    };
    let range = range.map_err(workbook_error)?;

    // used_cells() positions are relative to the range's top-left corner.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut open_row: Option<u32> = None;
    for (row, col, cell) in range.used_cells() {
        let row = start_row + row as u32;
        let col = start_col + col as u32;

        if open_row != Some(row) {
            if let Some(prev) = open_row {
                handler.on_row_end(prev)?;
            }
            handler.on_row_start(row);
            open_row = Some(row);
        }

        let reference = cell_reference(col, row);
        handler.on_cell(Some(&reference), &format_cell(cell));
    }
    if let Some(prev) = open_row {
        handler.on_row_end(prev)?;
    }

    Ok(SheetOutcome::Streamed)
}

/// Render a decoded cell as the text that goes into the output.
///
/// Dates carry no cell-style information at this layer, so date-only values
/// render as `YYYY-MM-DD` and anything with a time of day as
/// `YYYY-MM-DD HH:MM:SS`.
pub fn format_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) if dt.time() == chrono::NaiveTime::MIN => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Build an A1-style reference from zero-based column and row indices
pub fn cell_reference(col: u32, row: u32) -> String {
    let mut letters = String::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.insert(0, (b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.push_str(&(row + 1).to_string());
    letters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::column_index_from_reference;

    #[test]
    fn test_cell_reference_first_columns() {
        assert_eq!(cell_reference(0, 0), "A1");
        assert_eq!(cell_reference(2, 4), "C5");
        assert_eq!(cell_reference(25, 0), "Z1");
    }

    #[test]
    fn test_cell_reference_multi_letter() {
        assert_eq!(cell_reference(26, 9), "AA10");
        assert_eq!(cell_reference(27, 0), "AB1");
        assert_eq!(cell_reference(701, 0), "ZZ1");
        assert_eq!(cell_reference(702, 0), "AAA1");
    }

    #[test]
    fn test_cell_reference_inverts_resolver() {
        for col in [0u32, 1, 25, 26, 51, 52, 700, 701, 702, 16383] {
            let reference = cell_reference(col, 3);
            assert_eq!(
                column_index_from_reference(Some(&reference), 0),
                col as usize,
                "reference {reference}"
            );
        }
    }

    #[test]
    fn test_format_cell_scalars() {
        assert_eq!(format_cell(&Data::Empty), "");
        assert_eq!(format_cell(&Data::String("Precinct 1".to_string())), "Precinct 1");
        assert_eq!(format_cell(&Data::Int(42)), "42");
        assert_eq!(format_cell(&Data::Float(30.0)), "30");
        assert_eq!(format_cell(&Data::Float(2.5)), "2.5");
    }

    #[test]
    fn test_format_cell_bools() {
        assert_eq!(format_cell(&Data::Bool(true)), "TRUE");
        assert_eq!(format_cell(&Data::Bool(false)), "FALSE");
    }

    #[test]
    fn test_format_cell_iso_strings() {
        assert_eq!(
            format_cell(&Data::DateTimeIso("2024-11-05T08:00:00".to_string())),
            "2024-11-05T08:00:00"
        );
        assert_eq!(format_cell(&Data::DurationIso("PT1H30M".to_string())), "PT1H30M");
    }
}
