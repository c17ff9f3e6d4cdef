//! Streaming merge of many workbooks into one combined CSV
//!
//! One shared [`MergeState`] lives for the whole run; each workbook gets a
//! fresh [`SheetMerger`] that borrows it for a single forward pass. The
//! canonical header comes from the first non-empty header row seen, is
//! written exactly once, and later files are validated against it. The
//! column baseline only grows: short rows are padded up to it and wider
//! rows raise it; rows already written are never revisited.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::encoder;
use crate::error::{Error, Result};
use crate::reader::{self, SheetHandler, SheetOutcome};
use crate::row::RowAssembler;
use crate::scanner;

/// How often a running record count is reported
const PROGRESS_INTERVAL: u64 = 5000;

/// Shared state for one merge run.
///
/// Owns the output stream exclusively; the header is set at most once and
/// the column baseline never decreases.
pub struct MergeState<W: Write> {
    writer: W,
    header: Option<Vec<String>>,
    column_count: Option<usize>,
    records_written: u64,
}

impl<W: Write> MergeState<W> {
    /// Create fresh state around an output stream
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header: None,
            column_count: None,
            records_written: 0,
        }
    }

    /// The canonical header, once one has been established
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Current output row width, if any row or header has established one
    pub fn column_count(&self) -> Option<usize> {
        self.column_count
    }

    /// Data records written so far (the header line is not counted)
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

/// Per-workbook event handler: assembles rows and reconciles them into the
/// shared merge state.
pub struct SheetMerger<'a, W: Write> {
    workbook_name: String,
    state: &'a mut MergeState<W>,
    assembler: RowAssembler,
}

impl<'a, W: Write> SheetMerger<'a, W> {
    /// Create a handler for one workbook's sheet pass
    pub fn new(workbook_name: impl Into<String>, state: &'a mut MergeState<W>) -> Self {
        Self {
            workbook_name: workbook_name.into(),
            state,
            assembler: RowAssembler::new(),
        }
    }

    fn handle_header_row(&mut self, values: Vec<String>) -> Result<()> {
        if values.is_empty() {
            eprintln!("Skipping header in {} (empty header row)", self.workbook_name);
            return Ok(());
        }

        let state = &mut *self.state;
        match &state.header {
            None => {
                // Data rows from an earlier headerless file may already have
                // established a wider baseline; the baseline never shrinks.
                let baseline = state.column_count.map_or(values.len(), |c| c.max(values.len()));
                state.column_count = Some(baseline);
                encoder::write_record(&mut state.writer, &values)?;
                state.header = Some(values);
            }
            Some(header) => {
                if !headers_match(header, &values) {
                    eprintln!(
                        "Header mismatch detected in {}. Proceeding with canonical header.",
                        self.workbook_name
                    );
                }
            }
        }
        Ok(())
    }

    fn handle_data_row(&mut self, mut values: Vec<String>) -> Result<()> {
        if values.iter().all(|v| v.is_empty()) {
            return Ok(());
        }

        let state = &mut *self.state;
        let baseline = *state.column_count.get_or_insert(values.len());
        while values.len() < baseline {
            values.push(String::new());
        }
        if values.len() > baseline {
            state.column_count = Some(values.len());
        }

        encoder::write_record(&mut state.writer, &values)?;
        state.records_written += 1;
        if state.records_written % PROGRESS_INTERVAL == 0 {
            println!("Total records written: {}", state.records_written);
        }
        Ok(())
    }
}

impl<W: Write> SheetHandler for SheetMerger<'_, W> {
    fn on_row_start(&mut self, _row: u32) {
        self.assembler.begin_row();
    }

    fn on_cell(&mut self, reference: Option<&str>, value: &str) {
        self.assembler.push_cell(reference, Some(value));
    }

    fn on_row_end(&mut self, row: u32) -> Result<()> {
        let values = self.assembler.finish_row();
        if row == 0 {
            self.handle_header_row(values)
        } else {
            self.handle_data_row(values)
        }
    }
}

/// Compare a candidate header against the canonical one, positionally.
///
/// Out-of-range positions on either side count as empty, so a header that
/// only differs by trailing empty columns still matches.
fn headers_match(canonical: &[String], other: &[String]) -> bool {
    let len = canonical.len().max(other.len());
    (0..len).all(|i| {
        let left = canonical.get(i).map_or("", |s| s.as_str());
        let right = other.get(i).map_or("", |s| s.as_str());
        left == right
    })
}

/// Summary of a completed merge run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Where the combined CSV was written
    pub output: PathBuf,
    /// Workbooks whose first sheet was merged
    pub workbooks_merged: usize,
    /// Workbooks skipped because they expose no sheet
    pub workbooks_skipped: usize,
    /// Total data records written (header line excluded)
    pub records_written: u64,
}

impl MergeReport {
    /// Save the report as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Merge every workbook in `data_dir` into one CSV at `output`.
///
/// Workbooks are processed in file-name order, one full pass each. A
/// workbook without any sheet is skipped with a warning; a decode error
/// aborts the whole run. The output file is created (or truncated) once and
/// flushed before returning.
pub fn merge_workbooks<P: AsRef<Path>, Q: AsRef<Path>>(data_dir: P, output: Q) -> Result<MergeReport> {
    let data_dir = data_dir.as_ref();
    let output = output.as_ref();

    let workbooks = scanner::list_workbooks(data_dir)?;
    if workbooks.is_empty() {
        return Err(Error::NoWorkbooks {
            dir: data_dir.to_path_buf(),
        });
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let started_at = Utc::now();
    let file = File::create(output)?;
    let mut state = MergeState::new(BufWriter::new(file));

    let mut workbooks_merged = 0;
    let mut workbooks_skipped = 0;
    for path in &workbooks {
        let name = workbook_name(path);
        let mut merger = SheetMerger::new(name.clone(), &mut state);
        match reader::stream_first_sheet(path, &mut merger)? {
            SheetOutcome::Streamed => workbooks_merged += 1,
            SheetOutcome::NoSheet => {
                eprintln!("Skipping {name} (no sheets)");
                workbooks_skipped += 1;
            }
        }
    }

    state.writer.flush()?;

    Ok(MergeReport {
        started_at,
        finished_at: Utc::now(),
        output: output.to_path_buf(),
        workbooks_merged,
        workbooks_skipped,
        records_written: state.records_written,
    })
}

fn workbook_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
