//! Batched record export with automatic sheet splitting
//!
//! [`BatchWriter`] streams records into a workbook held in an anonymous temp
//! file. A sheet holds at most [`SHEET_ROW_LIMIT`] rows including its header
//! (and its total row when statistics are collected); further records go to
//! a new sheet named `<base>1`, `<base>2`, ...
//!
//! ```no_run
//! use excelbatch::config::ExportConfig;
//! use excelbatch::writer::BatchWriter;
//! # use excelbatch::schema::{FieldTable, Record};
//! # #[derive(Default)] struct User;
//! # impl Record for User { fn fields(_: &mut FieldTable<Self>) {} }
//! # fn load_page(_: usize) -> Vec<User> { Vec::new() }
//!
//! let config = ExportConfig::from_env();
//! let mut writer = BatchWriter::<User>::new("Users", &config)?;
//! for page in 0..10 {
//!     writer.write_batch(&load_page(page))?;
//! }
//! let file_name = writer.finish()?;
//! println!("exported {} rows to {}", writer.written_rows(), file_name);
//! # Ok::<(), excelbatch::ExcelError>(())
//! ```

use crate::binding::Direction;
use crate::config::{ExportConfig, FsImageLoader, ImageLoader};
use crate::error::{ExcelError, Result};
use crate::mapper::{ColumnTotals, WritePlan};
use crate::schema::{Record, Schema};
use crate::xlsx::{ColumnLayout, SheetLayout, StreamingWorkbook, Validation};
use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Rows per sheet, header included
pub const SHEET_ROW_LIMIT: u32 = 65_536;

/// Longest sheet name a workbook accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Replace characters sheet names may not contain and cut to 31 characters.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();

    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Name of the sheet at 0-based `index`: the base name, then `base1`, `base2`, ...
fn sheet_name(base: &str, index: u32) -> String {
    if index == 0 {
        return base.to_string();
    }
    let suffix = index.to_string();
    let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.len());
    let mut name: String = base.chars().take(keep).collect();
    name.push_str(&suffix);
    name
}

/// Streams records of type `T` into a multi-sheet workbook
pub struct BatchWriter<T> {
    plan: WritePlan<T>,
    config: ExportConfig,
    base_name: String,
    /// `None` once finished
    workbook: Option<StreamingWorkbook>,
    loader: Box<dyn ImageLoader>,
    totals: ColumnTotals,
    row_height: f64,
    sheet_index: u32,
    sheet_name: String,
    header_written: bool,
    written_rows: usize,
}

impl<T: Record> BatchWriter<T> {
    /// Writer over the export schema of `T`, with the first sheet open.
    pub fn new(base_name: &str, config: &ExportConfig) -> Result<Self> {
        let schema = Schema::build(Direction::Export)?;
        Self::with_schema(Arc::new(schema), base_name, config)
    }

    /// Writer over an explicit schema, e.g. an import schema for templates.
    pub fn with_schema(schema: Arc<Schema<T>>, base_name: &str, config: &ExportConfig) -> Result<Self> {
        let layout = SheetLayout {
            columns: schema
                .fields()
                .iter()
                .map(|f| {
                    let binding = f.binding();
                    ColumnLayout {
                        width: binding.column_width,
                        label: binding.label.clone(),
                        validation: Validation {
                            prompt: binding.prompt_text().map(str::to_string),
                            options: binding.combo.clone(),
                        },
                    }
                })
                .collect(),
        };
        let row_height = schema.max_row_height();

        let base_name = sanitize_sheet_name(base_name);
        let mut workbook =
            StreamingWorkbook::new(layout, config.compression_level, config.flush_interval)?;
        workbook.add_worksheet(&base_name)?;

        let plan = WritePlan::new(schema);
        let totals = plan.totals();

        Ok(BatchWriter {
            plan,
            config: config.clone(),
            sheet_name: base_name.clone(),
            base_name,
            workbook: Some(workbook),
            loader: Box::new(FsImageLoader::from(config)),
            totals,
            row_height,
            sheet_index: 0,
            header_written: false,
            written_rows: 0,
        })
    }

    /// Replace the file-system image loader.
    pub fn with_image_loader<L: ImageLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Records written so far across all sheets
    pub fn written_rows(&self) -> usize {
        self.written_rows
    }

    pub fn sheet_count(&self) -> usize {
        self.sheet_index as usize + 1
    }

    pub fn is_closed(&self) -> bool {
        self.workbook.is_none()
    }

    /// Write the header row of the current sheet if it has none yet.
    pub fn write_header(&mut self) -> Result<()> {
        let workbook = self.workbook.as_mut().ok_or(ExcelError::WriterClosed)?;
        if !self.header_written {
            workbook.write_row(&self.plan.header(), None)?;
            self.header_written = true;
        }
        Ok(())
    }

    /// Append `records`, opening new sheets at the row ceiling.
    pub fn write_batch(&mut self, records: &[T]) -> Result<()> {
        if self.workbook.is_none() {
            return Err(ExcelError::WriterClosed);
        }
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    fn write_record(&mut self, record: &T) -> Result<()> {
        let reserved = if self.totals.is_enabled() { 1 } else { 0 };
        let rows = self.workbook.as_ref().map(|w| w.rows_in_sheet()).unwrap_or(0);
        if rows + reserved >= SHEET_ROW_LIMIT {
            self.next_sheet()?;
        }
        self.write_header()?;

        let output = self.plan.write_row(record);
        let workbook = self.workbook.as_mut().ok_or(ExcelError::WriterClosed)?;
        let row = workbook.rows_in_sheet();

        workbook
            .write_row(&output.cells, Some(self.row_height))
            .map_err(|e| ExcelError::WriteRowError {
                row: row + 1,
                sheet: self.sheet_name.clone(),
                source: Box::new(e),
            })?;

        self.totals.add_row(&output);

        for (col, reference) in output.images {
            match self.loader.load_image(&reference) {
                Ok(bytes) => workbook.add_image(row, col, bytes)?,
                Err(e) => log::warn!("Skipping image '{}' at row {}: {}", reference, row + 1, e),
            }
        }

        self.written_rows += 1;
        Ok(())
    }

    fn next_sheet(&mut self) -> Result<()> {
        let workbook = self.workbook.as_mut().ok_or(ExcelError::WriterClosed)?;
        seal_sheet(&self.plan, &self.totals, self.header_written, workbook)?;

        self.sheet_index += 1;
        self.sheet_name = sheet_name(&self.base_name, self.sheet_index);
        workbook.add_worksheet(&self.sheet_name)?;
        self.header_written = false;
        self.totals.reset();

        log::info!(
            "Sheet limit reached after {} rows, continuing in '{}'",
            self.written_rows,
            self.sheet_name
        );
        Ok(())
    }

    /// Take the workbook out (the writer is closed from here on) and finalize it.
    fn close_workbook(&mut self) -> Result<File> {
        let mut workbook = self.workbook.take().ok_or(ExcelError::WriterClosed)?;
        seal_sheet(&self.plan, &self.totals, self.header_written, &mut workbook)?;
        workbook.close()
    }

    /// Persist the workbook as `<uuid>_<base>.xlsx` in the download
    /// directory and return the file name.
    pub fn finish(&mut self) -> Result<String> {
        let mut archive = self.close_workbook()?;

        let dir = &self.config.download_dir;
        std::fs::create_dir_all(dir)?;
        let file_name = format!("{}_{}.xlsx", Uuid::new_v4(), self.base_name);

        let mut temp = NamedTempFile::new_in(dir)?;
        io::copy(&mut archive, &mut temp)?;
        temp.flush()?;
        temp.persist(dir.join(&file_name))
            .map_err(|e| ExcelError::IoError(e.error))?;

        log::info!(
            "Exported {} rows in {} sheets to {}",
            self.written_rows,
            self.sheet_count(),
            file_name
        );
        Ok(file_name)
    }

    /// Copy the finished workbook into `sink` instead of a named file.
    pub fn finish_to<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        let mut archive = self.close_workbook()?;
        io::copy(&mut archive, sink)?;
        sink.flush()?;

        log::info!(
            "Exported {} rows in {} sheets to stream",
            self.written_rows,
            self.sheet_count()
        );
        Ok(())
    }
}

/// Complete the open sheet: header when nothing was written, total row when
/// statistics are collected.
fn seal_sheet<T: Record>(
    plan: &WritePlan<T>,
    totals: &ColumnTotals,
    header_written: bool,
    workbook: &mut StreamingWorkbook,
) -> Result<()> {
    if !header_written {
        workbook.write_row(&plan.header(), None)?;
    }
    if totals.is_enabled() {
        workbook.write_row(&totals.total_row(), None)?;
    }
    Ok(())
}
