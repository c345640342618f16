//! Batched, callback-driven import of records from xlsx documents

use crate::binding::Direction;
use crate::codec::decode_cell;
use crate::error::{ExcelError, Result};
use crate::header::{resolve_header, MergedRegion, SheetGrid};
use crate::mapper::{DecodePolicy, ReadPlan};
use crate::schema::{Record, Schema};
use crate::types::CellValue;
use calamine::{Data, Range, Reader, Xlsx};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Open a document on disk for reading.
pub fn open<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| ExcelError::DocumentNotFound(format!("{}: {}", path.display(), e)))?;
    Ok(BufReader::new(file))
}

/// One worksheet decoded into memory, with its merged regions
pub struct LoadedSheet {
    name: String,
    range: Range<Data>,
    merged: Vec<MergedRegion>,
}

impl LoadedSheet {
    /// Load the sheet called `sheet_name`; an empty name selects the first sheet.
    pub fn load<RS: Read + Seek>(source: RS, sheet_name: &str) -> Result<Self> {
        let mut workbook = open_workbook(source)?;
        let names = workbook.sheet_names();

        let name = if sheet_name.is_empty() {
            names.first().cloned()
        } else {
            names.iter().find(|n| n.as_str() == sheet_name).cloned()
        };
        let name = name.ok_or_else(|| ExcelError::SheetNotFound {
            sheet: sheet_name.to_string(),
            available: names.join(", "),
        })?;

        Self::from_workbook(&mut workbook, name)
    }

    /// Load the sheet at 0-based `index`.
    pub fn load_at<RS: Read + Seek>(source: RS, index: usize) -> Result<Self> {
        let mut workbook = open_workbook(source)?;
        let names = workbook.sheet_names();
        let name = names
            .get(index)
            .cloned()
            .ok_or_else(|| ExcelError::SheetNotFound {
                sheet: format!("index {}", index),
                available: names.join(", "),
            })?;

        Self::from_workbook(&mut workbook, name)
    }

    fn from_workbook<RS: Read + Seek>(workbook: &mut Xlsx<RS>, name: String) -> Result<Self> {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExcelError::ReadError(format!("sheet '{}': {}", name, e)))?;

        let merged = match workbook.worksheet_merge_cells(&name) {
            Some(Ok(dimensions)) => dimensions.iter().map(MergedRegion::from).collect(),
            Some(Err(e)) => {
                return Err(ExcelError::ReadError(format!(
                    "merged cells of '{}': {}",
                    name, e
                )))
            }
            None => Vec::new(),
        };

        Ok(LoadedSheet {
            name,
            range,
            merged,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn open_workbook<RS: Read + Seek>(source: RS) -> Result<Xlsx<RS>> {
    Xlsx::new(source).map_err(|e| ExcelError::DocumentNotFound(e.to_string()))
}

impl SheetGrid for LoadedSheet {
    fn cell(&self, row: u32, col: u32) -> CellValue {
        self.range
            .get_value((row, col))
            .map(decode_cell)
            .unwrap_or(CellValue::Empty)
    }

    fn row_count(&self) -> u32 {
        self.range.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    fn column_count(&self) -> u32 {
        self.range.end().map(|(_, col)| col + 1).unwrap_or(0)
    }

    fn merged_regions(&self) -> &[MergedRegion] {
        &self.merged
    }
}

/// Sheet selection and batching for one read
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadOptions {
    /// Empty selects the first sheet
    pub sheet_name: String,
    /// First header row, 0-based
    pub header_start: u32,
    /// Last header row, inclusive
    pub header_end: u32,
    /// First data row, 0-based
    pub data_start: u32,
    pub batch_size: usize,
    pub policy: DecodePolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            sheet_name: String::new(),
            header_start: 0,
            header_end: 0,
            data_start: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            policy: DecodePolicy::BestEffort,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str) -> Self {
        self.sheet_name = name.to_string();
        self
    }

    /// Inclusive header row range
    pub fn with_header_rows(mut self, start: u32, end: u32) -> Self {
        self.header_start = start;
        self.header_end = end;
        self
    }

    pub fn with_data_start(mut self, row: u32) -> Self {
        self.data_start = row;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ExcelError::InvalidArgument(
                "batch size must be greater than 0".to_string(),
            ));
        }
        if self.header_end < self.header_start {
            return Err(ExcelError::InvalidArgument(format!(
                "header rows {}..={} are reversed",
                self.header_start, self.header_end
            )));
        }
        Ok(())
    }
}

/// Imports records of type `T` in batches
///
/// # Examples
///
/// ```no_run
/// use excelbatch::reader::{open, BatchReader, ReadOptions};
/// # use excelbatch::schema::{FieldTable, Record};
/// # #[derive(Default)] struct User;
/// # impl Record for User { fn fields(_: &mut FieldTable<Self>) {} }
///
/// let mut reader = BatchReader::<User>::new()?;
/// let options = ReadOptions::new().with_batch_size(500);
/// let total = reader.read_batch(open("users.xlsx")?, &options, |batch, number, so_far| {
///     println!("batch {} with {} users ({} so far)", number, batch.len(), so_far);
///     true
/// })?;
/// # Ok::<(), excelbatch::ExcelError>(())
/// ```
pub struct BatchReader<T> {
    schema: Arc<Schema<T>>,
    read_rows: usize,
}

impl<T: Record> BatchReader<T> {
    /// Reader over the import schema of `T`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_schema(Arc::new(Schema::build(Direction::Import)?)))
    }

    /// Reuse an already built schema.
    pub fn with_schema(schema: Arc<Schema<T>>) -> Self {
        BatchReader {
            schema,
            read_rows: 0,
        }
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    /// Rows kept by the last read
    pub fn read_rows(&self) -> usize {
        self.read_rows
    }

    /// Map the data rows of the selected sheet and hand them to `callback`
    /// in batches of `options.batch_size`, with the 1-based batch number and
    /// the running count of kept rows. Returning `false` from the callback
    /// stops the read. Returns the number of kept rows.
    pub fn read_batch<RS, F>(&mut self, source: RS, options: &ReadOptions, mut callback: F) -> Result<usize>
    where
        RS: Read + Seek,
        F: FnMut(Vec<T>, usize, usize) -> bool,
    {
        options.validate()?;
        self.read_rows = 0;

        let sheet = LoadedSheet::load(source, &options.sheet_name)?;
        let header = resolve_header(&sheet, options.header_start, options.header_end);
        let plan = ReadPlan::new(Arc::clone(&self.schema), &header, options.policy);
        let total_rows = sheet.row_count();

        log::info!(
            "Reading sheet '{}': {} rows, data from row {}, batch size {}",
            sheet.name(),
            total_rows,
            options.data_start,
            options.batch_size
        );
        if plan.mapped_columns() == 0 {
            log::warn!(
                "Sheet '{}': no header column matches a bound field",
                sheet.name()
            );
        }

        let capacity = options.batch_size.min(4096);
        let mut batch = Vec::with_capacity(capacity);
        let mut batch_number = 0;
        let mut kept = 0;
        let mut stopped = false;

        for row in options.data_start..total_rows {
            let Some(record) = plan.read_row(&sheet, row)? else {
                continue;
            };
            batch.push(record);
            kept += 1;

            if batch.len() == options.batch_size {
                batch_number += 1;
                log::debug!("Batch {} ready at row {} ({} kept)", batch_number, row, kept);
                let full = std::mem::replace(&mut batch, Vec::with_capacity(capacity));
                if !callback(full, batch_number, kept) {
                    log::info!(
                        "Reading of '{}' stopped by the consumer after batch {}",
                        sheet.name(),
                        batch_number
                    );
                    stopped = true;
                    break;
                }
            }
        }

        if !stopped && !batch.is_empty() {
            batch_number += 1;
            log::debug!("Final batch {} with {} rows", batch_number, batch.len());
            callback(batch, batch_number, kept);
        }

        self.read_rows = kept;
        log::info!(
            "Finished sheet '{}': {} rows kept in {} batches",
            sheet.name(),
            kept,
            batch_number
        );
        Ok(kept)
    }

    /// Read every kept row into one vector.
    pub fn read_all<RS: Read + Seek>(&mut self, source: RS, options: &ReadOptions) -> Result<Vec<T>> {
        let mut records = Vec::new();
        self.read_batch(source, options, |batch, _, _| {
            records.extend(batch);
            true
        })?;
        Ok(records)
    }
}
