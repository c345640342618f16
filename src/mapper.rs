//! Row <-> record mapping
//!
//! A [`ReadPlan`] pairs the columns of a resolved header with the bound
//! fields of an import schema; a [`WritePlan`] lays the fields of an export
//! schema out as consecutive columns. Both are built once per sheet (read)
//! or per writer (write) and reused for every row.

use crate::codec::{reverse_by_exp, CellCodec, EncodedCell};
use crate::error::{ExcelError, Result};
use crate::header::{HeaderIndex, SheetGrid};
use crate::schema::{FieldValue, Record, Schema, SchemaField};
use crate::types::{CellStyle, CellValue, StyledCell};
use std::sync::Arc;

/// Label written into the first column of a statistics row
pub const TOTAL_LABEL: &str = "Total";

/// What to do with a cell that cannot be converted into its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodePolicy {
    /// Leave the field at its default and keep going
    #[default]
    BestEffort,
    /// Abort the read with [`ExcelError::Decode`]
    Strict,
}

struct ReadColumn {
    column: u32,
    field: usize,
    codec: CellCodec,
}

/// Column plan for importing rows of one sheet
pub struct ReadPlan<T> {
    schema: Arc<Schema<T>>,
    columns: Vec<ReadColumn>,
    policy: DecodePolicy,
}

impl<T: Record> ReadPlan<T> {
    /// Bindings whose label is missing from `header` are left out; their
    /// fields keep the record's default.
    pub fn new(schema: Arc<Schema<T>>, header: &HeaderIndex, policy: DecodePolicy) -> Self {
        let columns = schema
            .fields()
            .iter()
            .enumerate()
            .filter_map(|(field, f)| {
                header.get(&f.binding().label).map(|column| ReadColumn {
                    column,
                    field,
                    codec: CellCodec::new(f.binding()),
                })
            })
            .collect();

        ReadPlan {
            schema,
            columns,
            policy,
        }
    }

    /// Number of bound fields found in the header
    pub fn mapped_columns(&self) -> usize {
        self.columns.len()
    }

    /// Map one physical row. `None` when every mapped cell is blank.
    pub fn read_row<G: SheetGrid + ?Sized>(&self, grid: &G, row: u32) -> Result<Option<T>> {
        let mut record = T::default();
        let mut kept = false;

        for col in &self.columns {
            let raw = grid.cell(row, col.column);
            if raw.is_blank() {
                continue;
            }
            kept = true;

            let field = &self.schema.fields()[col.field];
            let binding = col.codec.binding();
            let cell = match binding.dictionary_expr() {
                Some(expr) => {
                    CellValue::String(reverse_by_exp(&raw.as_string(), expr, &binding.separator))
                }
                None => raw,
            };

            match col.codec.coerce(&cell, field.field_type()) {
                Ok(FieldValue::Null) => {}
                Ok(value) => {
                    if !field.set(&mut record, value) {
                        self.reject(row, col.column, field, "value does not fit the field")?;
                    }
                }
                Err(message) => self.reject(row, col.column, field, &message)?,
            }
        }

        Ok(kept.then_some(record))
    }

    fn reject(&self, row: u32, column: u32, field: &SchemaField<T>, message: &str) -> Result<()> {
        match self.policy {
            DecodePolicy::BestEffort => {
                log::debug!(
                    "Row {} column {}: leaving '{}' unset ({})",
                    row,
                    column,
                    field.path(),
                    message
                );
                Ok(())
            }
            DecodePolicy::Strict => Err(ExcelError::Decode {
                row,
                column,
                field: field.path().to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// One encoded data row
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutput {
    /// One slot per schema field, in column order
    pub cells: Vec<StyledCell>,
    /// `(column, reference)` of pictures to anchor over this row
    pub images: Vec<(u32, String)>,
    /// `(column, value)` of summed columns, applied with `ColumnTotals::add_row`
    pub amounts: Vec<(usize, f64)>,
}

/// Per-column sums for the statistics row of a sheet
#[derive(Debug, Clone)]
pub struct ColumnTotals {
    enabled: Vec<bool>,
    sums: Vec<f64>,
}

impl ColumnTotals {
    fn new(enabled: Vec<bool>) -> Self {
        let sums = vec![0.0; enabled.len()];
        ColumnTotals { enabled, sums }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.iter().any(|e| *e)
    }

    /// Fold in a row once it has been written.
    pub fn add_row(&mut self, row: &RowOutput) {
        for &(column, amount) in &row.amounts {
            if self.enabled.get(column).copied().unwrap_or(false) {
                self.sums[column] += amount;
            }
        }
    }

    pub fn reset(&mut self) {
        self.sums.iter_mut().for_each(|s| *s = 0.0);
    }

    /// `Total` in the first column, two-decimal sums under the summed columns.
    pub fn total_row(&self) -> Vec<StyledCell> {
        let mut cells: Vec<StyledCell> = (0..self.sums.len())
            .map(|_| StyledCell::blank(CellStyle::Total))
            .collect();
        if let Some(first) = cells.first_mut() {
            first.value = CellValue::String(TOTAL_LABEL.to_string());
        }
        for (column, sum) in self.sums.iter().enumerate() {
            if self.enabled[column] {
                cells[column].value = CellValue::String(format!("{:.2}", sum));
            }
        }
        cells
    }
}

/// Column layout for exporting records
pub struct WritePlan<T> {
    schema: Arc<Schema<T>>,
    codecs: Vec<CellCodec>,
    styles: Vec<CellStyle>,
    summed: Vec<bool>,
}

impl<T: Record> WritePlan<T> {
    pub fn new(schema: Arc<Schema<T>>) -> Self {
        let codecs = schema
            .fields()
            .iter()
            .map(|f| CellCodec::new(f.binding()))
            .collect();
        let styles = schema
            .fields()
            .iter()
            .map(|f| CellStyle::for_alignment(f.binding().alignment))
            .collect();
        let summed = schema
            .fields()
            .iter()
            .map(|f| f.binding().collect_statistics)
            .collect();

        WritePlan {
            schema,
            codecs,
            styles,
            summed,
        }
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Header cells, one per field including non-exportable ones
    pub fn header(&self) -> Vec<StyledCell> {
        self.schema
            .fields()
            .iter()
            .map(|f| StyledCell::new(CellValue::String(f.binding().label.clone()), CellStyle::Header))
            .collect()
    }

    /// Fresh accumulator for a new sheet
    pub fn totals(&self) -> ColumnTotals {
        ColumnTotals::new(self.summed.clone())
    }

    /// Encode `record`. Summed columns are reported in `amounts` and only
    /// reach the totals through `ColumnTotals::add_row`.
    pub fn write_row(&self, record: &T) -> RowOutput {
        let mut cells = Vec::with_capacity(self.codecs.len());
        let mut images = Vec::new();
        let mut amounts = Vec::new();

        for (column, (field, codec)) in self.schema.fields().iter().zip(&self.codecs).enumerate() {
            if !field.binding().exportable {
                cells.push(StyledCell::blank(CellStyle::Default));
                continue;
            }

            let style = self.styles[column];
            let value = field.get(record);
            if self.summed[column] {
                if let Some(amount) = value.as_f64() {
                    amounts.push((column, amount));
                }
            }

            match codec.encode(&value) {
                EncodedCell::Value(v) => cells.push(StyledCell::new(v, style)),
                EncodedCell::Blank => cells.push(StyledCell::blank(style)),
                EncodedCell::Image(reference) => {
                    images.push((column as u32, reference));
                    cells.push(StyledCell::blank(style));
                }
            }
        }

        RowOutput {
            cells,
            images,
            amounts,
        }
    }
}
