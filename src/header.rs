//! Header resolution over one or more header rows
//!
//! Each column's composite key joins the distinct labels found in the header
//! rows with `-`, reading merged cells from their top-left origin. A group
//! label spanning two columns above `subA` and `subB` yields `group-subA`
//! and `group-subB`.

use crate::types::CellValue;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Separator between the labels of a composite column key
pub const KEY_SEPARATOR: &str = "-";

/// Rectangular block of merged cells, 0-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRegion {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl MergedRegion {
    pub fn new(first_row: u32, last_row: u32, first_col: u32, last_col: u32) -> Self {
        MergedRegion {
            first_row,
            last_row,
            first_col,
            last_col,
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }
}

impl From<&calamine::Dimensions> for MergedRegion {
    fn from(dim: &calamine::Dimensions) -> Self {
        MergedRegion::new(dim.start.0, dim.end.0, dim.start.1, dim.end.1)
    }
}

/// Random access to the decoded cells of one loaded sheet
pub trait SheetGrid {
    /// Decoded value at an absolute 0-based position; `Empty` outside the data.
    fn cell(&self, row: u32, col: u32) -> CellValue;

    /// Exclusive end of the used rows.
    fn row_count(&self) -> u32;

    /// Exclusive end of the used columns.
    fn column_count(&self) -> u32;

    fn merged_regions(&self) -> &[MergedRegion];

    /// Value at `(row, col)`, taken from the origin cell when the position is merged.
    fn merged_cell(&self, row: u32, col: u32) -> CellValue {
        match self
            .merged_regions()
            .iter()
            .find(|region| region.contains(row, col))
        {
            Some(region) => self.cell(region.first_row, region.first_col),
            None => self.cell(row, col),
        }
    }
}

/// Composite column keys of one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    by_key: IndexMap<String, u32>,
    by_column: BTreeMap<u32, String>,
}

impl HeaderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` at `column`. A repeated key points at its latest column.
    pub fn insert(&mut self, column: u32, key: impl Into<String>) {
        let key = key.into();
        self.by_column.insert(column, key.clone());
        self.by_key.insert(key, column);
    }

    /// Column position of a composite key
    pub fn get(&self, key: &str) -> Option<u32> {
        self.by_key.get(key).copied()
    }

    /// Composite key at a column position
    pub fn label_at(&self, column: u32) -> Option<&str> {
        self.by_column.get(&column).map(String::as_str)
    }

    /// Indexed column positions in ascending order
    pub fn columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_column.keys().copied()
    }

    /// Keys in first-seen order with their columns
    pub fn keys(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.by_key.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for HeaderIndex {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        let mut index = HeaderIndex::new();
        for (column, key) in iter {
            index.insert(column, key);
        }
        index
    }
}

/// Build the header index from the inclusive row range `[start, end]`.
pub fn resolve_header<G: SheetGrid + ?Sized>(grid: &G, start: u32, end: u32) -> HeaderIndex {
    let mut index = HeaderIndex::new();

    for col in 0..grid.column_count() {
        let mut parts: Vec<String> = Vec::new();

        for row in start..=end {
            let value = grid.merged_cell(row, col);
            if value.is_blank() {
                continue;
            }
            let label: String = value
                .as_string()
                .chars()
                .filter(|c| *c != '\n' && *c != '\r')
                .collect();
            if !label.is_empty() && !parts.contains(&label) {
                parts.push(label);
            }
        }

        if !parts.is_empty() {
            index.insert(col, parts.join(KEY_SEPARATOR));
        }
    }

    index
}
