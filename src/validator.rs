//! Upload gating: header comparison against a reference template and
//! small file/sheet checks

use crate::error::{ExcelError, Result};
use crate::header::{resolve_header, HeaderIndex, SheetGrid};
use crate::reader::LoadedSheet;
use std::collections::BTreeSet;
use std::io::{Read, Seek};
use std::path::Path;

/// Compare two header maps column by column.
///
/// Every column position present in either map must carry the same label
/// in both; the first difference rejects the upload.
pub fn validate_header(uploaded: &HeaderIndex, template: &HeaderIndex) -> Result<()> {
    let columns: BTreeSet<u32> = uploaded.columns().chain(template.columns()).collect();

    for col in columns {
        let got = uploaded.label_at(col);
        let expected = template.label_at(col);
        if got != expected {
            log::warn!(
                "Header mismatch at column {}: uploaded {:?}, template {:?}",
                col,
                got,
                expected
            );
            return Err(ExcelError::wrong_template());
        }
    }
    Ok(())
}

/// Which sheets and header rows [`validate_template`] compares
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateOptions {
    /// Sheet of the upload; empty selects the first
    pub sheet_name: String,
    /// 0-based sheet index in the template
    pub template_sheet_index: usize,
    pub header_start: u32,
    pub header_end: u32,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        TemplateOptions {
            sheet_name: String::new(),
            template_sheet_index: 0,
            header_start: 0,
            header_end: 0,
        }
    }
}

/// Load the header rows of both documents and compare them.
pub fn validate_template<U, P>(upload: U, template: P, options: &TemplateOptions) -> Result<()>
where
    U: Read + Seek,
    P: Read + Seek,
{
    if options.header_end < options.header_start {
        return Err(ExcelError::InvalidArgument(format!(
            "header rows {}..={} are reversed",
            options.header_start, options.header_end
        )));
    }

    let uploaded = LoadedSheet::load(upload, &options.sheet_name)?;
    let reference = LoadedSheet::load_at(template, options.template_sheet_index)?;

    let uploaded_header = resolve_header(&uploaded, options.header_start, options.header_end);
    let template_header = resolve_header(&reference, options.header_start, options.header_end);
    validate_header(&uploaded_header, &template_header)
}

/// Extension of `file_name` including the dot, or `""` when it has none.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// `.xls` or `.xlsx`, any case
pub fn is_excel_file(file_name: &str) -> bool {
    let ext = file_extension(file_name).to_ascii_lowercase();
    ext == ".xls" || ext == ".xlsx"
}

/// A sheet with at most a header row has nothing to import.
pub fn is_sheet_empty<G: SheetGrid + ?Sized>(grid: &G) -> bool {
    grid.row_count() <= 1
}

/// Rows below the first `header_rows` rows
pub fn data_row_count<G: SheetGrid + ?Sized>(grid: &G, header_rows: u32) -> u32 {
    grid.row_count().saturating_sub(header_rows)
}
