//! Error types for the excelbatch library

use thiserror::Error;

/// Result type alias for excelbatch operations
pub type Result<T> = std::result::Result<T, ExcelError>;

/// User-facing message raised when an upload does not match its template.
pub const WRONG_TEMPLATE_MESSAGE: &str =
    "Wrong template: please download the correct template and upload again";

/// Main error type for all import/export operations
#[derive(Error, Debug)]
pub enum ExcelError {
    /// Error occurred while reading Excel file
    #[error("Failed to read Excel file: {0}")]
    ReadError(String),

    /// Error occurred while writing Excel file
    #[error("Failed to write Excel file: {0}")]
    WriteError(String),

    /// The document could not be opened as a workbook
    #[error("Document could not be opened: {0}")]
    DocumentNotFound(String),

    /// Invalid sheet name or sheet not found
    #[error("Sheet '{sheet}' not found. Available sheets: {available}")]
    SheetNotFound { sheet: String, available: String },

    /// Error occurred while writing a row
    #[error("Failed to write row {row} to sheet '{sheet}': {source}")]
    WriteRowError {
        row: u32,
        sheet: String,
        #[source]
        source: Box<ExcelError>,
    },

    /// A cell could not be converted into its field (strict decoding only)
    #[error("Cannot decode row {row}, column {column} into field '{field}': {message}")]
    Decode {
        row: u32,
        column: u32,
        field: String,
        message: String,
    },

    /// Uploaded header does not match the reference template
    #[error("{0}")]
    SchemaMismatch(String),

    /// Caller supplied an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A field binding could not be resolved against its record type
    #[error("Invalid field binding: {0}")]
    InvalidBinding(String),

    /// Writer was used after `finish`
    #[error("Writer is already closed")]
    WriterClosed,

    /// IO error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Calamine error wrapper
    #[error("Calamine error: {0}")]
    CalamineError(String),
}

impl ExcelError {
    /// True for a missing sheet or an unreadable document.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ExcelError::SheetNotFound { .. } | ExcelError::DocumentNotFound(_)
        )
    }

    /// True for failures of the underlying storage while opening, writing or closing.
    pub fn is_resource_error(&self) -> bool {
        match self {
            ExcelError::IoError(_) | ExcelError::WriteError(_) | ExcelError::ReadError(_) => true,
            ExcelError::WriteRowError { source, .. } => source.is_resource_error(),
            _ => false,
        }
    }

    pub(crate) fn wrong_template() -> Self {
        ExcelError::SchemaMismatch(WRONG_TEMPLATE_MESSAGE.to_string())
    }
}

impl From<calamine::Error> for ExcelError {
    fn from(err: calamine::Error) -> Self {
        ExcelError::CalamineError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ExcelError {
    fn from(err: calamine::XlsxError) -> Self {
        ExcelError::CalamineError(err.to_string())
    }
}

impl From<zip::result::ZipError> for ExcelError {
    fn from(err: zip::result::ZipError) -> Self {
        ExcelError::WriteError(err.to_string())
    }
}
