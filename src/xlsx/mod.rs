//! Low-level streaming OOXML writer
//!
//! Generates the package parts directly as XML into a ZIP archive:
//! - rows stream into the open worksheet entry
//! - shared strings, styles and the sheet list are written on close
//! - pictures become per-sheet drawing parts

pub mod drawing;
pub mod shared_strings;
pub mod styles;
pub mod workbook;
pub mod xml_writer;

pub use workbook::{ColumnLayout, SheetLayout, StreamingWorkbook, Validation};
