//! Cell-level value and style types shared by the reader and the writer

use crate::binding::Alignment;
use chrono::NaiveDateTime;
use std::fmt;

/// Default rendering of date-time values that carry no explicit format.
/// Fractional seconds appear only when non-zero.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Cell style presets, matching the `cellXfs` table the writer emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    /// Default style - no formatting
    Default = 0,
    /// Header: white bold Arial on grey fill, thin borders, centered
    Header = 1,
    /// Data cell for `Alignment::Auto`
    Data = 2,
    /// Data cell, left aligned
    DataLeft = 3,
    /// Data cell, centered
    DataCenter = 4,
    /// Data cell, right aligned
    DataRight = 5,
    /// Statistics (total) row
    Total = 6,
}

impl CellStyle {
    /// Get the style index for XML
    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// Data style selected by a binding's alignment.
    pub fn for_alignment(alignment: Alignment) -> Self {
        match alignment {
            Alignment::Auto => CellStyle::Data,
            Alignment::Left => CellStyle::DataLeft,
            Alignment::Center => CellStyle::DataCenter,
            Alignment::Right => CellStyle::DataRight,
        }
    }
}

/// Styled cell value (combines value with formatting)
#[derive(Debug, Clone, PartialEq)]
pub struct StyledCell {
    /// The cell value
    pub value: CellValue,
    /// The cell style
    pub style: CellStyle,
}

impl StyledCell {
    /// Create a new styled cell
    pub fn new(value: CellValue, style: CellStyle) -> Self {
        StyledCell { value, style }
    }

    /// A cell that carries only its style (borders) and no value.
    pub fn blank(style: CellStyle) -> Self {
        StyledCell {
            value: CellValue::Empty,
            style,
        }
    }
}

impl From<CellValue> for StyledCell {
    fn from(value: CellValue) -> Self {
        StyledCell::new(value, CellStyle::Default)
    }
}

/// Raw value of one worksheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Date-formatted numeric cell
    DateTime(NaiveDateTime),
    /// Error value
    Error(String),
}

impl CellValue {
    /// Convert cell value to string
    pub fn as_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(d) => d.format(DATETIME_FORMAT).to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }

    /// Check if cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Empty, or a string with nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

/// Convert column index to Excel letter (0 -> A, 25 -> Z, 26 -> AA)
pub fn column_letter(col: u32) -> String {
    let mut result = String::new();
    let mut col = col + 1;

    while col > 0 {
        col -= 1;
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }

    result
}

/// Excel-style cell reference for 0-based coordinates (e.g., "A1", "B2")
pub fn cell_reference(row: u32, col: u32) -> String {
    format!("{}{}", column_letter(col), row + 1)
}
