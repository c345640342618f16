//! Declarative per-field column bindings
//!
//! A [`FieldBinding`] describes how one record field maps to one worksheet
//! column: its header label, its position, how its value is formatted on
//! export and parsed back on import, and how the column is styled.
//!
//! ```
//! use excelbatch::binding::{Alignment, CellKind, FieldBinding};
//!
//! let binding = FieldBinding::new(3, "Gender")
//!     .dictionary("0=Male,1=Female")
//!     .combo(["Male", "Female"])
//!     .align(Alignment::Center);
//!
//! assert_eq!(binding.kind, CellKind::String);
//! assert_eq!(binding.separator, ",");
//! ```

use rust_decimal::RoundingStrategy;

/// How a value is written into its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    #[default]
    String,
    Numeric,
    /// The value is a reference (path or URL) to a picture embedded over the cell
    Image,
}

/// Horizontal alignment of data cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    #[default]
    Auto,
    Left,
    Center,
    Right,
}

/// Which operations a binding takes part in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    All,
    Export,
    Import,
}

impl Direction {
    /// Whether a binding declared with `self` is used for the requested `mode`.
    pub fn applies_to(self, mode: Direction) -> bool {
        self == Direction::All || self == mode
    }
}

/// Decimal rounding applied when rescaling, numbered by ordinal (0 = `Up` .. 6 = `HalfEven`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundingMode {
    Up,
    Down,
    Ceiling,
    Floor,
    HalfUp,
    HalfDown,
    #[default]
    HalfEven,
}

impl RoundingMode {
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Some(match ordinal {
            0 => RoundingMode::Up,
            1 => RoundingMode::Down,
            2 => RoundingMode::Ceiling,
            3 => RoundingMode::Floor,
            4 => RoundingMode::HalfUp,
            5 => RoundingMode::HalfDown,
            6 => RoundingMode::HalfEven,
            _ => return None,
        })
    }

    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Column binding metadata for one record field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldBinding {
    /// Sort key; equal orders keep declaration order
    pub order: u32,
    /// Header label, also the lookup key into the header index
    pub label: String,
    /// Pattern such as `yyyy-MM-dd HH:mm:ss`
    pub date_format: Option<String>,
    /// `key=label,key=label`
    pub dictionary_expr: Option<String>,
    pub separator: String,
    pub decimal_scale: Option<u32>,
    pub rounding: RoundingMode,
    pub kind: CellKind,
    /// Row height in points
    pub row_height: f64,
    /// Column width in characters
    pub column_width: f64,
    pub suffix: String,
    /// Written when the source value is absent
    pub default_value: String,
    pub prompt: Option<String>,
    pub combo: Vec<String>,
    /// `false` keeps the header column but leaves data cells empty
    pub exportable: bool,
    /// Dotted attribute path inside a nested record
    pub target_path: Option<String>,
    pub collect_statistics: bool,
    pub alignment: Alignment,
    pub direction: Direction,
}

impl Default for FieldBinding {
    fn default() -> Self {
        FieldBinding {
            order: u32::MAX,
            label: String::new(),
            date_format: None,
            dictionary_expr: None,
            separator: ",".to_string(),
            decimal_scale: None,
            rounding: RoundingMode::HalfEven,
            kind: CellKind::String,
            row_height: 14.0,
            column_width: 16.0,
            suffix: String::new(),
            default_value: String::new(),
            prompt: None,
            combo: Vec::new(),
            exportable: true,
            target_path: None,
            collect_statistics: false,
            alignment: Alignment::Auto,
            direction: Direction::All,
        }
    }
}

impl FieldBinding {
    pub fn new(order: u32, label: impl Into<String>) -> Self {
        FieldBinding {
            order,
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = Some(pattern.into());
        self
    }

    pub fn dictionary(mut self, expr: impl Into<String>) -> Self {
        self.dictionary_expr = Some(expr.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn scale(mut self, scale: u32, rounding: RoundingMode) -> Self {
        self.decimal_scale = Some(scale);
        self.rounding = rounding;
        self
    }

    pub fn kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn height(mut self, points: f64) -> Self {
        self.row_height = points;
        self
    }

    pub fn width(mut self, chars: f64) -> Self {
        self.column_width = chars;
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt = Some(text.into());
        self
    }

    pub fn combo<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.combo = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn exportable(mut self, exportable: bool) -> Self {
        self.exportable = exportable;
        self
    }

    pub fn target(mut self, path: impl Into<String>) -> Self {
        self.target_path = Some(path.into());
        self
    }

    pub fn statistics(mut self) -> Self {
        self.collect_statistics = true;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Blank strings count as unset for the optional text settings.
    pub(crate) fn date_pattern(&self) -> Option<&str> {
        self.date_format.as_deref().filter(|p| !p.is_empty())
    }

    pub(crate) fn dictionary_expr(&self) -> Option<&str> {
        self.dictionary_expr.as_deref().filter(|e| !e.is_empty())
    }

    pub(crate) fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let b = FieldBinding::new(1, "Name");
        assert_eq!(b.separator, ",");
        assert_eq!(b.decimal_scale, None);
        assert_eq!(b.rounding, RoundingMode::HalfEven);
        assert_eq!(b.row_height, 14.0);
        assert_eq!(b.column_width, 16.0);
        assert!(b.exportable);
        assert_eq!(FieldBinding::default().order, u32::MAX);
    }

    #[test]
    fn test_direction_filter() {
        assert!(Direction::All.applies_to(Direction::Import));
        assert!(Direction::Export.applies_to(Direction::Export));
        assert!(!Direction::Export.applies_to(Direction::Import));
    }

    #[test]
    fn test_rounding_ordinals() {
        assert_eq!(RoundingMode::from_ordinal(4), Some(RoundingMode::HalfUp));
        assert_eq!(RoundingMode::from_ordinal(6), Some(RoundingMode::HalfEven));
        assert_eq!(RoundingMode::from_ordinal(7), None);
        assert_eq!(
            RoundingMode::Floor.strategy(),
            RoundingStrategy::ToNegativeInfinity
        );
    }

    #[test]
    fn test_blank_settings_are_unset() {
        let b = FieldBinding::new(1, "When").date_format("").prompt("");
        assert_eq!(b.date_pattern(), None);
        assert_eq!(b.prompt_text(), None);
    }
}
