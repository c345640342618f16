//! Conversion between raw cells and typed field values
//!
//! Reading goes `calamine::Data` -> [`CellValue`] ([`decode_cell`]) ->
//! [`FieldValue`] ([`CellCodec::coerce`]). Writing goes [`FieldValue`] ->
//! display text ([`CellCodec::format_value`]) -> [`EncodedCell`]
//! ([`CellCodec::encode`]).

use crate::binding::{CellKind, FieldBinding};
use crate::schema::{FieldType, FieldValue};
use crate::types::{CellValue, DATETIME_FORMAT};
use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::str::FromStr;

/// Patterns tried in order when a date field receives text.
const DATE_PARSE_PATTERNS: [(&str, PatternShape); 16] = [
    ("%Y%m%d", PatternShape::Date),
    ("%Y%m%d %H:%M:%S%.f", PatternShape::DateTime),
    ("%Y%m%d %H:%M", PatternShape::DateTime),
    ("%Y%m", PatternShape::YearMonth),
    ("%Y-%m-%d", PatternShape::Date),
    ("%Y-%m-%d %H:%M:%S%.f", PatternShape::DateTime),
    ("%Y-%m-%d %H:%M", PatternShape::DateTime),
    ("%Y-%m", PatternShape::YearMonth),
    ("%Y/%m/%d", PatternShape::Date),
    ("%Y/%m/%d %H:%M:%S%.f", PatternShape::DateTime),
    ("%Y/%m/%d %H:%M", PatternShape::DateTime),
    ("%Y/%m", PatternShape::YearMonth),
    ("%Y.%m.%d", PatternShape::Date),
    ("%Y.%m.%d %H:%M:%S%.f", PatternShape::DateTime),
    ("%Y.%m.%d %H:%M", PatternShape::DateTime),
    ("%Y.%m", PatternShape::YearMonth),
];

#[derive(Debug, Clone, Copy)]
enum PatternShape {
    Date,
    DateTime,
    YearMonth,
}

/// Decode a calamine cell. Whole numbers become integer strings, other
/// numbers keep their decimal text, date-formatted numbers become dates.
pub fn decode_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::String(i.to_string()),
        Data::Float(f) => CellValue::String(number_text(*f)),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if dt.is_datetime() => CellValue::DateTime(value),
            _ => CellValue::String(number_text(dt.as_f64())),
        },
        Data::DateTimeIso(s) => parse_iso(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

fn number_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Try the fixed list of common date layouts; year-month layouts resolve to day 1.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_PARSE_PATTERNS
        .iter()
        .find_map(|(pattern, shape)| match shape {
            PatternShape::DateTime => NaiveDateTime::parse_from_str(text, pattern).ok(),
            PatternShape::Date => NaiveDate::parse_from_str(text, pattern)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN)),
            PatternShape::YearMonth => {
                NaiveDate::parse_from_str(&format!("{}-01", text), &format!("{}-%d", pattern))
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            }
        })
}

/// Translate a `yyyy-MM-dd HH:mm:ss` style pattern into a chrono format string.
pub fn to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // quoted literal; '' is an escaped quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let spec = match (c, run) {
            ('y', 2) => Some("%y"),
            ('y', _) => Some("%Y"),
            ('M', 1) => Some("%-m"),
            ('M', 2) => Some("%m"),
            ('M', 3) => Some("%b"),
            ('M', _) => Some("%B"),
            ('d', 1) => Some("%-d"),
            ('d', _) => Some("%d"),
            ('H', 1) => Some("%-H"),
            ('H', _) => Some("%H"),
            ('h', 1) => Some("%-I"),
            ('h', _) => Some("%I"),
            ('m', 1) => Some("%-M"),
            ('m', _) => Some("%M"),
            ('s', 1) => Some("%-S"),
            ('s', _) => Some("%S"),
            ('S', _) => Some("%3f"),
            ('a', _) => Some("%p"),
            ('E', 1..=3) => Some("%a"),
            ('E', _) => Some("%A"),
            _ => None,
        };

        match spec {
            Some(spec) => out.push_str(spec),
            None => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
            }
        }
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn format_datetime(value: &NaiveDateTime, chrono_format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", value.format(chrono_format)).ok()?;
    Some(out)
}

fn dictionary_pairs(expr: &str) -> impl Iterator<Item = (&str, &str)> {
    expr.split(',').filter_map(|item| {
        let mut parts = item.split('=');
        let key = parts.next()?;
        let label = parts.next().filter(|l| !l.is_empty())?;
        Some((key, label))
    })
}

fn translate_by_exp(value: &str, expr: &str, separator: &str, forward: bool) -> String {
    let lookup = |token: &str| {
        dictionary_pairs(expr).find_map(|(key, label)| {
            let (from, to) = if forward { (key, label) } else { (label, key) };
            (from == token).then_some(to)
        })
    };

    if !separator.is_empty() && value.contains(separator) {
        value
            .split(separator)
            .filter_map(lookup)
            .collect::<Vec<_>>()
            .join(separator)
    } else {
        lookup(value).unwrap_or_default().to_string()
    }
}

/// Map stored keys to display labels (`"0=Male,1=Female"`: `"1"` -> `"Female"`).
pub fn convert_by_exp(value: &str, expr: &str, separator: &str) -> String {
    translate_by_exp(value, expr, separator, true)
}

/// Map display labels back to stored keys.
pub fn reverse_by_exp(value: &str, expr: &str, separator: &str) -> String {
    translate_by_exp(value, expr, separator, false)
}

/// Picture formats the writer can embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Sniff the byte signature; anything unrecognised is embedded as JPEG.
pub fn detect_image_format(bytes: &[u8]) -> ImageFormat {
    if bytes.starts_with(PNG_SIGNATURE) {
        ImageFormat::Png
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        ImageFormat::Gif
    } else {
        ImageFormat::Jpeg
    }
}

/// What the writer should put into a data cell
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedCell {
    /// Styled but empty
    Blank,
    Value(CellValue),
    /// Reference handed to the image loader
    Image(String),
}

/// Per-binding codec; the date pattern is translated once at construction.
#[derive(Debug, Clone)]
pub struct CellCodec {
    binding: FieldBinding,
    date_format: Option<String>,
}

impl CellCodec {
    pub fn new(binding: &FieldBinding) -> Self {
        CellCodec {
            binding: binding.clone(),
            date_format: binding.date_pattern().map(to_chrono_format),
        }
    }

    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    /// Convert a decoded cell into `ty`. Blank cells give `Null` for every
    /// type; the error string describes why the text did not fit.
    pub fn coerce(&self, cell: &CellValue, ty: FieldType) -> Result<FieldValue, String> {
        if cell.is_blank() {
            return Ok(FieldValue::Null);
        }

        match (ty, cell) {
            (FieldType::String, CellValue::DateTime(dt)) => {
                let text = self
                    .date_format
                    .as_deref()
                    .and_then(|f| format_datetime(dt, f))
                    .unwrap_or_else(|| dt.format(DATETIME_FORMAT).to_string());
                Ok(FieldValue::String(text))
            }
            (FieldType::String, other) => Ok(FieldValue::String(other.as_string())),
            (FieldType::Date, CellValue::DateTime(dt)) => Ok(FieldValue::Date(dt.date())),
            (FieldType::DateTime, CellValue::DateTime(dt)) => Ok(FieldValue::DateTime(*dt)),
            (FieldType::Bool, CellValue::Bool(b)) => Ok(FieldValue::Bool(*b)),
            (ty, other) => coerce_text(other.as_string().trim(), ty),
        }
    }

    /// Display text for a value, applying in order: date format, dictionary
    /// expression, decimal rescaling, plain conversion.
    pub fn format_value(&self, value: &FieldValue) -> String {
        if value.is_null() {
            return String::new();
        }

        if let Some(fmt) = self.date_format.as_deref() {
            let formatted = match value {
                FieldValue::Date(d) => format_datetime(&d.and_time(NaiveTime::MIN), fmt),
                FieldValue::DateTime(dt) => format_datetime(dt, fmt),
                _ => None,
            };
            if let Some(text) = formatted {
                return text;
            }
        }

        if let Some(expr) = self.binding.dictionary_expr() {
            return convert_by_exp(&value.to_plain_string(), expr, &self.binding.separator);
        }

        if let (FieldValue::Decimal(d), Some(scale)) = (value, self.binding.decimal_scale) {
            let mut scaled = d.round_dp_with_strategy(scale, self.binding.rounding.strategy());
            scaled.rescale(scale);
            return scaled.to_string();
        }

        value.to_plain_string()
    }

    /// Decide the cell content for `value` according to the binding's cell kind.
    pub fn encode(&self, value: &FieldValue) -> EncodedCell {
        let formatted = self.format_value(value);
        let text = if formatted.is_empty() {
            value.to_plain_string()
        } else {
            formatted
        };

        match self.binding.kind {
            CellKind::String => {
                if value.is_null() {
                    if self.binding.default_value.is_empty() {
                        EncodedCell::Blank
                    } else {
                        EncodedCell::Value(CellValue::String(self.binding.default_value.clone()))
                    }
                } else {
                    EncodedCell::Value(CellValue::String(text + &self.binding.suffix))
                }
            }
            CellKind::Numeric => {
                if text.is_empty() {
                    return EncodedCell::Blank;
                }
                let number = if text.contains('.') {
                    text.trim().parse::<f64>().ok().map(CellValue::Float)
                } else {
                    text.trim().parse::<i64>().ok().map(CellValue::Int)
                };
                match number {
                    Some(cell) => EncodedCell::Value(cell),
                    None => {
                        log::warn!(
                            "Column '{}': '{}' is not numeric, writing it as text",
                            self.binding.label,
                            text
                        );
                        EncodedCell::Value(CellValue::String(text))
                    }
                }
            }
            CellKind::Image => {
                if text.is_empty() {
                    EncodedCell::Blank
                } else {
                    EncodedCell::Image(text)
                }
            }
        }
    }
}

/// Coerce with a one-off codec for `binding`.
pub fn coerce(cell: &CellValue, ty: FieldType, binding: &FieldBinding) -> Result<FieldValue, String> {
    CellCodec::new(binding).coerce(cell, ty)
}

/// Display text of `value` under `binding`.
pub fn format_value(value: &FieldValue, binding: &FieldBinding) -> String {
    CellCodec::new(binding).format_value(value)
}

pub fn encode_cell(value: &FieldValue, binding: &FieldBinding) -> EncodedCell {
    CellCodec::new(binding).encode(value)
}

fn coerce_text(text: &str, ty: FieldType) -> Result<FieldValue, String> {
    let invalid = |what: &str| format!("'{}' is not a valid {}", text, what);

    match ty {
        FieldType::String => Ok(FieldValue::String(text.to_string())),
        FieldType::Int => parse_integer(text)
            .and_then(|v| i32::try_from(v).ok())
            .map(FieldValue::Int)
            .ok_or_else(|| invalid("integer")),
        FieldType::Long => parse_integer(text)
            .map(FieldValue::Long)
            .ok_or_else(|| invalid("long")),
        FieldType::Float => text
            .parse::<f32>()
            .map(FieldValue::Float)
            .map_err(|_| invalid("float")),
        FieldType::Double => text
            .parse::<f64>()
            .map(FieldValue::Double)
            .map_err(|_| invalid("double")),
        FieldType::Decimal => Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(FieldValue::Decimal)
            .map_err(|_| invalid("decimal")),
        FieldType::Date => parse_date(text)
            .map(|dt| FieldValue::Date(dt.date()))
            .ok_or_else(|| invalid("date")),
        FieldType::DateTime => parse_date(text)
            .map(FieldValue::DateTime)
            .ok_or_else(|| invalid("date")),
        FieldType::Bool => Ok(FieldValue::Bool(parse_bool(text))),
    }
}

/// Integers, also accepting whole-valued decimal text such as `"3.0"`.
fn parse_integer(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Unrecognised text is `false`.
fn parse_bool(text: &str) -> bool {
    matches!(
        text.to_ascii_lowercase().as_str(),
        "true" | "yes" | "ok" | "y" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::RoundingMode;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_decode_numbers() {
        assert_eq!(
            decode_cell(&Data::Float(42.0)),
            CellValue::String("42".to_string())
        );
        assert_eq!(
            decode_cell(&Data::Float(1234.56)),
            CellValue::String("1234.56".to_string())
        );
        assert_eq!(
            decode_cell(&Data::Int(-7)),
            CellValue::String("-7".to_string())
        );
        assert_eq!(decode_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(decode_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            decode_cell(&Data::Error(CellErrorType::Div0)),
            CellValue::Error("#DIV/0!".to_string())
        );
    }

    #[test]
    fn test_decode_date_formatted_number() {
        // 45292 is 2024-01-01 in the 1900 date system
        let cell = Data::DateTime(ExcelDateTime::new(
            45292.5,
            ExcelDateTimeType::DateTime,
            false,
        ));
        let expected = ymd(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(decode_cell(&cell), CellValue::DateTime(expected));
    }

    #[test]
    fn test_parse_date_patterns() {
        let midnight = |y, m, d| ymd(y, m, d).and_time(NaiveTime::MIN);
        assert_eq!(parse_date("20240305"), Some(midnight(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05"), Some(midnight(2024, 3, 5)));
        assert_eq!(parse_date("2024/03/05"), Some(midnight(2024, 3, 5)));
        assert_eq!(parse_date("2024.03.05"), Some(midnight(2024, 3, 5)));
        assert_eq!(parse_date("202403"), Some(midnight(2024, 3, 1)));
        assert_eq!(parse_date("2024-03"), Some(midnight(2024, 3, 1)));
        assert_eq!(
            parse_date("2024-03-05 08:15"),
            ymd(2024, 3, 5).and_hms_opt(8, 15, 0)
        );
        assert_eq!(
            parse_date("20240305 23:59:01"),
            ymd(2024, 3, 5).and_hms_opt(23, 59, 1)
        );
        assert_eq!(
            parse_date("2024-01-02 03:04:05.678"),
            ymd(2024, 1, 2).and_hms_milli_opt(3, 4, 5, 678)
        );
        assert_eq!(parse_date("next tuesday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_chrono_pattern_translation() {
        assert_eq!(to_chrono_format("yyyy-MM-dd"), "%Y-%m-%d");
        assert_eq!(to_chrono_format("yyyy-MM-dd HH:mm:ss"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(to_chrono_format("yyyy年MM月dd日"), "%Y年%m月%d日");
        assert_eq!(to_chrono_format("HH:mm:ss.SSS"), "%H:%M:%S.%3f");
        assert_eq!(to_chrono_format("yyyy'T'HH 100%"), "%YT%H 100%%");
    }

    #[test]
    fn test_coerce_by_type() {
        let codec = CellCodec::new(&FieldBinding::new(1, "x"));
        let text = |s: &str| CellValue::String(s.to_string());

        assert_eq!(
            codec.coerce(&text("12"), FieldType::Int),
            Ok(FieldValue::Int(12))
        );
        assert_eq!(
            codec.coerce(&text("v2.0"), FieldType::String),
            Ok(FieldValue::String("v2.0".to_string()))
        );
        assert_eq!(
            codec.coerce(&text("9007199254740993"), FieldType::Long),
            Ok(FieldValue::Long(9007199254740993))
        );
        assert_eq!(
            codec.coerce(&text("12.50"), FieldType::Decimal),
            Ok(FieldValue::Decimal(Decimal::new(1250, 2)))
        );
        assert_eq!(
            codec.coerce(&text("2024/03/05"), FieldType::Date),
            Ok(FieldValue::Date(ymd(2024, 3, 5)))
        );
        assert_eq!(
            codec.coerce(&text("Yes"), FieldType::Bool),
            Ok(FieldValue::Bool(true))
        );
        assert_eq!(
            codec.coerce(&text("maybe"), FieldType::Bool),
            Ok(FieldValue::Bool(false))
        );
        assert_eq!(codec.coerce(&text("   "), FieldType::Bool), Ok(FieldValue::Null));
        assert!(codec.coerce(&text("abc"), FieldType::Int).is_err());
        assert!(codec.coerce(&text("99999999999"), FieldType::Int).is_err());
    }

    #[test]
    fn test_coerce_date_into_string_field() {
        let codec = CellCodec::new(&FieldBinding::new(1, "When").date_format("yyyy/MM/dd"));
        let cell = CellValue::DateTime(ymd(2023, 12, 31).and_hms_opt(6, 0, 0).unwrap());
        assert_eq!(
            codec.coerce(&cell, FieldType::String),
            Ok(FieldValue::String("2023/12/31".to_string()))
        );
    }

    #[test]
    fn test_dictionary_expressions() {
        let expr = "0=Male,1=Female,2=Unknown";
        assert_eq!(convert_by_exp("1", expr, ","), "Female");
        assert_eq!(convert_by_exp("9", expr, ","), "");
        assert_eq!(reverse_by_exp("Unknown", expr, ","), "2");
        assert_eq!(convert_by_exp("2,0", expr, ","), "Unknown,Male");
        assert_eq!(convert_by_exp("0,7,1", expr, ","), "Male,Female");
        assert_eq!(reverse_by_exp("Female;Male", expr, ";"), "1;0");
    }

    #[test]
    fn test_format_precedence() {
        let dated = CellCodec::new(
            &FieldBinding::new(1, "When")
                .date_format("dd.MM.yyyy")
                .dictionary("x=y"),
        );
        assert_eq!(
            dated.format_value(&FieldValue::Date(ymd(2024, 2, 29))),
            "29.02.2024"
        );

        let dict = CellCodec::new(&FieldBinding::new(1, "Flag").dictionary("true=On,false=Off"));
        assert_eq!(dict.format_value(&FieldValue::Bool(false)), "Off");

        let money = CellCodec::new(&FieldBinding::new(1, "Amount").scale(2, RoundingMode::HalfUp));
        assert_eq!(
            money.format_value(&FieldValue::Decimal(Decimal::new(2345, 3))),
            "2.35"
        );
        assert_eq!(
            money.format_value(&FieldValue::Decimal(Decimal::new(15, 1))),
            "1.50"
        );

        let even = CellCodec::new(&FieldBinding::new(1, "Amount").scale(2, RoundingMode::HalfEven));
        assert_eq!(
            even.format_value(&FieldValue::Decimal(Decimal::new(2345, 3))),
            "2.34"
        );

        assert_eq!(money.format_value(&FieldValue::Null), "");
    }

    #[test]
    fn test_encode_string_kind() {
        let codec = CellCodec::new(
            &FieldBinding::new(1, "Weight")
                .suffix(" kg")
                .default_value("n/a"),
        );
        assert_eq!(
            codec.encode(&FieldValue::Int(70)),
            EncodedCell::Value(CellValue::String("70 kg".to_string()))
        );
        assert_eq!(
            codec.encode(&FieldValue::Null),
            EncodedCell::Value(CellValue::String("n/a".to_string()))
        );
        let plain = CellCodec::new(&FieldBinding::new(1, "Name"));
        assert_eq!(plain.encode(&FieldValue::Null), EncodedCell::Blank);
    }

    #[test]
    fn test_encode_numeric_kind() {
        let codec = CellCodec::new(&FieldBinding::new(1, "Qty").kind(CellKind::Numeric));
        assert_eq!(
            codec.encode(&FieldValue::Long(12)),
            EncodedCell::Value(CellValue::Int(12))
        );
        assert_eq!(
            codec.encode(&FieldValue::Double(2.5)),
            EncodedCell::Value(CellValue::Float(2.5))
        );
        assert_eq!(
            codec.encode(&FieldValue::String("n/a".to_string())),
            EncodedCell::Value(CellValue::String("n/a".to_string()))
        );
        assert_eq!(codec.encode(&FieldValue::Null), EncodedCell::Blank);
    }

    #[test]
    fn test_encode_image_kind() {
        let codec = CellCodec::new(&FieldBinding::new(1, "Photo").kind(CellKind::Image));
        assert_eq!(
            codec.encode(&FieldValue::String("/profile/a.png".to_string())),
            EncodedCell::Image("/profile/a.png".to_string())
        );
        assert_eq!(codec.encode(&FieldValue::Null), EncodedCell::Blank);
    }

    #[test]
    fn test_detect_image_format() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(detect_image_format(&png), ImageFormat::Png);
        assert_eq!(detect_image_format(b"GIF89a......"), ImageFormat::Gif);
        assert_eq!(detect_image_format(b"not an image"), ImageFormat::Jpeg);
    }
}
