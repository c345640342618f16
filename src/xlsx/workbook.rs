//! Multi-sheet streaming workbook backed by an anonymous temp file
//!
//! Rows go straight into the open worksheet entry of the ZIP archive; only
//! the shared strings and the current sheet's pictures stay in memory.
//! Parts that depend on the whole workbook (sheet list, content types) are
//! written by [`StreamingWorkbook::close`].

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use super::drawing::{write_drawing, write_drawing_rels, write_sheet_rels, PendingImage, PlacedImage};
use super::shared_strings::SharedStrings;
use super::styles::write_styles;
use super::xml_writer::{escape_into, push_int, XmlWriter};
use crate::codec::ImageFormat;
use crate::error::{ExcelError, Result};
use crate::types::{column_letter, CellStyle, CellValue, StyledCell, DATETIME_FORMAT};

/// Last row covered by column data validations
pub const VALIDATION_LAST_ROW: u32 = 65_536;

/// Labels containing this marker get a wide note column
const NOTE_MARKER: &str = "注：";
const NOTE_WIDTH: f64 = 6000.0 / 256.0;

/// Input help attached to one column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub prompt: Option<String>,
    /// Explicit dropdown values
    pub options: Vec<String>,
}

impl Validation {
    fn is_empty(&self) -> bool {
        self.prompt.is_none() && self.options.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Width in characters as declared by the binding
    pub width: f64,
    pub label: String,
    pub validation: Validation,
}

impl ColumnLayout {
    fn sheet_width(&self) -> f64 {
        if self.label.contains(NOTE_MARKER) {
            NOTE_WIDTH
        } else {
            self.width + 0.72
        }
    }
}

/// Column widths and validations shared by every sheet of a workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetLayout {
    pub columns: Vec<ColumnLayout>,
}

struct SheetEntry {
    name: String,
    drawing: Option<u32>,
}

struct OpenSheet {
    rows: u32,
    images: Vec<PendingImage>,
}

/// Streaming xlsx writer with several worksheets
pub struct StreamingWorkbook {
    zip: ZipWriter<File>,
    options: FileOptions<'static, ()>,
    layout: SheetLayout,
    shared_strings: SharedStrings,
    sheets: Vec<SheetEntry>,
    current: Option<OpenSheet>,
    media_formats: Vec<ImageFormat>,
    media_count: u32,
    drawing_count: u32,
    row_buffer: Vec<u8>,
    flush_interval: u32,
}

impl StreamingWorkbook {
    /// Start a workbook in a fresh anonymous temp file.
    pub fn new(layout: SheetLayout, compression_level: u32, flush_interval: u32) -> Result<Self> {
        let file = tempfile::tempfile()?;
        let mut zip = ZipWriter::new(file);

        let options = FileOptions::<()>::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(compression_level.min(9))));

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS.as_bytes())?;

        zip.start_file("docProps/core.xml", options)?;
        write_core_props(&mut zip)?;

        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(APP_PROPS.as_bytes())?;

        Ok(StreamingWorkbook {
            zip,
            options,
            layout,
            shared_strings: SharedStrings::new(),
            sheets: Vec::new(),
            current: None,
            media_formats: Vec::new(),
            media_count: 0,
            drawing_count: 0,
            row_buffer: Vec::with_capacity(8192),
            flush_interval: flush_interval.max(1),
        })
    }

    /// Close the open worksheet, if any, and start a new one named `name`.
    pub fn add_worksheet(&mut self, name: &str) -> Result<()> {
        self.finish_current_worksheet()?;

        self.sheets.push(SheetEntry {
            name: name.to_string(),
            drawing: None,
        });
        let sheet_path = format!("xl/worksheets/sheet{}.xml", self.sheets.len());
        self.zip.start_file(sheet_path, self.options)?;

        let mut xml = XmlWriter::new(&mut self.zip);
        xml.declaration()?;
        xml.start_element("worksheet")?;
        xml.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        xml.attribute(
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        )?;
        xml.close_start_tag()?;

        if !self.layout.columns.is_empty() {
            xml.write_str("<cols>")?;
            for (i, column) in self.layout.columns.iter().enumerate() {
                let position = i as i64 + 1;
                xml.start_element("col")?;
                xml.attribute_int("min", position)?;
                xml.attribute_int("max", position)?;
                xml.attribute_num("width", column.sheet_width())?;
                xml.attribute("customWidth", "1")?;
                xml.close_empty()?;
            }
            xml.write_str("</cols>")?;
        }

        xml.write_str("<sheetData>")?;
        xml.flush()?;

        self.current = Some(OpenSheet {
            rows: 0,
            images: Vec::new(),
        });
        Ok(())
    }

    /// Rows written to the open worksheet
    pub fn rows_in_sheet(&self) -> u32 {
        self.current.as_ref().map(|s| s.rows).unwrap_or(0)
    }

    /// Append a row to the open worksheet. Unstyled empty cells are skipped,
    /// styled empty cells keep their borders.
    pub fn write_row(&mut self, cells: &[StyledCell], height: Option<f64>) -> Result<()> {
        let sheet = self
            .current
            .as_mut()
            .ok_or_else(|| ExcelError::WriteError("No active worksheet".to_string()))?;
        sheet.rows += 1;
        let row_num = sheet.rows;

        let buf = &mut self.row_buffer;
        buf.clear();
        buf.extend_from_slice(b"<row r=\"");
        push_int(buf, row_num);
        buf.push(b'"');
        if let Some(height) = height {
            buf.extend_from_slice(b" ht=\"");
            buf.extend_from_slice(height.to_string().as_bytes());
            buf.extend_from_slice(b"\" customHeight=\"1\"");
        }
        buf.push(b'>');

        for (col, cell) in cells.iter().enumerate() {
            if cell.value.is_empty() && cell.style == CellStyle::Default {
                continue;
            }
            push_cell(buf, &mut self.shared_strings, row_num, col as u32, cell);
        }

        buf.extend_from_slice(b"</row>");
        self.zip.write_all(&self.row_buffer)?;

        if row_num % self.flush_interval == 0 {
            self.zip.flush()?;
        }
        Ok(())
    }

    /// Anchor a picture over the cell at 0-based `(row, col)` of the open worksheet.
    pub fn add_image(&mut self, row: u32, col: u32, bytes: Vec<u8>) -> Result<()> {
        let sheet = self
            .current
            .as_mut()
            .ok_or_else(|| ExcelError::WriteError("No active worksheet".to_string()))?;
        let format = crate::codec::detect_image_format(&bytes);
        sheet.images.push(PendingImage {
            row,
            col,
            format,
            bytes,
        });
        Ok(())
    }

    fn finish_current_worksheet(&mut self) -> Result<()> {
        let Some(sheet) = self.current.take() else {
            return Ok(());
        };
        let has_drawing = !sheet.images.is_empty();

        {
            let mut xml = XmlWriter::new(&mut self.zip);
            xml.write_str("</sheetData>")?;
            write_validations(&mut xml, &self.layout)?;
            if has_drawing {
                xml.write_str("<drawing r:id=\"rId1\"/>")?;
            }
            xml.end_element("worksheet")?;
            xml.flush()?;
        }

        if has_drawing {
            self.write_sheet_drawing(sheet.images)?;
        }
        Ok(())
    }

    fn write_sheet_drawing(&mut self, images: Vec<PendingImage>) -> Result<()> {
        self.drawing_count += 1;
        let drawing = self.drawing_count;
        let sheet_index = self.sheets.len();

        let mut placed = Vec::with_capacity(images.len());
        for image in images {
            self.media_count += 1;
            let media = format!("image{}.{}", self.media_count, image.format.extension());
            self.zip.start_file(format!("xl/media/{}", media), self.options)?;
            self.zip.write_all(&image.bytes)?;
            if !self.media_formats.contains(&image.format) {
                self.media_formats.push(image.format);
            }
            placed.push(PlacedImage {
                row: image.row,
                col: image.col,
                media,
            });
        }

        self.zip
            .start_file(format!("xl/drawings/drawing{}.xml", drawing), self.options)?;
        write_drawing(&mut XmlWriter::new(&mut self.zip), &placed)?;

        self.zip.start_file(
            format!("xl/drawings/_rels/drawing{}.xml.rels", drawing),
            self.options,
        )?;
        write_drawing_rels(&mut XmlWriter::new(&mut self.zip), &placed)?;

        self.zip.start_file(
            format!("xl/worksheets/_rels/sheet{}.xml.rels", sheet_index),
            self.options,
        )?;
        write_sheet_rels(&mut XmlWriter::new(&mut self.zip), drawing)?;

        if let Some(entry) = self.sheets.last_mut() {
            entry.drawing = Some(drawing);
        }
        Ok(())
    }

    /// Write the workbook-level parts and return the finished archive,
    /// rewound to its start.
    pub fn close(mut self) -> Result<File> {
        self.finish_current_worksheet()?;

        if self.sheets.is_empty() {
            return Err(ExcelError::WriteError(
                "Workbook has no worksheets".to_string(),
            ));
        }

        self.zip.start_file("xl/sharedStrings.xml", self.options)?;
        self.shared_strings
            .write_xml(&mut XmlWriter::new(&mut self.zip))?;

        self.zip.start_file("xl/workbook.xml", self.options)?;
        self.write_workbook_xml()?;

        self.zip
            .start_file("xl/_rels/workbook.xml.rels", self.options)?;
        self.write_workbook_rels()?;

        self.zip.start_file("xl/styles.xml", self.options)?;
        write_styles(&mut XmlWriter::new(&mut self.zip))?;

        self.zip.start_file("[Content_Types].xml", self.options)?;
        self.write_content_types()?;

        let mut file = self.zip.finish()?;
        file.seek(SeekFrom::Start(0))?;
        Ok(file)
    }

    fn write_workbook_xml(&mut self) -> Result<()> {
        let mut xml = XmlWriter::new(&mut self.zip);
        xml.declaration()?;
        xml.start_element("workbook")?;
        xml.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        xml.attribute(
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        )?;
        xml.close_start_tag()?;

        xml.write_str("<sheets>")?;
        for (i, sheet) in self.sheets.iter().enumerate() {
            let sheet_id = i as i64 + 1;
            xml.start_element("sheet")?;
            xml.attribute("name", &sheet.name)?;
            xml.attribute_int("sheetId", sheet_id)?;
            xml.attribute("r:id", &format!("rId{}", sheet_id))?;
            xml.close_empty()?;
        }
        xml.write_str("</sheets>")?;
        xml.end_element("workbook")?;
        xml.flush()
    }

    fn write_workbook_rels(&mut self) -> Result<()> {
        let count = self.sheets.len();
        let mut xml = XmlWriter::new(&mut self.zip);
        xml.declaration()?;
        xml.write_str(
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
        )?;

        let relationship = |xml: &mut XmlWriter<_>, id: usize, kind: &str, target: &str| -> Result<()> {
            xml.start_element("Relationship")?;
            xml.attribute("Id", &format!("rId{}", id))?;
            xml.attribute(
                "Type",
                &format!(
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/{}",
                    kind
                ),
            )?;
            xml.attribute("Target", target)?;
            xml.close_empty()
        };

        for i in 1..=count {
            relationship(&mut xml, i, "worksheet", &format!("worksheets/sheet{}.xml", i))?;
        }
        relationship(&mut xml, count + 1, "styles", "styles.xml")?;
        relationship(&mut xml, count + 2, "sharedStrings", "sharedStrings.xml")?;

        xml.end_element("Relationships")?;
        xml.flush()
    }

    fn write_content_types(&mut self) -> Result<()> {
        let mut xml = XmlWriter::new(&mut self.zip);
        xml.declaration()?;
        xml.write_str(
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
        )?;
        xml.write_str("<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>")?;
        xml.write_str("<Default Extension=\"xml\" ContentType=\"application/xml\"/>")?;
        for format in &self.media_formats {
            xml.start_element("Default")?;
            xml.attribute("Extension", format.extension())?;
            xml.attribute("ContentType", format.content_type())?;
            xml.close_empty()?;
        }

        let part = |xml: &mut XmlWriter<_>, name: &str, content_type: &str| -> Result<()> {
            xml.start_element("Override")?;
            xml.attribute("PartName", name)?;
            xml.attribute("ContentType", content_type)?;
            xml.close_empty()
        };

        part(
            &mut xml,
            "/xl/workbook.xml",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
        )?;
        for (i, sheet) in self.sheets.iter().enumerate() {
            part(
                &mut xml,
                &format!("/xl/worksheets/sheet{}.xml", i + 1),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
            )?;
            if let Some(drawing) = sheet.drawing {
                part(
                    &mut xml,
                    &format!("/xl/drawings/drawing{}.xml", drawing),
                    "application/vnd.openxmlformats-officedocument.drawing+xml",
                )?;
            }
        }
        part(
            &mut xml,
            "/xl/styles.xml",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
        )?;
        part(
            &mut xml,
            "/xl/sharedStrings.xml",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml",
        )?;
        part(
            &mut xml,
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml",
        )?;
        part(
            &mut xml,
            "/docProps/app.xml",
            "application/vnd.openxmlformats-officedocument.extended-properties+xml",
        )?;

        xml.end_element("Types")?;
        xml.flush()
    }
}

fn push_cell(
    buf: &mut Vec<u8>,
    shared_strings: &mut SharedStrings,
    row: u32,
    col: u32,
    cell: &StyledCell,
) {
    buf.extend_from_slice(b"<c r=\"");
    buf.extend_from_slice(column_letter(col).as_bytes());
    push_int(buf, row);
    buf.push(b'"');
    if cell.style != CellStyle::Default {
        buf.extend_from_slice(b" s=\"");
        push_int(buf, cell.style.index());
        buf.push(b'"');
    }

    // Header and total labels repeat on every sheet, so they go through the
    // shared table. Data text is written inline to keep memory flat.
    let labelled = matches!(cell.style, CellStyle::Header | CellStyle::Total);
    let text = |buf: &mut Vec<u8>, shared_strings: &mut SharedStrings, value: &str| {
        if labelled {
            let index = shared_strings.add_string(value);
            buf.extend_from_slice(b" t=\"s\"><v>");
            push_int(buf, index);
            buf.extend_from_slice(b"</v></c>");
        } else {
            push_inline_string(buf, value);
        }
    };

    match &cell.value {
        CellValue::Empty => buf.extend_from_slice(b"/>"),
        CellValue::String(s) | CellValue::Error(s) => text(buf, shared_strings, s),
        CellValue::Int(n) => {
            buf.extend_from_slice(b"><v>");
            push_int(buf, *n);
            buf.extend_from_slice(b"</v></c>");
        }
        CellValue::Float(f) if f.is_finite() => {
            buf.extend_from_slice(b"><v>");
            buf.extend_from_slice(f.to_string().as_bytes());
            buf.extend_from_slice(b"</v></c>");
        }
        CellValue::Float(f) => text(buf, shared_strings, &f.to_string()),
        CellValue::Bool(b) => {
            buf.extend_from_slice(b" t=\"b\"><v>");
            buf.push(if *b { b'1' } else { b'0' });
            buf.extend_from_slice(b"</v></c>");
        }
        CellValue::DateTime(dt) => {
            text(buf, shared_strings, &dt.format(DATETIME_FORMAT).to_string())
        }
    }
}

fn push_inline_string(buf: &mut Vec<u8>, text: &str) {
    buf.extend_from_slice(b" t=\"inlineStr\"><is>");
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        buf.extend_from_slice(b"<t xml:space=\"preserve\">");
    } else {
        buf.extend_from_slice(b"<t>");
    }
    escape_into(buf, text);
    buf.extend_from_slice(b"</t></is></c>");
}

/// Excel list formula for a combo column: `"a,b"`. Quotes inside an option
/// are doubled. Commas would split the option, so they become spaces.
fn list_formula(options: &[String]) -> String {
    let mut formula = String::from("\"");
    for (i, option) in options.iter().enumerate() {
        if i > 0 {
            formula.push(',');
        }
        if option.contains(',') {
            log::warn!("Combo option '{}' contains a comma, replaced with a space", option);
        }
        formula.push_str(&option.replace(',', " ").replace('"', "\"\""));
    }
    formula.push('"');
    formula
}

fn write_validations<W: Write>(xml: &mut XmlWriter<W>, layout: &SheetLayout) -> Result<()> {
    let columns: Vec<(usize, &Validation)> = layout
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.validation.is_empty())
        .map(|(i, c)| (i, &c.validation))
        .collect();
    if columns.is_empty() {
        return Ok(());
    }

    xml.start_element("dataValidations")?;
    xml.attribute_int("count", columns.len() as i64)?;
    xml.close_start_tag()?;

    for (col, validation) in columns {
        let letter = column_letter(col as u32);
        xml.start_element("dataValidation")?;
        if !validation.options.is_empty() {
            xml.attribute("type", "list")?;
            xml.attribute("showErrorMessage", "1")?;
        }
        xml.attribute("allowBlank", "1")?;
        if let Some(prompt) = &validation.prompt {
            xml.attribute("showInputMessage", "1")?;
            xml.attribute("prompt", prompt)?;
        }
        xml.attribute(
            "sqref",
            &format!("{}2:{}{}", letter, letter, VALIDATION_LAST_ROW),
        )?;

        if validation.options.is_empty() {
            xml.close_empty()?;
        } else {
            xml.close_start_tag()?;
            xml.text_element("formula1", &list_formula(&validation.options))?;
            xml.end_element("dataValidation")?;
        }
    }

    xml.end_element("dataValidations")
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

const APP_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>excelbatch</Application>
<DocSecurity>0</DocSecurity>
<ScaleCrop>false</ScaleCrop>
<LinksUpToDate>false</LinksUpToDate>
<SharedDoc>false</SharedDoc>
<HyperlinksChanged>false</HyperlinksChanged>
</Properties>"#;

fn write_core_props<W: Write>(writer: &mut W) -> Result<()> {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:creator>excelbatch</dc:creator>
<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>
<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>
</cp:coreProperties>"#
    );
    writer.write_all(xml.as_bytes())?;
    Ok(())
}
