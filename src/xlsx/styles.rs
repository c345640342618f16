//! `xl/styles.xml` for the fixed set of [`CellStyle`] presets
//!
//! The `cellXfs` entries are written in [`CellStyle::index`] order.

use super::xml_writer::XmlWriter;
use crate::error::Result;
use crate::types::CellStyle;
use std::io::Write;

const HEADER_FILL: &str = "FF808080";
const BORDER_COLOR: &str = "FF808080";

/// (font, fill, border, horizontal alignment) per preset
fn format_of(style: CellStyle) -> (u32, u32, u32, Option<&'static str>) {
    match style {
        CellStyle::Default => (0, 0, 0, None),
        CellStyle::Header => (1, 2, 1, Some("center")),
        CellStyle::Data | CellStyle::DataCenter => (2, 0, 1, Some("center")),
        CellStyle::DataLeft => (2, 0, 1, Some("left")),
        CellStyle::DataRight => (2, 0, 1, Some("right")),
        CellStyle::Total => (1, 2, 1, Some("center")),
    }
}

const PRESETS: [CellStyle; 7] = [
    CellStyle::Default,
    CellStyle::Header,
    CellStyle::Data,
    CellStyle::DataLeft,
    CellStyle::DataCenter,
    CellStyle::DataRight,
    CellStyle::Total,
];

pub fn write_styles<W: Write>(writer: &mut XmlWriter<W>) -> Result<()> {
    writer.declaration()?;
    writer.write_str(
        "<styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">",
    )?;

    writer.write_str(concat!(
        "<fonts count=\"3\">",
        "<font><sz val=\"11\"/><name val=\"Calibri\"/><family val=\"2\"/></font>",
        "<font><b/><sz val=\"10\"/><color rgb=\"FFFFFFFF\"/><name val=\"Arial\"/><family val=\"2\"/></font>",
        "<font><sz val=\"10\"/><name val=\"Arial\"/><family val=\"2\"/></font>",
        "</fonts>"
    ))?;

    writer.write_str("<fills count=\"3\">")?;
    writer.write_str("<fill><patternFill patternType=\"none\"/></fill>")?;
    writer.write_str("<fill><patternFill patternType=\"gray125\"/></fill>")?;
    writer.write_str("<fill><patternFill patternType=\"solid\"><fgColor")?;
    writer.attribute("rgb", HEADER_FILL)?;
    writer.write_str("/><bgColor indexed=\"64\"/></patternFill></fill></fills>")?;

    writer.write_str("<borders count=\"2\">")?;
    writer.write_str("<border><left/><right/><top/><bottom/><diagonal/></border>")?;
    writer.write_str("<border>")?;
    for side in ["left", "right", "top", "bottom"] {
        writer.start_element(side)?;
        writer.attribute("style", "thin")?;
        writer.close_start_tag()?;
        writer.start_element("color")?;
        writer.attribute("rgb", BORDER_COLOR)?;
        writer.close_empty()?;
        writer.end_element(side)?;
    }
    writer.write_str("<diagonal/></border></borders>")?;

    writer.write_str(
        "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
    )?;

    writer.start_element("cellXfs")?;
    writer.attribute_int("count", PRESETS.len() as i64)?;
    writer.close_start_tag()?;
    for style in PRESETS {
        let (font, fill, border, horizontal) = format_of(style);
        writer.start_element("xf")?;
        writer.attribute("numFmtId", "0")?;
        writer.attribute_int("fontId", font as i64)?;
        writer.attribute_int("fillId", fill as i64)?;
        writer.attribute_int("borderId", border as i64)?;
        writer.attribute("xfId", "0")?;
        match horizontal {
            Some(horizontal) => {
                if font != 0 {
                    writer.attribute("applyFont", "1")?;
                }
                if fill != 0 {
                    writer.attribute("applyFill", "1")?;
                }
                writer.attribute("applyBorder", "1")?;
                writer.attribute("applyAlignment", "1")?;
                writer.close_start_tag()?;
                writer.start_element("alignment")?;
                writer.attribute("horizontal", horizontal)?;
                writer.attribute("vertical", "center")?;
                writer.close_empty()?;
                writer.end_element("xf")?;
            }
            None => writer.close_empty()?,
        }
    }
    writer.end_element("cellXfs")?;

    writer.write_str(
        "<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>",
    )?;
    writer.end_element("styleSheet")?;
    writer.flush()
}
