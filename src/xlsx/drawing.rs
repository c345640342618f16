//! Drawing parts for pictures anchored over single cells

use super::xml_writer::XmlWriter;
use crate::codec::ImageFormat;
use crate::error::Result;
use std::io::Write;

const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_DRAWING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";

/// A picture waiting for its sheet to close
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub row: u32,
    pub col: u32,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// A picture already stored under `xl/media/`
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub row: u32,
    pub col: u32,
    /// File name inside `xl/media/`
    pub media: String,
}

/// `xl/drawings/drawingN.xml`: one two-cell anchor per picture, from the
/// cell's top-left corner to the next cell's.
pub fn write_drawing<W: Write>(writer: &mut XmlWriter<W>, images: &[PlacedImage]) -> Result<()> {
    writer.declaration()?;
    writer.write_str(concat!(
        "<xdr:wsDr xmlns:xdr=\"http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing\"",
        " xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\"",
        " xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">"
    ))?;

    for (i, image) in images.iter().enumerate() {
        let id = i + 1;
        writer.write_str("<xdr:twoCellAnchor editAs=\"oneCell\">")?;
        write_marker(writer, "xdr:from", image.col, image.row)?;
        write_marker(writer, "xdr:to", image.col + 1, image.row + 1)?;
        writer.write_str(&format!(
            concat!(
                "<xdr:pic><xdr:nvPicPr><xdr:cNvPr id=\"{id}\" name=\"Picture {id}\"/>",
                "<xdr:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></xdr:cNvPicPr></xdr:nvPicPr>",
                "<xdr:blipFill><a:blip r:embed=\"rId{id}\"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>",
                "<xdr:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/></a:xfrm>",
                "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></xdr:spPr></xdr:pic>"
            ),
            id = id
        ))?;
        writer.write_str("<xdr:clientData/></xdr:twoCellAnchor>")?;
    }

    writer.write_str("</xdr:wsDr>")?;
    writer.flush()
}

fn write_marker<W: Write>(writer: &mut XmlWriter<W>, tag: &str, col: u32, row: u32) -> Result<()> {
    writer.start_element(tag)?;
    writer.close_start_tag()?;
    writer.text_element("xdr:col", &col.to_string())?;
    writer.text_element("xdr:colOff", "0")?;
    writer.text_element("xdr:row", &row.to_string())?;
    writer.text_element("xdr:rowOff", "0")?;
    writer.end_element(tag)
}

/// `xl/drawings/_rels/drawingN.xml.rels`, `rIdK` pointing at the K-th picture
pub fn write_drawing_rels<W: Write>(
    writer: &mut XmlWriter<W>,
    images: &[PlacedImage],
) -> Result<()> {
    let targets: Vec<String> = images
        .iter()
        .map(|image| format!("../media/{}", image.media))
        .collect();
    write_relationships(
        writer,
        targets.iter().map(|target| (REL_IMAGE, target.as_str())),
    )
}

/// `xl/worksheets/_rels/sheetN.xml.rels` linking the sheet to its drawing as `rId1`
pub fn write_sheet_rels<W: Write>(writer: &mut XmlWriter<W>, drawing: u32) -> Result<()> {
    let target = format!("../drawings/drawing{}.xml", drawing);
    write_relationships(writer, std::iter::once((REL_DRAWING, target.as_str())))
}

fn write_relationships<'a, W: Write>(
    writer: &mut XmlWriter<W>,
    relationships: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<()> {
    writer.declaration()?;
    writer.write_str(
        "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    )?;
    for (i, (kind, target)) in relationships.enumerate() {
        writer.start_element("Relationship")?;
        writer.attribute("Id", &format!("rId{}", i + 1))?;
        writer.attribute("Type", kind)?;
        writer.attribute("Target", target)?;
        writer.close_empty()?;
    }
    writer.end_element("Relationships")?;
    writer.flush()
}
