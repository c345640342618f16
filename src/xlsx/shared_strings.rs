//! Workbook-wide shared strings table

use super::xml_writer::XmlWriter;
use crate::error::Result;
use std::collections::HashMap;
use std::io::Write;

/// Past this many distinct strings new entries are appended without deduplication.
const DEFAULT_MAX_UNIQUE: usize = 100_000;

/// Shared strings collected while the worksheets stream out
pub struct SharedStrings {
    strings: Vec<String>,
    lookup: HashMap<String, u32>,
    max_unique: usize,
    references: u64,
}

impl SharedStrings {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_UNIQUE)
    }

    pub fn with_limit(max_unique: usize) -> Self {
        SharedStrings {
            strings: Vec::with_capacity(1024),
            lookup: HashMap::with_capacity(1024),
            max_unique,
            references: 0,
        }
    }

    /// Index of `s`, adding it when unseen.
    pub fn add_string(&mut self, s: &str) -> u32 {
        self.references += 1;
        if let Some(&index) = self.lookup.get(s) {
            return index;
        }

        let index = self.strings.len() as u32;
        self.strings.push(s.to_string());
        if self.lookup.len() < self.max_unique {
            self.lookup.insert(s.to_string(), index);
        }
        index
    }

    /// Entries in the table
    pub fn count(&self) -> usize {
        self.strings.len()
    }

    pub fn write_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<()> {
        writer.declaration()?;
        writer.start_element("sst")?;
        writer.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        writer.attribute_int("count", self.references as i64)?;
        writer.attribute_int("uniqueCount", self.strings.len() as i64)?;
        writer.close_start_tag()?;

        for s in &self.strings {
            writer.write_str("<si><t")?;
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                writer.attribute("xml:space", "preserve")?;
            }
            writer.close_start_tag()?;
            writer.write_escaped(s)?;
            writer.write_str("</t></si>")?;
        }

        writer.end_element("sst")?;
        writer.flush()
    }
}

impl Default for SharedStrings {
    fn default() -> Self {
        Self::new()
    }
}
