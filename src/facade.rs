//! One-call entry points over [`BatchReader`] and [`BatchWriter`]

use crate::binding::Direction;
use crate::config::ExportConfig;
use crate::error::Result;
use crate::reader::{BatchReader, ReadOptions};
use crate::schema::{Record, Schema};
use crate::writer::BatchWriter;
use std::io::{Read, Seek, Write};
use std::sync::Arc;

/// Import every kept row of the selected sheet.
pub fn import_excel<T, RS>(source: RS, options: &ReadOptions) -> Result<Vec<T>>
where
    T: Record,
    RS: Read + Seek,
{
    BatchReader::<T>::new()?.read_all(source, options)
}

/// Import in batches; see [`BatchReader::read_batch`].
pub fn import_excel_batch<T, RS, F>(source: RS, options: &ReadOptions, callback: F) -> Result<usize>
where
    T: Record,
    RS: Read + Seek,
    F: FnMut(Vec<T>, usize, usize) -> bool,
{
    BatchReader::<T>::new()?.read_batch(source, options, callback)
}

/// Export `records` to `<download_dir>/<uuid>_<base>.xlsx` and return the file name.
pub fn export_excel<T: Record>(records: &[T], base_name: &str, config: &ExportConfig) -> Result<String> {
    let mut writer = BatchWriter::new(base_name, config)?;
    writer.write_batch(records)?;
    writer.finish()
}

/// Export `records` into `sink`.
pub fn export_excel_to<T, W>(records: &[T], base_name: &str, config: &ExportConfig, sink: &mut W) -> Result<()>
where
    T: Record,
    W: Write,
{
    let mut writer = BatchWriter::new(base_name, config)?;
    writer.write_batch(records)?;
    writer.finish_to(sink)
}

/// Writer for callers that produce records page by page.
pub fn create_batch_writer<T: Record>(base_name: &str, config: &ExportConfig) -> Result<BatchWriter<T>> {
    BatchWriter::new(base_name, config)
}

fn template_writer<T: Record>(base_name: &str, config: &ExportConfig) -> Result<BatchWriter<T>> {
    let schema = Schema::build(Direction::Import)?;
    let mut writer = BatchWriter::with_schema(Arc::new(schema), base_name, config)?;
    writer.write_header()?;
    Ok(writer)
}

/// Header-only upload template for `T`, with prompts and dropdowns.
pub fn export_template<T: Record>(base_name: &str, config: &ExportConfig) -> Result<String> {
    template_writer::<T>(base_name, config)?.finish()
}

pub fn export_template_to<T: Record, W: Write>(base_name: &str, config: &ExportConfig, sink: &mut W) -> Result<()> {
    template_writer::<T>(base_name, config)?.finish_to(sink)
}
