//! # excelbatch
//!
//! Schema-driven Excel (xlsx) import and export of typed records.
//!
//! ## Features
//!
//! - **Batched Read**: Map data rows to records and hand them to a callback
//!   in fixed-size batches, with early stop
//! - **Streaming Write**: Rows go straight into a compressed temp archive,
//!   a new sheet is opened every 65,536 rows
//! - **Merged Headers**: Multi-row headers with merged regions resolve to
//!   composite keys such as `Contact-Email`
//! - **Cell Conversions**: Date patterns, dictionary expressions, decimal
//!   scaling, suffixes, defaults, images, dropdowns and column totals
//! - **Template Checks**: Reject uploads whose header differs from the
//!   reference template
//!
//! ## Quick Start
//!
//! ### Declaring a Record
//!
//! ```rust
//! use excelbatch::binding::FieldBinding;
//! use excelbatch::schema::{FieldTable, Record};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     name: String,
//!     age: i32,
//!     gender: String,
//! }
//!
//! impl Record for User {
//!     fn fields(table: &mut FieldTable<Self>) {
//!         table
//!             .attr("name", |u| &u.name, |u| &mut u.name)
//!             .bind(FieldBinding::new(1, "Name"));
//!         table
//!             .attr("age", |u| &u.age, |u| &mut u.age)
//!             .bind(FieldBinding::new(2, "Age"));
//!         table
//!             .attr("gender", |u| &u.gender, |u| &mut u.gender)
//!             .bind(FieldBinding::new(3, "Gender").dictionary("0=Male,1=Female"));
//!     }
//! }
//! ```
//!
//! ### Reading in Batches
//!
//! ```rust,no_run
//! # use excelbatch::schema::{FieldTable, Record};
//! # #[derive(Default)] struct User;
//! # impl Record for User { fn fields(_: &mut FieldTable<Self>) {} }
//! use excelbatch::reader::{open, ReadOptions};
//!
//! # fn main() -> excelbatch::Result<()> {
//! let options = ReadOptions::new().with_batch_size(1000);
//! excelbatch::import_excel_batch::<User, _, _>(open("users.xlsx")?, &options, |batch, n, total| {
//!     println!("batch {}: {} users, {} so far", n, batch.len(), total);
//!     true
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing
//!
//! ```rust,no_run
//! # use excelbatch::schema::{FieldTable, Record};
//! # #[derive(Default)] struct User;
//! # impl Record for User { fn fields(_: &mut FieldTable<Self>) {} }
//! use excelbatch::config::ExportConfig;
//!
//! # fn main() -> excelbatch::Result<()> {
//! let config = ExportConfig::from_env();
//! let mut writer = excelbatch::create_batch_writer::<User>("Users", &config)?;
//! writer.write_batch(&[User, User])?;
//! let file_name = writer.finish()?;
//! println!("saved {}", file_name);
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod codec;
pub mod config;
pub mod error;
pub mod facade;
pub mod header;
pub mod mapper;
pub mod reader;
pub mod schema;
pub mod types;
pub mod validator;
pub mod writer;

mod xlsx;

pub use binding::{Alignment, CellKind, Direction, FieldBinding, RoundingMode};
pub use config::{ExportConfig, FsImageLoader, ImageLoader};
pub use error::{ExcelError, Result};
pub use facade::{
    create_batch_writer, export_excel, export_excel_to, export_template, export_template_to,
    import_excel, import_excel_batch,
};
pub use header::{HeaderIndex, SheetGrid};
pub use mapper::DecodePolicy;
pub use reader::{BatchReader, ReadOptions};
pub use schema::{FieldTable, FieldType, FieldValue, Record, Schema};
pub use types::{CellStyle, CellValue, StyledCell};
pub use validator::{validate_header, validate_template, TemplateOptions};
pub use writer::{BatchWriter, SHEET_ROW_LIMIT};
