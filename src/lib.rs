//! `tabular-marshal` converts between slices of typed records and labeled grids (spreadsheet
//! sheets, CSV), driven by a caller-supplied [`types::FieldMap`] from attribute paths to column
//! labels.
//!
//! The primary entrypoints are [`marshal::export`] (records → one or more sheets) and
//! [`marshal::import`] (any [`grid::Grid`] → records).
//!
//! ## What gets marshalled
//!
//! A record type opts in by implementing [`record::Record`]: it registers a table of named
//! attribute accessors once, including nested records (`"college.name"`) and attributes
//! inherited from an embedded ancestor record. Attribute values are coerced from cell text by
//! their declared [`types::ValueType`]:
//!
//! - text, `i16`/`i32`/`i64`, `f32`/`f64`, `char`
//! - arbitrary-precision decimals ([`bigdecimal::BigDecimal`])
//! - date/time ([`chrono::NaiveDateTime`]) in the fixed `MM/dd/yyyy HH:mm` format
//! - `Option<_>` of any of the above (empty cell ↔ `None`)
//! - caller types, which receive the raw cell text
//!
//! ## Quick example
//!
//! ```rust
//! use std::sync::OnceLock;
//!
//! use tabular_marshal::marshal::{export, ExportOptions};
//! use tabular_marshal::record::{AttributeTable, Record};
//! use tabular_marshal::types::FieldMap;
//!
//! struct Student {
//!     id: i32,
//!     name: String,
//!     score: i32,
//! }
//!
//! impl Record for Student {
//!     fn attributes() -> &'static AttributeTable<Self> {
//!         static TABLE: OnceLock<AttributeTable<Student>> = OnceLock::new();
//!         TABLE.get_or_init(|| {
//!             AttributeTable::builder("Student")
//!                 .field("id", |s: &Student| &s.id, |s: &mut Student| &mut s.id)
//!                 .field("name", |s: &Student| &s.name, |s: &mut Student| &mut s.name)
//!                 .field("score", |s: &Student| &s.score, |s: &mut Student| &mut s.score)
//!                 .build()
//!         })
//!     }
//! }
//!
//! # fn main() -> Result<(), tabular_marshal::MarshalError> {
//! let students = [
//!     Student { id: 1, name: "Tom".to_string(), score: 78 },
//!     Student { id: 2, name: "Hanks".to_string(), score: 56 },
//! ];
//! let map = FieldMap::from_pairs([("id", "ID"), ("name", "Name"), ("score", "Score")])?;
//! let opts = ExportOptions { sheet_name: "Students".to_string(), page_capacity: 10, ..Default::default() };
//!
//! let workbook = export(&students, &map, &opts)?;
//! let sheet = workbook.sheet("Students")?;
//! assert_eq!(sheet.row_text(0), vec!["ID", "Name", "Score"]);
//! assert_eq!(sheet.row_text(2), vec!["2", "Hanks", "56"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`marshal`]: export/import entrypoints, options and observers
//! - [`record`]: the record capability (attribute tables)
//! - [`grid`]: the grid capability and in-memory sheets/workbooks
//! - [`io`]: CSV and workbook (feature `excel`) adapters
//! - [`types`]: field maps, key specs and values
//! - [`error`]: the error type shared by every operation

pub mod error;
pub mod grid;
pub mod io;
pub mod marshal;
pub mod record;
pub mod types;

pub use error::{MarshalError, MarshalResult};
pub use marshal::{ExportOptions, ImportOptions, export, import};
