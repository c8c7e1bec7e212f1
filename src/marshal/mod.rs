//! Export and import between typed records and labeled grids.
//!
//! Most callers use [`export`] and [`import`]:
//!
//! - [`export`] writes a record slice into one or more [`Sheet`]s (split by
//!   [`ExportOptions::page_capacity`]) with a header row taken from the [`FieldMap`] labels.
//! - [`import`] reads any [`Grid`] back into records, validating the header against the
//!   [`FieldMap`] and rejecting repeated [`UniqueKeySpec`] tuples.
//!
//! Either call is all-or-nothing: on failure no partial workbook or record list is returned.
//! If an [`MarshalObserver`] is configured, success/failure/alerts are reported to it.
//!
//! ```rust
//! use std::sync::OnceLock;
//!
//! use tabular_marshal::grid::Grid;
//! use tabular_marshal::marshal::{export, import, ExportOptions, ImportOptions};
//! use tabular_marshal::record::{AttributeTable, Record};
//! use tabular_marshal::types::{FieldMap, UniqueKeySpec};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Student {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl Record for Student {
//!     fn attributes() -> &'static AttributeTable<Self> {
//!         static TABLE: OnceLock<AttributeTable<Student>> = OnceLock::new();
//!         TABLE.get_or_init(|| {
//!             AttributeTable::builder("Student")
//!                 .field("id", |s: &Student| &s.id, |s: &mut Student| &mut s.id)
//!                 .field("name", |s: &Student| &s.name, |s: &mut Student| &mut s.name)
//!                 .default_constructible()
//!                 .build()
//!         })
//!     }
//! }
//!
//! # fn main() -> Result<(), tabular_marshal::MarshalError> {
//! let map = FieldMap::from_pairs([("id", "ID"), ("name", "Name")])?;
//! let students = vec![Student { id: 1, name: "Tom".to_string() }];
//!
//! let workbook = export(&students, &map, &ExportOptions::default())?;
//! let sheet = workbook.sheet("Sheet")?;
//! assert_eq!(sheet.cell(1, 1), Some("Tom"));
//!
//! let back: Vec<Student> = import(sheet, &map, &UniqueKeySpec::new(["id"]), &ImportOptions::default())?;
//! assert_eq!(back, students);
//! # Ok(())
//! # }
//! ```

pub mod coerce;
pub mod duplicate;
pub mod observability;
pub mod paginate;
pub mod path;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorCause, MarshalError, MarshalResult};
use crate::grid::{Grid, Sheet, Workbook, autosize_columns};
use crate::record::Record;
use crate::types::{FieldMap, FieldMapping, UniqueKeySpec};

pub use observability::{
    CompositeObserver, FileObserver, MarshalContext, MarshalObserver, MarshalSeverity, MarshalStats,
    Operation, StdErrObserver, TracingObserver,
};
pub use paginate::MAX_PAGE_ROWS;

/// Padding added to the widest cell of each exported column.
pub const DEFAULT_COLUMN_PADDING: usize = 5;

/// Options controlling [`export`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ExportOptions {
    /// Sheet name; with more than one page each sheet gets the page number appended.
    pub sheet_name: String,
    /// Records per sheet. `0` or anything above [`MAX_PAGE_ROWS`] means [`MAX_PAGE_ROWS`].
    pub page_capacity: usize,
    /// Characters added to the widest cell when sizing columns.
    pub column_padding: usize,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn MarshalObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: MarshalSeverity,
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOptions")
            .field("sheet_name", &self.sheet_name)
            .field("page_capacity", &self.page_capacity)
            .field("column_padding", &self.column_padding)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet".to_string(),
            page_capacity: MAX_PAGE_ROWS,
            column_padding: DEFAULT_COLUMN_PADDING,
            observer: None,
            alert_at_or_above: MarshalSeverity::Critical,
        }
    }
}

/// Options controlling [`import`].
#[derive(Clone)]
pub struct ImportOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn MarshalObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: MarshalSeverity,
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: MarshalSeverity::Critical,
        }
    }
}

/// Export `records` into a workbook, one sheet per page.
///
/// Each sheet has the field map labels in row 0 and one record per following row. Column
/// widths are set to the widest cell plus [`ExportOptions::column_padding`].
///
/// Fails if `records` is empty or if a field map path does not resolve on the record type.
pub fn export<T: Record>(
    records: &[T],
    field_map: &FieldMap,
    options: &ExportOptions,
) -> MarshalResult<Workbook> {
    let ctx = MarshalContext {
        operation: Operation::Export,
        type_name: T::attributes().type_name(),
        sheet: Some(options.sheet_name.clone()),
    };

    let result = export_pages(records, field_map, options).map_err(|e| e.context("export failed"));

    notify(
        options.observer.as_ref(),
        options.alert_at_or_above,
        &ctx,
        &result,
        |wb| MarshalStats {
            records: records.len(),
            pages: wb.len(),
        },
    );
    result
}

fn export_pages<T: Record>(
    records: &[T],
    field_map: &FieldMap,
    options: &ExportOptions,
) -> MarshalResult<Workbook> {
    if records.is_empty() {
        return Err(MarshalError::new(ErrorCause::EmptyDataSource("no records to export")));
    }

    let pages = paginate::paginate(records.len(), options.page_capacity);
    let mut workbook = Workbook::new();

    for page in &pages {
        let mut sheet = Sheet::new(page.sheet_name(&options.sheet_name, pages.len()));
        for (col, label) in field_map.labels().enumerate() {
            sheet.set_cell(col, 0, label.to_string());
        }

        for (offset, record) in records[page.range()].iter().enumerate() {
            for (col, attr_path) in field_map.paths().enumerate() {
                let value = path::resolve(attr_path, record).map_err(|e| {
                    e.context(format!("record {}, attribute '{attr_path}'", page.first + offset + 1))
                })?;
                sheet.set_cell(col, offset + 1, coerce::to_display(&value));
            }
        }

        autosize_columns(&mut sheet, options.column_padding);
        tracing::debug!(
            sheet = sheet.name(),
            page = page.number,
            rows = page.len(),
            "exported page"
        );
        workbook.push(sheet);
    }

    Ok(workbook)
}

/// Import every real data row of `grid` as a new `T`.
///
/// Row 0 is the header. Rows are read until the first fully blank row. Every field map label
/// must appear in the header; the first column carrying a label wins. When `unique_keys` is not
/// empty, no two data rows may share the same values in all key columns. Each key names either
/// a field map path or a column label.
///
/// Cell text is trimmed before it is converted to the attribute's declared type. Nested
/// records along a path are not created: `T`'s default value must already hold them.
pub fn import<T: Record, G: Grid + ?Sized>(
    grid: &G,
    field_map: &FieldMap,
    unique_keys: &UniqueKeySpec,
    options: &ImportOptions,
) -> MarshalResult<Vec<T>> {
    let ctx = MarshalContext {
        operation: Operation::Import,
        type_name: T::attributes().type_name(),
        sheet: None,
    };

    let result = import_rows(grid, field_map, unique_keys).map_err(|e| e.context("import failed"));

    notify(
        options.observer.as_ref(),
        options.alert_at_or_above,
        &ctx,
        &result,
        |records| MarshalStats {
            records: records.len(),
            pages: 1,
        },
    );
    result
}

fn import_rows<T: Record, G: Grid + ?Sized>(
    grid: &G,
    field_map: &FieldMap,
    unique_keys: &UniqueKeySpec,
) -> MarshalResult<Vec<T>> {
    let real_rows = count_real_rows(grid);
    match real_rows {
        0 => return Err(MarshalError::new(ErrorCause::EmptyDataSource("grid is empty"))),
        1 => return Err(MarshalError::new(ErrorCause::EmptyDataSource("header row only"))),
        _ => {}
    }
    let last_row = real_rows - 1;

    let headers = header_labels(grid);
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (col, label) in headers.iter().enumerate() {
        index.entry(label.as_str()).or_insert(col);
    }

    let mut missing: Vec<String> = Vec::new();
    for label in field_map.labels() {
        if !index.contains_key(label) && !missing.iter().any(|m| m == label) {
            missing.push(label.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(MarshalError::new(ErrorCause::MissingRequiredColumns {
            missing,
            headers: headers.clone(),
        }));
    }
    tracing::debug!(real_rows, columns = headers.len(), "header validated");

    if !unique_keys.is_empty() {
        let key_labels: Vec<&str> = unique_keys
            .iter()
            .map(|key| field_map.label_of(key).unwrap_or(key))
            .collect();
        let mut key_columns = Vec::with_capacity(key_labels.len());
        for label in &key_labels {
            match index.get(label) {
                Some(&col) => key_columns.push(col),
                None => {
                    return Err(MarshalError::new(ErrorCause::MissingRequiredColumns {
                        missing: vec![label.to_string()],
                        headers: headers.clone(),
                    }));
                }
            }
        }

        if let Some(conflict) = duplicate::find_duplicate_key_tuples(grid, &key_columns, 1..=last_row) {
            return Err(MarshalError::new(ErrorCause::DuplicateRow {
                row: conflict.duplicate_row + 1,
                duplicate_of: conflict.row + 1,
                columns: key_labels.iter().map(|l| l.to_string()).collect(),
            }));
        }
        tracing::debug!(keys = key_columns.len(), "no duplicate key tuples");
    }

    let columns: Vec<(&FieldMapping, usize)> = field_map
        .iter()
        .filter_map(|m| index.get(m.label.as_str()).map(|&col| (m, col)))
        .collect();
    let table = T::attributes();

    let mut records = Vec::with_capacity(last_row);
    for row in 1..=last_row {
        let mut record = table.instantiate().ok_or_else(|| {
            MarshalError::new(ErrorCause::Instantiation {
                type_name: table.type_name(),
            })
        })?;
        for &(mapping, col) in &columns {
            let text = grid.cell(col, row).unwrap_or("").trim();
            path::assign(&mapping.path, &mut record, text).map_err(|e| {
                e.context(format!("row {}, column '{}'", row + 1, mapping.label))
            })?;
        }
        records.push(record);
    }

    tracing::debug!(records = records.len(), "imported rows");
    Ok(records)
}

/// Rows from the top up to (not including) the first row with no non-blank cell.
fn count_real_rows<G: Grid + ?Sized>(grid: &G) -> usize {
    let columns = grid.column_count();
    (0..grid.row_count())
        .take_while(|&row| (0..columns).any(|col| !grid.is_blank(col, row)))
        .count()
}

fn header_labels<G: Grid + ?Sized>(grid: &G) -> Vec<String> {
    (0..grid.column_count())
        .map(|col| grid.cell(col, 0).unwrap_or("").trim().to_string())
        .collect()
}

fn notify<R>(
    observer: Option<&Arc<dyn MarshalObserver>>,
    alert_at_or_above: MarshalSeverity,
    ctx: &MarshalContext,
    result: &MarshalResult<R>,
    stats: impl FnOnce(&R) -> MarshalStats,
) {
    if let Err(e) = result {
        tracing::debug!(operation = %ctx.operation, error = %e, "marshalling failed");
    }

    let Some(obs) = observer else {
        return;
    };
    match result {
        Ok(r) => obs.on_success(ctx, stats(r)),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

fn severity_for_error(e: &MarshalError) -> MarshalSeverity {
    match e.cause() {
        ErrorCause::Io(_) => MarshalSeverity::Critical,
        ErrorCause::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => MarshalSeverity::Critical,
            _ => MarshalSeverity::Error,
        },
        #[cfg(feature = "excel")]
        ErrorCause::Excel(_) | ErrorCause::XlsxWriter(_) => MarshalSeverity::Critical,
        _ => MarshalSeverity::Error,
    }
}
