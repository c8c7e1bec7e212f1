//! Format adapters between [`crate::grid::Workbook`]/[`crate::grid::Sheet`] and bytes.
//!
//! The marshaller never touches files itself. These adapters read a grid from CSV text or a
//! spreadsheet file before [`crate::marshal::import`], and write the result of
//! [`crate::marshal::export`] to any byte sink.
//!
//! - [`csv`]
//! - [`excel`] (requires the `excel` feature)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;

use chrono::NaiveDateTime;

/// Conventional download file name for an export made at `now`: `yyyyMMddHHmmss.<extension>`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use tabular_marshal::io::timestamped_file_name;
///
/// let now = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(7, 5, 1).unwrap();
/// assert_eq!(timestamped_file_name(now, "xlsx"), "20240309070501.xlsx");
/// ```
pub fn timestamped_file_name(now: NaiveDateTime, extension: &str) -> String {
    format!("{}.{}", now.format("%Y%m%d%H%M%S"), extension.trim_start_matches('.'))
}
