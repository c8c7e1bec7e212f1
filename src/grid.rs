//! Grid capability and in-memory grid containers.
//!
//! The marshaller only talks to the [`Grid`] trait. [`Sheet`] is the in-memory implementation
//! produced by export and consumed by import; [`Workbook`] is an ordered list of named sheets.
//! Format adapters in [`crate::io`] convert workbooks to and from CSV or spreadsheet files.

use std::ops::RangeInclusive;

use crate::error::{ErrorCause, MarshalError, MarshalResult};

/// A rectangular space of text cells addressed by zero-based `(column, row)`.
///
/// Row 0 holds the header by convention. An absent cell (`None`) and an empty cell (`Some("")`)
/// are distinct states; both count as blank when classifying rows.
pub trait Grid {
    /// Text of the cell, or `None` if the cell was never written.
    fn cell(&self, column: usize, row: usize) -> Option<&str>;

    /// Write the text of a cell, growing the grid as needed.
    fn set_cell(&mut self, column: usize, row: usize, text: String);

    /// Number of physical rows.
    fn row_count(&self) -> usize;

    /// Number of physical columns (width of the widest row).
    fn column_count(&self) -> usize;

    /// Set the display width hint of a column (in characters).
    fn set_column_width(&mut self, column: usize, width: usize);

    /// Display width hint of a column, if one was set.
    fn column_width(&self, column: usize) -> Option<usize>;

    /// First row in `rows` whose cell in `column` has trimmed text equal to `text`.
    fn find_cell(&self, text: &str, column: usize, rows: RangeInclusive<usize>) -> Option<usize> {
        let last = self.row_count().checked_sub(1)?;
        (*rows.start()..=(*rows.end()).min(last)).find(|&row| self.cell(column, row).unwrap_or("").trim() == text)
    }

    /// Returns `true` if the cell is absent or contains only whitespace.
    fn is_blank(&self, column: usize, row: usize) -> bool {
        self.cell(column, row).is_none_or(|s| s.trim().is_empty())
    }
}

/// Apply `max(characters in column) + padding` as each column's width hint.
///
/// Every row counts, including the header.
pub fn autosize_columns<G: Grid + ?Sized>(grid: &mut G, padding: usize) {
    for column in 0..grid.column_count() {
        let widest = (0..grid.row_count())
            .map(|row| grid.cell(column, row).map_or(0, |s| s.chars().count()))
            .max()
            .unwrap_or(0);
        grid.set_column_width(column, widest + padding);
    }
}

/// One named, in-memory grid segment (a worksheet).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Option<String>>>,
    column_widths: Vec<Option<usize>>,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            column_widths: Vec::new(),
        }
    }

    /// Create a sheet from row-major text. Every given cell is present (possibly empty).
    pub fn from_rows<R, C>(name: impl Into<String>, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(|c| Some(c.into())).collect())
            .collect();
        Self {
            name: name.into(),
            rows,
            column_widths: Vec::new(),
        }
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the sheet.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Cells of one row as text; absent cells render as `""`. Trailing absent cells are kept up
    /// to the row's physical length.
    pub fn row_text(&self, row: usize) -> Vec<&str> {
        self.rows
            .get(row)
            .map(|r| r.iter().map(|c| c.as_deref().unwrap_or("")).collect())
            .unwrap_or_default()
    }

    /// Iterate all rows as text.
    pub fn rows_text(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.rows.len()).map(|r| self.row_text(r))
    }
}

impl Grid for Sheet {
    fn cell(&self, column: usize, row: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    fn set_cell(&mut self, column: usize, row: usize, text: String) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= column {
            cells.resize(column + 1, None);
        }
        cells[column] = Some(text);
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn set_column_width(&mut self, column: usize, width: usize) {
        if self.column_widths.len() <= column {
            self.column_widths.resize(column + 1, None);
        }
        self.column_widths[column] = Some(width);
    }

    fn column_width(&self, column: usize) -> Option<usize> {
        self.column_widths.get(column).copied().flatten()
    }
}

/// An ordered collection of named sheets (the grid container).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a workbook from sheets, keeping their order.
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Append a sheet.
    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// All sheets in order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Sheet names in order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(Sheet::name)
    }

    /// Sheet by name, or an error naming the missing sheet.
    pub fn sheet(&self, name: &str) -> MarshalResult<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| MarshalError::new(ErrorCause::SheetNotFound(name.to_string())))
    }

    /// First sheet, if any.
    pub fn first(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    /// Number of sheets.
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Returns `true` if the workbook has no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Consume the workbook, returning its sheets.
    pub fn into_sheets(self) -> Vec<Sheet> {
        self.sheets
    }
}
