//! Composite-key duplicate detection over a grid's data rows.

use std::ops::RangeInclusive;

use crate::grid::Grid;

/// A data row whose key tuple repeats further down the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateConflict {
    /// Zero-based grid row of the first occurrence.
    pub row: usize,
    /// Zero-based grid row of the first later row with the same key tuple.
    pub duplicate_row: usize,
}

/// Find the first row in `data_rows` whose key tuple (trimmed text of every column in
/// `key_columns`) occurs again in a later row of the same range.
///
/// Rows agreeing on only some of the key columns are not conflicts. Rows are scanned in
/// increasing order and the scan stops at the first conflict. With no key columns there is
/// nothing to compare and `None` is returned.
///
/// Candidates are located with [`Grid::find_cell`] on the first key column, so the worst case
/// is quadratic in the number of rows.
pub fn find_duplicate_key_tuples<G: Grid + ?Sized>(
    grid: &G,
    key_columns: &[usize],
    data_rows: RangeInclusive<usize>,
) -> Option<DuplicateConflict> {
    let (&lead, rest) = key_columns.split_first()?;
    let end = *data_rows.end();

    for row in data_rows {
        let lead_text = key_text(grid, lead, row);
        let mut from = row + 1;
        while from <= end {
            let Some(candidate) = grid.find_cell(lead_text, lead, from..=end) else {
                break;
            };
            if rest
                .iter()
                .all(|&col| key_text(grid, col, candidate) == key_text(grid, col, row))
            {
                return Some(DuplicateConflict {
                    row,
                    duplicate_row: candidate,
                });
            }
            from = candidate + 1;
        }
    }
    None
}

fn key_text<G: Grid + ?Sized>(grid: &G, column: usize, row: usize) -> &str {
    grid.cell(column, row).unwrap_or("").trim()
}
