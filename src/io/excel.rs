//! Spreadsheet workbook adapter (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
//!
//! Reading goes through `calamine`, writing through `rust_xlsxwriter`. Cells are text on both
//! sides: numeric cells are rendered as text on read (integral values without a fractional
//! part), date cells in the `MM/dd/yyyy HH:mm` format, and every cell is written as a string.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use rust_xlsxwriter::{Workbook as XlsxWorkbook, XlsxError};

use crate::error::MarshalResult;
use crate::grid::{Grid, Sheet, Workbook};
use crate::types::DATE_TIME_FORMAT;

/// Read every sheet of a workbook file, in workbook order.
pub fn read_workbook(path: impl AsRef<Path>) -> MarshalResult<Workbook> {
    let mut sheets = open_workbook_auto(path)?;
    read_sheets(&mut sheets)
}

/// Read every sheet of an in-memory workbook (e.g. an uploaded file).
pub fn read_workbook_from_bytes(bytes: impl Into<Vec<u8>>) -> MarshalResult<Workbook> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes.into()))?;
    read_sheets(&mut sheets)
}

fn read_sheets<RS: Read + Seek>(sheets: &mut Sheets<RS>) -> MarshalResult<Workbook> {
    let names = sheets.sheet_names().to_vec();
    let mut workbook = Workbook::new();
    for name in names {
        let range = sheets.worksheet_range(&name)?;
        workbook.push(range_to_sheet(&name, &range));
    }
    Ok(workbook)
}

/// calamine ranges start at the first used cell; shift them back to absolute positions so the
/// header stays in row 0 of a sheet that begins at `A1`.
fn range_to_sheet(name: &str, range: &calamine::Range<Data>) -> Sheet {
    let (row0, col0) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut sheet = Sheet::new(name);
    for (r, row) in range.rows().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if matches!(cell, Data::Empty) {
                continue;
            }
            sheet.set_cell(col0 + c, row0 + r, cell_to_string(cell));
        }
    }
    sheet
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .filter(|_| !dt.is_duration())
            .map_or_else(|| dt.to_string(), |d| d.format(DATE_TIME_FORMAT).to_string()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

/// Write a workbook to a file, replacing it if it exists.
pub fn write_workbook(workbook: &Workbook, path: impl AsRef<Path>) -> MarshalResult<()> {
    let mut xlsx = to_xlsx(workbook)?;
    xlsx.save(path.as_ref())?;
    Ok(())
}

/// Serialize a workbook to `.xlsx` bytes, e.g. for an HTTP response body.
pub fn write_workbook_to_buffer(workbook: &Workbook) -> MarshalResult<Vec<u8>> {
    let mut xlsx = to_xlsx(workbook)?;
    Ok(xlsx.save_to_buffer()?)
}

fn to_xlsx(workbook: &Workbook) -> MarshalResult<XlsxWorkbook> {
    let mut xlsx = XlsxWorkbook::new();
    for sheet in workbook.sheets() {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(sheet.name())?;

        for col in 0..sheet.column_count() {
            let xcol = column_index(col)?;
            if let Some(width) = sheet.column_width(col) {
                worksheet.set_column_width(xcol, width as f64)?;
            }
            for row in 0..sheet.row_count() {
                if let Some(text) = sheet.cell(col, row) {
                    worksheet.write_string(row_index(row)?, xcol, text)?;
                }
            }
        }
    }
    Ok(xlsx)
}

fn row_index(row: usize) -> Result<u32, XlsxError> {
    u32::try_from(row).map_err(|_| XlsxError::RowColumnLimitError)
}

fn column_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}
