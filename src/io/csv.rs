//! CSV adapter.
//!
//! Every CSV record becomes one grid row, the first one included: the marshaller decides what
//! the header is. Rows may have different lengths.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::MarshalResult;
use crate::grid::{Grid, Sheet};

/// Read CSV text into a sheet named `name`.
pub fn read_sheet<R: Read>(name: &str, reader: R) -> MarshalResult<Sheet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Sheet::from_rows(name, rows))
}

/// Read a CSV file into a sheet named after the file stem.
pub fn read_sheet_from_path(path: impl AsRef<Path>) -> MarshalResult<Sheet> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet")
        .to_string();
    let file = std::fs::File::open(path)?;
    read_sheet(&name, file)
}

/// Write a sheet as CSV. Short rows are padded with empty fields to the sheet's width.
pub fn write_sheet<W: Write>(sheet: &Sheet, writer: W) -> MarshalResult<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    let width = sheet.column_count();
    for mut row in sheet.rows_text() {
        row.resize(width, "");
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a sheet to a CSV file, replacing it if it exists.
pub fn write_sheet_to_path(sheet: &Sheet, path: impl AsRef<Path>) -> MarshalResult<()> {
    let file = std::fs::File::create(path)?;
    write_sheet(sheet, file)
}
