//! CSV import of formula grids

use crate::document::Sheet;
use crate::error::{GridlintError, Result};
use gridlint_engine::engine::CellRef;
use std::path::Path;

/// Parse a CSV file into a sheet named after the file stem.
/// The first field of the first record lands at (`start_col`, `start_row`).
pub fn parse_csv(path: &Path, start_col: u32, start_row: u32) -> Result<Sheet> {
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Sheet1".to_string());
    parse_csv_content(&name, &content, start_col, start_row)
}

/// Parse CSV text into a sheet. Fields starting with `=` are formulas,
/// everything else is skipped.
pub fn parse_csv_content(
    name: &str,
    content: &str,
    start_col: u32,
    start_row: u32,
) -> Result<Sheet> {
    let sheet = Sheet::new(name);
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|err| GridlintError::Parse {
            line: err
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(row_idx + 1),
            message: err.to_string(),
        })?;
        for (col_idx, field) in record.iter().enumerate() {
            let cell = offset_cell(start_col, start_row, col_idx, row_idx).ok_or_else(|| {
                GridlintError::Parse {
                    line: row_idx + 1,
                    message: format!("cell in column {} is out of range", col_idx + 1),
                }
            })?;
            sheet.set_cell(cell, field);
        }
    }

    Ok(sheet)
}

pub(crate) fn offset_cell(
    start_col: u32,
    start_row: u32,
    col_idx: usize,
    row_idx: usize,
) -> Option<CellRef> {
    let col = start_col.checked_add(u32::try_from(col_idx).ok()?)?;
    let row = start_row.checked_add(u32::try_from(row_idx).ok()?)?;
    Some(CellRef::new(col, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_formulas_are_placed_by_position() {
        let sheet = parse_csv_content("s", "1,2,=A1+B1\n3,4,=A2+B2\n", 1, 1).unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.formula(&CellRef::new(3, 2)).as_deref(), Some("=A2+B2"));
    }

    #[test]
    fn test_quoted_formula_with_commas() {
        let sheet = parse_csv_content("s", "\"=SUM(A1,B1)\",x\n", 1, 1).unwrap();
        assert_eq!(sheet.formula(&CellRef::new(1, 1)).as_deref(), Some("=SUM(A1,B1)"));
    }

    #[test]
    fn test_ragged_rows_and_offset() {
        let sheet = parse_csv_content("s", "=A1\n,,=B2\n", 2, 3).unwrap();
        assert_eq!(sheet.formula(&CellRef::new(2, 3)).as_deref(), Some("=A1"));
        assert_eq!(sheet.formula(&CellRef::new(4, 4)).as_deref(), Some("=B2"));
    }

    #[test]
    fn test_file_name_becomes_sheet_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        std::fs::write(&path, "=B1\n").unwrap();
        let sheet = parse_csv(&path, 1, 1).unwrap();
        assert_eq!(sheet.name, "ledger");
        assert_eq!(sheet.len(), 1);
    }
}
