//! Import of extracted workbook JSON.
//!
//! The extraction tool emits one entry per workbook:
//!
//! ```json
//! [{
//!   "workbookName": "budget.xlsx",
//!   "worksheets": [{
//!     "sheetName": "Sheet1",
//!     "usedRangeAddress": "Sheet1!B2:D9",
//!     "formulas": [["", "=B2*2"], ["", "=B3*2"]],
//!     "values": [],
//!     "styles": []
//!   }]
//! }]
//! ```
//!
//! `formulas` is row-major and starts at the used range's top-left cell.

use crate::document::Sheet;
use crate::error::{GridlintError, Result};
use gridlint_engine::engine::CellRef;
use serde::Deserialize;
use std::path::Path;

use super::csv::offset_cell;

const MAX_JSON_FILE_BYTES: u64 = 256 * 1_048_576; // 256 MiB

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkbookEntry {
    workbook_name: String,
    #[serde(default)]
    worksheets: Vec<WorksheetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorksheetEntry {
    sheet_name: String,
    used_range_address: String,
    #[serde(default)]
    formulas: Vec<Vec<String>>,
}

/// Load every worksheet from an extracted workbook JSON file.
pub fn parse_sheet_json(path: &Path) -> Result<Vec<Sheet>> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_JSON_FILE_BYTES {
        return Err(GridlintError::TooLarge {
            path: path.display().to_string(),
            size,
            max: MAX_JSON_FILE_BYTES,
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_sheet_json_content(&content)
}

/// Parse extracted workbook JSON. A single workbook object is accepted as
/// well as the usual array. With several workbooks, sheet names are
/// qualified as `workbook!sheet`.
pub fn parse_sheet_json_content(content: &str) -> Result<Vec<Sheet>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let workbooks: Vec<WorkbookEntry> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    let qualify = workbooks.len() > 1;

    let mut sheets = Vec::new();
    for workbook in workbooks {
        for worksheet in workbook.worksheets {
            let name = if qualify {
                format!("{}!{}", workbook.workbook_name, worksheet.sheet_name)
            } else {
                worksheet.sheet_name.clone()
            };
            sheets.push(load_worksheet(name, &worksheet)?);
        }
    }
    Ok(sheets)
}

fn load_worksheet(name: String, worksheet: &WorksheetEntry) -> Result<Sheet> {
    let origin = used_range_origin(&worksheet.used_range_address)?;
    let sheet = Sheet::new(name);
    for (row_idx, row) in worksheet.formulas.iter().enumerate() {
        for (col_idx, text) in row.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let cell = offset_cell(origin.col, origin.row, col_idx, row_idx)
                .ok_or_else(|| GridlintError::UsedRange(worksheet.used_range_address.clone()))?;
            sheet.set_cell(cell, text);
        }
    }
    tracing::debug!(sheet = %sheet.name, formulas = sheet.len(), "loaded worksheet");
    Ok(sheet)
}

/// Top-left cell of a used range such as `Sheet1!B2:D9`, `'My Sheet'!C9` or `A1:A1`.
pub fn used_range_origin(address: &str) -> Result<CellRef> {
    let range = address
        .rsplit_once('!')
        .map_or(address, |(_, range)| range);
    let first = range.split(':').next().unwrap_or(range).trim();
    CellRef::from_str(first).ok_or_else(|| GridlintError::UsedRange(address.to_string()))
}
