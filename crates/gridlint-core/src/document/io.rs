use super::Sheet;
use crate::error::{GridlintError, Result};
use crate::storage::{parse_csv, parse_sheet_json};
use std::path::Path;

impl Sheet {
    /// Load every sheet in a file: `.json` is extracted workbook JSON,
    /// anything else is read as CSV starting at A1.
    pub fn load_all(path: &Path) -> Result<Vec<Sheet>> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let sheets = if is_json {
            parse_sheet_json(path)?
        } else {
            vec![parse_csv(path, 1, 1)?]
        };
        if sheets.is_empty() {
            return Err(GridlintError::NoSheets);
        }
        Ok(sheets)
    }

    /// Keep only the sheet called `name`, or every sheet when `name` is None.
    pub fn select(sheets: Vec<Sheet>, name: Option<&str>) -> Result<Vec<Sheet>> {
        let Some(name) = name else {
            return Ok(sheets);
        };
        let selected: Vec<Sheet> = sheets.into_iter().filter(|s| s.name == name).collect();
        if selected.is_empty() {
            return Err(GridlintError::UnknownSheet(name.to_string()));
        }
        Ok(selected)
    }
}
