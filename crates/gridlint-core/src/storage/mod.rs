//! Storage module for formula grid import (CSV, extracted workbook JSON) and report export

mod csv;
mod json;
mod md;

pub use csv::{parse_csv, parse_csv_content};
pub use json::{parse_sheet_json, parse_sheet_json_content, used_range_origin};
pub use md::{write_json, write_markdown};
