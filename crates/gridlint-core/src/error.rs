//! Error types for gridlint core.

use thiserror::Error;

/// Errors that can occur while loading sheets or configuration
#[derive(Error, Debug)]
pub enum GridlintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid used range: {0}")]
    UsedRange(String),

    #[error("No sheet named {0}")]
    UnknownSheet(String),

    #[error("Input contains no sheets")]
    NoSheets,

    #[error("Refusing to read {path}: file too large ({size} bytes, max {max})")]
    TooLarge { path: String, size: u64, max: u64 },
}

pub type Result<T> = std::result::Result<T, GridlintError>;
