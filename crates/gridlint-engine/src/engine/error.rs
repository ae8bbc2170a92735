//! Error types for dependency extraction.

use thiserror::Error;

/// Reasons a formula cannot be reduced to a dependency vector.
///
/// Any of these fails the whole formula: a partial vector would produce a
/// fingerprint that misrepresents it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Invalid cell reference: {token}")]
    AddressParse { token: String },

    #[error("Range {range} has no cells")]
    EmptyRange { range: String },

    #[error("Dependency vector overflow at {token}")]
    Overflow { token: String },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
