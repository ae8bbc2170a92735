//! Cell reference parsing and formatting.
//!
//! Two types live here:
//!
//! - [`CellRef`] - a plain 1-indexed cell position (column 1 is "A").
//! - [`CellAddress`] - a reference as written in a formula, carrying
//!   independent column/row absoluteness flags (`$A$1`, `$A1`, `A$1`, `A1`).
//!
//! # Examples
//!
//! ```
//! use gridlint_engine::engine::{CellAddress, CellRef};
//!
//! let addr = CellAddress::parse("$B3").unwrap();
//! assert_eq!(addr.col, 2);
//! assert_eq!(addr.row, 3);
//! assert!(addr.col_absolute && !addr.row_absolute);
//!
//! assert_eq!(CellRef::new(28, 10).to_string(), "AB10");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::ExtractError;

/// A cell position by column and row (1-indexed).
///
/// Ordering is row-major, so sorted cells read like a sheet.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(col: u32, row: u32) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a plain cell reference such as "B3" or "AA10".
    /// Absolute markers are accepted and dropped. Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        CellAddress::parse(name).ok().map(|addr| addr.cell())
    }

    /// Convert a 1-indexed column to spreadsheet letters (1 -> A, 26 -> Z, 27 -> AA).
    pub fn col_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Convert column letters to a 1-indexed column (bijective base 26).
    /// Returns None for empty input, non-uppercase letters, or overflow.
    pub fn letters_to_col(letters: &str) -> Option<u32> {
        if letters.is_empty() {
            return None;
        }
        let mut acc = 0u32;
        for c in letters.bytes() {
            if !c.is_ascii_uppercase() {
                return None;
            }
            let digit = (c - b'A') as u32 + 1;
            acc = acc.checked_mul(26)?.checked_add(digit)?;
        }
        Some(acc)
    }
}

impl std::str::FromStr for CellRef {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellAddress::parse(s).map(|addr| addr.cell())
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row)
    }
}

/// A cell reference as it appears in formula text.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct CellAddress {
    pub col: u32,
    pub row: u32,
    pub col_absolute: bool,
    pub row_absolute: bool,
}

/// Addressing modes in the order they are tried.
const MODES: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

fn mode_patterns() -> &'static [Regex; 4] {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$",
            r"^\$(?<letters>[A-Z]+)(?<numbers>[0-9]+)$",
            r"^(?<letters>[A-Z]+)\$(?<numbers>[0-9]+)$",
            r"^\$(?<letters>[A-Z]+)\$(?<numbers>[0-9]+)$",
        ]
        .map(|pattern| Regex::new(pattern).expect("addressing mode regex must compile"))
    })
}

impl CellAddress {
    /// Parse a single reference token such as `A1`, `$A1`, `A$1` or `$A$1`.
    ///
    /// The four addressing modes are tried in order: both relative, column
    /// absolute, row absolute, both absolute. The first full match wins.
    pub fn parse(token: &str) -> Result<CellAddress, ExtractError> {
        let invalid = || ExtractError::AddressParse {
            token: token.to_string(),
        };

        for (re, (col_absolute, row_absolute)) in mode_patterns().iter().zip(MODES) {
            let Some(caps) = re.captures(token) else {
                continue;
            };
            let col = CellRef::letters_to_col(&caps["letters"]).ok_or_else(invalid)?;
            let row = caps["numbers"]
                .parse::<u32>()
                .ok()
                .filter(|row| *row >= 1)
                .ok_or_else(invalid)?;
            return Ok(CellAddress {
                col,
                row,
                col_absolute,
                row_absolute,
            });
        }

        Err(invalid())
    }

    pub fn cell(&self) -> CellRef {
        CellRef::new(self.col, self.row)
    }

    /// Displacement of this reference as seen from `origin`.
    ///
    /// Absolute axes contribute their raw coordinate, relative axes the
    /// difference to the origin's coordinate.
    pub fn displacement(&self, origin: CellRef) -> (i64, i64) {
        let dx = if self.col_absolute {
            self.col as i64
        } else {
            self.col as i64 - origin.col as i64
        };
        let dy = if self.row_absolute {
            self.row as i64
        } else {
            self.row as i64 - origin.row as i64
        };
        (dx, dy)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.col_absolute { "$" } else { "" },
            CellRef::col_to_letters(self.col),
            if self.row_absolute { "$" } else { "" },
            self.row
        )
    }
}
