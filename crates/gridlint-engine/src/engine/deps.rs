//! Dependency vector extraction from formula strings.
//!
//! A formula's dependency vector is the sum of the displacements of every
//! cell it references, measured from the formula's own cell. Formulas that
//! were filled/copied from one another share the same vector, wherever they
//! sit on the sheet.
//!
//! Handles:
//! - Singleton references in all four addressing modes: `A1`, `$A1`, `A$1`, `$A$1`
//! - Range references: `B2:C5`, summed in closed form rather than per cell
//! - Optionally ignores references inside string literals

use regex::{Match, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::cell_ref::{CellAddress, CellRef};
use super::error::{ExtractError, Result};

/// Aggregate displacement, in (column, row) units, of all cells a formula references.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct DependencyVector {
    pub dx: i64,
    pub dy: i64,
}

impl DependencyVector {
    pub const ZERO: DependencyVector = DependencyVector { dx: 0, dy: 0 };

    pub fn new(dx: i64, dy: i64) -> Self {
        DependencyVector { dx, dy }
    }

    fn checked_add(self, other: DependencyVector) -> Option<DependencyVector> {
        Some(DependencyVector {
            dx: self.dx.checked_add(other.dx)?,
            dy: self.dy.checked_add(other.dy)?,
        })
    }
}

/// Serialized as a two-element array, e.g. `[48,42]`. This is the form that gets hashed.
impl fmt::Display for DependencyVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.dx, self.dy)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Blank out the contents of `"..."` literals before scanning.
    pub skip_string_literals: bool,
}

/// A reference found in formula text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefToken<'a> {
    Single(&'a str),
    Range(&'a str, &'a str),
}

/// Extract the dependency vector of `formula` as seen from the cell at
/// (`origin_col`, `origin_row`), both 1-indexed.
pub fn extract_dependency_vector(
    formula: &str,
    origin_col: u32,
    origin_row: u32,
) -> Result<DependencyVector> {
    extract_with_options(
        formula,
        CellRef::new(origin_col, origin_row),
        &ExtractOptions::default(),
    )
}

pub fn extract_with_options(
    formula: &str,
    origin: CellRef,
    options: &ExtractOptions,
) -> Result<DependencyVector> {
    let stripped;
    let text = if options.skip_string_literals {
        stripped = strip_string_literals(formula);
        stripped.as_str()
    } else {
        formula
    };

    let tokens = tokenize(text);
    let mut vector = DependencyVector::ZERO;

    // Ranges first, then singletons.
    for token in &tokens {
        if let RefToken::Range(first, last) = *token {
            let sum = range_vector(first, last, origin)?;
            vector = vector.checked_add(sum).ok_or_else(|| ExtractError::Overflow {
                token: format!("{first}:{last}"),
            })?;
        }
    }
    for token in &tokens {
        if let RefToken::Single(cell) = *token {
            let (dx, dy) = CellAddress::parse(cell)?.displacement(origin);
            vector = vector
                .checked_add(DependencyVector::new(dx, dy))
                .ok_or_else(|| ExtractError::Overflow {
                    token: cell.to_string(),
                })?;
        }
    }

    Ok(vector)
}

/// Split formula text into range and singleton reference tokens.
///
/// Text is cut into runs of reference characters. A run counts as a
/// reference when it contains an uppercase letter followed by a digit and
/// is neither a numeric literal (`1E5`), a function name (`LOG10(`), a
/// sheet name (`Q1!`) nor a defined name (`TAX_RATE2`, `Q1_Sales`). Two
/// references joined by a single `:` form a range.
/// Reference runs are not validated here; malformed ones such as `1A1` fail
/// later in [`CellAddress::parse`].
pub fn tokenize(text: &str) -> Vec<RefToken<'_>> {
    let runs: Vec<Match<'_>> = run_re().find_iter(text).collect();
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();

    let mut i = 0;
    while i < runs.len() {
        let run = runs[i];
        if !is_reference(bytes, run) {
            i += 1;
            continue;
        }

        if let Some(next) = runs.get(i + 1) {
            let joined = bytes.get(run.end()) == Some(&b':') && next.start() == run.end() + 1;
            if joined && is_reference(bytes, *next) {
                tracing::trace!(first = run.as_str(), last = next.as_str(), "range reference");
                tokens.push(RefToken::Range(run.as_str(), next.as_str()));
                i += 2;
                continue;
            }
        }

        tracing::trace!(cell = run.as_str(), "singleton reference");
        tokens.push(RefToken::Single(run.as_str()));
        i += 1;
    }

    tokens
}

fn is_reference(bytes: &[u8], run: Match<'_>) -> bool {
    let text = run.as_str();
    if !reference_shape_re().is_match(text) || numeric_literal_re().is_match(text) {
        return false;
    }
    if is_defined_name(text) {
        return false;
    }
    !matches!(bytes.get(run.end()), Some(b'(') | Some(b'!'))
}

/// A1 references never hold `_`, `.` or lowercase letters; names do.
fn is_defined_name(text: &str) -> bool {
    text.bytes().any(|b| b == b'_' || b == b'.' || b.is_ascii_lowercase())
}

/// Sum of the displacements of every cell in the range `first:last`.
///
/// With `(fx, fy)` and `(lx, ly)` the corner displacements, each column
/// value in `fx..=lx` appears once per row and each row value in `fy..=ly`
/// once per column, so the sums reduce to arithmetic series scaled by the
/// orthogonal extent.
///
/// Only a range whose cells are reversed (`B2:A1`) is rejected. When the
/// corners differ in absoluteness, as in the running total `$B$2:B5`, the
/// corner displacements need not be ordered; the series identity is then
/// applied to the signed extents as they are, so every filled copy of the
/// formula gets the same vector.
fn range_vector(first: &str, last: &str, origin: CellRef) -> Result<DependencyVector> {
    let first_addr = CellAddress::parse(first)?;
    let last_addr = CellAddress::parse(last)?;
    if first_addr.col > last_addr.col || first_addr.row > last_addr.row {
        return Err(ExtractError::EmptyRange {
            range: format!("{first}:{last}"),
        });
    }

    let (fx, fy) = first_addr.displacement(origin);
    let (lx, ly) = last_addr.displacement(origin);

    let overflow = || ExtractError::Overflow {
        token: format!("{first}:{last}"),
    };
    let width = lx - fx + 1;
    let height = ly - fy + 1;
    let dx = series_sum(fx, lx)
        .and_then(|sum| sum.checked_mul(height))
        .ok_or_else(overflow)?;
    let dy = series_sum(fy, ly)
        .and_then(|sum| sum.checked_mul(width))
        .ok_or_else(overflow)?;

    Ok(DependencyVector::new(dx, dy))
}

/// `k + (k+1) + ... + n` for `k <= n`, zero for `n == k - 1`, and the
/// negated sum of `n+1 ..= k-1` below that.
fn series_sum(k: i64, n: i64) -> Option<i64> {
    let upper = n.checked_mul(n.checked_add(1)?)? / 2;
    let lower = k.checked_sub(1)?.checked_mul(k)? / 2;
    upper.checked_sub(lower)
}

fn run_re() -> &'static Regex {
    static RUN_RE: OnceLock<Regex> = OnceLock::new();
    RUN_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9_.$]+").expect("reference run regex must compile")
    })
}

fn reference_shape_re() -> &'static Regex {
    static SHAPE_RE: OnceLock<Regex> = OnceLock::new();
    SHAPE_RE.get_or_init(|| {
        Regex::new(r"[A-Z]\$?[0-9]").expect("reference shape regex must compile")
    })
}

fn numeric_literal_re() -> &'static Regex {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE.get_or_init(|| {
        Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)E[0-9]+$")
            .expect("numeric literal regex must compile")
    })
}

/// Replace the contents of `"..."` literals with spaces. A doubled `""`
/// inside a literal closes and reopens it, which leaves it blanked too.
fn strip_string_literals(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut in_string = false;

    for ch in formula.chars() {
        if ch == '"' {
            in_string = !in_string;
            out.push('"');
        } else if in_string {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }

    out
}
