//! Fingerprinting many formulas at once.
//!
//! Each formula is independent, so the batch fans out across the rayon pool.
//! A formula that fails to extract is reported alongside the successes
//! instead of aborting the batch.

use rayon::prelude::*;
use serde::Serialize;

use super::cell_ref::CellRef;
use super::deps::{DependencyVector, ExtractOptions, extract_with_options};
use super::error::ExtractError;
use super::fingerprint::{Fingerprint, fingerprint};

/// A formula and the cell that holds it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaCell {
    pub cell: CellRef,
    pub formula: String,
}

impl FormulaCell {
    pub fn new(cell: CellRef, formula: impl Into<String>) -> Self {
        FormulaCell {
            cell,
            formula: formula.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellFingerprint {
    pub cell: CellRef,
    pub vector: DependencyVector,
    pub fingerprint: Fingerprint,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaFailure {
    pub cell: CellRef,
    pub formula: String,
    pub error: ExtractError,
}

/// Outcome of a batch, both lists in row-major cell order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub fingerprints: Vec<CellFingerprint>,
    pub failures: Vec<FormulaFailure>,
}

pub fn fingerprint_cell(
    input: &FormulaCell,
    options: &ExtractOptions,
) -> Result<CellFingerprint, ExtractError> {
    let vector = extract_with_options(&input.formula, input.cell, options)?;
    Ok(CellFingerprint {
        cell: input.cell,
        vector,
        fingerprint: fingerprint(&vector),
    })
}

pub fn fingerprint_batch(
    inputs: &[FormulaCell],
    options: &ExtractOptions,
    parallel: bool,
) -> BatchResult {
    let run = |input: &FormulaCell| {
        fingerprint_cell(input, options).map_err(|error| {
            tracing::debug!(
                cell = %input.cell,
                formula = %input.formula,
                %error,
                "formula skipped"
            );
            FormulaFailure {
                cell: input.cell,
                formula: input.formula.clone(),
                error,
            }
        })
    };

    let outcomes: Vec<Result<CellFingerprint, FormulaFailure>> = if parallel {
        inputs.par_iter().map(run).collect()
    } else {
        inputs.iter().map(run).collect()
    };

    let mut result = BatchResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(cell) => result.fingerprints.push(cell),
            Err(failure) => result.failures.push(failure),
        }
    }
    result.fingerprints.sort_by_key(|f| f.cell);
    result.failures.sort_by_key(|f| f.cell);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> Vec<FormulaCell> {
        vec![
            FormulaCell::new(CellRef::new(3, 2), "=A2+B2"),
            FormulaCell::new(CellRef::new(3, 1), "=A1+B1"),
            FormulaCell::new(CellRef::new(3, 3), "=A3+1A1"),
            FormulaCell::new(CellRef::new(4, 1), "=SUM($C$2:$E$5)"),
        ]
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        let result = fingerprint_batch(&inputs(), &ExtractOptions::default(), false);
        assert_eq!(result.fingerprints.len(), 3);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].cell, CellRef::new(3, 3));
        assert!(matches!(
            result.failures[0].error,
            ExtractError::AddressParse { .. }
        ));
    }

    #[test]
    fn test_results_are_row_major_and_location_invariant() {
        let result = fingerprint_batch(&inputs(), &ExtractOptions::default(), false);
        let cells: Vec<CellRef> = result.fingerprints.iter().map(|f| f.cell).collect();
        assert_eq!(
            cells,
            vec![CellRef::new(3, 1), CellRef::new(4, 1), CellRef::new(3, 2)]
        );
        assert_eq!(
            result.fingerprints[0].fingerprint,
            result.fingerprints[2].fingerprint
        );
        assert_eq!(result.fingerprints[1].vector, DependencyVector::new(48, 42));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let options = ExtractOptions::default();
        assert_eq!(
            fingerprint_batch(&inputs(), &options, true),
            fingerprint_batch(&inputs(), &options, false)
        );
    }
}
