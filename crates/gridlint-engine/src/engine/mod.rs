//! Formula fingerprinting engine.
//!
//! This module provides the pure computations behind gridlint:
//!
//! - [`CellAddress`], [`CellRef`] - Cell reference parsing with absoluteness flags
//! - [`extract_dependency_vector`] - Reduce a formula to its dependency vector
//! - [`fingerprint`] - Hash a dependency vector to a 32-bit structural signature
//! - [`Rect`], [`mergeable`], [`bounding_box`] - Rectangle geometry
//! - [`cluster_cells`] - Coalesce same-fingerprint cells into rectangles
//! - [`find_fixes`] - Neighbouring rectangles whose fingerprints disagree
//! - [`fingerprint_batch`] - Fingerprint many formulas, collecting failures
//! - [`color_for`] - Display color of a fingerprint

mod batch;
mod cell_ref;
mod cluster;
mod deps;
mod error;
mod fingerprint;
mod fixes;
mod palette;
mod rect;

pub use batch::{
    BatchResult, CellFingerprint, FormulaCell, FormulaFailure, fingerprint_batch, fingerprint_cell,
};
pub use cell_ref::{CellAddress, CellRef};
pub use cluster::{Cluster, cluster_cells, coalesce};
pub use deps::{
    DependencyVector, ExtractOptions, RefToken, extract_dependency_vector, extract_with_options,
    tokenize,
};
pub use error::{ExtractError, Result};
pub use fingerprint::{Fingerprint, fingerprint, hash_str};
pub use fixes::{FixCandidate, find_fixes};
pub use palette::{Color, color_for, rgb_from_hsv};
pub use rect::{
    DEFAULT_TOLERANCE, Rect, area, bounding_box, is_adjacent, is_adjacent_within, mergeable,
    mergeable_within,
};
