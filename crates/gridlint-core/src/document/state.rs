use gridlint_engine::engine::{CellRef, FormulaCell, Rect};
use std::sync::Arc;

use dashmap::DashMap;

/// Sparse formula storage (DashMap is internally Arc-based, clones are cheap)
pub type Grid = Arc<DashMap<CellRef, String>>;

/// One worksheet's formulas, keyed by cell.
///
/// Only formula text (starting with `=`) is kept; values and blanks are
/// irrelevant to fingerprinting.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            grid: Arc::new(DashMap::new()),
        }
    }

    /// Store `text` at `cell` if it is a formula, clearing the cell otherwise.
    /// Returns whether a formula was stored.
    pub fn set_cell(&self, cell: CellRef, text: &str) -> bool {
        let text = text.trim();
        if text.starts_with('=') {
            self.grid.insert(cell, text.to_string());
            true
        } else {
            self.grid.remove(&cell);
            false
        }
    }

    pub fn formula(&self, cell: &CellRef) -> Option<String> {
        self.grid.get(cell).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// All formulas in row-major order.
    pub fn formula_cells(&self) -> Vec<FormulaCell> {
        let mut cells: Vec<FormulaCell> = self
            .grid
            .iter()
            .map(|entry| FormulaCell::new(*entry.key(), entry.value().clone()))
            .collect();
        cells.sort_by_key(|c| c.cell);
        cells
    }

    /// Smallest rectangle holding every formula, None for an empty sheet.
    pub fn bounds(&self) -> Option<Rect> {
        let mut cells = self.grid.iter().map(|entry| *entry.key());
        let first = cells.next()?;
        let (mut min, mut max) = ((first.col, first.row), (first.col, first.row));
        for cell in cells {
            min = (min.0.min(cell.col), min.1.min(cell.row));
            max = (max.0.max(cell.col), max.1.max(cell.row));
        }
        Rect::new(min, max)
    }
}
