//! Coalescing same-fingerprint cells into rectangles.
//!
//! Cells are grouped by fingerprint, then each group is reduced to a fixed
//! point: any mergeable pair is replaced by its bounding box until no
//! mergeable pair remains. Starting from distinct cells, every merge keeps
//! the rectangles disjoint, so the covered area always equals the cell count.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use super::cell_ref::CellRef;
use super::fingerprint::Fingerprint;
use super::rect::{Rect, area, bounding_box, mergeable_within};

/// Rectangles covering every cell that shares one fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub fingerprint: Fingerprint,
    pub rects: Vec<Rect>,
}

impl Cluster {
    /// Number of cells covered.
    pub fn cell_count(&self) -> u64 {
        self.rects.iter().map(area).sum()
    }
}

/// Merge rectangles pairwise until no mergeable pair is left.
///
/// Two linear sweeps run first: neighbours in row-major order are merged
/// into row runs, then neighbours in column-major order stack those runs
/// into blocks. The pairwise rescan only sees what the sweeps left. The
/// result is sorted by top-left corner.
pub fn coalesce(mut rects: Vec<Rect>, tolerance: u32) -> Vec<Rect> {
    rects.sort_by_key(|r| (r.top_left().1, r.top_left().0));
    rects = merge_neighbours(rects, tolerance);
    rects.sort_by_key(|r| r.top_left());
    rects = merge_neighbours(rects, tolerance);

    loop {
        let mut merged_any = false;
        let mut i = 0;
        while i < rects.len() {
            let mut j = i + 1;
            while j < rects.len() {
                if mergeable_within(&rects[i], &rects[j], tolerance) {
                    rects[i] = bounding_box(&rects[i], &rects[j]);
                    rects.swap_remove(j);
                    merged_any = true;
                    // rects[i] grew, so earlier candidates may now fit.
                    j = i + 1;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !merged_any {
            break;
        }
    }

    rects.sort_by_key(|r| (r.top_left().1, r.top_left().0));
    rects
}

/// Merge each rectangle into the previous survivor when the two are mergeable.
fn merge_neighbours(rects: Vec<Rect>, tolerance: u32) -> Vec<Rect> {
    let mut out: Vec<Rect> = Vec::with_capacity(rects.len());
    for rect in rects {
        if let Some(last) = out.last_mut() {
            if mergeable_within(last, &rect, tolerance) {
                *last = bounding_box(last, &rect);
                continue;
            }
        }
        out.push(rect);
    }
    out
}

/// Group cells by fingerprint and coalesce each group.
///
/// Duplicate cells are counted once. Clusters are ordered by descending
/// cell count, then by fingerprint. With `parallel`, groups are coalesced
/// on the rayon pool.
pub fn cluster_cells<I>(cells: I, tolerance: u32, parallel: bool) -> Vec<Cluster>
where
    I: IntoIterator<Item = (CellRef, Fingerprint)>,
{
    let mut groups: BTreeMap<Fingerprint, Vec<CellRef>> = BTreeMap::new();
    for (cell, fingerprint) in cells {
        groups.entry(fingerprint).or_default().push(cell);
    }

    let build = |(fingerprint, mut cells): (Fingerprint, Vec<CellRef>)| {
        cells.sort();
        cells.dedup();
        let rects = cells.into_iter().map(Rect::cell).collect();
        Cluster {
            fingerprint,
            rects: coalesce(rects, tolerance),
        }
    };

    let mut clusters: Vec<Cluster> = if parallel {
        groups.into_par_iter().map(build).collect()
    } else {
        groups.into_iter().map(build).collect()
    };

    clusters.sort_by(|a, b| {
        b.cell_count()
            .cmp(&a.cell_count())
            .then(a.fingerprint.cmp(&b.fingerprint))
    });
    clusters
}
