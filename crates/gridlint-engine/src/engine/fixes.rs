//! Suspicious formulas: rectangles that would coalesce with a neighbour if
//! only their fingerprints agreed.
//!
//! After clustering, any mergeable pair of rectangles from different
//! clusters is a candidate fix. The smaller side is the likely odd one out,
//! and a small outlier next to a large block scores highest.

use rayon::prelude::*;
use serde::Serialize;

use super::cluster::Cluster;
use super::fingerprint::Fingerprint;
use super::rect::{Rect, area, mergeable_within};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FixCandidate {
    /// The smaller rectangle of the pair.
    pub outlier: Rect,
    pub outlier_fingerprint: Fingerprint,
    pub neighbor: Rect,
    pub neighbor_fingerprint: Fingerprint,
    /// Share of the merged rectangle held by the neighbour, in `[0.5, 1)`.
    pub score: f64,
}

#[derive(Clone, Copy)]
struct Piece {
    rect: Rect,
    fingerprint: Fingerprint,
    cluster_cells: u64,
}

impl FixCandidate {
    /// The smaller rectangle is the outlier. On equal areas the one from the
    /// smaller cluster is, then the later one in row-major order.
    fn between(a: Piece, b: Piece) -> FixCandidate {
        let rank = |p: &Piece| {
            let (x, y) = p.rect.top_left();
            (area(&p.rect), p.cluster_cells, std::cmp::Reverse((y, x)))
        };
        let (outlier, neighbor) = if rank(&b) < rank(&a) {
            (b, a)
        } else {
            (a, b)
        };
        let outlier_cells = area(&outlier.rect) as f64;
        let neighbor_cells = area(&neighbor.rect) as f64;
        FixCandidate {
            outlier: outlier.rect,
            outlier_fingerprint: outlier.fingerprint,
            neighbor: neighbor.rect,
            neighbor_fingerprint: neighbor.fingerprint,
            score: neighbor_cells / (outlier_cells + neighbor_cells),
        }
    }
}

/// Every mergeable pair of rectangles with different fingerprints, most
/// suspicious first.
///
/// Rectangles are swept left to right, so each one is only compared with
/// those starting within `tolerance` columns of its right edge.
pub fn find_fixes(clusters: &[Cluster], tolerance: u32, parallel: bool) -> Vec<FixCandidate> {
    let mut pieces: Vec<Piece> = clusters
        .iter()
        .flat_map(|cluster| {
            let cluster_cells = cluster.cell_count();
            cluster.rects.iter().map(move |rect| Piece {
                rect: *rect,
                fingerprint: cluster.fingerprint,
                cluster_cells,
            })
        })
        .collect();
    pieces.sort_by_key(|p| p.rect.top_left());

    let pairs_from = |i: usize| -> Vec<FixCandidate> {
        let a = pieces[i];
        let reach = a.rect.bottom_right().0 as u64 + tolerance as u64;
        pieces[i + 1..]
            .iter()
            .take_while(|b| b.rect.top_left().0 as u64 <= reach)
            .filter(|b| {
                b.fingerprint != a.fingerprint && mergeable_within(&a.rect, &b.rect, tolerance)
            })
            .map(|b| FixCandidate::between(a, *b))
            .collect()
    };

    let mut fixes: Vec<FixCandidate> = if parallel {
        (0..pieces.len())
            .into_par_iter()
            .flat_map_iter(&pairs_from)
            .collect()
    } else {
        (0..pieces.len()).flat_map(&pairs_from).collect()
    };

    let row_major = |r: &Rect| (r.top_left().1, r.top_left().0);
    fixes.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| row_major(&a.outlier).cmp(&row_major(&b.outlier)))
            .then_with(|| row_major(&a.neighbor).cmp(&row_major(&b.neighbor)))
    });
    tracing::debug!(candidates = fixes.len(), "found candidate fixes");
    fixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cell_ref::CellRef;
    use crate::engine::cluster::cluster_cells;
    use crate::engine::rect::DEFAULT_TOLERANCE;

    fn rect(x1: u32, y1: u32, x2: u32, y2: u32) -> Rect {
        Rect::new((x1, y1), (x2, y2)).unwrap()
    }

    /// Column C with one odd formula at C5.
    fn column_with_outlier() -> Vec<Cluster> {
        let cells = (1..=6).map(|row| {
            let fingerprint = if row == 5 {
                Fingerprint(2)
            } else {
                Fingerprint(1)
            };
            (CellRef::new(3, row), fingerprint)
        });
        cluster_cells(cells, DEFAULT_TOLERANCE, false)
    }

    #[test]
    fn test_outlier_in_column_is_flagged() {
        let fixes = find_fixes(&column_with_outlier(), DEFAULT_TOLERANCE, false);
        assert_eq!(fixes.len(), 2);
        assert!(fixes.iter().all(|f| f.outlier == rect(3, 5, 3, 5)));
        assert!(fixes.iter().all(|f| f.outlier_fingerprint == Fingerprint(2)));

        assert_eq!(fixes[0].neighbor, rect(3, 1, 3, 4));
        assert!((fixes[0].score - 0.8).abs() < 1e-9);
        // C6 is a single cell too, but its cluster is the larger one.
        assert_eq!(fixes[1].neighbor, rect(3, 6, 3, 6));
        assert!((fixes[1].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_clusters_have_no_fixes() {
        let cells = (1..=4).map(|row| (CellRef::new(1, row), Fingerprint(9)));
        let clusters = cluster_cells(cells, DEFAULT_TOLERANCE, false);
        assert!(find_fixes(&clusters, DEFAULT_TOLERANCE, false).is_empty());
    }

    #[test]
    fn test_unmergeable_neighbours_are_ignored() {
        // B1:B3 beside C1 would form an L shape.
        let clusters = vec![
            Cluster {
                fingerprint: Fingerprint(1),
                rects: vec![rect(2, 1, 2, 3)],
            },
            Cluster {
                fingerprint: Fingerprint(2),
                rects: vec![rect(3, 1, 3, 1)],
            },
        ];
        assert!(find_fixes(&clusters, DEFAULT_TOLERANCE, false).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let cells: Vec<(CellRef, Fingerprint)> = (1..=8)
            .flat_map(|col| {
                (1..=8).map(move |row| (CellRef::new(col, row), Fingerprint((col * row) % 4)))
            })
            .collect();
        let clusters = cluster_cells(cells, DEFAULT_TOLERANCE, false);
        assert_eq!(
            find_fixes(&clusters, DEFAULT_TOLERANCE, true),
            find_fixes(&clusters, DEFAULT_TOLERANCE, false)
        );
    }
}
