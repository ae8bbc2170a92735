use gridlint_engine::engine::{
    CellFingerprint, CellRef, Color, DependencyVector, Fingerprint, Rect, cluster_cells, color_for,
    find_fixes, fingerprint_batch,
};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use super::Sheet;
use crate::config::AnalysisConfig;

/// Fingerprints and clusters of one sheet.
#[derive(Clone, Debug, Serialize)]
pub struct Analysis {
    pub sheet: String,
    pub formula_count: usize,
    /// Smallest range holding every formula, e.g. `B2:F40`.
    pub formula_range: Option<String>,
    /// Per-cell results in row-major order.
    pub cells: Vec<CellFingerprint>,
    pub clusters: Vec<ClusterReport>,
    /// Formulas that break the pattern of a neighbouring range, most suspicious first.
    pub fixes: Vec<FixReport>,
    pub failures: Vec<FailureReport>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClusterReport {
    pub fingerprint: Fingerprint,
    /// Vector of the cluster's first cell. Colliding vectors share a cluster.
    pub vector: DependencyVector,
    pub color: Color,
    pub cells: u64,
    #[serde(rename = "ranges", serialize_with = "ranges_as_a1")]
    pub rects: Vec<Rect>,
}

/// `range` could join `neighbor` if its formulas matched.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FixReport {
    pub range: String,
    pub fingerprint: Fingerprint,
    pub neighbor: String,
    pub neighbor_fingerprint: Fingerprint,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub cell: String,
    pub formula: String,
    pub error: String,
}

fn ranges_as_a1<S: Serializer>(rects: &[Rect], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(rects.iter().map(|r| r.to_string()))
}

impl Sheet {
    /// Fingerprint every formula and coalesce same-fingerprint cells.
    pub fn analyze(&self, config: &AnalysisConfig) -> Analysis {
        let inputs = self.formula_cells();
        let batch = fingerprint_batch(&inputs, &config.extract_options(), config.parallel);

        let mut vectors: HashMap<Fingerprint, DependencyVector> = HashMap::new();
        for cell in &batch.fingerprints {
            vectors.entry(cell.fingerprint).or_insert(cell.vector);
        }

        let clusters = cluster_cells(
            batch.fingerprints.iter().map(|f| (f.cell, f.fingerprint)),
            config.merge_tolerance,
            config.parallel,
        );

        let fixes = find_fixes(&clusters, config.merge_tolerance, config.parallel)
            .into_iter()
            .map(|fix| FixReport {
                range: fix.outlier.to_string(),
                fingerprint: fix.outlier_fingerprint,
                neighbor: fix.neighbor.to_string(),
                neighbor_fingerprint: fix.neighbor_fingerprint,
                score: fix.score,
            })
            .collect::<Vec<_>>();

        let clusters = clusters
            .into_iter()
            .map(|cluster| ClusterReport {
                fingerprint: cluster.fingerprint,
                vector: vectors
                    .get(&cluster.fingerprint)
                    .copied()
                    .unwrap_or_default(),
                color: color_for(cluster.fingerprint),
                cells: cluster.cell_count(),
                rects: cluster.rects,
            })
            .collect::<Vec<_>>();

        let failures = batch
            .failures
            .into_iter()
            .map(|failure| FailureReport {
                cell: failure.cell.to_string(),
                formula: failure.formula,
                error: failure.error.to_string(),
            })
            .collect::<Vec<_>>();

        tracing::info!(
            sheet = %self.name,
            formulas = inputs.len(),
            clusters = clusters.len(),
            fixes = fixes.len(),
            failures = failures.len(),
            "analyzed sheet"
        );

        Analysis {
            sheet: self.name.clone(),
            formula_count: inputs.len(),
            formula_range: self.bounds().map(|r| r.to_string()),
            cells: batch.fingerprints,
            clusters,
            fixes,
            failures,
        }
    }
}

impl Analysis {
    pub fn fingerprint_at(&self, cell: CellRef) -> Option<Fingerprint> {
        self.cells
            .binary_search_by_key(&cell, |c| c.cell)
            .ok()
            .map(|i| self.cells[i].fingerprint)
    }

    pub fn cluster_of(&self, cell: CellRef) -> Option<&ClusterReport> {
        self.clusters
            .iter()
            .find(|c| c.rects.iter().any(|r| r.contains(cell)))
    }

    /// Candidate fixes whose outlier range holds `cell`.
    pub fn fixes_at(&self, cell: CellRef) -> impl Iterator<Item = &FixReport> {
        let name = self
            .cluster_of(cell)
            .and_then(|c| c.rects.iter().find(|r| r.contains(cell)))
            .map(|r| r.to_string());
        self.fixes
            .iter()
            .filter(move |fix| name.as_deref() == Some(fix.range.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Column C sums A:B on each row; C5 breaks the pattern; D1 points elsewhere.
    fn sample_sheet() -> Sheet {
        let sheet = Sheet::new("Budget");
        for row in 1..=6 {
            let formula = if row == 5 {
                format!("=A{row}+B{}", row + 1)
            } else {
                format!("=A{row}+B{row}")
            };
            sheet.set_cell(CellRef::new(3, row), &formula);
        }
        sheet.set_cell(CellRef::new(4, 1), "=SUM($C$1:$C$6)");
        sheet.set_cell(CellRef::new(4, 2), "=1A1");
        sheet
    }

    #[test]
    fn test_clusters_follow_formula_shape() {
        let analysis = sample_sheet().analyze(&AnalysisConfig::default());
        assert_eq!(analysis.formula_count, 8);
        assert_eq!(analysis.cells.len(), 7);

        let main = &analysis.clusters[0];
        assert_eq!(main.cells, 5);
        let ranges: Vec<String> = main.rects.iter().map(|r| r.to_string()).collect();
        assert_eq!(ranges, vec!["C1:C4".to_string(), "C6".to_string()]);
        assert_eq!(main.vector, DependencyVector::new(-3, 0));

        let odd = analysis.cluster_of(CellRef::new(3, 5)).unwrap();
        assert_eq!(odd.cells, 1);
        assert_ne!(odd.fingerprint, main.fingerprint);
    }

    #[test]
    fn test_failures_are_reported_per_formula() {
        let analysis = sample_sheet().analyze(&AnalysisConfig::default());
        assert_eq!(
            analysis.failures,
            vec![FailureReport {
                cell: "D2".to_string(),
                formula: "=1A1".to_string(),
                error: "Invalid cell reference: 1A1".to_string(),
            }]
        );
        assert_eq!(analysis.fingerprint_at(CellRef::new(4, 2)), None);
    }

    #[test]
    fn test_odd_formula_is_flagged_as_fix() {
        let analysis = sample_sheet().analyze(&AnalysisConfig::default());
        let ranges: Vec<(&str, &str)> = analysis
            .fixes
            .iter()
            .map(|f| (f.range.as_str(), f.neighbor.as_str()))
            .collect();
        assert_eq!(ranges, vec![("C5", "C1:C4"), ("C5", "C6")]);
        assert!((analysis.fixes[0].score - 0.8).abs() < 1e-9);
        assert_eq!(analysis.fixes_at(CellRef::new(3, 5)).count(), 2);
        assert_eq!(analysis.fixes_at(CellRef::new(3, 2)).count(), 0);
    }

    #[test]
    fn test_formula_range_spans_all_formulas() {
        let analysis = sample_sheet().analyze(&AnalysisConfig::default());
        assert_eq!(analysis.formula_range.as_deref(), Some("C1:D6"));
        let empty = Sheet::new("Blank").analyze(&AnalysisConfig::default());
        assert_eq!(empty.formula_range, None);
    }

    #[test]
    fn test_area_matches_fingerprinted_cells() {
        let analysis = sample_sheet().analyze(&AnalysisConfig::default());
        let covered: u64 = analysis.clusters.iter().map(|c| c.cells).sum();
        assert_eq!(covered, analysis.cells.len() as u64);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let sheet = sample_sheet();
        let parallel = sheet.analyze(&AnalysisConfig::default());
        let sequential = sheet.analyze(&AnalysisConfig {
            parallel: false,
            ..AnalysisConfig::default()
        });
        assert_eq!(
            serde_json::to_value(&parallel).unwrap(),
            serde_json::to_value(&sequential).unwrap()
        );
    }

    #[test]
    fn test_json_shape() {
        let analysis = sample_sheet().analyze(&AnalysisConfig::default());
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["sheet"], "Budget");
        assert_eq!(json["clusters"][0]["ranges"][0], "C1:C4");
        assert_eq!(json["clusters"][0]["vector"]["dx"], -3);
        assert_eq!(json["fixes"][0]["range"], "C5");
        assert_eq!(json["fixes"][0]["neighbor"], "C1:C4");
        assert!(json["clusters"][0]["color"].as_str().unwrap().starts_with('#'));
    }
}
