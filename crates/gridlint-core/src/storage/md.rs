//! Markdown and JSON report export

use crate::document::Analysis;
use crate::error::Result;
use std::io::Write;

/// Write one section per analyzed sheet: a fingerprint table, then any
/// suspicious formulas and failures.
pub fn write_markdown<W: Write>(w: &mut W, analyses: &[Analysis]) -> std::io::Result<()> {
    for (i, analysis) in analyses.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "# {}", escape_markdown(&analysis.sheet))?;
        writeln!(w)?;

        if analysis.formula_count == 0 {
            writeln!(w, "*No formulas*")?;
            continue;
        }

        writeln!(
            w,
            "{} formulas, {} fingerprints, {} failures",
            analysis.formula_count,
            analysis.clusters.len(),
            analysis.failures.len()
        )?;
        if let Some(range) = &analysis.formula_range {
            writeln!(w, "Formulas in {range}")?;
        }

        if !analysis.clusters.is_empty() {
            writeln!(w)?;
            writeln!(w, "| Fingerprint | Color | Vector | Cells | Ranges |")?;
            writeln!(w, "|---|---|---|---|---|")?;
            for cluster in &analysis.clusters {
                let ranges: Vec<String> = cluster.rects.iter().map(|r| r.to_string()).collect();
                writeln!(
                    w,
                    "| {} | {} | {} | {} | {} |",
                    cluster.fingerprint,
                    cluster.color,
                    cluster.vector,
                    cluster.cells,
                    ranges.join(", ")
                )?;
            }
        }

        if !analysis.fixes.is_empty() {
            writeln!(w)?;
            writeln!(w, "## Suspicious formulas")?;
            writeln!(w)?;
            writeln!(w, "| Range | Fingerprint | Next to | Suspiciousness |")?;
            writeln!(w, "|---|---|---|---|")?;
            for fix in &analysis.fixes {
                writeln!(
                    w,
                    "| {} | {} | {} | {:.2} |",
                    fix.range, fix.fingerprint, fix.neighbor, fix.score
                )?;
            }
        }

        if !analysis.failures.is_empty() {
            writeln!(w)?;
            writeln!(w, "## Failures")?;
            writeln!(w)?;
            writeln!(w, "| Cell | Formula | Error |")?;
            writeln!(w, "|---|---|---|")?;
            for failure in &analysis.failures {
                writeln!(
                    w,
                    "| {} | `{}` | {} |",
                    failure.cell,
                    escape_markdown(&failure.formula),
                    escape_markdown(&failure.error)
                )?;
            }
        }
    }
    Ok(())
}

pub fn write_json<W: Write>(w: &mut W, analyses: &[Analysis]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, analyses)?;
    writeln!(w)?;
    Ok(())
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::document::Sheet;
    use gridlint_engine::engine::CellRef;

    fn analysis() -> Analysis {
        let sheet = Sheet::new("Totals");
        for row in 1..=3 {
            sheet.set_cell(CellRef::new(2, row), &format!("=A{row}*2"));
        }
        sheet.set_cell(CellRef::new(3, 1), "=IF(A1>0,1A1,0)");
        sheet.analyze(&AnalysisConfig::default())
    }

    #[test]
    fn test_markdown_lists_clusters_and_failures() {
        let mut out = Vec::new();
        write_markdown(&mut out, &[analysis()]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("# Totals\n"));
        assert!(text.contains("4 formulas, 1 fingerprints, 1 failures"));
        assert!(text.contains("| [-1,0] | 3 | B1:B3 |"));
        assert!(text.contains("## Failures"));
        assert!(text.contains("| C1 | `=IF(A1>0,1A1,0)` | Invalid cell reference: 1A1 |"));
    }

    #[test]
    fn test_markdown_lists_suspicious_formulas() {
        let sheet = Sheet::new("Column");
        for row in 1..=4 {
            let source_row = if row == 3 { 2 } else { row };
            sheet.set_cell(CellRef::new(2, row), &format!("=A{source_row}*2"));
        }
        let mut out = Vec::new();
        write_markdown(&mut out, &[sheet.analyze(&AnalysisConfig::default())]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Formulas in B1:B4"));
        assert!(text.contains("## Suspicious formulas"));
        assert!(text.contains("| Range | Fingerprint | Next to | Suspiciousness |"));
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("| B3 |")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("| B1:B2 | 0.67 |"));
        assert!(rows[1].contains("| B4 | 0.50 |"));
    }

    #[test]
    fn test_markdown_empty_sheet() {
        let empty = Sheet::new("Blank").analyze(&AnalysisConfig::default());
        let mut out = Vec::new();
        write_markdown(&mut out, &[empty]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "# Blank\n\n*No formulas*\n");
    }

    #[test]
    fn test_json_report_is_an_array() {
        let mut out = Vec::new();
        write_json(&mut out, &[analysis()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["sheet"], "Totals");
        assert_eq!(value[0]["clusters"][0]["ranges"][0], "B1:B3");
        assert_eq!(value[0]["failures"][0]["cell"], "C1");
        assert_eq!(value[0]["fixes"], serde_json::json!([]));
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a|b\nc"), "a\\|b c");
    }
}
