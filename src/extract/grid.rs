//! Ruled-grid table strategy.
//!
//! Bordered tables paint their cell borders as horizontal and vertical
//! rules. Clustering the rule positions recovers the grid lines, and
//! every text span inside the grid is binned into its cell.

use crate::models::ExtractedTable;

use super::content::{cluster_positions, PageGeometry, TextSpan};

/// Max cross-axis deviation for a segment to count as axis-aligned.
const AXIS_TOL: f64 = 1.0;
/// Segments shorter than this are decoration, not grid rules.
const MIN_RULE_LEN: f64 = 8.0;
/// Rule positions closer than this merge into one grid line.
const GRID_TOL: f64 = 2.0;

/// Detect a bordered table from painted rules. Requires at least three
/// horizontal and three vertical grid lines, so the smallest candidate
/// is a 2x2 grid of cells.
pub(crate) fn from_ruled_grid(geometry: &PageGeometry) -> Option<ExtractedTable> {
    let mut ys = Vec::new();
    let mut xs = Vec::new();
    for seg in &geometry.segments {
        let dx = (seg.x1 - seg.x0).abs();
        let dy = (seg.y1 - seg.y0).abs();
        if dy <= AXIS_TOL && dx >= MIN_RULE_LEN {
            ys.push((seg.y0 + seg.y1) / 2.0);
        } else if dx <= AXIS_TOL && dy >= MIN_RULE_LEN {
            xs.push((seg.x0 + seg.x1) / 2.0);
        }
    }

    let ys = cluster_positions(ys, GRID_TOL);
    let xs = cluster_positions(xs, GRID_TOL);
    if ys.len() < 3 || xs.len() < 3 {
        return None;
    }

    let n_rows = ys.len() - 1;
    let n_cols = xs.len() - 1;
    let mut cells: Vec<Vec<Vec<&TextSpan>>> = vec![vec![Vec::new(); n_cols]; n_rows];

    for span in &geometry.spans {
        let Some(col) = band_index(&xs, span.x) else {
            continue;
        };
        let Some(band) = band_index(&ys, span.y) else {
            continue;
        };
        // Page coordinates grow upward; rows read downward.
        cells[n_rows - 1 - band][col].push(span);
    }

    let rows = cells.into_iter().map(row_strings).collect();
    Some(ExtractedTable::new(rows))
}

/// Index of the band between consecutive bounds that contains `v`.
/// Bounds are ascending; values outside the outermost bounds are not
/// part of the grid.
fn band_index(bounds: &[f64], v: f64) -> Option<usize> {
    if v < bounds[0] {
        return None;
    }
    for i in 0..bounds.len() - 1 {
        if v <= bounds[i + 1] {
            return Some(i);
        }
    }
    None
}

fn row_strings(row: Vec<Vec<&TextSpan>>) -> Vec<String> {
    row.into_iter().map(join_cell).collect()
}

/// Join a cell's spans in reading order.
fn join_cell(mut cell: Vec<&TextSpan>) -> String {
    cell.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));
    cell.iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::super::content::Segment;
    use super::*;

    fn hline(y: f64) -> Segment {
        Segment { x0: 50.0, y0: y, x1: 350.0, y1: y }
    }

    fn vline(x: f64) -> Segment {
        Segment { x0: x, y0: 500.0, x1: x, y1: 700.0 }
    }

    fn span(x: f64, y: f64, text: &str) -> TextSpan {
        TextSpan { x, y, text: text.to_string() }
    }

    fn bordered_page() -> PageGeometry {
        PageGeometry {
            segments: vec![
                hline(700.0),
                hline(600.0),
                hline(500.0),
                vline(50.0),
                vline(200.0),
                vline(350.0),
            ],
            spans: vec![
                span(60.0, 650.0, "Indicator"),
                span(210.0, 650.0, "Value"),
                span(60.0, 550.0, "CPI"),
                span(210.0, 550.0, "6.2"),
            ],
        }
    }

    #[test]
    fn bordered_grid_becomes_rows_and_columns() {
        let table = from_ruled_grid(&bordered_page()).unwrap();
        assert_eq!(
            table.rows,
            vec![
                vec!["Indicator".to_string(), "Value".to_string()],
                vec!["CPI".to_string(), "6.2".to_string()],
            ]
        );
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 2);
    }

    #[test]
    fn two_rules_per_axis_are_not_a_grid() {
        let geometry = PageGeometry {
            segments: vec![hline(700.0), hline(500.0), vline(50.0), vline(350.0)],
            spans: vec![span(60.0, 600.0, "boxed heading")],
        };
        assert!(from_ruled_grid(&geometry).is_none());
    }

    #[test]
    fn spans_outside_the_grid_are_ignored() {
        let mut geometry = bordered_page();
        geometry.spans.push(span(60.0, 750.0, "Bulletin Title"));
        geometry.spans.push(span(400.0, 650.0, "sidebar"));

        let table = from_ruled_grid(&geometry).unwrap();
        assert_eq!(table.rows[0], vec!["Indicator".to_string(), "Value".to_string()]);
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn double_painted_borders_collapse_to_one_grid_line() {
        let mut geometry = bordered_page();
        geometry.segments.push(hline(700.5));
        geometry.segments.push(vline(200.8));

        let table = from_ruled_grid(&geometry).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 2);
    }

    #[test]
    fn multiple_spans_in_one_cell_join_in_reading_order() {
        let mut geometry = bordered_page();
        geometry.spans.push(span(110.0, 650.0, "name"));
        geometry.spans.push(span(60.0, 630.0, "(2026)"));

        let table = from_ruled_grid(&geometry).unwrap();
        assert_eq!(table.rows[0][0], "Indicator name (2026)");
    }

    #[test]
    fn empty_grid_has_no_content() {
        let geometry = PageGeometry {
            segments: bordered_page().segments,
            spans: Vec::new(),
        };
        let table = from_ruled_grid(&geometry).unwrap();
        assert!(!table.has_content());
    }
}
