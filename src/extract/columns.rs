//! Aligned-column table strategy.
//!
//! Borderless statistical tables line their cells up on shared start
//! positions. Spans are grouped into lines by vertical position, and a
//! run of multi-span lines whose spans keep starting at the same x
//! positions is read as a table.

use crate::models::ExtractedTable;

use super::content::{cluster_positions, TextSpan};

/// Spans within this vertical distance belong to one line.
const LINE_TOL: f64 = 2.0;
/// Start positions within this distance share a column.
const COL_TOL: f64 = 5.0;

/// Detect a borderless table from column-aligned text. The longest run
/// of consecutive lines with two or more spans is the candidate block;
/// it must be at least two lines mapping onto at least two recurring
/// columns.
pub(crate) fn from_aligned_columns(spans: &[TextSpan]) -> Option<ExtractedTable> {
    let lines = group_lines(spans);
    let block = longest_multi_span_run(&lines)?;

    let columns = recurring_columns(block);
    if columns.len() < 2 {
        return None;
    }

    let rows = block
        .iter()
        .map(|line| {
            let mut cells: Vec<Vec<&TextSpan>> = vec![Vec::new(); columns.len()];
            for span in line {
                cells[nearest_column(&columns, span.x)].push(span);
            }
            cells.into_iter().map(join_cell).collect()
        })
        .collect();

    Some(ExtractedTable::new(rows))
}

/// Group spans into lines, top to bottom, left to right within a line.
fn group_lines(spans: &[TextSpan]) -> Vec<Vec<&TextSpan>> {
    let mut sorted: Vec<&TextSpan> = spans.iter().collect();
    sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<&TextSpan>> = Vec::new();
    for span in sorted {
        match lines.last_mut() {
            Some(line) if (line[0].y - span.y).abs() <= LINE_TOL => line.push(span),
            _ => lines.push(vec![span]),
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// The longest consecutive run of lines holding at least two spans.
/// Ties keep the earliest run. Runs shorter than two lines are prose,
/// not tables.
fn longest_multi_span_run<'a, 'b>(
    lines: &'b [Vec<&'a TextSpan>],
) -> Option<&'b [Vec<&'a TextSpan>]> {
    let mut best_start = 0;
    let mut best_len = 0;
    let mut start = 0;
    let mut len = 0;
    for (i, line) in lines.iter().enumerate() {
        if line.len() >= 2 {
            if len == 0 {
                start = i;
            }
            len += 1;
            if len > best_len {
                best_len = len;
                best_start = start;
            }
        } else {
            len = 0;
        }
    }
    (best_len >= 2).then(|| &lines[best_start..best_start + best_len])
}

/// Cluster span start positions across the block and keep the clusters
/// that at least two lines hit. A start position used by a single line
/// is an artifact of that line, not a column.
fn recurring_columns(block: &[Vec<&TextSpan>]) -> Vec<f64> {
    let starts: Vec<f64> = block
        .iter()
        .flat_map(|line| line.iter().map(|s| s.x))
        .collect();

    cluster_positions(starts, COL_TOL)
        .into_iter()
        .filter(|&cx| {
            let hits = block
                .iter()
                .filter(|line| line.iter().any(|s| (s.x - cx).abs() <= COL_TOL))
                .count();
            hits >= 2
        })
        .collect()
}

fn nearest_column(columns: &[f64], x: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, &cx) in columns.iter().enumerate() {
        let distance = (x - cx).abs();
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn join_cell(mut cell: Vec<&TextSpan>) -> String {
    cell.sort_by(|a, b| a.x.total_cmp(&b.x));
    cell.iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
