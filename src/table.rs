use crate::projection::ProjectedLine;
use crate::reconcile::Comparison;

pub const PROJECTION_HEADERS: [&str; 7] = [
    "Team",
    "AdjO",
    "AdjD",
    "Tempo",
    "SOS",
    "Proj Spread",
    "Proj Total",
];

// Column order is part of the downstream contract; moneylines are carried on
// BookLine but are not part of the comparison view.
pub const COMPARISON_HEADERS: [&str; 8] = [
    "Team",
    "Bookmaker",
    "Proj Spread",
    "Spread",
    "Spread Diff",
    "Proj Total",
    "Over/Under",
    "Total Diff",
];

pub fn projection_rows(projections: &[ProjectedLine]) -> Vec<Vec<String>> {
    projections
        .iter()
        .map(|p| {
            vec![
                p.team().to_string(),
                fmt_num(p.rating.adj_offense),
                fmt_num(p.rating.adj_defense),
                fmt_num(p.rating.tempo),
                fmt_num(p.rating.strength_of_schedule),
                fmt_num(p.projected_spread),
                fmt_num(p.projected_total),
            ]
        })
        .collect()
}

pub fn comparison_rows(comparisons: &[Comparison]) -> Vec<Vec<String>> {
    comparisons
        .iter()
        .map(|c| {
            vec![
                c.team.clone(),
                c.bookmaker.clone(),
                fmt_num(c.projected_spread),
                fmt_num(c.market_spread),
                fmt_num(c.spread_difference),
                fmt_num(c.projected_total),
                fmt_num(c.market_total),
                fmt_num(c.total_difference),
            ]
        })
        .collect()
}

/// Plain monospace rendering, columns padded to their widest cell.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx < widths.len() && cell.len() > widths[idx] {
                widths[idx] = cell.len();
            }
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    push_row(
        &mut out,
        widths.iter().map(|w| "-".repeat(*w)),
        &widths,
    );
    for row in rows {
        push_row(&mut out, row.iter().cloned(), &widths);
    }
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let mut first = true;
    for (cell, width) in cells.zip(widths.iter().copied()) {
        if !first {
            out.push_str("  ");
        }
        first = false;
        out.push_str(&format!("{cell:<width$}"));
    }
    // Trailing pad spaces are noise in terminal output.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

fn fmt_num(value: f64) -> String {
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::{COMPARISON_HEADERS, comparison_rows, render};
    use crate::reconcile::Comparison;

    fn duke_vs_bookx() -> Comparison {
        Comparison {
            team: "Duke".to_string(),
            bookmaker: "BookX".to_string(),
            projected_spread: -23.0,
            market_spread: -20.0,
            spread_difference: -3.0,
            projected_total: 213.0,
            market_total: 210.0,
            total_difference: 3.0,
        }
    }

    #[test]
    fn comparison_row_preserves_column_order() {
        let rows = comparison_rows(&[duke_vs_bookx()]);
        assert_eq!(
            rows[0],
            vec!["Duke", "BookX", "-23.0", "-20.0", "-3.0", "213.0", "210.0", "3.0"]
        );
    }

    #[test]
    fn render_aligns_and_terminates_lines() {
        let rows = comparison_rows(&[duke_vs_bookx()]);
        let text = render(&COMPARISON_HEADERS, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Team"));
        assert!(lines[2].contains("BookX"));
    }
}
