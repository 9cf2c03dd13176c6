//! Optional SVG scatter plot of the reduced coordinates.
//!
//! Strictly a consumer of the pipeline outcome: points are the first two
//! reduced components, colored by cluster rank, noise omitted. Nothing
//! here feeds back into clustering.

use crate::types::TriageOutcome;
use std::fmt::Write;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const MARGIN: f64 = 24.0;

/// Color palette cycled over cluster ranks.
const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Render a 2D scatter of the outcome's reduced coordinates.
///
/// Returns `None` when the run short-circuited the numeric stages and no
/// coordinates exist (fewer than three failing tests).
pub fn render_scatter(outcome: &TriageOutcome) -> Option<String> {
    let coords = outcome.coordinates.as_ref()?;

    // index → cluster rank, noise absent.
    let mut rank_of = vec![None; outcome.results.len()];
    for cluster in &outcome.clusters {
        for &idx in &cluster.member_indices {
            rank_of[idx] = Some(cluster.rank);
        }
    }

    let plotted: Vec<(usize, usize)> = rank_of
        .iter()
        .enumerate()
        .filter_map(|(idx, rank)| rank.map(|r| (idx, r)))
        .collect();

    let (min_x, max_x) = extent(plotted.iter().map(|&(i, _)| coords[i][0]));
    let (min_y, max_y) = extent(plotted.iter().map(|&(i, _)| coords[i][1]));
    let span_x = (max_x - min_x).max(1e-9);
    let span_y = (max_y - min_y).max(1e-9);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = writeln!(svg, r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#);

    for (idx, rank) in plotted {
        let px = MARGIN + (coords[idx][0] - min_x) / span_x * (WIDTH - 2.0 * MARGIN);
        let py = MARGIN + (coords[idx][1] - min_y) / span_y * (HEIGHT - 2.0 * MARGIN);
        let color = PALETTE[(rank - 1) % PALETTE.len()];
        let _ = writeln!(
            svg,
            r#"<circle cx="{px:.2}" cy="{py:.2}" r="4" fill="{color}"><title>{}</title></circle>"#,
            escape_xml(&outcome.results[idx].name)
        );
    }

    svg.push_str("</svg>\n");
    Some(svg)
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RankedCluster, TestResult, TriageOutcome};

    fn outcome_with_coords() -> TriageOutcome {
        TriageOutcome {
            results: vec![
                TestResult::new("a", "x", "x"),
                TestResult::new("b", "y", "y"),
                TestResult::new("c", "z", "z"),
            ],
            clusters: vec![RankedCluster {
                rank: 1,
                member_indices: vec![0, 1],
                member_names: vec!["a".into(), "b".into()],
                representatives: Vec::new(),
            }],
            noise_indices: vec![2],
            coordinates: Some(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![9.0, 9.0]]),
        }
    }

    #[test]
    fn test_noise_points_excluded() {
        let svg = render_scatter(&outcome_with_coords()).unwrap();
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(!svg.contains("<title>c</title>"));
    }

    #[test]
    fn test_no_coordinates_no_plot() {
        let mut o = outcome_with_coords();
        o.coordinates = None;
        assert!(render_scatter(&o).is_none());
    }

    #[test]
    fn test_degenerate_extent_does_not_divide_by_zero() {
        let mut o = outcome_with_coords();
        o.coordinates = Some(vec![vec![2.0, 2.0]; 3]);
        let svg = render_scatter(&o).unwrap();
        assert!(!svg.contains("NaN"));
    }
}
