//! Report assembly: the Markdown triage report and the flat failing-name
//! list.
//!
//! Everything rendered here is already deterministically ordered by the
//! runner; this module adds explicit sorts only where it aggregates across
//! clusters (the name list). Logged text goes into fenced code blocks whose
//! fence is widened past the longest backtick run inside the content, so a
//! log that itself contains code fences can never corrupt the document.

use crate::types::{TriageConfig, TriageOutcome};
use std::fmt::Write;

/// Render the Markdown triage report.
///
/// Clusters appear in rank order (size descending); noise members are
/// excluded from the listing but counted in the preamble statistic.
pub fn render_report(outcome: &TriageOutcome, config: &TriageConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} failing tests, {} clusters, {} unclustered ({:.1}%)",
        outcome.results.len(),
        outcome.clusters.len(),
        outcome.noise_indices.len(),
        outcome.percent_unclustered(),
    );

    for cluster in &outcome.clusters {
        let _ = writeln!(out, "\n# Cluster {} ({} tests)\n", cluster.rank, cluster.len());

        for name in &cluster.member_names {
            let _ = writeln!(out, "- {name}");
        }

        for (i, rep) in cluster.representatives.iter().enumerate() {
            let _ = writeln!(
                out,
                "\n<details>\n<summary>Representative {} — {} ({} tests)</summary>",
                i + 1,
                rep.name,
                rep.group_size
            );

            if config.show_normalized {
                let _ = writeln!(out, "\nNormalized:\n");
                push_fenced(&mut out, &rep.normalized_output);
            }

            let _ = writeln!(out, "\nRaw:\n");
            push_fenced(&mut out, &rep.raw_output);

            let _ = writeln!(out, "\n</details>");
        }
    }

    out
}

/// Render the flat failing-name list: one canonical name per line,
/// sorted and deduplicated, regardless of cluster membership.
pub fn render_failing_names(outcome: &TriageOutcome) -> String {
    let mut names: Vec<&str> = outcome.results.iter().map(|r| r.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();

    let mut out = names.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn push_fenced(out: &mut String, text: &str) {
    let fence = fence_for(text);
    let _ = writeln!(out, "{fence}\n{text}\n{fence}");
}

/// A backtick fence one longer than the longest backtick run in `text`,
/// and never shorter than the standard three.
fn fence_for(text: &str) -> String {
    let mut longest = 0usize;
    let mut run = 0usize;
    for ch in text.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RankedCluster, Representative, TestResult};

    fn outcome() -> TriageOutcome {
        let results = vec![
            TestResult::new("beta", "raw b", "norm b"),
            TestResult::new("alpha", "raw a", "norm a"),
            TestResult::new("alpha", "raw a2", "norm a"),
            TestResult::new("stray", "raw s", "norm s"),
        ];
        TriageOutcome {
            results,
            clusters: vec![
                RankedCluster {
                    rank: 1,
                    member_indices: vec![1, 2],
                    member_names: vec!["alpha".into(), "alpha".into()],
                    representatives: vec![Representative {
                        name: "alpha".into(),
                        group_size: 2,
                        normalized_output: "norm a".into(),
                        raw_output: "raw a".into(),
                    }],
                },
                RankedCluster {
                    rank: 2,
                    member_indices: vec![0],
                    member_names: vec!["beta".into()],
                    representatives: vec![Representative {
                        name: "beta".into(),
                        group_size: 1,
                        normalized_output: "norm b".into(),
                        raw_output: "raw b".into(),
                    }],
                },
            ],
            noise_indices: vec![3],
            coordinates: None,
        }
    }

    #[test]
    fn test_report_structure() {
        let report = render_report(&outcome(), &TriageConfig::default());
        assert!(report.contains("# Cluster 1 (2 tests)"));
        assert!(report.contains("# Cluster 2 (1 tests)"));
        assert!(report.contains("- alpha"));
        assert!(report.contains("<summary>Representative 1 — alpha (2 tests)</summary>"));
        assert!(report.contains("4 failing tests, 2 clusters, 1 unclustered (25.0%)"));
        // Rank 1 renders before rank 2.
        assert!(report.find("# Cluster 1").unwrap() < report.find("# Cluster 2").unwrap());
    }

    #[test]
    fn test_hide_normalized() {
        let config = TriageConfig::default().with_show_normalized(false);
        let report = render_report(&outcome(), &config);
        assert!(!report.contains("Normalized:"));
        assert!(report.contains("Raw:"));
    }

    #[test]
    fn test_fence_widens_past_embedded_fences() {
        assert_eq!(fence_for("plain text"), "```");
        assert_eq!(fence_for("has ``` inside"), "````");
        assert_eq!(fence_for("has ````` inside"), "``````");
    }

    #[test]
    fn test_embedded_fence_does_not_break_block() {
        let mut o = outcome();
        o.clusters[0].representatives[0].raw_output = "before\n```\nafter".into();
        let report = render_report(&o, &TriageConfig::default());
        assert!(report.contains("````\nbefore\n```\nafter\n````"));
    }

    #[test]
    fn test_failing_names_sorted_dedup() {
        assert_eq!(render_failing_names(&outcome()), "alpha\nbeta\nstray\n");
    }

    #[test]
    fn test_render_deterministic() {
        let o = outcome();
        let config = TriageConfig::default();
        assert_eq!(render_report(&o, &config), render_report(&o, &config));
    }
}
