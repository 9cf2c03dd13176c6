//! Property-based tests using proptest

use failsift::{run, Normalizer, RankedCluster, TestResult, TriageConfig};
use proptest::prelude::*;

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// A maximal ASCII digit run not glued to a letter, digit, or underscore
/// on either side. Normalization masks every such run, so finding one in
/// normalized output is a failure.
fn has_bare_digit_run(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let left_free = start == 0 || !is_word(bytes[start - 1]);
        let right_free = i == bytes.len() || !is_word(bytes[i]);
        if left_free && right_free {
            return true;
        }
    }
    false
}

fn results_from(docs: &[String]) -> Vec<TestResult> {
    docs.iter()
        .enumerate()
        .map(|(i, doc)| TestResult::new(format!("test_{i}"), doc.clone(), doc.clone()))
        .collect()
}

proptest! {
    /// Normalizing already-normalized text changes nothing: placeholders
    /// contain no digits, so no masking rule can fire a second time, and
    /// every skip-trigger line was already removed by the first pass.
    #[test]
    fn test_normalize_idempotent(input in "[ -~\n]{0,400}") {
        let normalizer = Normalizer::new();
        let once = normalizer.normalize(&input);
        let twice = normalizer.normalize(&once);
        prop_assert_eq!(once, twice);
    }

    /// No free-standing number survives normalization.
    #[test]
    fn test_normalize_masks_bare_numbers(input in "[ -~\n]{0,400}") {
        let normalizer = Normalizer::new();
        let normalized = normalizer.normalize(&input);
        prop_assert!(
            !has_bare_digit_run(&normalized),
            "bare number survived in {:?}",
            normalized
        );
    }

    /// Cluster members plus noise always partition the input exactly.
    #[test]
    fn test_clusters_and_noise_partition_input(
        docs in prop::collection::vec("[a-z ]{1,40}", 0..12),
    ) {
        let results = results_from(&docs);
        let n = results.len();

        let outcome = run(results, &TriageConfig::default()).unwrap();

        let mut seen = vec![false; n];
        for cluster in &outcome.clusters {
            for &idx in &cluster.member_indices {
                prop_assert!(!seen[idx], "index {} assigned twice", idx);
                seen[idx] = true;
            }
        }
        for &idx in &outcome.noise_indices {
            prop_assert!(!seen[idx], "index {} both clustered and noise", idx);
            seen[idx] = true;
        }
        prop_assert!(seen.iter().all(|&s| s), "some index unaccounted for");
    }

    /// Ranks are 1-based, consecutive, and sizes never increase with rank.
    #[test]
    fn test_ranking_ordered_by_size(
        docs in prop::collection::vec("[a-z ]{1,40}", 0..12),
    ) {
        let outcome = run(results_from(&docs), &TriageConfig::default()).unwrap();

        for (i, cluster) in outcome.clusters.iter().enumerate() {
            prop_assert_eq!(cluster.rank, i + 1);
        }
        let sizes: Vec<usize> = outcome.clusters.iter().map(RankedCluster::len).collect();
        for pair in sizes.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    /// The same input always produces the same partition.
    #[test]
    fn test_run_deterministic(
        docs in prop::collection::vec("[a-z ]{1,40}", 3..10),
    ) {
        let config = TriageConfig::default();
        let a = run(results_from(&docs), &config).unwrap();
        let b = run(results_from(&docs), &config).unwrap();

        prop_assert_eq!(a.clusters.len(), b.clusters.len());
        for (ca, cb) in a.clusters.iter().zip(&b.clusters) {
            prop_assert_eq!(&ca.member_indices, &cb.member_indices);
        }
        prop_assert_eq!(a.noise_indices, b.noise_indices);
    }
}
