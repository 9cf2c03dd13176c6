//! Pipeline runner — orchestrates stage execution and cluster ranking.
//!
//! Threads the retained failing tests through vectorize → reduce →
//! cluster, then derives the user-facing ranked view. Ranking is a
//! deliberate two-phase design: phase one collects an unordered map from
//! raw clusterer label to member list, phase two sorts once — size
//! descending, ties broken by the lexicographically smallest member name —
//! so no output ever depends on hash-map iteration order.

use crate::cluster::Dbscan;
use crate::errors::{Result, TriageError};
use crate::pipeline::traits::{Cluster, Reduce, Vectorize};
use crate::reduce::TsneReducer;
use crate::types::{RankedCluster, Representative, TestResult, TriageConfig, TriageOutcome};
use crate::vectorize::TfIdfVectorizer;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Run the full clustering pipeline with the default stage implementations.
///
/// Fewer than three results short-circuits the numeric stages entirely:
/// each test becomes the sole member of its own singleton cluster, with no
/// noise and no reduced coordinates.
pub fn run(results: Vec<TestResult>, config: &TriageConfig) -> Result<TriageOutcome> {
    config.validate()?;

    if results.len() < 3 {
        return Ok(singleton_outcome(results, config));
    }

    let vectorizer = TfIdfVectorizer::new(config.unit, config.max_features);
    let reducer = TsneReducer::new(config.seed);
    run_with_stages(results, config, &vectorizer, &reducer, &Dbscan)
}

/// Run the pipeline with explicit stage implementations.
///
/// The seam tests use to substitute trivial stages; `run` is the
/// production entry point.
pub fn run_with_stages(
    results: Vec<TestResult>,
    config: &TriageConfig,
    vectorizer: &dyn Vectorize,
    reducer: &dyn Reduce,
    clusterer: &dyn Cluster,
) -> Result<TriageOutcome> {
    config.validate()?;

    if results.len() < 3 {
        return Ok(singleton_outcome(results, config));
    }

    let docs: Vec<String> = results
        .iter()
        .map(|r| r.normalized_output.clone())
        .collect();

    // Index alignment across stages is load-bearing: every later lookup
    // maps a row back to its TestResult by position.
    let matrix = vectorizer.vectorize(&docs);
    if matrix.len() != results.len() {
        return Err(TriageError::internal(format!(
            "vectorizer produced {} rows for {} documents",
            matrix.len(),
            results.len()
        )));
    }

    let coordinates = reducer.reduce(&matrix, config.reduce_dims);
    if coordinates.len() != results.len() {
        return Err(TriageError::internal(format!(
            "reducer produced {} points for {} documents",
            coordinates.len(),
            results.len()
        )));
    }

    let labels = clusterer.cluster(&coordinates, config.epsilon, config.min_samples);
    if labels.len() != results.len() {
        return Err(TriageError::internal(format!(
            "clusterer produced {} labels for {} points",
            labels.len(),
            results.len()
        )));
    }

    // Phase 1: unordered raw-label → members map, noise tracked aside.
    let mut by_label: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    let mut noise_indices = Vec::new();
    for (idx, label) in labels.iter().enumerate() {
        match label {
            Some(id) => by_label.entry(*id).or_default().push(idx),
            None => noise_indices.push(idx),
        }
    }

    // Phase 2: one explicit sort defines display order.
    let mut groups: Vec<Vec<usize>> = by_label.into_values().collect();
    groups.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| smallest_name(&results, a).cmp(smallest_name(&results, b)))
    });

    let clusters = groups
        .into_iter()
        .enumerate()
        .map(|(i, members)| build_cluster(i + 1, members, &results, config))
        .collect::<Vec<_>>();

    debug!(
        tests = results.len(),
        clusters = clusters.len(),
        noise = noise_indices.len(),
        "clustering complete"
    );

    Ok(TriageOutcome {
        results,
        clusters,
        noise_indices,
        coordinates: Some(coordinates),
    })
}

fn smallest_name<'a>(results: &'a [TestResult], members: &[usize]) -> &'a str {
    members
        .iter()
        .map(|&i| results[i].name.as_str())
        .min()
        .unwrap_or("")
}

/// Build the display view of one cluster: sorted member names plus
/// representative output groups chosen by frequency of identical
/// normalized output, ties broken by first encounter.
fn build_cluster(
    rank: usize,
    member_indices: Vec<usize>,
    results: &[TestResult],
    config: &TriageConfig,
) -> RankedCluster {
    let mut member_names: Vec<String> = member_indices
        .iter()
        .map(|&i| results[i].name.clone())
        .collect();
    member_names.sort();

    // Group members by identical normalized output, preserving the index
    // of the first member seen in each group.
    let mut group_order: Vec<&str> = Vec::new();
    let mut group_members: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for &idx in &member_indices {
        let key = results[idx].normalized_output.as_str();
        let entry = group_members.entry(key).or_default();
        if entry.is_empty() {
            group_order.push(key);
        }
        entry.push(idx);
    }

    let mut groups: Vec<(usize, Vec<usize>)> = group_order
        .iter()
        .enumerate()
        .map(|(order, key)| (order, group_members[key].clone()))
        .collect();
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));

    let representatives = groups
        .into_iter()
        .take(config.reps_per_cluster)
        .map(|(_, indices)| {
            let first = &results[indices[0]];
            Representative {
                name: first.name.clone(),
                group_size: indices.len(),
                normalized_output: first.normalized_output.clone(),
                raw_output: first.raw_output.clone(),
            }
        })
        .collect();

    RankedCluster {
        rank,
        member_indices,
        member_names,
        representatives,
    }
}

/// Short-circuit for N < 3: one singleton cluster per test, ranked by the
/// standard tie-break (all sizes equal, so by name).
fn singleton_outcome(results: Vec<TestResult>, config: &TriageConfig) -> TriageOutcome {
    let mut order: Vec<usize> = (0..results.len()).collect();
    order.sort_by(|&a, &b| results[a].name.cmp(&results[b].name));

    let clusters = order
        .into_iter()
        .enumerate()
        .map(|(i, idx)| build_cluster(i + 1, vec![idx], &results, config))
        .collect();

    TriageOutcome {
        results,
        clusters,
        noise_indices: Vec::new(),
        coordinates: None,
    }
}
