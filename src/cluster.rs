//! Density clustering of reduced coordinates (DBSCAN).
//!
//! A point is a core point when at least `min_samples` points (itself
//! included) lie within `epsilon`; connected dense regions chain into one
//! cluster and everything else is noise. Brute-force O(n²) neighbor search
//! is fine at triage batch sizes and keeps the implementation obviously
//! deterministic.

use crate::pipeline::Cluster;
use std::collections::VecDeque;

/// DBSCAN density clusterer (Ester, Kriegel, Sander, Xu 1996).
#[derive(Debug, Clone, Copy, Default)]
pub struct Dbscan;

impl Cluster for Dbscan {
    fn cluster(
        &self,
        points: &[Vec<f64>],
        epsilon: f64,
        min_samples: usize,
    ) -> Vec<Option<usize>> {
        let n = points.len();
        if n == 0 {
            return Vec::new();
        }

        let neighbors: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| euclidean_dist(&points[i], &points[j]) <= epsilon)
                    .collect()
            })
            .collect();

        let core: Vec<bool> = neighbors.iter().map(|nb| nb.len() >= min_samples).collect();

        let mut labels: Vec<Option<usize>> = vec![None; n];
        let mut cluster_id = 0;

        for i in 0..n {
            if labels[i].is_some() || !core[i] {
                continue;
            }

            labels[i] = Some(cluster_id);
            let mut queue: VecDeque<usize> = neighbors[i]
                .iter()
                .copied()
                .filter(|&j| labels[j].is_none())
                .collect();

            while let Some(q) = queue.pop_front() {
                if labels[q].is_some() {
                    continue;
                }
                labels[q] = Some(cluster_id);
                // Only core points extend the cluster; border points join
                // but do not chain further.
                if core[q] {
                    for &nb in &neighbors[q] {
                        if labels[nb].is_none() {
                            queue.push_back(nb);
                        }
                    }
                }
            }

            cluster_id += 1;
        }

        labels
    }
}

fn euclidean_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs_and_a_stray() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.5, 0.0],
            vec![0.0, 0.5],
            vec![10.0, 10.0],
            vec![10.5, 10.0],
            vec![10.0, 10.5],
            vec![50.0, 50.0],
        ]
    }

    #[test]
    fn test_two_clusters_and_noise() {
        let labels = Dbscan.cluster(&two_blobs_and_a_stray(), 1.5, 2);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(labels[6], None);
    }

    #[test]
    fn test_every_point_labeled_or_noise() {
        let labels = Dbscan.cluster(&two_blobs_and_a_stray(), 1.5, 2);
        assert_eq!(labels.len(), 7);
    }

    #[test]
    fn test_large_epsilon_merges_everything() {
        let labels = Dbscan.cluster(&two_blobs_and_a_stray(), 100.0, 2);
        assert!(labels.iter().all(|l| *l == Some(0)));
    }

    #[test]
    fn test_high_min_samples_yields_all_noise() {
        let labels = Dbscan.cluster(&two_blobs_and_a_stray(), 1.5, 5);
        assert!(labels.iter().all(Option::is_none));
    }

    #[test]
    fn test_deterministic() {
        let points = two_blobs_and_a_stray();
        assert_eq!(
            Dbscan.cluster(&points, 1.5, 2),
            Dbscan.cluster(&points, 1.5, 2)
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(Dbscan.cluster(&[], 1.0, 2).is_empty());
    }
}
