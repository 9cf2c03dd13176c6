//! Manifold reduction: exact t-SNE with a fixed seed.
//!
//! Projects the TF-IDF matrix into 2 or 3 dimensions while preserving
//! local neighborhood structure, so density clustering has something to
//! bite on. The implementation is the classic exact algorithm: per-row
//! Gaussian affinities tuned by binary search to a target perplexity,
//! early exaggeration, and gradient descent with adaptive gains and
//! momentum. Update steps are clamped and the finished layout is scaled
//! to a fixed extent, so a clustering radius chosen once stays valid
//! across inputs. Affinity rows are computed in parallel; the descent
//! itself is sequential and fully deterministic for a given seed.

use crate::pipeline::Reduce;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

const EARLY_EXAGGERATION: f64 = 4.0;
const EARLY_EXAGGERATION_ITERS: usize = 100;
const MOMENTUM_SWITCH_ITER: usize = 250;
/// Per-component cap on one iteration's position update. The student-t
/// tails keep repelling unrelated points until the floored affinities
/// balance out, which for small batches is tens of thousands of units
/// away; uncapped, adaptive gains turn that into overflow.
const MAX_STEP: f64 = 5.0;
/// Largest absolute coordinate in the returned embedding. The layout is
/// scaled down (never up) to this extent so the clustering radius has a
/// stable meaning regardless of how far the descent spread the groups.
const FINAL_EXTENT: f64 = 25.0;

/// Seeded exact t-SNE reducer.
#[derive(Debug, Clone)]
pub struct TsneReducer {
    perplexity: f64,
    iterations: usize,
    learning_rate: f64,
    seed: u64,
}

impl TsneReducer {
    /// Create a reducer with the given seed and default tuning.
    pub fn new(seed: u64) -> Self {
        Self {
            perplexity: 30.0,
            iterations: 500,
            learning_rate: 100.0,
            seed,
        }
    }

    /// Builder method: set perplexity (upper bound; scaled down for small N)
    pub fn with_perplexity(mut self, perplexity: f64) -> Self {
        self.perplexity = perplexity;
        self
    }

    /// Builder method: set gradient-descent iterations
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder method: set learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Symmetrized joint affinities P, rows tuned to the effective
    /// perplexity by binary search over sigma.
    fn joint_affinities(&self, matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let n = matrix.len();
        // Neighborhood size must shrink for small batches.
        let perplexity = self.perplexity.min((n - 1) as f64 / 3.0).max(1.0);
        let target_entropy = perplexity.ln();

        let dist_sq: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| {
                        matrix[i]
                            .iter()
                            .zip(&matrix[j])
                            .map(|(a, b)| (a - b) * (a - b))
                            .sum()
                    })
                    .collect()
            })
            .collect();

        let mut p: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut row = vec![0.0; n];
                let mut sigma = 1.0_f64;
                let mut lo = 0.0_f64;
                let mut hi = f64::MAX;

                for _ in 0..50 {
                    let mut sum = 0.0;
                    for j in 0..n {
                        if i == j {
                            row[j] = 0.0;
                            continue;
                        }
                        row[j] = (-dist_sq[i][j] / (2.0 * sigma * sigma)).exp();
                        sum += row[j];
                    }

                    if sum > 0.0 {
                        for v in &mut row {
                            *v /= sum;
                        }
                    } else {
                        // All neighbors numerically at infinity: fall back
                        // to a uniform row.
                        let uniform = 1.0 / (n - 1) as f64;
                        for (j, v) in row.iter_mut().enumerate() {
                            *v = if j == i { 0.0 } else { uniform };
                        }
                        break;
                    }

                    let entropy: f64 = row
                        .iter()
                        .filter(|&&v| v > 1e-12)
                        .map(|&v| -v * v.ln())
                        .sum();

                    if (entropy - target_entropy).abs() < 1e-5 {
                        break;
                    }

                    if entropy > target_entropy {
                        hi = sigma;
                        sigma = (lo + hi) / 2.0;
                    } else {
                        lo = sigma;
                        sigma = if hi == f64::MAX { sigma * 2.0 } else { (lo + hi) / 2.0 };
                    }
                }

                row
            })
            .collect();

        // Symmetrize: P = (P + Pᵀ) / 2n, floored away from zero.
        for i in 0..n {
            for j in (i + 1)..n {
                let sym = ((p[i][j] + p[j][i]) / (2.0 * n as f64)).max(1e-12);
                p[i][j] = sym;
                p[j][i] = sym;
            }
        }

        p
    }
}

impl Reduce for TsneReducer {
    fn reduce(&self, matrix: &[Vec<f64>], dims: usize) -> Vec<Vec<f64>> {
        let n = matrix.len();
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![vec![0.0; dims]];
        }

        let p = self.joint_affinities(matrix);

        // Small gaussian initialization (Box-Muller) from the fixed seed.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut gaussian = || {
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen();
            (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
        };
        let mut y: Vec<Vec<f64>> = (0..n)
            .map(|_| (0..dims).map(|_| gaussian() * 1e-2).collect())
            .collect();

        let mut velocity = vec![vec![0.0_f64; dims]; n];
        let mut gains = vec![vec![1.0_f64; dims]; n];
        let mut q_num = vec![vec![0.0_f64; n]; n];

        for iter in 0..self.iterations {
            let exaggeration = if iter < EARLY_EXAGGERATION_ITERS {
                EARLY_EXAGGERATION
            } else {
                1.0
            };
            let momentum: f64 = if iter < MOMENTUM_SWITCH_ITER { 0.5 } else { 0.8 };

            // Student-t numerators and their total.
            let mut q_sum = 0.0;
            for i in 0..n {
                for j in (i + 1)..n {
                    let dist_sq: f64 = y[i]
                        .iter()
                        .zip(&y[j])
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum();
                    let num = 1.0 / (1.0 + dist_sq);
                    q_num[i][j] = num;
                    q_num[j][i] = num;
                    q_sum += 2.0 * num;
                }
            }
            let q_sum = q_sum.max(1e-12);

            for i in 0..n {
                let mut grad = vec![0.0; dims];
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let q = (q_num[i][j] / q_sum).max(1e-12);
                    let mult = 4.0 * (exaggeration * p[i][j] - q) * q_num[i][j];
                    for k in 0..dims {
                        grad[k] += mult * (y[i][k] - y[j][k]);
                    }
                }

                for k in 0..dims {
                    gains[i][k] = if grad[k].signum() == velocity[i][k].signum() {
                        (gains[i][k] * 0.8).max(0.01)
                    } else {
                        gains[i][k] + 0.2
                    };
                    velocity[i][k] = (momentum * velocity[i][k]
                        - self.learning_rate * gains[i][k] * grad[k])
                        .clamp(-MAX_STEP, MAX_STEP);
                    y[i][k] += velocity[i][k];
                }
            }

            // Re-center to keep coordinates bounded.
            for k in 0..dims {
                let mean: f64 = y.iter().map(|row| row[k]).sum::<f64>() / n as f64;
                for row in &mut y {
                    row[k] -= mean;
                }
            }
        }

        // Degenerate inputs must still yield valid coordinates.
        if y.iter().flatten().any(|v| !v.is_finite()) {
            return vec![vec![0.0; dims]; n];
        }

        // Scale down to the fixed extent, never up: a layout that
        // collapsed to a point (all-identical input) must not have its
        // numeric noise inflated apart.
        let max_abs = y.iter().flatten().fold(0.0_f64, |m, v| m.max(v.abs()));
        if max_abs > FINAL_EXTENT {
            let scale = FINAL_EXTENT / max_abs;
            for row in &mut y {
                for v in row {
                    *v *= scale;
                }
            }
        }

        y
    }
}
