//! Stage trait definitions for the pipeline.
//!
//! Each trait represents one numeric stage boundary. The contracts are
//! deliberately narrow — strings in, index-aligned matrices and labels
//! out — so an implementation can be a library call or a from-scratch
//! algorithm without the runner caring.

/// Converts normalized outputs into a numeric feature matrix.
///
/// # Contract
///
/// - **Input**: N documents.
/// - **Output**: N rows, index-aligned with the input; every row the same
///   length, bounded by the implementation's vocabulary cap.
/// - **Deterministic**: same document set → same matrix, bit for bit.
pub trait Vectorize {
    /// Build the feature matrix for `docs`.
    fn vectorize(&self, docs: &[String]) -> Vec<Vec<f64>>;
}

/// Projects a high-dimensional feature matrix into `dims` dimensions
/// (2 or 3), preserving local neighborhood structure.
///
/// # Contract
///
/// - **Input**: N×M matrix, N ≥ 3.
/// - **Output**: N×`dims` matrix, index-aligned, every value finite. An
///   implementation must return *some* valid output even for degenerate
///   input (all-identical rows); falling back to zero coordinates is
///   acceptable, crashing is not.
/// - **Reproducible**: any internal randomness is seeded.
pub trait Reduce {
    /// Reduce `matrix` to `dims` dimensions.
    fn reduce(&self, matrix: &[Vec<f64>], dims: usize) -> Vec<Vec<f64>>;
}

/// Groups reduced points by density.
///
/// # Contract
///
/// - **Input**: N×d coordinates; `epsilon` > 0; `min_samples` ≥ 2, the
///   point itself included in its own neighborhood.
/// - **Output**: one label per point, index-aligned. `None` marks noise.
///   Labels are the algorithm's raw ids; display ranking happens in the
///   runner, never here.
/// - **Deterministic** for fixed input and parameters.
pub trait Cluster {
    /// Assign a cluster label (or noise) to every point.
    fn cluster(&self, points: &[Vec<f64>], epsilon: f64, min_samples: usize)
        -> Vec<Option<usize>>;
}
