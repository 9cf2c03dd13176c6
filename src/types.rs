//! Core types for failsift
//!
//! This module defines the fundamental data structures used throughout the
//! library: the retained failing-test record, the pipeline configuration,
//! and the clustered-output value types consumed by the reporter.

use crate::errors::{Result, TriageError};
use serde::{Deserialize, Serialize};

// ============================================================================
// Test Result
// ============================================================================

/// A failing test retained for clustering.
///
/// Created by the ingest stage and immutable afterward. `raw_output` is
/// preserved verbatim for display; `normalized_output` is what the numeric
/// pipeline operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Canonical test name (decorations stripped)
    pub name: String,
    /// Captured stdout exactly as recorded
    pub raw_output: String,
    /// Output after noise masking and block skipping
    pub normalized_output: String,
}

impl TestResult {
    /// Create a new test result
    pub fn new(
        name: impl Into<String>,
        raw_output: impl Into<String>,
        normalized_output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            raw_output: raw_output.into(),
            normalized_output: normalized_output.into(),
        }
    }
}

// ============================================================================
// Feature Unit
// ============================================================================

/// The text unit the vectorizer counts when building TF-IDF features.
///
/// Whole lines are the default: log-line identity carries more signal than
/// individual tokens once noise has been masked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureUnit {
    /// One feature per distinct normalized line
    #[default]
    Lines,
    /// One feature per distinct unicode word
    Tokens,
}

impl FeatureUnit {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tokens" | "token" | "words" => FeatureUnit::Tokens,
            _ => FeatureUnit::Lines,
        }
    }
}

impl std::str::FromStr for FeatureUnit {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Ok(FeatureUnit::parse(value))
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a triage run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Representative output groups shown per cluster (>= 1)
    pub reps_per_cluster: usize,
    /// Target dimensionality of the manifold reduction (2 or 3)
    pub reduce_dims: usize,
    /// DBSCAN neighborhood radius in reduced space (> 0)
    pub epsilon: f64,
    /// Minimum points (including the point itself) for a dense neighborhood
    pub min_samples: usize,
    /// Text unit for TF-IDF features
    pub unit: FeatureUnit,
    /// Vocabulary cap for the feature matrix
    pub max_features: usize,
    /// Seed for the reducer's random initialization
    pub seed: u64,
    /// Show normalized output alongside raw output in the report
    pub show_normalized: bool,
    /// Replace the test's own canonical name with a placeholder before
    /// clustering, so per-test names don't dominate the similarity signal
    pub mask_test_name: bool,
    /// Name delimiters `(outer, inner)`: canonicalization takes the
    /// substring after the last `outer`, then before the first `inner`
    pub name_delimiters: (char, char),
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            reps_per_cluster: 3,
            reduce_dims: 2,
            epsilon: 3.0,
            min_samples: 2,
            unit: FeatureUnit::Lines,
            max_features: 8192,
            seed: 42,
            show_normalized: true,
            mask_test_name: true,
            name_delimiters: ('$', '#'),
        }
    }
}

impl TriageConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.reps_per_cluster == 0 {
            return Err(TriageError::invalid_config(
                "reps_per_cluster must be >= 1",
            ));
        }

        if !(2..=3).contains(&self.reduce_dims) {
            return Err(TriageError::invalid_config(format!(
                "reduce_dims must be 2 or 3, got {}",
                self.reduce_dims
            )));
        }

        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(TriageError::invalid_config(format!(
                "epsilon must be a positive finite number, got {}",
                self.epsilon
            )));
        }

        if self.min_samples < 2 {
            return Err(TriageError::invalid_config("min_samples must be >= 2"));
        }

        if self.max_features == 0 {
            return Err(TriageError::invalid_config("max_features must be > 0"));
        }

        Ok(())
    }

    /// Builder method: set representative outputs per cluster
    pub fn with_reps_per_cluster(mut self, reps: usize) -> Self {
        self.reps_per_cluster = reps;
        self
    }

    /// Builder method: set reduction target dimension
    pub fn with_reduce_dims(mut self, dims: usize) -> Self {
        self.reduce_dims = dims;
        self
    }

    /// Builder method: set clustering radius
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Builder method: set minimum neighborhood size
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Builder method: set the feature unit
    pub fn with_unit(mut self, unit: FeatureUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Builder method: set the vocabulary cap
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Builder method: set the reducer seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method: toggle normalized output in the report
    pub fn with_show_normalized(mut self, show: bool) -> Self {
        self.show_normalized = show;
        self
    }

    /// Builder method: toggle test-name masking
    pub fn with_mask_test_name(mut self, mask: bool) -> Self {
        self.mask_test_name = mask;
        self
    }

    /// Builder method: set the name delimiter pair
    pub fn with_name_delimiters(mut self, outer: char, inner: char) -> Self {
        self.name_delimiters = (outer, inner);
        self
    }
}

// ============================================================================
// Clustered Output
// ============================================================================

/// One group of members inside a cluster that share an identical
/// normalized output, chosen as a representative for human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Representative {
    /// Canonical name of the first member encountered in this group
    pub name: String,
    /// Number of cluster members sharing this normalized output
    pub group_size: usize,
    /// The shared normalized output
    pub normalized_output: String,
    /// Raw output of the first member encountered
    pub raw_output: String,
}

/// A cluster as rendered to users: rank is display order, assigned after
/// sorting by size descending (ties broken by lexicographically smallest
/// member name), never the clusterer's raw label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCluster {
    /// 1-based display rank
    pub rank: usize,
    /// Indices into the run's `TestResult` list, in encounter order
    pub member_indices: Vec<usize>,
    /// Member names sorted alphabetically
    pub member_names: Vec<String>,
    /// Representative output groups, frequency-descending, capped at
    /// `reps_per_cluster`
    pub representatives: Vec<Representative>,
}

impl RankedCluster {
    /// Number of tests in this cluster
    pub fn len(&self) -> usize {
        self.member_indices.len()
    }

    /// Whether the cluster has no members (never true for emitted clusters)
    pub fn is_empty(&self) -> bool {
        self.member_indices.is_empty()
    }
}

/// Complete output of one pipeline run.
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    /// Every retained failing test, in input encounter order
    pub results: Vec<TestResult>,
    /// Ranked clusters, size descending
    pub clusters: Vec<RankedCluster>,
    /// Indices of results that fit no cluster
    pub noise_indices: Vec<usize>,
    /// Reduced coordinates, index-aligned with `results`; `None` when the
    /// singleton short-circuit skipped the numeric stages
    pub coordinates: Option<Vec<Vec<f64>>>,
}

impl TriageOutcome {
    /// Fraction of failing tests that fit no cluster, in percent
    pub fn percent_unclustered(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.noise_indices.len() as f64 * 100.0 / self.results.len() as f64
    }
}
