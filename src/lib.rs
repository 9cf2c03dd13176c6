//! # failsift
//!
//! Collapses large batches of failing-test output into a handful of ranked
//! root-cause clusters.
//!
//! The pipeline: filter failing records out of a JSONL event stream,
//! normalize their output (masking timestamps, paths, ids, and numbers and
//! skipping boilerplate blocks), vectorize the normalized text with TF-IDF,
//! project to 2–3 dimensions with seeded t-SNE, group by density with
//! DBSCAN, and render a Markdown report ranking clusters by size with
//! representative log excerpts.
//!
//! ## Features
//!
//! - **Deterministic**: fixed seed, explicit sorts at every rendering
//!   boundary — identical input and configuration produce byte-identical
//!   output
//! - **Forgiving input**: malformed records are skipped, never fatal
//! - **Narrow numeric seams**: [`Vectorize`], [`Reduce`], and [`Cluster`]
//!   are small traits, so stages can be swapped or stubbed in tests

pub mod cluster;
pub mod errors;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod plot;
pub mod reduce;
pub mod report;
pub mod types;
pub mod vectorize;

// Re-export commonly used types
pub use errors::{Result, TriageError};
pub use types::{
    FeatureUnit, RankedCluster, Representative, TestResult, TriageConfig, TriageOutcome,
};

// Re-export main functionality
pub use cluster::Dbscan;
pub use ingest::{canonical_name, read_results, IngestStats};
pub use normalize::Normalizer;
pub use pipeline::{run, Cluster, Reduce, Vectorize};
pub use plot::render_scatter;
pub use reduce::TsneReducer;
pub use report::{render_failing_names, render_report};
pub use vectorize::TfIdfVectorizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
