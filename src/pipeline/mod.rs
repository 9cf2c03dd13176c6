//! Pipeline stage seams and orchestration.
//!
//! The three numeric stages sit behind narrow traits so the orchestration
//! logic never touches algorithm internals, and tests can substitute
//! trivial implementations.
//!
//! ## Submodules
//!
//! - [`traits`] — Stage trait definitions ([`Vectorize`], [`Reduce`],
//!   [`Cluster`])
//! - [`runner`] — Orchestration: short-circuits, stage threading, and the
//!   two-phase size-descending ranking

pub mod runner;
pub mod traits;

pub use runner::run;
pub use traits::{Cluster, Reduce, Vectorize};
