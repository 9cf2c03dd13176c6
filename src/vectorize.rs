//! TF-IDF vectorization of normalized outputs.
//!
//! Converts N normalized strings into an N×M weight matrix, M capped by the
//! configured vocabulary budget. Units are whole lines by default; after
//! masking, shared log lines carry far more signal than shared words. The
//! whole stage is deterministic: vocabulary selection and column order are
//! fixed by (document frequency descending, term lexicographic) rather than
//! hash-map iteration order.

use crate::pipeline::Vectorize;
use crate::types::FeatureUnit;
use rustc_hash::FxHashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Line- or token-level TF-IDF vectorizer.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    unit: FeatureUnit,
    max_features: usize,
}

impl TfIdfVectorizer {
    /// Create a vectorizer for the given unit and vocabulary cap.
    pub fn new(unit: FeatureUnit, max_features: usize) -> Self {
        Self { unit, max_features }
    }

    fn units<'a>(&self, doc: &'a str) -> Vec<&'a str> {
        match self.unit {
            FeatureUnit::Lines => doc.lines().filter(|l| !l.is_empty()).collect(),
            FeatureUnit::Tokens => doc.unicode_words().collect(),
        }
    }
}

impl Vectorize for TfIdfVectorizer {
    fn vectorize(&self, docs: &[String]) -> Vec<Vec<f64>> {
        let n = docs.len();
        if n == 0 {
            return Vec::new();
        }

        // Per-document term counts.
        let doc_counts: Vec<FxHashMap<&str, usize>> = docs
            .iter()
            .map(|doc| {
                let mut counts = FxHashMap::default();
                for unit in self.units(doc) {
                    *counts.entry(unit).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        // Document frequency per term.
        let mut df: FxHashMap<&str, usize> = FxHashMap::default();
        for counts in &doc_counts {
            for &term in counts.keys() {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        // Deterministic vocabulary: df descending, then term ascending,
        // truncated to the feature budget.
        let mut vocab: Vec<(&str, usize)> = df.into_iter().collect();
        vocab.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        vocab.truncate(self.max_features);

        let index: FxHashMap<&str, usize> = vocab
            .iter()
            .enumerate()
            .map(|(col, &(term, _))| (term, col))
            .collect();

        let idf: Vec<f64> = vocab
            .iter()
            .map(|&(_, df)| (n as f64 / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let m = vocab.len();
        doc_counts
            .iter()
            .map(|counts| {
                let mut row = vec![0.0; m];
                for (&term, &count) in counts {
                    if let Some(&col) = index.get(term) {
                        row[col] = count as f64 * idf[col];
                    }
                }
                // L2-normalize so document length doesn't dominate.
                let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for v in &mut row {
                        *v /= norm;
                    }
                }
                row
            })
            .collect()
    }
}
