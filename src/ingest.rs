//! Record Filter: turns a stream of JSONL test events into the failing
//! [`TestResult`] set the pipeline clusters.
//!
//! Every per-record problem is recoverable: lines that are not
//! self-contained JSON objects are skipped, parse failures are skipped,
//! and records whose output normalizes to nothing are dropped with a
//! warning. Nothing in this module returns an error.

use crate::normalize::{Normalizer, TESTNAME_PLACEHOLDER};
use crate::types::{TestResult, TriageConfig};
use serde::Deserialize;
use tracing::{debug, warn};

/// One parsed input line. Transient; exists only during filtering.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    stdout: Option<String>,
}

/// Counters surfaced after ingest for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Lines seen in the input
    pub total_lines: usize,
    /// Lines skipped before or during JSON parsing
    pub skipped_lines: usize,
    /// Failing records dropped because normalization left nothing
    pub dropped_empty: usize,
    /// Failing records retained for clustering
    pub retained: usize,
}

/// Derive the canonical short name from a decorated test name.
///
/// Applies the outer delimiter first (substring after its *last*
/// occurrence), then the inner delimiter to that result (substring before
/// its *first* occurrence).
pub fn canonical_name(name: &str, delimiters: (char, char)) -> String {
    let (outer, inner) = delimiters;
    let after_outer = name.rsplit(outer).next().unwrap_or(name);
    let before_inner = after_outer.split(inner).next().unwrap_or(after_outer);
    before_inner.to_string()
}

/// Filter an ordered sequence of raw input lines down to failing tests.
///
/// The normalizer runs once per retained record; when `mask_test_name` is
/// set, literal occurrences of the canonical name inside the normalized
/// output are replaced with a fixed placeholder so the name itself cannot
/// dominate the similarity signal.
pub fn read_results<'a, I>(
    lines: I,
    normalizer: &Normalizer,
    config: &TriageConfig,
) -> (Vec<TestResult>, IngestStats)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut results = Vec::new();
    let mut stats = IngestStats::default();

    for line in lines {
        stats.total_lines += 1;
        let line = line.trim();

        // Defensive pre-check: only self-contained object literals are
        // even handed to the parser.
        if !line.starts_with('{') || !line.ends_with('}') {
            stats.skipped_lines += 1;
            continue;
        }

        let record: RawRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) => {
                stats.skipped_lines += 1;
                continue;
            }
        };

        if record.event.as_deref() != Some("failed") {
            stats.skipped_lines += 1;
            continue;
        }

        let (name, stdout) = match (record.name, record.stdout) {
            (Some(name), Some(stdout)) if !name.is_empty() && !stdout.is_empty() => {
                (name, stdout)
            }
            _ => {
                stats.skipped_lines += 1;
                continue;
            }
        };

        let name = canonical_name(&name, config.name_delimiters);

        let mut normalized = normalizer.normalize(&stdout);
        if config.mask_test_name && !name.is_empty() {
            normalized = normalized.replace(&name, TESTNAME_PLACEHOLDER);
        }

        if normalized.trim().is_empty() {
            warn!(
                test = %name,
                "normalization masked the entire output; dropping record"
            );
            stats.dropped_empty += 1;
            continue;
        }

        results.push(TestResult::new(name, stdout, normalized));
        stats.retained += 1;
    }

    debug!(
        total = stats.total_lines,
        skipped = stats.skipped_lines,
        dropped_empty = stats.dropped_empty,
        retained = stats.retained,
        "ingest complete"
    );

    (results, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(lines: &[&str]) -> (Vec<TestResult>, IngestStats) {
        let normalizer = Normalizer::new();
        let config = TriageConfig::default();
        read_results(lines.iter().copied(), &normalizer, &config)
    }

    #[test]
    fn test_canonical_name_both_delimiters() {
        assert_eq!(
            canonical_name("suite$inner$writes.relations#variant_a", ('$', '#')),
            "writes.relations"
        );
    }

    #[test]
    fn test_canonical_name_no_delimiters() {
        assert_eq!(canonical_name("plain_test", ('$', '#')), "plain_test");
    }

    #[test]
    fn test_only_failed_events_retained() {
        let (results, stats) = read(&[
            r#"{"event":"passed","name":"ok_test","stdout":"fine"}"#,
            r#"{"event":"failed","name":"bad_test","stdout":"assertion failed: boom"}"#,
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "bad_test");
        assert_eq!(stats.retained, 1);
        assert_eq!(stats.skipped_lines, 1);
    }

    #[test]
    fn test_malformed_lines_skipped_silently() {
        let (results, stats) = read(&[
            "not json at all",
            "{ truncated",
            r#"{"event":"failed","name":"t","stdout":"#,
            r#"{"event":"failed","name":"t1","stdout":"real failure text"}"#,
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(stats.skipped_lines, 3);
    }

    #[test]
    fn test_missing_fields_skipped() {
        let (results, _) = read(&[
            r#"{"event":"failed","name":"","stdout":"x"}"#,
            r#"{"event":"failed","name":"t","stdout":""}"#,
            r#"{"event":"failed","name":"t"}"#,
            r#"{"event":"failed","stdout":"x"}"#,
        ]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_fully_masked_record_dropped_with_stat() {
        let (results, stats) = read(&[
            r#"{"event":"failed","name":"t_masked","stdout":"stack backtrace:\nmodel User {\nid Int\n}"}"#,
        ]);
        assert!(results.is_empty());
        assert_eq!(stats.dropped_empty, 1);
    }

    #[test]
    fn test_own_name_masked_in_normalized_output() {
        let (results, _) = read(&[
            r#"{"event":"failed","name":"checkout_flow","stdout":"checkout_flow blew up badly"}"#,
        ]);
        assert_eq!(results.len(), 1);
        assert!(results[0].normalized_output.contains(TESTNAME_PLACEHOLDER));
        assert!(!results[0].normalized_output.contains("checkout_flow"));
        // Raw output is preserved verbatim.
        assert!(results[0].raw_output.contains("checkout_flow"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let (results, _) = read(&[
            r#"{"event":"failed","name":"t","stdout":"boom happened","exec_time":1.5,"type":"test"}"#,
        ]);
        assert_eq!(results.len(), 1);
    }
}
