//! Deterministic output normalization.
//!
//! Maps raw captured test output to a canonical form: non-deterministic
//! substrings (timestamps, paths, ids, numbers) are masked by an ordered
//! rule table, then a stateful line scanner drops whole irrelevant sections
//! (verbose bullet blocks, panic unwind trailers, schema-style braced
//! declarations). Normalization is a pure function of its input — the
//! [`Normalizer`] holds compiled patterns and nothing else — and is
//! idempotent: placeholders never re-trigger a rule.

mod rules;
mod scanner;

use rules::{mask_rules, MaskRule};
use scanner::LineScanner;

/// Placeholder substituted for a test's own canonical name inside its
/// normalized output (see [`crate::ingest`]).
pub const TESTNAME_PLACEHOLDER: &str = "<TESTNAME>";

/// The normalizer: an explicit, stateless configuration object holding the
/// ordered mask-rule table and the line-skip scanner.
pub struct Normalizer {
    rules: Vec<MaskRule>,
    scanner: LineScanner,
}

impl Normalizer {
    /// Build a normalizer with the standard rule table.
    pub fn new() -> Self {
        Self {
            rules: mask_rules(),
            scanner: LineScanner::new(),
        }
    }

    /// Normalize raw output.
    ///
    /// Returns an empty string when everything was masked or skipped; the
    /// caller decides whether that is worth a warning.
    pub fn normalize(&self, input: &str) -> String {
        let masked = self
            .rules
            .iter()
            .fold(input.to_string(), |text, rule| rule.apply(&text));

        let trimmed: Vec<&str> = masked.lines().map(str::trim).collect();
        let kept = self.scanner.filter(&trimmed);

        kept.join("\n").trim().to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masking_literal() {
        let n = Normalizer::new();
        let out =
            n.normalize("2024-01-15T10:30:00 connected to /var/lib/db-1234 with id 9f8e7d6c5b4a3210");
        assert!(out.contains("<TIMESTAMP>"));
        assert!(out.contains("<PATH>"));
        assert!(out.contains("<ID>"));
        assert!(!out.contains('/'));
        assert!(!out.bytes().any(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_idempotent() {
        let n = Normalizer::new();
        let input = "2024-01-15 error at /opt/app/db writing 9f8e7d6c5b4a3210\n\
                     took 1.25 seconds over ======\n\
                     thread 'worker-3' panicked at src/io.rs:44:9:\n\
                     0: rust_begin_unwind\n\
                     trailing detail";
        let once = n.normalize(input);
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn test_braced_block_elided_end_to_end() {
        let n = Normalizer::new();
        let out = n.normalize("error before\nmodel User {\n  id Int @id\n  junk 123\n}\nerror after");
        assert_eq!(out, "error before\nerror after");
    }

    #[test]
    fn test_panic_trailer_elided_end_to_end() {
        let n = Normalizer::new();
        let out = n.normalize(
            "assertion failed: left == right\n\
             thread 'main' panicked at src/lib.rs:10:5:\n\
             0: rust_begin_unwind\n\
             1: core::panicking::panic_fmt\n\
             query returned 7 rows",
        );
        assert_eq!(out, "assertion failed: left == right\nquery returned <DEC> rows");
    }

    #[test]
    fn test_fully_masked_input_yields_empty() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("stack backtrace:\n\n   \n"), "");
        assert_eq!(n.normalize("model User {\n  id Int\n}\n"), "");
        assert_eq!(n.normalize(""), "");
    }

    #[test]
    fn test_lines_trimmed_and_collapsed() {
        let n = Normalizer::new();
        let out = n.normalize("   wide    gap here   \nsecond  line ");
        assert_eq!(out, "wide gap here\nsecond line");
    }
}
