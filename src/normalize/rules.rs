//! Ordered masking rules applied before line scanning.
//!
//! Each rule is a compiled pattern plus a replacement placeholder, applied
//! over the whole text in table order. Ordering matters: structured patterns
//! (full timestamps, paths) run before the generic numeric rules that would
//! otherwise eat their digits. The `regex` crate has no lookaround, so rules
//! that need a content check (such as "must contain a digit") carry a guard
//! predicate evaluated against every candidate match.

use regex::Regex;

/// One masking rule: pattern, placeholder, optional match guard.
pub(crate) struct MaskRule {
    pattern: Regex,
    replacement: &'static str,
    guard: Option<fn(&str) -> bool>,
}

impl MaskRule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("mask rule pattern must compile"),
            replacement,
            guard: None,
        }
    }

    fn guarded(pattern: &str, replacement: &'static str, guard: fn(&str) -> bool) -> Self {
        Self {
            guard: Some(guard),
            ..Self::new(pattern, replacement)
        }
    }

    /// Apply this rule to `text`, masking every (guard-passing) match.
    pub(crate) fn apply(&self, text: &str) -> String {
        match self.guard {
            None => self.pattern.replace_all(text, self.replacement).into_owned(),
            Some(guard) => self
                .pattern
                .replace_all(text, |caps: &regex::Captures<'_>| {
                    let matched = &caps[0];
                    if guard(matched) {
                        self.replacement.to_string()
                    } else {
                        matched.to_string()
                    }
                })
                .into_owned(),
        }
    }
}

fn contains_digit(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
}

fn contains_digit_and_letter(s: &str) -> bool {
    contains_digit(s) && s.bytes().any(|b| b.is_ascii_alphabetic())
}

fn is_hex_with_digit(s: &str) -> bool {
    contains_digit(s) && s.bytes().any(|b| matches!(b, b'a'..=b'f' | b'A'..=b'F'))
}

/// Build the ordered mask-rule table.
///
/// Placeholders are digit-free, so no rule can re-trigger on another rule's
/// output — normalization is idempotent by construction.
pub(crate) fn mask_rules() -> Vec<MaskRule> {
    vec![
        // ISO-style date-times, with optional fraction and zone.
        MaskRule::new(
            r"\d{4}-\d{2}-\d{2}[T ]\d{1,2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?",
            "<TIMESTAMP>",
        ),
        // Bare dates and bare times, once full timestamps are gone.
        MaskRule::new(r"\d{4}-\d{2}-\d{2}", "<DATE>"),
        MaskRule::new(r"\b\d{1,2}:\d{2}:\d{2}(?:\.\d+)?\b", "<TIME>"),
        // Absolute filesystem paths, both slash styles. Two or more
        // segments required so lone slashes in prose survive.
        MaskRule::new(r"(?:/[\w.\-]+){2,}/?", "<PATH>"),
        MaskRule::new(r"(?:[A-Za-z]:)?(?:\\[\w.\-]+){2,}\\?", "<PATH>"),
        // Long hex identifiers, hyphen-tolerant (UUIDs and friends).
        MaskRule::guarded(
            r"\b[0-9a-fA-F][0-9a-fA-F-]{6,}[0-9a-fA-F]\b",
            "<ID>",
            contains_digit,
        ),
        // Long mixed alphanumeric identifiers. The guard keeps ordinary
        // words (no digits) and bare numbers (no letters) out.
        MaskRule::guarded(r"\b[0-9A-Za-z]{8,}\b", "<ID>", contains_digit_and_letter),
        // Shorter pure-hex runs; the guard requires both a digit and a
        // hex letter so English words and plain integers pass through.
        MaskRule::guarded(
            r"\b(?:0x)?[0-9a-fA-F]{4,7}\b",
            "<HEX>",
            is_hex_with_digit,
        ),
        // Signed decimals with fraction (optional exponent), then bare
        // integers.
        MaskRule::new(r"[+-]?\b\d+\.\d+(?:[eE][+-]?\d+)?\b", "<FLOAT>"),
        MaskRule::new(r"\b\d+\b", "<DEC>"),
        // Visual separator banners.
        MaskRule::new(r"={3,}|\*{3,}|-{3,}", "<SEP>"),
        // Collapse runs of horizontal whitespace; newlines stay intact.
        MaskRule::new(r"[ \t]{2,}", " "),
    ]
}
