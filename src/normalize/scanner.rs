//! Stateful line-skip scanner run after masking.
//!
//! Drops whole sections that carry no clustering signal: bulleted verbose
//! blocks, panic unwind trailers, and schema-style braced declarations.
//! The scanner sees lines that are already masked and trimmed, so its
//! patterns match placeholder tokens (`<PATH>`, `<DEC>`) rather than raw
//! text.

use regex::Regex;

/// Substrings that mark a line as boilerplate regardless of state.
const NOISE_SUBSTRINGS: &[&str] = &[
    "stack backtrace:",
    "RUST_BACKTRACE",
    "Connecting to database",
    "Starting test session",
    "at <PATH>:<DEC>",
];

/// Lines exactly equal to one of these open a bulleted verbose block.
const BULLETED_BLOCK_MARKERS: &[&str] = &["Registered connectors:", "Enabled capabilities:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Keep,
    SkipBulleted,
    SkipPanicTrailer,
    SkipBraced,
}

/// Four-state scanner over masked, trimmed lines.
pub(crate) struct LineScanner {
    panic_header: Regex,
    unwind_header: Regex,
    frame_line: Regex,
    braced_header: Regex,
}

impl LineScanner {
    pub(crate) fn new() -> Self {
        Self {
            // `thread 'x' panicked at src/foo.rs:<DEC>:<DEC>` (path may or
            // may not have been masked; the prefix alone identifies it).
            panic_header: Regex::new(r"^thread '[^']*' panicked at ")
                .expect("panic header pattern must compile"),
            // Masked frame number followed by a known unwind entry point.
            unwind_header: Regex::new(r"^<DEC>: (?:rust_begin_unwind|core::panicking)")
                .expect("unwind header pattern must compile"),
            // Masked-decimal-prefixed stack frames inside a trailer.
            frame_line: Regex::new(r"^(?:<DEC>: |at )").expect("frame pattern must compile"),
            braced_header: Regex::new(r"^(?:datasource|generator|model) \w+ ?\{$")
                .expect("braced header pattern must compile"),
        }
    }

    /// Filter `lines`, returning the ones that survive in order.
    pub(crate) fn filter<'a>(&self, lines: &[&'a str]) -> Vec<&'a str> {
        let mut kept = Vec::with_capacity(lines.len());
        let mut state = ScanState::Keep;

        for &line in lines {
            // A skip state that ends on a non-matching line hands that
            // line back to the Keep rules in the same pass, hence the loop.
            loop {
                match state {
                    ScanState::Keep => {
                        if line.is_empty() || self.is_noise(line) {
                            // dropped
                        } else if BULLETED_BLOCK_MARKERS.contains(&line) {
                            state = ScanState::SkipBulleted;
                        } else if self.panic_header.is_match(line)
                            || self.unwind_header.is_match(line)
                        {
                            state = ScanState::SkipPanicTrailer;
                        } else if self.braced_header.is_match(line) {
                            state = ScanState::SkipBraced;
                        } else {
                            kept.push(line);
                        }
                        break;
                    }
                    ScanState::SkipBulleted => {
                        if line.starts_with('*') {
                            break;
                        }
                        state = ScanState::Keep;
                        // fall through: re-evaluate under Keep
                    }
                    ScanState::SkipPanicTrailer => {
                        if self.frame_line.is_match(line) {
                            break;
                        }
                        state = ScanState::Keep;
                        // fall through: re-evaluate under Keep
                    }
                    ScanState::SkipBraced => {
                        if line == "}" {
                            state = ScanState::Keep;
                        }
                        // The closing brace itself is consumed, not
                        // re-evaluated.
                        break;
                    }
                }
            }
        }

        kept
    }

    fn is_noise(&self, line: &str) -> bool {
        NOISE_SUBSTRINGS.iter().any(|s| line.contains(s))
    }
}
