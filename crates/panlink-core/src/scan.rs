//! PAN token scanning.
//!
//! A PAN (Permanent Account Number) is ten characters: five uppercase
//! letters, four digits, one uppercase letter. The scanner applies that shape
//! and nothing more — the fourth character encodes a holder category and the
//! tenth is a check letter, but validating either would reject nothing the
//! downstream linker cares about, so arbitrary ten-character lookalikes are
//! an accepted false-positive source.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::PanMatch;

static PAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{5}[0-9]{4}[A-Z]\b").expect("PAN pattern should compile")
});

/// Scan document text for PAN-shaped tokens.
///
/// Matches are non-overlapping, left to right, in order of first occurrence.
/// Repeated values are kept — the report writer deduplicates after linking.
pub fn scan_pans(text: &str) -> Vec<PanMatch> {
    PAN_PATTERN
        .find_iter(text)
        .map(|m| PanMatch {
            value: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}
