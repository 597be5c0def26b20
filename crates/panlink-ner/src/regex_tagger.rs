//! Pattern-based entity tagger.
//!
//! Tuned for the conventions of Indian financial and tax documents:
//! honorific-prefixed person names (Mr./Mrs./Shri/Smt.), plain capitalised
//! names, and organisation names ending in a corporate suffix (Ltd, Pvt,
//! Enterprises, ...). High precision on its target domain, no model files.

use std::collections::HashSet;
use std::sync::LazyLock;

use panlink_core::{EntityLabel, TaggedSpan};
use regex::Regex;

use crate::{TagError, Tagger};

static ORG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z][A-Za-z&.]*(?:\s+[A-Z][A-Za-z&.]*)*\s+(?:Ltd\.?|Limited|Pvt\.?|Private|Corporation|Corp\.?|Inc\.?|Company|Co\.|Enterprises|Industries|Traders|Associates|LLP|Bank))\b",
    )
    .expect("organisation pattern should compile")
});

static HONORIFIC_PERSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Mr\.|Ms\.|Mrs\.|Dr\.|Shri|Smt\.)\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,3})")
        .expect("honorific person pattern should compile")
});

static CAPITALIZED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]{2,}(?:\s+[A-Z]\.?\s+|\s+)[A-Z][a-z]{2,})\b")
        .expect("capitalised name pattern should compile")
});

// Capitalised two-word phrases common in tax documents that are not names.
static NAME_STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "Permanent Account",
        "Account Number",
        "Income Tax",
        "Assessment Year",
        "Financial Year",
        "New Delhi",
        "Tax Deducted",
    ]
    .into_iter()
    .collect()
});

/// Built-in regex NER backend; the default tagger.
pub struct RegexTagger;

impl RegexTagger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RegexTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for RegexTagger {
    fn backend_id(&self) -> &str {
        "regex"
    }

    fn tag(&mut self, text: &str) -> Result<Vec<TaggedSpan>, TagError> {
        let mut spans: Vec<TaggedSpan> = Vec::new();
        let mut taken: Vec<(usize, usize)> = Vec::new();

        // Organisations first: a corporate suffix is a stronger signal than
        // capitalisation, and person patterns must not re-claim those words.
        for cap in ORG_PATTERN.captures_iter(text) {
            if let Some(m) = cap.get(1) {
                push_span(
                    &mut spans,
                    &mut taken,
                    EntityLabel::Organization,
                    m.as_str(),
                    m.start(),
                    m.end(),
                );
            }
        }

        for cap in HONORIFIC_PERSON.captures_iter(text) {
            if let Some(m) = cap.get(1)
                && is_plausible_name(m.as_str())
            {
                push_span(
                    &mut spans,
                    &mut taken,
                    EntityLabel::Person,
                    m.as_str(),
                    m.start(),
                    m.end(),
                );
            }
        }

        for cap in CAPITALIZED_NAME.captures_iter(text) {
            if let Some(m) = cap.get(1)
                && is_plausible_name(m.as_str())
                && !NAME_STOPWORDS.contains(m.as_str())
            {
                push_span(
                    &mut spans,
                    &mut taken,
                    EntityLabel::Person,
                    m.as_str(),
                    m.start(),
                    m.end(),
                );
            }
        }

        spans.sort_by_key(|s| (s.start, s.end));
        Ok(spans)
    }
}

/// Record a span unless it overlaps one already taken.
fn push_span(
    spans: &mut Vec<TaggedSpan>,
    taken: &mut Vec<(usize, usize)>,
    label: EntityLabel,
    text: &str,
    start: usize,
    end: usize,
) {
    if taken.iter().any(|&(s, e)| start < e && end > s) {
        return;
    }
    taken.push((start, end));
    spans.push(TaggedSpan {
        label,
        text: text.to_string(),
        start,
        end,
    });
}

fn is_plausible_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.is_empty() || parts.len() > 4 {
        return false;
    }
    parts.iter().all(|p| {
        p.len() >= 2 && p.chars().next().is_some_and(char::is_uppercase)
    })
}
