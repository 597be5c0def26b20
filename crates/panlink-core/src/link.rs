//! Proximity-based entity linking.
//!
//! Each PAN goes through an explicit two-stage decision:
//!
//! 1. **Pattern cue pass** — a small fixed set of textual patterns anchored
//!    around the PAN value ("PAN: X of Mr. Y", "Y Ltd - PAN X", ...). A cue
//!    hit settles the PAN outright.
//! 2. **Proximity fallback** — otherwise, the nearest tagged person or
//!    organisation within `window` characters of the PAN wins, ties resolved
//!    per [`TieBreak`].
//!
//! A PAN with neither a cue hit nor a candidate in the window produces no
//! relation. That is documented behaviour, not an error.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::types::{EntityLabel, LinkedRelation, PanMatch, RelatedType, TaggedSpan};

/// Default number of characters searched on each side of a PAN.
pub const DEFAULT_WINDOW: usize = 200;

/// Resolution order for candidates equally near a PAN.
///
/// The equal-distance case has no single right answer, so it is a knob
/// rather than a hard-coded preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// The candidate earliest in the text wins.
    #[default]
    EarliestOffset,
    /// A person beats an organisation; within a label, earliest offset wins.
    PreferPerson,
}

/// Linker configuration.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Characters searched on each side of a PAN in the proximity fallback.
    pub window: usize,
    pub tie_break: TieBreak,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            tie_break: TieBreak::default(),
        }
    }
}

// Honorifics that mark a captured name as a person. "M/s." is accepted as a
// cue prefix below but denotes a firm, so it is deliberately absent here.
const PERSON_HONORIFIC: &str = r"(?:Mr\.|Ms\.|Mrs\.|Dr\.|Shri|Smt\.)";
const NAME_PREFIX: &str = r"(?:Mr\.|Ms\.|Mrs\.|Dr\.|Shri|Smt\.|M/s\.)";
const PERSON_NAME: &str = r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*";
const CORP_NAME: &str =
    r"[A-Z][A-Za-z\s&,.]+?(?:Ltd|Limited|Pvt|Private|Corporation|Corp|Inc|Company|Enterprises|Industries)";
// "PAN", "Pan No.", "PAN:" and friends.
const PAN_CUE: &str = r"(?:PAN|Pan|pan)(?:\s*No\.?)?[\s:]*";

static HONORIFIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{PERSON_HONORIFIC}")).expect("honorific pattern should compile")
});

/// Link every PAN to a related entity where one can be found.
///
/// Output order follows `pans`; a PAN can contribute at most one relation.
/// Empty `pans` or `spans` simply yields an empty result.
pub fn link_relations(
    text: &str,
    pans: &[PanMatch],
    spans: &[TaggedSpan],
    opts: &LinkOptions,
) -> Vec<LinkedRelation> {
    let mut relations = Vec::with_capacity(pans.len());

    for pan in pans {
        if let Some((name, related_type)) = pattern_cue(text, &pan.value) {
            debug!(pan = %pan.value, name = %name, "pattern cue hit");
            relations.push(LinkedRelation {
                pan: pan.value.clone(),
                related_type,
                related_name: name,
            });
            continue;
        }

        match nearest_span(pan, spans, opts) {
            Some(span) => relations.push(LinkedRelation {
                pan: pan.value.clone(),
                related_type: span.label.into(),
                related_name: span.text.clone(),
            }),
            None => debug!(
                pan = %pan.value,
                window = opts.window,
                "no entity within window, dropping PAN"
            ),
        }
    }

    relations
}

/// Stage 1: try the fixed cue patterns against the whole document.
///
/// Patterns are anchored on the PAN value, so they are built per PAN. The
/// first pattern to match wins; the captured name is classified as a person
/// when it starts with a person honorific, otherwise as an organisation.
fn pattern_cue(text: &str, pan: &str) -> Option<(String, RelatedType)> {
    let value = regex::escape(pan);

    let patterns = [
        // "PAN: X of Mr. Name" / "PAN No. X issued to Smt. Name"
        format!(
            r"{PAN_CUE}{value}\s+(?:of|for|belonging to|issued to)\s+({NAME_PREFIX}\s*{PERSON_NAME})"
        ),
        // "Mr. Name (PAN: X)" / "Mr. Name, PAN X"
        format!(r"({NAME_PREFIX}\s*{PERSON_NAME})\s*[(,\s]\s*{PAN_CUE}{value}"),
        // "Acme Industries Ltd - PAN: X"
        format!(r"({CORP_NAME})\s*[-–:,]?\s*{PAN_CUE}{value}"),
        // "PAN X in the name of Acme Industries Ltd"
        format!(r"{PAN_CUE}{value}\s+(?:in the name of|belongs to|for)\s+({CORP_NAME})"),
    ];

    for pattern in &patterns {
        let re = Regex::new(pattern).expect("cue pattern should compile");
        if let Some(cap) = re.captures(text)
            && let Some(m) = cap.get(1)
        {
            let name = m.as_str().trim().to_string();
            let related_type = classify_name(&name);
            return Some((name, related_type));
        }
    }

    None
}

fn classify_name(name: &str) -> RelatedType {
    if HONORIFIC_PREFIX.is_match(name) {
        RelatedType::Person
    } else {
        RelatedType::Organisation
    }
}

/// Stage 2: nearest tagged span within the window, by edge distance.
fn nearest_span<'a>(
    pan: &PanMatch,
    spans: &'a [TaggedSpan],
    opts: &LinkOptions,
) -> Option<&'a TaggedSpan> {
    let mut best: Option<(&TaggedSpan, usize)> = None;

    for span in spans {
        let dist = edge_distance(span, pan);
        if dist > opts.window {
            continue;
        }
        let wins = match best {
            None => true,
            Some((incumbent, best_dist)) => {
                dist < best_dist || (dist == best_dist && wins_tie(span, incumbent, opts.tie_break))
            }
        };
        if wins {
            best = Some((span, dist));
        }
    }

    best.map(|(span, _)| span)
}

/// Characters between the nearest edges of a span and a PAN; 0 when they
/// overlap. A distance of at most `window` is exactly "inside the closed
/// interval `[start - window, end + window]`".
fn edge_distance(span: &TaggedSpan, pan: &PanMatch) -> usize {
    if span.end <= pan.start {
        pan.start - span.end
    } else if span.start >= pan.end {
        span.start - pan.end
    } else {
        0
    }
}

fn wins_tie(challenger: &TaggedSpan, incumbent: &TaggedSpan, tie: TieBreak) -> bool {
    match tie {
        TieBreak::EarliestOffset => challenger.start < incumbent.start,
        TieBreak::PreferPerson => match (challenger.label, incumbent.label) {
            (EntityLabel::Person, EntityLabel::Organization) => true,
            (EntityLabel::Organization, EntityLabel::Person) => false,
            _ => challenger.start < incumbent.start,
        },
    }
}
