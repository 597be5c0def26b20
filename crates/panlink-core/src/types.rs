//! Value objects shared across the extraction pipeline.
//!
//! Everything here is created once during a single linear run and never
//! mutated in place: the scanner produces [`PanMatch`]es, the tagger produces
//! [`TaggedSpan`]s, and the linker combines them into [`LinkedRelation`]s.

use serde::{Deserialize, Serialize};

/// One occurrence of a PAN-shaped token in the document text.
///
/// `start`/`end` are byte offsets into the normalised document text. The same
/// PAN value can occur more than once; deduplication happens per-relation at
/// report time, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanMatch {
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// Label assigned by the entity tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Organization,
}

/// A named-entity span produced by a tagger backend.
///
/// Offsets are byte offsets into the same document text the scanner saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSpan {
    pub label: EntityLabel,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Entity type as it appears in the exported report.
///
/// The report spells the organisation variant `Organisation` — that spelling
/// is part of the output contract and is kept verbatim even though the
/// tagger-side label is `Organization`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelatedType {
    Person,
    Organisation,
}

impl RelatedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Organisation => "Organisation",
        }
    }
}

impl From<EntityLabel> for RelatedType {
    fn from(label: EntityLabel) -> Self {
        match label {
            EntityLabel::Person => Self::Person,
            EntityLabel::Organization => Self::Organisation,
        }
    }
}

/// A PAN linked to its nearest qualifying person or organisation.
///
/// The relation name is always `PAN_Of`; it is written as a literal by the
/// report writer rather than stored per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedRelation {
    pub pan: String,
    pub related_type: RelatedType,
    pub related_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_label_maps_to_organisation_spelling() {
        assert_eq!(
            RelatedType::from(EntityLabel::Organization),
            RelatedType::Organisation
        );
        assert_eq!(RelatedType::Organisation.as_str(), "Organisation");
    }

    #[test]
    fn person_label_maps_to_person() {
        assert_eq!(RelatedType::from(EntityLabel::Person), RelatedType::Person);
        assert_eq!(RelatedType::Person.as_str(), "Person");
    }
}
