//! Deduplicated CSV report of linked relations.
//!
//! One row per surviving relation, five fixed columns. The dedup key is the
//! (pan, related_name) pair — case-sensitive, exact — with first-seen order
//! preserved. Zero relations is a valid, header-only report.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{LinkedRelation, RelatedType};

const COLUMNS: [&str; 5] = [
    "Entity_Type",
    "Entity_Value",
    "Relation",
    "Related_Entity_Type",
    "Related_Entity",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

/// One exported row. `Entity_Type` and `Relation` are fixed literals.
#[derive(Serialize)]
struct ReportRow<'a> {
    entity_type: &'static str,
    entity_value: &'a str,
    relation: &'static str,
    related_entity_type: RelatedType,
    related_entity: &'a str,
}

/// Write the deduplicated relation table to `writer`.
///
/// Returns the number of data rows written (header excluded). Later
/// duplicates of a (pan, related_name) pair are discarded silently.
pub fn write_report<W: Write>(
    relations: &[LinkedRelation],
    writer: W,
) -> Result<usize, ReportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(COLUMNS)?;

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut rows = 0usize;

    for relation in relations {
        if !seen.insert((relation.pan.as_str(), relation.related_name.as_str())) {
            debug!(pan = %relation.pan, name = %relation.related_name, "duplicate relation skipped");
            continue;
        }
        csv_writer.serialize(ReportRow {
            entity_type: "PAN",
            entity_value: &relation.pan,
            relation: "PAN_Of",
            related_entity_type: relation.related_type,
            related_entity: &relation.related_name,
        })?;
        rows += 1;
    }

    csv_writer.flush()?;
    Ok(rows)
}

/// Write the report to a file, creating or truncating it.
pub fn write_report_file(
    relations: &[LinkedRelation],
    path: &Path,
) -> Result<usize, ReportError> {
    let file = File::create(path)?;
    let rows = write_report(relations, file)?;
    info!(rows, path = %path.display(), "report written");
    Ok(rows)
}
