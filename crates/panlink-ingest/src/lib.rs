//! Document text source.
//!
//! Turns a file path into the single document string the rest of the
//! pipeline operates on. PDF text goes through [`normalize_text`] on load —
//! ligatures and irregular whitespace are PDF extraction artifacts — so the
//! returned string is the text every downstream byte offset refers to.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported document format: {0:?}")]
    UnsupportedFormat(String),

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pdf extraction failed for {path}")]
    Pdf {
        path: PathBuf,
        #[source]
        source: pdf_extract::OutputError,
    },
}

/// Load the full text of one document.
///
/// `.pdf` goes through the PDF extractor and is normalised; `.txt` and `.md`
/// are read as-is. Any other extension is an [`ExtractError::UnsupportedFormat`].
pub fn load_document(path: &Path) -> Result<String, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let text = match ext.as_str() {
        "pdf" => {
            let raw = pdf_extract::extract_text(path).map_err(|source| ExtractError::Pdf {
                path: path.to_path_buf(),
                source,
            })?;
            normalize_text(&raw)
        }
        "txt" | "md" => std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?,
        other => return Err(ExtractError::UnsupportedFormat(other.to_string())),
    };

    info!(path = %path.display(), chars = text.len(), "document loaded");
    Ok(text)
}

// Ligatures and typographic characters PDF extractors commonly emit.
const CHAR_FOLDS: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
];

/// Fold ligatures and typographic characters, then collapse all whitespace
/// runs (including page breaks) to single spaces.
///
/// Collapsing happens before scanning and tagging, so offsets into the
/// returned string are stable for the whole run.
pub fn normalize_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        match CHAR_FOLDS.iter().find(|(from, _)| *from == ch) {
            Some((_, to)) => folded.push_str(to),
            None => folded.push(ch),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
