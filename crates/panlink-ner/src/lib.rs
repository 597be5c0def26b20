//! Entity tagging layer: pluggable NER backends producing offset spans.
//!
//! The built-in [`RegexTagger`] needs no model files and covers the honorific
//! and corporate-suffix conventions of Indian financial documents. The
//! [`OnnxTagger`] (feature `onnx`) runs a pretrained token-classification
//! model through ONNX Runtime.

mod regex_tagger;
pub use regex_tagger::RegexTagger;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxTagger;

use panlink_core::TaggedSpan;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenize(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Onnx(#[from] ort::Error),
}

/// A named-entity tagging backend.
///
/// `tag` takes `&mut self` because model-backed sessions mutate internal
/// state on inference. Backends may return an empty vector; they should not
/// fail on well-formed input.
pub trait Tagger {
    /// Human-readable backend identifier (e.g. "regex", "onnx").
    fn backend_id(&self) -> &str;

    /// Extract person and organisation spans from text.
    ///
    /// Spans carry byte offsets into `text` and are sorted by start offset.
    fn tag(&mut self, text: &str) -> Result<Vec<TaggedSpan>, TagError>;
}
