//! ONNX Runtime token-classification tagger.
//!
//! Runs a pretrained NER model (e.g. a CoNLL-finetuned BERT exported to
//! ONNX). The model directory must contain `model.onnx` and `tokenizer.json`,
//! and may contain `labels.txt` (one BIO label per line) when the model's
//! label order differs from the CoNLL default.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use panlink_core::{EntityLabel, TaggedSpan};
use tokenizers::Tokenizer;
use tracing::info;

use crate::{TagError, Tagger};

/// CoNLL-2003 label order used by the common exported NER checkpoints.
const DEFAULT_LABELS: [&str; 9] = [
    "O", "B-MISC", "I-MISC", "B-PER", "I-PER", "B-ORG", "I-ORG", "B-LOC", "I-LOC",
];

const MAX_SEQ_LEN: usize = 512;

/// Token-classification NER backend running through ONNX Runtime.
pub struct OnnxTagger {
    session: Session,
    tokenizer: Tokenizer,
    labels: Vec<String>,
}

impl OnnxTagger {
    /// Load a tagger from a directory containing `model.onnx` and
    /// `tokenizer.json`, plus an optional `labels.txt`.
    pub fn load(model_dir: &Path) -> Result<Self, TagError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(TagError::ModelLoad(format!(
                "model.onnx not found in {}",
                model_dir.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(TagError::ModelLoad(format!(
                "tokenizer.json not found in {}",
                model_dir.display()
            )));
        }

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| TagError::ModelLoad(format!("load tokenizer: {e}")))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| TagError::ModelLoad(format!("set truncation: {e}")))?;

        let labels = load_labels(model_dir);

        info!(
            model = %model_path.display(),
            num_labels = labels.len(),
            "loaded NER model"
        );

        Ok(Self {
            session,
            tokenizer,
            labels,
        })
    }
}

impl Tagger for OnnxTagger {
    fn backend_id(&self) -> &str {
        "onnx"
    }

    fn tag(&mut self, text: &str) -> Result<Vec<TaggedSpan>, TagError> {
        if text.is_empty() {
            return Ok(vec![]);
        }

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| TagError::Tokenize(e.to_string()))?;

        let seq_len = encoding.get_ids().len();
        if seq_len == 0 {
            return Ok(vec![]);
        }

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        let shape = [1i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;
        let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        let outputs = self.session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        ])?;

        // Logits: [1, seq_len, num_labels].
        let (logits_shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = logits_shape;
        if dims.len() != 3 || dims[1] as usize != seq_len {
            return Err(TagError::Inference(format!(
                "unexpected logits shape: {dims:?}, expected [1, {seq_len}, num_labels]"
            )));
        }
        let num_labels = dims[2] as usize;

        // Per-token argmax over the label dimension.
        let mut token_labels: Vec<&str> = Vec::with_capacity(seq_len);
        for t in 0..seq_len {
            let row = &logits[t * num_labels..(t + 1) * num_labels];
            let best = row
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap_or(0);
            token_labels.push(self.labels.get(best).map(String::as_str).unwrap_or("O"));
        }

        let offsets: Vec<(usize, usize)> = encoding.get_offsets().to_vec();
        Ok(decode_bio(&token_labels, &offsets, text))
    }
}

/// Read `labels.txt` (one label per line) or fall back to the CoNLL order.
fn load_labels(model_dir: &Path) -> Vec<String> {
    let path = model_dir.join("labels.txt");
    match std::fs::read_to_string(&path) {
        Ok(contents) => contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        Err(_) => DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Fold per-token BIO labels and tokenizer offsets into entity spans.
///
/// Only PER and ORG groups are kept. Special tokens carry a (0, 0) offset
/// and break any open group; an I- tag continues the current group, anything
/// else closes it. Subword tokens merge by extending the span's end offset.
fn decode_bio(token_labels: &[&str], offsets: &[(usize, usize)], text: &str) -> Vec<TaggedSpan> {
    let mut spans = Vec::new();
    // (group name, start, end) of the entity currently being built.
    let mut current: Option<(&'static str, usize, usize)> = None;

    for (label, &(start, end)) in token_labels.iter().zip(offsets) {
        let is_special = start == 0 && end == 0;
        let (prefix, group) = match label.split_once('-') {
            Some((p, g)) if !is_special => (p, g),
            _ => ("O", ""),
        };

        // An I- tag extends the open group when the entity group matches.
        if prefix == "I"
            && let Some((open_group, _, open_end)) = current.as_mut()
            && *open_group == group
        {
            *open_end = end;
            continue;
        }

        flush(&mut current, &mut spans, text);
        if prefix == "B" || prefix == "I" {
            current = Some((group_name(group), start, end));
        }
    }
    flush(&mut current, &mut spans, text);

    spans
}

/// Intern the group name so continuation comparison is against a stable str.
fn group_name(group: &str) -> &'static str {
    match group {
        "PER" => "PER",
        "ORG" => "ORG",
        "LOC" => "LOC",
        "MISC" => "MISC",
        _ => "",
    }
}

fn flush(
    current: &mut Option<(&'static str, usize, usize)>,
    spans: &mut Vec<TaggedSpan>,
    text: &str,
) {
    if let Some((group, start, end)) = current.take() {
        let label = match group {
            "PER" => EntityLabel::Person,
            "ORG" => EntityLabel::Organization,
            _ => return,
        };
        if let Some(snippet) = text.get(start..end) {
            spans.push(TaggedSpan {
                label,
                text: snippet.to_string(),
                start,
                end,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_single_person() {
        let text = "Anil Agarwal paid";
        let labels = ["O", "B-PER", "I-PER", "O", "O"];
        let offsets = [(0, 0), (0, 4), (5, 12), (13, 17), (0, 0)];
        let spans = decode_bio(&labels, &offsets, text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].label, EntityLabel::Person);
        assert_eq!(spans[0].text, "Anil Agarwal");
        assert_eq!((spans[0].start, spans[0].end), (0, 12));
    }

    #[test]
    fn decode_adjacent_groups_split_on_label_change() {
        let text = "Agarwal Acme";
        let labels = ["B-PER", "B-ORG"];
        let offsets = [(0, 7), (8, 12)];
        let spans = decode_bio(&labels, &offsets, text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].label, EntityLabel::Person);
        assert_eq!(spans[1].label, EntityLabel::Organization);
        assert_eq!(spans[1].text, "Acme");
    }

    #[test]
    fn decode_i_after_different_group_starts_new_entity() {
        // "I-ORG" directly after a PER group opens a fresh ORG entity.
        let text = "Agarwal Acme";
        let labels = ["B-PER", "I-ORG"];
        let offsets = [(0, 7), (8, 12)];
        let spans = decode_bio(&labels, &offsets, text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].label, EntityLabel::Organization);
    }

    #[test]
    fn decode_o_gap_closes_entity() {
        let text = "Acme of Pune";
        let labels = ["B-ORG", "O", "B-LOC"];
        let offsets = [(0, 4), (5, 7), (8, 12)];
        let spans = decode_bio(&labels, &offsets, text);
        // LOC entities are discarded; only the ORG survives.
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Acme");
    }

    #[test]
    fn decode_subword_continuation_extends_span() {
        // "Agarwal" split into "Agar" + "##wal" by the tokenizer.
        let text = "Agarwal";
        let labels = ["B-PER", "I-PER"];
        let offsets = [(0, 4), (4, 7)];
        let spans = decode_bio(&labels, &offsets, text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Agarwal");
    }

    #[test]
    fn decode_special_tokens_break_groups() {
        // [CLS]/[SEP]-style tokens carry (0, 0) offsets.
        let text = "Acme";
        let labels = ["O", "B-ORG", "O"];
        let offsets = [(0, 0), (0, 4), (0, 0)];
        let spans = decode_bio(&labels, &offsets, text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Acme");
    }

    #[test]
    fn decode_empty_input() {
        assert!(decode_bio(&[], &[], "").is_empty());
    }

    #[test]
    fn default_labels_are_bio_shaped() {
        assert_eq!(DEFAULT_LABELS[0], "O");
        assert!(DEFAULT_LABELS[1..]
            .iter()
            .all(|l| l.starts_with("B-") || l.starts_with("I-")));
    }
}
