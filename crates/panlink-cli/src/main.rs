use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use panlink_core::{LinkOptions, TieBreak, link_relations, scan_pans, write_report_file};
use panlink_ner::{RegexTagger, Tagger};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "panlink",
    version,
    about = "Extract PAN numbers and their holders from PDF documents"
)]
struct Cli {
    /// Input document (.pdf, .txt or .md)
    input: PathBuf,

    /// Output CSV path
    #[arg(long, default_value = "extracted_entities.csv")]
    out: PathBuf,

    /// Characters searched on each side of a PAN for a related entity
    #[arg(long, default_value_t = panlink_core::link::DEFAULT_WINDOW)]
    window: usize,

    /// Entity tagging backend
    #[arg(long, value_enum, default_value_t = TaggerKind::Regex)]
    tagger: TaggerKind,

    /// Model directory for the onnx tagger (model.onnx + tokenizer.json)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// How to resolve two candidates equally near a PAN
    #[arg(long, value_enum, default_value_t = TieBreakArg::EarliestOffset)]
    tie_break: TieBreakArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TaggerKind {
    Regex,
    Onnx,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TieBreakArg {
    EarliestOffset,
    PreferPerson,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::EarliestOffset => TieBreak::EarliestOffset,
            TieBreakArg::PreferPerson => TieBreak::PreferPerson,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let text = panlink_ingest::load_document(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;

    let pans = scan_pans(&text);
    info!(pans = pans.len(), "scanned document");

    let mut tagger = build_tagger(&cli)?;
    let spans = tagger
        .tag(&text)
        .with_context(|| format!("tagging with {} backend", tagger.backend_id()))?;
    info!(spans = spans.len(), backend = tagger.backend_id(), "tagged entities");

    let opts = LinkOptions {
        window: cli.window,
        tie_break: cli.tie_break.into(),
    };
    let relations = link_relations(&text, &pans, &spans, &opts);

    let rows = write_report_file(&relations, &cli.out)
        .with_context(|| format!("writing {}", cli.out.display()))?;

    let unmatched = pans.len() - relations.len();
    println!("Extracted {} characters from {}", text.len(), cli.input.display());
    println!("PAN occurrences found:   {}", pans.len());
    println!("Relations linked:        {}", relations.len());
    println!("Unmatched occurrences:   {unmatched}");
    println!("Rows written to {}: {rows}", cli.out.display());

    Ok(())
}

#[cfg(feature = "onnx")]
fn build_tagger(cli: &Cli) -> anyhow::Result<Box<dyn Tagger>> {
    match cli.tagger {
        TaggerKind::Regex => Ok(Box::new(RegexTagger::new())),
        TaggerKind::Onnx => {
            let dir = cli
                .model_dir
                .as_deref()
                .context("--model-dir is required with --tagger onnx")?;
            Ok(Box::new(panlink_ner::OnnxTagger::load(dir)?))
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn build_tagger(cli: &Cli) -> anyhow::Result<Box<dyn Tagger>> {
    match cli.tagger {
        TaggerKind::Regex => Ok(Box::new(RegexTagger::new())),
        TaggerKind::Onnx => anyhow::bail!(
            "this build does not include the onnx tagger; rebuild with --features onnx"
        ),
    }
}
