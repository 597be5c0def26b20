//! End-to-end pipeline runs over plain-text documents: load → scan → tag →
//! link → report, exactly as the binary composes the crates.

use std::io::Write;
use std::path::Path;

use panlink_core::{LinkOptions, link_relations, scan_pans, write_report_file};
use panlink_ner::{RegexTagger, Tagger};

const STATEMENT: &str = "Form 26AS extract. PAN: AAUFM6247N of Mr. Agarwal. \
    Deductor: Zenith Traders whose tax id ABCDE1234F appears in the deductor column. \
    Page two repeats the holder PAN AAUFM6247N of Mr. Agarwal. \
    xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx \
    xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx \
    xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx \
    An orphan entry QWERT9876Z sits alone at the end with nothing named near it.";

fn run_pipeline(text: &str, out: &Path) -> usize {
    let pans = scan_pans(text);
    let spans = RegexTagger::new().tag(text).unwrap();
    let relations = link_relations(text, &pans, &spans, &LinkOptions::default());
    write_report_file(&relations, out).unwrap()
}

fn write_document(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{contents}").unwrap();
    path
}

#[test]
fn full_run_links_dedups_and_drops() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_document(dir.path(), "statement.txt", STATEMENT);
    let out = dir.path().join("extracted_entities.csv");

    let text = panlink_ingest::load_document(&doc).unwrap();
    let rows = run_pipeline(&text, &out);

    let report = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(
        lines[0],
        "Entity_Type,Entity_Value,Relation,Related_Entity_Type,Related_Entity"
    );
    // Two AAUFM6247N occurrences collapse to one row; the orphan PAN has no
    // nearby entity and produces no row at all.
    assert_eq!(rows, 2);
    assert_eq!(
        lines.iter().filter(|l| l.contains("AAUFM6247N")).count(),
        1
    );
    assert!(report.contains("PAN,AAUFM6247N,PAN_Of,Person,Mr. Agarwal"));
    assert!(report.contains("PAN,ABCDE1234F,PAN_Of,Organisation,Zenith Traders"));
    assert!(!report.contains("QWERT9876Z"));
}

#[test]
fn pipeline_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let out_a = dir.path().join("a.csv");
    let out_b = dir.path().join("b.csv");

    run_pipeline(STATEMENT, &out_a);
    run_pipeline(STATEMENT, &out_b);

    let a = std::fs::read_to_string(&out_a).unwrap();
    let b = std::fs::read_to_string(&out_b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn empty_document_produces_header_only_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("empty.csv");

    let rows = run_pipeline("No identifiers in this text.", &out);

    assert_eq!(rows, 0);
    let report = std::fs::read_to_string(&out).unwrap();
    assert_eq!(report.lines().count(), 1);
}
