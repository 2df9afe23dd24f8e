//! Integration tests for knowledge base loading

mod common;

use common::record_line;
use kbqa::errors::QaError;
use kbqa::knowledge::{load, Loader, MalformedLinePolicy};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_kb(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_load_preserves_count_and_order() {
    let lines: Vec<String> = (0..25)
        .map(|i| record_line(&format!("Question {}", i), &format!("Answer {}", i)))
        .collect();
    let file = write_kb(&lines);

    let kb = load(file.path()).unwrap();

    assert_eq!(kb.len(), 25);
    for (i, pair) in kb.iter().enumerate() {
        assert_eq!(pair.question, format!("Question {}", i));
        assert_eq!(pair.answer, format!("Answer {}", i));
    }
}

#[test]
fn test_load_unicode_and_escapes() {
    let file = write_kb(&[record_line(
        "¿Qué es el RGPD?",
        "Reglamento \"General\" de Protección de Datos\nUE",
    )]);

    let kb = load(file.path()).unwrap();
    assert_eq!(kb.get(0).unwrap().question, "¿Qué es el RGPD?");
    assert!(kb.get(0).unwrap().answer.contains('\n'));
}

#[test]
fn test_empty_file_is_empty_knowledge_base() {
    let file = NamedTempFile::new().unwrap();
    let kb = load(file.path()).unwrap();
    assert!(kb.is_empty());
}

#[test]
fn test_default_policy_aborts_on_malformed_line() {
    let file = write_kb(&[
        record_line("q1", "a1"),
        r#"{"contents":[{"parts":[{"text":"q2"}]}]}"#.to_string(),
        record_line("q3", "a3"),
    ]);

    match load(file.path()) {
        Err(QaError::MalformedRecord { line, reason }) => {
            assert_eq!(line, 2);
            assert!(reason.contains("answer"));
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn test_skip_policy_keeps_good_lines() {
    let file = write_kb(&[
        record_line("q1", "a1"),
        "not json at all".to_string(),
        record_line("q3", "a3"),
    ]);

    let report = Loader::new(MalformedLinePolicy::Skip).load(file.path()).unwrap();

    assert_eq!(report.knowledge_base.questions(), vec!["q1", "q3"]);
    assert_eq!(report.skipped_lines, vec![2]);
}

#[test]
fn test_invalid_utf8_line_follows_policy() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", record_line("q1", "a1")).unwrap();
    file.write_all(b"\xff\xfe not text\n").unwrap();
    writeln!(file, "{}", record_line("q3", "a3")).unwrap();

    let report = Loader::new(MalformedLinePolicy::Skip).load(file.path()).unwrap();
    assert_eq!(report.knowledge_base.questions(), vec!["q1", "q3"]);
    assert_eq!(report.skipped_lines, vec![2]);

    match load(file.path()) {
        Err(QaError::MalformedRecord { line, reason }) => {
            assert_eq!(line, 2);
            assert_eq!(reason, "invalid UTF-8");
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load("/nonexistent/dir/kb.jsonl").unwrap_err();
    assert!(matches!(err, QaError::Io(_)));
    assert!(err.to_string().contains("kb.jsonl"));
}

#[test]
fn test_bundled_knowledge_base_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/knowledge_base.jsonl");
    let kb = load(path).unwrap();
    assert_eq!(kb.len(), 8);
    assert_eq!(kb.get(0).unwrap().question, "What is ISO 27001?");
}
