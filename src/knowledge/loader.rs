//! Line-delimited knowledge base loader
//!
//! Each non-blank line holds one two-turn conversation record:
//!
//! ```text
//! {"contents":[{"parts":[{"text":"<question>"}]},{"parts":[{"text":"<answer>"}]}]}
//! ```
//!
//! The first part of the first turn is the question and the first part of
//! the second turn is the answer. Extra turns and parts are ignored.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{QaError, Result};
use crate::knowledge::types::{KnowledgeBase, QaPair};

/// What to do with a line that does not parse into a pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Fail the whole load on the first bad line
    #[default]
    Abort,
    /// Log a warning, drop the line, keep going
    Skip,
}

/// Outcome of a load
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub knowledge_base: KnowledgeBase,
    /// 1-based line numbers dropped under `MalformedLinePolicy::Skip`
    pub skipped_lines: Vec<usize>,
}

#[derive(Deserialize)]
struct Record {
    contents: Vec<Turn>,
}

#[derive(Deserialize)]
struct Turn {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Knowledge base loader with a fixed malformed-line policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    policy: MalformedLinePolicy,
}

impl Loader {
    pub fn new(policy: MalformedLinePolicy) -> Self {
        Self { policy }
    }

    /// Load from a file on disk
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            QaError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;

        let report = self.load_from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            pairs = report.knowledge_base.len(),
            skipped = report.skipped_lines.len(),
            "Loaded knowledge base"
        );
        Ok(report)
    }

    /// Load from any buffered reader. Blank lines are not records.
    ///
    /// A line that is not valid UTF-8 is malformed like any other bad
    /// line; only a failed read is an I/O error.
    pub fn load_from_reader<R: BufRead>(&self, mut reader: R) -> Result<LoadReport> {
        let mut pairs = Vec::new();
        let mut skipped_lines = Vec::new();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let parsed = match std::str::from_utf8(strip_line_ending(&buf)) {
                Ok(line) => {
                    let line = if line_no == 1 {
                        line.trim_start_matches('\u{feff}')
                    } else {
                        line
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    parse_record(line)
                }
                Err(_) => Err("invalid UTF-8".to_string()),
            };

            match parsed {
                Ok(pair) => pairs.push(pair),
                Err(reason) => match self.policy {
                    MalformedLinePolicy::Abort => {
                        return Err(QaError::MalformedRecord {
                            line: line_no,
                            reason,
                        });
                    }
                    MalformedLinePolicy::Skip => {
                        tracing::warn!(line = line_no, %reason, "Skipping malformed record");
                        skipped_lines.push(line_no);
                    }
                },
            }
        }

        Ok(LoadReport {
            knowledge_base: KnowledgeBase::new(pairs),
            skipped_lines,
        })
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Load a knowledge base from `path`, aborting on the first malformed line
pub fn load(path: impl AsRef<Path>) -> Result<KnowledgeBase> {
    Loader::default().load(path).map(|r| r.knowledge_base)
}

/// Reader variant of [`load`]
pub fn load_from_reader<R: BufRead>(reader: R) -> Result<KnowledgeBase> {
    Loader::default()
        .load_from_reader(reader)
        .map(|r| r.knowledge_base)
}

/// Parse one record line into a pair, or describe why it is malformed
pub fn parse_record(line: &str) -> std::result::Result<QaPair, String> {
    let record: Record =
        serde_json::from_str(line).map_err(|e| format!("invalid record: {}", e))?;

    let question = turn_text(&record.contents, 0, "question")?;
    let answer = turn_text(&record.contents, 1, "answer")?;

    Ok(QaPair { question, answer })
}

fn turn_text(turns: &[Turn], index: usize, field: &str) -> std::result::Result<String, String> {
    let turn = turns
        .get(index)
        .ok_or_else(|| format!("missing {} turn (contents[{}])", field, index))?;

    turn.parts
        .first()
        .and_then(|p| p.text.clone())
        .ok_or_else(|| format!("missing {} text (contents[{}].parts[0].text)", field, index))
}
