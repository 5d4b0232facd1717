//! Reader for the delimited corpus file written by the news scrapers.
//!
//! ```text
//! Korea Times News
//! Korea economy grows fast
//! 2024-03-01 09:12:00
//! https://www.koreatimes.co.kr/www/nation/2024/03/123.html
//! ==========================================
//! ```
//!
//! Within a record the first line is the title, the last the source URL and
//! everything in between is body, joined with single spaces.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

pub const DELIMITER: &str = "==========================================";

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus: {0}")]
    Io(#[from] io::Error),
    #[error("malformed record #{record} starting at line {line}: {reason}")]
    MalformedRecord { record: usize, line: usize, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub title: String,
    pub body: String,
    pub url: String,
}

pub fn load_corpus<R: BufRead>(reader: R) -> Result<Vec<RawDocument>, CorpusError> {
    let mut docs = Vec::new();
    // (1-based line number, trimmed text) of the record being read
    let mut record: Vec<(usize, String)> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed == DELIMITER {
            flush(&mut record, &mut docs)?;
        } else if !trimmed.is_empty() {
            record.push((i + 1, trimmed.to_string()));
        }
    }
    flush(&mut record, &mut docs)?;
    tracing::debug!(records = docs.len(), "parsed corpus");
    Ok(docs)
}

pub fn load_corpus_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawDocument>, CorpusError> {
    let f = File::open(path)?;
    load_corpus(BufReader::new(f))
}

fn flush(record: &mut Vec<(usize, String)>, docs: &mut Vec<RawDocument>) -> Result<(), CorpusError> {
    if record.is_empty() {
        return Ok(());
    }
    if record.len() < 2 {
        return Err(CorpusError::MalformedRecord {
            record: docs.len(),
            line: record[0].0,
            reason: "expected a title line and a URL line",
        });
    }
    let mut lines = record.drain(..).map(|(_, text)| text);
    let title = lines.next().unwrap_or_default();
    let mut rest: Vec<String> = lines.collect();
    let url = rest.pop().unwrap_or_default();
    docs.push(RawDocument { title, body: rest.join(" "), url });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Vec<RawDocument>, CorpusError> { load_corpus(Cursor::new(text)) }

    #[test]
    fn parses_records() {
        let text = format!(
            "Korea Times News\nKorea economy grows fast\n  2024-03-01  \nhttps://kt/1\n{DELIMITER}\n\
             Sports Update\nhttps://kt/2\n{DELIMITER}\n"
        );
        let docs = parse(&text).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "Korea Times News");
        assert_eq!(docs[0].body, "Korea economy grows fast 2024-03-01");
        assert_eq!(docs[0].url, "https://kt/1");
        assert_eq!(docs[1].body, "");
        assert_eq!(docs[1].url, "https://kt/2");
    }

    #[test]
    fn leading_delimiter_and_missing_trailing_one() {
        let text = format!("{DELIMITER}\nTitle\nbody\n\nmore body\nhttps://u\n");
        let docs = parse(&text).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body, "body more body");
    }

    #[test]
    fn empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse(&format!("{DELIMITER}\n\n{DELIMITER}\n")).unwrap().is_empty());
    }

    #[test]
    fn record_without_url_is_rejected() {
        let text = format!("A\nhttps://a\n{DELIMITER}\nOrphan title\n{DELIMITER}\n");
        match parse(&text) {
            Err(CorpusError::MalformedRecord { record, line, .. }) => {
                assert_eq!(record, 1);
                assert_eq!(line, 4);
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }
}
