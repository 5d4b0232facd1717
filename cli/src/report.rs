use newsdex_core::{DocId, SearchEngine};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Boolean,
    Ranked,
}

#[derive(Debug, Serialize)]
pub struct ResultLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    pub doc_id: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub title: String,
    pub url: String,
}

/// Outcome of one query, rendered as text or as a JSON line.
#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub query: String,
    pub mode: Mode,
    pub took_s: f64,
    pub results: Vec<ResultLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryReport {
    pub fn run(engine: &SearchEngine, mode: Mode, query: &str, limit: usize) -> Self {
        let start = std::time::Instant::now();
        let mut report = QueryReport { query: query.to_string(), mode, took_s: 0.0, results: Vec::new(), error: None };
        match mode {
            Mode::Boolean => match engine.boolean(query) {
                Ok(ids) => {
                    report.results = ids.into_iter().filter_map(|id| line(engine, id, None, None)).collect();
                }
                Err(err) => {
                    tracing::warn!(query, %err, "rejected boolean query");
                    report.error = Some(err.to_string());
                }
            },
            Mode::Ranked => {
                let hits = engine.ranked(query);
                let take = if limit == 0 { hits.len() } else { limit };
                report.results = hits
                    .into_iter()
                    .take(take)
                    .filter_map(|h| line(engine, h.doc_id, Some(h.rank), Some(h.score)))
                    .collect();
            }
        }
        report.took_s = start.elapsed().as_secs_f64();
        tracing::info!(query, hits = report.results.len(), took_s = report.took_s, "retrieval complete");
        report
    }

    pub fn write_text<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Query: {}", self.query)?;
        if let Some(err) = &self.error {
            writeln!(out, "Error: {err}")?;
        } else if self.results.is_empty() {
            writeln!(out, "No matching documents found.")?;
        } else {
            match self.mode {
                Mode::Boolean => writeln!(out, "Matching documents:")?,
                Mode::Ranked => writeln!(out, "Ranking:")?,
            }
            for r in &self.results {
                match (r.rank, r.score) {
                    (Some(rank), Some(score)) => writeln!(out, "{rank}: {} (score {score:.4})", r.title)?,
                    _ => writeln!(out, "{}", r.title)?,
                }
                writeln!(out, "URL: {}", r.url)?;
            }
        }
        writeln!(out)
    }

    pub fn write_json<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        serde_json::to_writer(&mut *out, self)?;
        writeln!(out)
    }
}

fn line(engine: &SearchEngine, doc_id: DocId, rank: Option<usize>, score: Option<f32>) -> Option<ResultLine> {
    let doc = engine.document(doc_id)?;
    Some(ResultLine { rank, doc_id, score, title: doc.title.clone(), url: doc.url.clone() })
}
