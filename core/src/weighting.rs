//! TF-IDF weighting in two phases.
//!
//! [`TermStatistics`] accumulates normalized term frequencies while documents
//! are ingested. [`TermStatistics::finalize`] consumes it once the corpus size
//! is known and yields the read-only [`WeightIndex`]. Neither phase can be
//! reached out of order: there is no way to observe into a `WeightIndex` or to
//! read weights from a `TermStatistics`.

use crate::tokenizer::tokenize_document;
use crate::{DocId, Document};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("corpus size {given} is smaller than the {observed} documents observed")]
    CorpusSizeMismatch { given: u32, observed: u32 },
}

/// `log2(N / df)`; a term in every document weighs 0.
pub fn idf(num_docs: u32, df: u32) -> f32 {
    (num_docs as f32 / df as f32).log2()
}

#[derive(Debug, Default)]
pub struct TermStatistics {
    // term -> doc -> tf, tf = count / max count in that doc
    frequencies: HashMap<String, HashMap<DocId, f32>>,
    observed: HashSet<DocId>,
}

impl TermStatistics {
    pub fn new() -> Self { Self::default() }

    /// Count terms of title+body and upsert their normalized frequency.
    /// Observing the same id again replaces its previous entries.
    pub fn observe(&mut self, doc: &Document) {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for term in tokenize_document(&doc.title, &doc.body) {
            *counts.entry(term).or_insert(0) += 1;
        }
        if !self.observed.insert(doc.id) {
            for per_doc in self.frequencies.values_mut() {
                per_doc.remove(&doc.id);
            }
            self.frequencies.retain(|_, per_doc| !per_doc.is_empty());
        }
        let Some(&max) = counts.values().max() else {
            tracing::debug!(doc_id = doc.id, "document has no terms");
            return;
        };
        for (term, count) in counts {
            self.frequencies.entry(term).or_default().insert(doc.id, count as f32 / max as f32);
        }
    }

    pub fn frequency(&self, term: &str, doc_id: DocId) -> Option<f32> {
        self.frequencies.get(term)?.get(&doc_id).copied()
    }

    pub fn num_terms(&self) -> usize { self.frequencies.len() }

    /// Compute idf for every term with `num_docs` as N and emit weights.
    pub fn finalize(self, num_docs: u32) -> Result<WeightIndex, IndexError> {
        let observed = self.observed.len() as u32;
        if num_docs < observed {
            return Err(IndexError::CorpusSizeMismatch { given: num_docs, observed });
        }

        let mut weights: HashMap<String, Vec<(DocId, f32)>> = HashMap::with_capacity(self.frequencies.len());
        let mut squared: HashMap<DocId, f32> = HashMap::new();
        for (term, per_doc) in self.frequencies {
            let term_idf = idf(num_docs, per_doc.len() as u32);
            let mut entry: Vec<(DocId, f32)> = per_doc
                .into_iter()
                .map(|(doc_id, tf)| (doc_id, tf * term_idf))
                .collect();
            entry.sort_by_key(|(doc_id, _)| *doc_id);
            for (doc_id, w) in &entry {
                *squared.entry(*doc_id).or_insert(0.0) += w * w;
            }
            weights.insert(term, entry);
        }
        let doc_norms = squared.into_iter().map(|(doc_id, s)| (doc_id, s.sqrt())).collect();

        tracing::info!(num_docs, num_terms = weights.len(), "finalized term weights");
        Ok(WeightIndex { weights, doc_norms, num_docs })
    }
}

/// Term -> (doc, tf * idf), sorted by doc id. Read-only.
#[derive(Debug, Clone)]
pub struct WeightIndex {
    weights: HashMap<String, Vec<(DocId, f32)>>,
    doc_norms: HashMap<DocId, f32>,
    num_docs: u32,
}

impl WeightIndex {
    pub fn weights(&self, term: &str) -> &[(DocId, f32)] {
        self.weights.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document_frequency(&self, term: &str) -> u32 { self.weights(term).len() as u32 }

    pub fn idf(&self, term: &str) -> f32 { idf(self.num_docs, self.document_frequency(term)) }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.weights.len() }

    /// Euclidean norm of the document's full weight vector.
    pub fn document_norm(&self, doc_id: DocId) -> f32 { self.doc_norms.get(&doc_id).copied().unwrap_or(0.0) }

    /// Raw query counts times idf. Terms absent from the corpus fall back
    /// to `log2(N / (df + 1))`.
    pub fn query_vector<I, S>(&self, terms: I) -> QueryVector
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for term in terms {
            *counts.entry(term.into()).or_insert(0) += 1;
        }
        let weights = counts
            .into_iter()
            .map(|(term, count)| {
                let df = self.document_frequency(&term);
                let term_idf = if df == 0 { idf(self.num_docs, df + 1) } else { idf(self.num_docs, df) };
                (term, count as f32 * term_idf)
            })
            .collect();
        QueryVector { weights }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    weights: HashMap<String, f32>,
}

impl QueryVector {
    pub fn get(&self, term: &str) -> Option<f32> { self.weights.get(term).copied() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> { self.weights.iter().map(|(t, w)| (t.as_str(), *w)) }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    pub fn norm(&self) -> f32 { self.weights.values().map(|w| w * w).sum::<f32>().sqrt() }
}
