use crate::boolean::{self, OrNotSemantics, QueryError};
use crate::corpus::RawDocument;
use crate::index::InvertedIndex;
use crate::ranking::{rank, score, Normalization, RankedHit};
use crate::store::DocumentStore;
use crate::tokenizer::tokenize;
use crate::weighting::{IndexError, TermStatistics, WeightIndex};
use crate::{DocId, Document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default)]
    pub or_not: OrNotSemantics,
    #[serde(default)]
    pub normalization: Normalization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub num_docs: u32,
    pub num_terms: usize,
}

/// Ingestion phase: documents go into the store and both indexes in one pass.
pub struct EngineBuilder {
    options: EngineOptions,
    store: DocumentStore,
    inverted: InvertedIndex,
    stats: TermStatistics,
    started: Instant,
}

impl EngineBuilder {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            store: DocumentStore::new(),
            inverted: InvertedIndex::new(),
            stats: TermStatistics::new(),
            started: Instant::now(),
        }
    }

    pub fn add(&mut self, title: String, body: String, url: String) -> DocId {
        let id = self.store.push(title, body, url);
        if let Some(doc) = self.store.get(id) {
            self.inverted.add_document(doc);
            self.stats.observe(doc);
        }
        id
    }

    pub fn extend<I: IntoIterator<Item = RawDocument>>(&mut self, docs: I) {
        for d in docs {
            self.add(d.title, d.body, d.url);
        }
    }

    pub fn len(&self) -> usize { self.store.len() }

    pub fn is_empty(&self) -> bool { self.store.is_empty() }

    /// Fix N to the number of added documents and compute weights.
    pub fn build(self) -> Result<SearchEngine, IndexError> {
        let num_docs = self.store.len() as u32;
        let weights = self.stats.finalize(num_docs)?;
        let elapsed = self.started.elapsed();
        tracing::info!(
            num_docs,
            num_terms = self.inverted.num_terms(),
            took_s = elapsed.as_secs_f64(),
            "index build complete"
        );
        Ok(SearchEngine { options: self.options, store: self.store, inverted: self.inverted, weights })
    }
}

/// Finalized, read-only engine answering both query models.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    options: EngineOptions,
    store: DocumentStore,
    inverted: InvertedIndex,
    weights: WeightIndex,
}

impl SearchEngine {
    pub fn from_documents<I>(docs: I, options: EngineOptions) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = RawDocument>,
    {
        let mut builder = EngineBuilder::new(options);
        builder.extend(docs);
        builder.build()
    }

    pub fn boolean(&self, query: &str) -> Result<BTreeSet<DocId>, QueryError> {
        let start = Instant::now();
        let hits = boolean::search(query, &self.inverted, self.num_docs(), self.options.or_not)?;
        tracing::debug!(query, hits = hits.len(), took_s = start.elapsed().as_secs_f64(), "boolean query");
        Ok(hits)
    }

    pub fn ranked(&self, query: &str) -> Vec<RankedHit> {
        let start = Instant::now();
        let q = self.weights.query_vector(tokenize(query));
        if q.is_empty() {
            return Vec::new();
        }
        let scores = score(&q, &self.weights, self.options.normalization);
        let ranked = rank(&scores);
        tracing::debug!(query, hits = ranked.len(), took_s = start.elapsed().as_secs_f64(), "ranked query");
        ranked
    }

    pub fn document(&self, id: DocId) -> Option<&Document> { self.store.get(id) }

    pub fn documents(&self) -> &DocumentStore { &self.store }

    pub fn inverted_index(&self) -> &InvertedIndex { &self.inverted }

    pub fn weight_index(&self) -> &WeightIndex { &self.weights }

    pub fn options(&self) -> EngineOptions { self.options }

    pub fn num_docs(&self) -> u32 { self.store.len() as u32 }

    pub fn num_terms(&self) -> usize { self.inverted.num_terms() }

    pub fn stats(&self) -> EngineStats { EngineStats { num_docs: self.num_docs(), num_terms: self.num_terms() } }
}
