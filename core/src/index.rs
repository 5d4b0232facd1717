use crate::tokenizer::tokenize_document;
use crate::{DocId, Document};
use std::collections::HashMap;

/// Term -> document ids, one entry per occurrence in title+body.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn add_document(&mut self, doc: &Document) {
        for term in tokenize_document(&doc.title, &doc.body) {
            self.postings.entry(term).or_default().push(doc.id);
        }
    }

    /// Ids in insertion order, possibly repeated. Empty for unseen terms.
    pub fn postings(&self, term: &str) -> &[DocId] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> { self.postings.keys().map(String::as_str) }

    pub fn num_terms(&self) -> usize { self.postings.len() }
}
