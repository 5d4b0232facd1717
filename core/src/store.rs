use crate::{DocId, Document};

/// Append-only sequence of ingested documents. Ids are positions.
#[derive(Debug, Default, Clone)]
pub struct DocumentStore {
    docs: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, title: String, body: String, url: String) -> DocId {
        let id = self.docs.len() as DocId;
        self.docs.push(Document { id, title, body, url });
        id
    }

    pub fn get(&self, id: DocId) -> Option<&Document> { self.docs.get(id as usize) }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Document> { self.docs.iter() }

    /// The universe of ids, `0..N`.
    pub fn ids(&self) -> impl Iterator<Item = DocId> { 0..self.docs.len() as DocId }
}
