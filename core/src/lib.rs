pub mod boolean;
pub mod corpus;
pub mod engine;
pub mod index;
pub mod ranking;
pub mod store;
pub mod tokenizer;
pub mod weighting;

use serde::{Deserialize, Serialize};

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub body: String,
    /// Source URL the article was scraped from.
    pub url: String,
}

pub use boolean::{OrNotSemantics, QueryError};
pub use corpus::{load_corpus, load_corpus_file, CorpusError, RawDocument};
pub use engine::{EngineBuilder, EngineOptions, EngineStats, SearchEngine};
pub use index::InvertedIndex;
pub use ranking::{rank, score, Normalization, RankedHit, Scores};
pub use store::DocumentStore;
pub use weighting::{IndexError, QueryVector, TermStatistics, WeightIndex};
