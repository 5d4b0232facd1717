use crate::weighting::{QueryVector, WeightIndex};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Document magnitude used in the cosine denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Only the document weights of terms shared with the query.
    #[default]
    QueryOverlap,
    /// The document's full weight vector (true cosine similarity).
    FullDocument,
}

#[derive(Debug, Clone, Default)]
pub struct Scores {
    by_doc: HashMap<DocId, f32>,
}

impl Scores {
    /// Similarity of `doc_id`; 0.0 when it shares no term with the query.
    pub fn get(&self, doc_id: DocId) -> f32 { self.by_doc.get(&doc_id).copied().unwrap_or(0.0) }

    pub fn len(&self) -> usize { self.by_doc.len() }

    pub fn is_empty(&self) -> bool { self.by_doc.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, f32)> + '_ { self.by_doc.iter().map(|(d, s)| (*d, *s)) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHit {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub doc_id: DocId,
    pub score: f32,
}

#[derive(Default)]
struct Accumulator {
    dot: f32,
    // sum of squared doc weights over the query's terms
    overlap: f32,
}

/// Cosine similarity between the query and every document sharing a term with it.
pub fn score(query: &QueryVector, index: &WeightIndex, normalization: Normalization) -> Scores {
    let mut acc: HashMap<DocId, Accumulator> = HashMap::new();
    for (term, q_w) in query.iter() {
        for &(doc_id, d_w) in index.weights(term) {
            let a = acc.entry(doc_id).or_default();
            a.dot += q_w * d_w;
            a.overlap += d_w * d_w;
        }
    }

    let q_norm = query.norm();
    let by_doc = acc
        .into_iter()
        .map(|(doc_id, a)| {
            let d_norm = match normalization {
                Normalization::QueryOverlap => a.overlap.sqrt(),
                Normalization::FullDocument => index.document_norm(doc_id),
            };
            let denom = q_norm * d_norm;
            let s = if a.overlap == 0.0 || denom == 0.0 { 0.0 } else { a.dot / denom };
            (doc_id, s)
        })
        .collect();
    Scores { by_doc }
}

/// Descending by score, ties by ascending doc id.
pub fn rank(scores: &Scores) -> Vec<RankedHit> {
    let mut scored: Vec<(DocId, f32)> = scores.iter().collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
    scored
        .into_iter()
        .enumerate()
        .map(|(i, (doc_id, score))| RankedHit { rank: i + 1, doc_id, score })
        .collect()
}
