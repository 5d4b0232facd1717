//! Boolean retrieval over the inverted index.
//!
//! Queries are evaluated strictly left to right: no precedence, no
//! parentheses. `korea and not trade or football` is `((korea \ trade) ∪ football)`.

use crate::index::InvertedIndex;
use crate::tokenizer::tokenize;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed query: operator `{operator}` at position {position} has no left operand")]
    LeadingOperator { operator: String, position: usize },
    #[error("malformed query: `{operator}` at position {position} is not followed by a term")]
    MissingOperand { operator: String, position: usize },
    #[error("malformed query: `{found}` at position {position} directly follows `{previous}`")]
    DoubleOperator { previous: String, found: String, position: usize },
    #[error("malformed query: expected `and` or `or` before `{found}` at position {position}")]
    MissingOperator { found: String, position: usize },
}

/// How `OR NOT <term>` widens the running result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrNotSemantics {
    /// Union with every document not containing the term.
    #[default]
    Complement,
    /// Union with the postings of every other vocabulary term.
    OtherTerms,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    /// One whitespace-separated word and the terms the tokenizer found in it.
    Term { text: String, terms: Vec<String> },
    And,
    Or,
    Not,
}

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryToken::Term { text, .. } => f.write_str(text),
            QueryToken::And => f.write_str("and"),
            QueryToken::Or => f.write_str("or"),
            QueryToken::Not => f.write_str("not"),
        }
    }
}

/// Split on whitespace and tag operators, keeping each word's position.
/// Other words are normalized with the indexing tokenizer; a word with no
/// terms at all (`&`, `--`) is dropped without renumbering the rest.
pub fn lex(query: &str) -> Vec<(usize, QueryToken)> {
    query
        .split_whitespace()
        .enumerate()
        .filter_map(|(position, word)| {
            let token = match word.to_lowercase().as_str() {
                "and" => QueryToken::And,
                "or" => QueryToken::Or,
                "not" => QueryToken::Not,
                _ => {
                    let terms: Vec<String> = tokenize(word).collect();
                    if terms.is_empty() {
                        return None;
                    }
                    QueryToken::Term { text: word.to_string(), terms }
                }
            };
            Some((position, token))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    First,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub combine: Combine,
    pub negated: bool,
    /// Matched documents contain all of these.
    pub terms: Vec<String>,
}

enum Expect {
    Operand { combine: Combine, negated: bool, position: usize },
    Operator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanQuery {
    pub clauses: Vec<Clause>,
}

impl BooleanQuery {
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let tokens = lex(query);
        let mut clauses = Vec::new();
        let mut state = Expect::Operand { combine: Combine::First, negated: false, position: 0 };
        // token that put us in the current operand state, for error messages
        let mut pending: Option<QueryToken> = None;

        for (position, token) in tokens {
            state = match (state, token) {
                (Expect::Operand { combine, negated, .. }, QueryToken::Term { terms, .. }) => {
                    clauses.push(Clause { combine, negated, terms });
                    pending = None;
                    Expect::Operator
                }
                (Expect::Operand { combine, negated: false, .. }, QueryToken::Not) => {
                    pending = Some(QueryToken::Not);
                    Expect::Operand { combine, negated: true, position }
                }
                (Expect::Operand { combine: Combine::First, negated: false, .. }, op) => {
                    return Err(QueryError::LeadingOperator { operator: op.to_string(), position });
                }
                (Expect::Operand { .. }, found) => {
                    let previous = pending.as_ref().map(ToString::to_string).unwrap_or_default();
                    return Err(QueryError::DoubleOperator { previous, found: found.to_string(), position });
                }
                (Expect::Operator, QueryToken::And) => {
                    pending = Some(QueryToken::And);
                    Expect::Operand { combine: Combine::And, negated: false, position }
                }
                (Expect::Operator, QueryToken::Or) => {
                    pending = Some(QueryToken::Or);
                    Expect::Operand { combine: Combine::Or, negated: false, position }
                }
                (Expect::Operator, found) => {
                    return Err(QueryError::MissingOperator { found: found.to_string(), position });
                }
            };
        }

        if let (Expect::Operand { position, .. }, Some(op)) = (&state, &pending) {
            return Err(QueryError::MissingOperand { operator: op.to_string(), position: *position });
        }
        Ok(Self { clauses })
    }

    /// Run the clauses against `index`; the universe is `0..num_docs`.
    pub fn evaluate(&self, index: &InvertedIndex, num_docs: u32, or_not: OrNotSemantics) -> BTreeSet<DocId> {
        let mut result = BTreeSet::new();
        for clause in &self.clauses {
            let matched = postings_of_all(index, &clause.terms);
            match (clause.combine, clause.negated) {
                (Combine::First, false) => result = matched,
                (Combine::First, true) => result = complement(&matched, num_docs),
                (Combine::And, false) => result.retain(|id| matched.contains(id)),
                (Combine::And, true) => result.retain(|id| !matched.contains(id)),
                (Combine::Or, false) => result.extend(matched),
                (Combine::Or, true) => match or_not {
                    OrNotSemantics::Complement => result.extend(complement(&matched, num_docs)),
                    OrNotSemantics::OtherTerms => {
                        for term in index.terms().filter(|t| !clause.terms.iter().any(|c| c.as_str() == *t)) {
                            result.extend(index.postings(term).iter().copied());
                        }
                    }
                },
            }
        }
        result
    }
}

fn postings_of_all(index: &InvertedIndex, terms: &[String]) -> BTreeSet<DocId> {
    let mut sets = terms.iter().map(|t| index.postings(t).iter().copied().collect::<BTreeSet<DocId>>());
    let Some(mut matched) = sets.next() else {
        return BTreeSet::new();
    };
    for set in sets {
        matched.retain(|id| set.contains(id));
    }
    matched
}

fn complement(matched: &BTreeSet<DocId>, num_docs: u32) -> BTreeSet<DocId> {
    (0..num_docs).filter(|id| !matched.contains(id)).collect()
}

/// Parse and evaluate in one step.
pub fn search(
    query: &str,
    index: &InvertedIndex,
    num_docs: u32,
    or_not: OrNotSemantics,
) -> Result<BTreeSet<DocId>, QueryError> {
    let parsed = BooleanQuery::parse(query)?;
    tracing::debug!(clauses = parsed.clauses.len(), "parsed boolean query");
    Ok(parsed.evaluate(index, num_docs, or_not))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn index() -> InvertedIndex {
        let mut idx = InvertedIndex::new();
        let docs = [
            ("Korea Times News", "Korea economy grows fast"),
            ("World News Today", "Korea trade deal signed"),
            ("Sports Update", "Football match results"),
        ];
        for (id, (title, body)) in docs.iter().enumerate() {
            idx.add_document(&Document {
                id: id as DocId,
                title: title.to_string(),
                body: body.to_string(),
                url: String::new(),
            });
        }
        idx
    }

    fn run(query: &str) -> Vec<DocId> {
        search(query, &index(), 3, OrNotSemantics::Complement).unwrap().into_iter().collect()
    }

    #[test]
    fn lexes_operators_case_insensitively() {
        let term = |text: &str, t: &str| QueryToken::Term { text: text.into(), terms: vec![t.into()] };
        assert_eq!(
            lex("Korea AND Not trade"),
            vec![(0, term("Korea", "korea")), (1, QueryToken::And), (2, QueryToken::Not), (3, term("trade", "trade"))]
        );
    }

    #[test]
    fn punctuated_word_is_one_operand() {
        assert_eq!(
            lex("covid-19 & korea"),
            vec![
                (0, QueryToken::Term { text: "covid-19".into(), terms: vec!["covid".into(), "19".into()] }),
                (2, QueryToken::Term { text: "korea".into(), terms: vec!["korea".into()] }),
            ]
        );
    }

    #[test]
    fn single_term() {
        assert_eq!(run("korea"), vec![0, 1]);
        assert_eq!(run("Korea,"), vec![0, 1]);
        assert!(run("nothing").is_empty());
    }

    #[test]
    fn and_or() {
        assert_eq!(run("korea and trade"), vec![1]);
        assert_eq!(run("korea or football"), vec![0, 1, 2]);
        assert_eq!(run("news and korea or football"), vec![0, 1, 2]);
    }

    #[test]
    fn and_not_is_difference() {
        assert_eq!(run("korea and not trade"), vec![0]);
    }

    #[test]
    fn leading_not_is_complement() {
        assert_eq!(run("not korea"), vec![2]);
        assert_eq!(run("not missing"), vec![0, 1, 2]);
    }

    #[test]
    fn or_not_semantics() {
        let idx = index();
        let complement = search("football or not korea", &idx, 3, OrNotSemantics::Complement).unwrap();
        assert_eq!(complement.into_iter().collect::<Vec<_>>(), vec![2]);
        // every document has some term other than "korea"
        let other = search("football or not korea", &idx, 3, OrNotSemantics::OtherTerms).unwrap();
        assert_eq!(other.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn punctuated_words_evaluate_as_single_operands() {
        let mut idx = index();
        idx.add_document(&Document {
            id: 3,
            title: "Covid-19 cases in Korea".into(),
            body: "Korea's hospitals report 19 new cases".into(),
            url: String::new(),
        });
        let run4 = |q: &str| search(q, &idx, 4, OrNotSemantics::Complement).unwrap().into_iter().collect::<Vec<_>>();
        assert_eq!(run4("covid-19 and korea"), vec![3]);
        assert_eq!(run4("korea's or football"), vec![2, 3]);
        assert!(matches!(
            BooleanQuery::parse("korea & trade"),
            Err(QueryError::MissingOperator { position: 2, .. })
        ));
        // all terms of the word must be present
        assert!(run4("football-19").is_empty());
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(run("").is_empty());
        assert!(run("  ?! ").is_empty());
    }

    #[test]
    fn malformed_queries() {
        assert!(matches!(
            BooleanQuery::parse("and korea"),
            Err(QueryError::LeadingOperator { position: 0, .. })
        ));
        assert!(matches!(
            BooleanQuery::parse("korea and"),
            Err(QueryError::MissingOperand { position: 1, .. })
        ));
        assert!(matches!(BooleanQuery::parse("korea or not"), Err(QueryError::MissingOperand { .. })));
        assert!(matches!(BooleanQuery::parse("not"), Err(QueryError::MissingOperand { .. })));
        assert!(matches!(
            BooleanQuery::parse("korea and or trade"),
            Err(QueryError::DoubleOperator { position: 2, .. })
        ));
        assert!(matches!(BooleanQuery::parse("not not korea"), Err(QueryError::DoubleOperator { .. })));
        assert!(matches!(
            BooleanQuery::parse("korea trade"),
            Err(QueryError::MissingOperator { position: 1, .. })
        ));
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = BooleanQuery::parse("korea and or trade").unwrap_err();
        assert_eq!(err.to_string(), "malformed query: `or` at position 2 directly follows `and`");
    }
}
