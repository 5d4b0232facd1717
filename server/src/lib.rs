use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::{HeaderValue, StatusCode}, routing::get, Json, Router};
use newsdex_core::boolean::{lex, QueryToken};
use newsdex_core::tokenizer::tokenize;
use newsdex_core::{load_corpus_file, DocId, EngineOptions, SearchEngine};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use regex::{Regex, RegexBuilder};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub corpus: PathBuf,
    pub options: EngineOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Boolean,
    #[default]
    Ranked,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: SearchMode,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub rank: usize,
    pub doc_id: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    // finalized, read-only; shared by all requests without locking
    pub engine: Arc<SearchEngine>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn build_app(config: &ServerConfig) -> Result<Router> {
    let docs = load_corpus_file(&config.corpus)
        .with_context(|| format!("loading corpus {}", config.corpus.display()))?;
    let engine = SearchEngine::from_documents(docs, config.options)?;
    tracing::info!(num_docs = engine.num_docs(), num_terms = engine.num_terms(), "engine ready");
    Ok(router(Arc::new(engine)))
}

pub fn router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/stats", get(stats_handler))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(AppState { engine })
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Origins come from CORS_ALLOW_ORIGIN (comma-separated); any origin otherwise.
fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let allow = if origins.is_empty() { AllowOrigin::any() } else { AllowOrigin::list(origins) };
    CorsLayer::new().allow_origin(allow).allow_methods(Any).allow_headers(Any)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let engine = &state.engine;
    let k = params.k.clamp(1, 100);

    // (doc_id, score) in presentation order
    let hits: Vec<(DocId, Option<f32>)> = match params.mode {
        SearchMode::Ranked => engine.ranked(&params.q).into_iter().map(|h| (h.doc_id, Some(h.score))).collect(),
        SearchMode::Boolean => match engine.boolean(&params.q) {
            Ok(ids) => ids.into_iter().map(|id| (id, None)).collect(),
            Err(err) => {
                tracing::warn!(query = %params.q, %err, "rejected boolean query");
                return Err((StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": err.to_string() }))));
            }
        },
    };
    let total_hits = hits.len();

    let terms = highlight_terms_for(&params.q, params.mode);
    let mut results: Vec<SearchHit> = Vec::with_capacity(k.min(total_hits));
    for (i, (doc_id, score)) in hits.into_iter().take(k).enumerate() {
        if let Some(doc) = engine.document(doc_id) {
            results.push(SearchHit {
                rank: i + 1,
                doc_id,
                score,
                title: doc.title.clone(),
                url: doc.url.clone(),
                snippet: snippet(&doc.body, &terms),
            });
        }
    }

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits, took_s = elapsed.as_secs_f64(), "search");
    Ok(Json(SearchResponse { query: params.q, mode: params.mode, took_s: elapsed.as_secs_f64(), total_hits, results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<serde_json::Value>, ApiError> {
    match state.engine.document(doc_id) {
        Some(doc) => Ok(Json(serde_json::json!({
            "doc_id": doc.id,
            "title": doc.title,
            "url": doc.url,
            "text": doc.body,
        }))),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "stats": state.engine.stats(),
        "options": state.engine.options(),
    }))
}

/// Search terms of the query; boolean operators are not highlighted.
fn highlight_terms_for(query: &str, mode: SearchMode) -> Vec<String> {
    match mode {
        SearchMode::Ranked => tokenize(query).collect(),
        SearchMode::Boolean => lex(query)
            .into_iter()
            .filter_map(|t| match t {
                (_, QueryToken::Term { terms, .. }) => Some(terms),
                _ => None,
            })
            .flatten()
            .collect(),
    }
}

fn snippet(text: &str, terms: &[String]) -> Option<String> {
    if text.is_empty() { return None; }
    let Some(pat) = term_pattern(terms) else {
        return Some(text.chars().take(200).collect());
    };
    let snippet = match pat.find(text) {
        Some(m) => {
            let start = floor_char_boundary(text, m.start().saturating_sub(100));
            let end = floor_char_boundary(text, (m.start() + 200).min(text.len()));
            &text[start..end]
        }
        None => {
            let end = text.char_indices().nth(200).map(|(i, _)| i).unwrap_or(text.len());
            &text[..end]
        }
    };
    // one pass, so inserted markup is never matched again
    Some(pat.replace_all(snippet, "<em>$0</em>").into_owned())
}

/// Case-insensitive whole-word alternation of the terms, longest first.
fn term_pattern(terms: &[String]) -> Option<Regex> {
    let mut words: Vec<&str> = terms.iter().map(String::as_str).filter(|t| !t.is_empty()).collect();
    if words.is_empty() { return None; }
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    words.dedup();
    let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    RegexBuilder::new(&format!(r"\b(?:{alternation})\b")).case_insensitive(true).build().ok()
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
