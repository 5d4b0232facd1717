use newsdex_core::corpus::DELIMITER;
use newsdex_core::{load_corpus, load_corpus_file, CorpusError, EngineOptions, Normalization, OrNotSemantics, QueryError, SearchEngine};
use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

fn corpus_text() -> String {
    format!(
        "Korea Times News\nKorea economy grows fast\nhttps://news.test/0\n{d}\n\
         World News Today\nKorea trade deal signed\nhttps://news.test/1\n{d}\n\
         Sports Update\nFootball match results\nhttps://news.test/2\n{d}\n",
        d = DELIMITER
    )
}

fn engine(options: EngineOptions) -> SearchEngine {
    let docs = load_corpus(Cursor::new(corpus_text())).unwrap();
    SearchEngine::from_documents(docs, options).unwrap()
}

fn ids(set: BTreeSet<u32>) -> Vec<u32> { set.into_iter().collect() }

#[test]
fn boolean_round_trip() {
    let e = engine(EngineOptions::default());
    assert_eq!(e.num_docs(), 3);
    assert_eq!(ids(e.boolean("korea").unwrap()), vec![0, 1]);
    assert_eq!(ids(e.boolean("korea and trade").unwrap()), vec![1]);
    assert_eq!(ids(e.boolean("korea or football").unwrap()), vec![0, 1, 2]);
    assert_eq!(ids(e.boolean("NOT korea").unwrap()), vec![2]);
}

#[test]
fn boolean_matches_set_algebra() {
    let e = engine(EngineOptions::default());
    let index = e.inverted_index();
    let set = |t: &str| index.postings(t).iter().copied().collect::<BTreeSet<u32>>();
    for a in ["korea", "news", "football", "missing"] {
        for b in ["trade", "news", "results", "korea"] {
            let and = e.boolean(&format!("{a} and {b}")).unwrap();
            let or = e.boolean(&format!("{a} or {b}")).unwrap();
            assert_eq!(and, set(a).intersection(&set(b)).copied().collect::<BTreeSet<u32>>());
            assert_eq!(or, set(a).union(&set(b)).copied().collect::<BTreeSet<u32>>());
        }
        let universe: BTreeSet<u32> = (0..3).collect();
        assert_eq!(e.boolean(&format!("not {a}")).unwrap(), universe.difference(&set(a)).copied().collect::<BTreeSet<u32>>());
    }
}

#[test]
fn malformed_boolean_query_is_an_error() {
    let e = engine(EngineOptions::default());
    assert!(matches!(e.boolean("or korea"), Err(QueryError::LeadingOperator { .. })));
    assert!(matches!(e.boolean("korea and not"), Err(QueryError::MissingOperand { .. })));
}

#[test]
fn ranked_round_trip() {
    for normalization in [Normalization::QueryOverlap, Normalization::FullDocument] {
        let e = engine(EngineOptions { normalization, or_not: OrNotSemantics::Complement });
        let hits = e.ranked("korea trade");
        assert_eq!(hits.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![1, 0]);
        assert!(hits[0].score > hits[1].score);
        assert!(hits.iter().all(|h| h.doc_id != 2));
    }
}

#[test]
fn engine_is_shareable_across_threads() {
    let e = std::sync::Arc::new(engine(EngineOptions::default()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let e = e.clone();
            std::thread::spawn(move || e.ranked("korea").len())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 2);
    }
}

#[test]
fn corpus_file_with_punctuated_boolean_terms() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("database.txt");
    fs::write(
        &path,
        format!(
            "Covid-19 cases in Korea\nHospitals report new infections\n2024-03-01\nhttps://news.test/0\n{d}\n\
             Sports Update\nKorea's football match results\nhttps://news.test/1\n{d}\n",
            d = DELIMITER
        ),
    )
    .unwrap();
    let docs = load_corpus_file(&path).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].body, "Hospitals report new infections 2024-03-01");

    let e = SearchEngine::from_documents(docs, EngineOptions::default()).unwrap();
    assert_eq!(ids(e.boolean("covid-19 and korea").unwrap()), vec![0]);
    assert_eq!(ids(e.boolean("korea's or covid-19").unwrap()), vec![0, 1]);
    assert_eq!(ids(e.boolean("korea and not covid-19").unwrap()), vec![1]);
}

#[test]
fn corpus_file_errors() {
    let dir = tempdir().unwrap();
    assert!(matches!(load_corpus_file(dir.path().join("missing.txt")), Err(CorpusError::Io(_))));

    let path = dir.path().join("truncated.txt");
    fs::write(&path, format!("Title\nhttps://news.test/0\n{DELIMITER}\nDangling title\n")).unwrap();
    let err = load_corpus_file(&path).unwrap_err();
    assert_eq!(err.to_string(), "malformed record #1 starting at line 4: expected a title line and a URL line");
}
