//! Concurrency and thread safety tests for qmonitor

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use qmonitor::{
    build_candidates, process_document, run_pass, CandidateMatcher, InputDocument, MatchResult,
    MatcherConfig, Metadata, MonitorQuery, Query, ScoringMatching, StrategyKind,
};

fn create_test_document(id: &str) -> Arc<InputDocument> {
    Arc::new(
        InputDocument::builder(id)
            .add_field("body", "concurrent matching over a shared document with shared queries")
            .build()
            .expect("valid document"),
    )
}

fn create_test_queries(count: usize) -> Vec<MonitorQuery> {
    let terms = ["concurrent", "shared", "document", "missing", "queries"];
    (0..count)
        .map(|i| {
            MonitorQuery::new(
                format!("q{i:03}"),
                Query::or(vec![
                    Query::term("body", terms[i % terms.len()]),
                    Query::term("body", terms[(i + 1) % terms.len()]),
                ]),
            )
        })
        .collect()
}

#[test]
fn concurrent_documents_are_independent() {
    let queries = Arc::new(create_test_queries(40));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let queries = Arc::clone(&queries);
            thread::spawn(move || {
                let doc = create_test_document(&format!("doc-{i}"));
                process_document(doc, &queries, &MatcherConfig::default())
                    .expect("pass should succeed")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Same text, same queries: only the document id may differ
    let first = &results[0];
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.doc_id, format!("doc-{i}"));
        assert_eq!(result.matched, first.matched, "Thread {i} matched differently");
        assert_eq!(result.presearcher_hits, 40);
    }
}

#[test]
fn threads_share_one_matcher() {
    let matcher = Arc::new(CandidateMatcher::new(
        create_test_document("shared"),
        ScoringMatching,
    ));
    let candidates = Arc::new(build_candidates(&create_test_queries(25), true));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let matcher = Arc::clone(&matcher);
            let candidates = Arc::clone(&candidates);
            thread::spawn(move || {
                for c in candidates.iter() {
                    matcher
                        .match_query(c.query_id(), c.predicate(), &Metadata::new())
                        .expect("query should evaluate");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    matcher
        .finish(Duration::ZERO, candidates.len() * 4)
        .expect("finish");

    let shared = matcher.matches().expect("finished");
    let single = run_pass(
        create_test_document("shared"),
        ScoringMatching,
        &candidates,
        &MatcherConfig::default(),
        Duration::ZERO,
    )
    .expect("single pass");

    assert_eq!(
        shared.matched_ids().collect::<Vec<_>>(),
        single.matched_ids().collect::<Vec<_>>()
    );
    // Every candidate ran four times, so every merged score is four times larger.
    for (id, m) in single.matches() {
        let shared_score = shared.get(id).expect("same ids").score();
        assert!((shared_score - 4.0 * m.score()).abs() < 1e-4, "{id}");
        assert_eq!(m.query_id(), id);
    }
}

#[test]
fn parallel_configured_pass_matches_sequential() {
    let queries = create_test_queries(200);
    let doc = create_test_document("doc");

    let sequential = process_document(
        Arc::clone(&doc),
        &queries,
        &MatcherConfig {
            strategy: StrategyKind::Highlighting,
            ..MatcherConfig::default()
        },
    )
    .expect("sequential");
    let parallel = process_document(
        doc,
        &queries,
        &MatcherConfig {
            strategy: StrategyKind::Highlighting,
            parallel: true,
            worker_threads: Some(8),
            ..MatcherConfig::default()
        },
    )
    .expect("parallel");

    assert_eq!(sequential.matched, parallel.matched);
    assert_eq!(sequential.presearcher_hits, parallel.presearcher_hits);
    assert_eq!(sequential.queries_run, parallel.queries_run);
}
