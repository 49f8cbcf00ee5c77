use std::sync::Arc;
use std::time::Duration;

use qmonitor::{
    process_document, run_pass, CandidateQuery, HighlightingMatching, InputDocument,
    MatcherConfig, MonitorConfig, MonitorQuery, Query, ScoringMatching, StrategyKind,
};

fn news_document() -> Arc<InputDocument> {
    Arc::new(
        InputDocument::builder("news-1")
            .add_field("headline", "Storm closes harbour")
            .add_field("body", "A storm closed the harbour on Monday.")
            .add_field("body", "Ferries resume once the storm passes.")
            .build()
            .expect("valid document"),
    )
}

fn registered_queries() -> Vec<MonitorQuery> {
    let raw = r#"[
        {"id": "storms", "query": {"type": "term", "field": "body", "term": "storm"}},
        {"id": "transport", "query": {"type": "or", "clauses": [
            {"type": "term", "field": "body", "term": "ferries"},
            {"type": "term", "field": "body", "term": "trains"}
        ]}},
        {"id": "sports", "query": {"type": "term", "field": "headline", "term": "football"}},
        {"id": "harbour_closed", "query": {"type": "phrase", "field": "headline",
            "terms": ["closes", "harbour"]}}
    ]"#;
    serde_json::from_str(raw).expect("queries parse")
}

#[test]
fn yaml_configured_pass_reports_matches() {
    let cfg = MonitorConfig::from_yaml(
        r#"
version: "1.0"
matcher:
  version: "v1"
  strategy: "scoring"
  parallel: true
"#,
    )
    .expect("valid config");

    let report = process_document(news_document(), &registered_queries(), cfg.matcher_config())
        .expect("pass succeeds");

    assert_eq!(report.doc_id, "news-1");
    assert_eq!(report.matched, vec!["harbour_closed", "storms", "transport"]);
    assert_eq!(report.presearcher_hits, 4);
    assert_eq!(report.queries_run, 5);
    assert!(report.errors.is_empty());
}

#[test]
fn multi_valued_fields_are_searched_as_one() {
    let queries = registered_queries();
    let candidates: Vec<CandidateQuery> = queries[0].candidates(false);
    let matches = run_pass(
        news_document(),
        ScoringMatching,
        &candidates,
        &MatcherConfig::default(),
        Duration::ZERO,
    )
    .expect("pass succeeds");

    // "storm" occurs once in each value of `body`.
    let score = matches.get("storms").expect("matched").score();
    assert!((score - 2.0_f32.sqrt()).abs() < 1e-6);
}

#[test]
fn highlights_cover_every_matching_value() {
    let candidates = MonitorQuery::new("storms", Query::term("body", "storm")).candidates(true);
    let matches = run_pass(
        news_document(),
        HighlightingMatching,
        &candidates,
        &MatcherConfig::default(),
        Duration::ZERO,
    )
    .expect("pass succeeds");

    let hit = matches.get("storms").expect("matched");
    assert_eq!(hit.hit_count(), 2);
    let spans: Vec<_> = hit.field_hits("body").collect();
    assert!(spans[0].start_position < spans[1].start_position);
}

#[test]
fn report_serializes_for_downstream_consumers() {
    let cfg = MatcherConfig {
        strategy: StrategyKind::Explaining,
        ..MatcherConfig::default()
    };
    let report = process_document(news_document(), &registered_queries(), &cfg)
        .expect("pass succeeds");
    let value: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("serialize")).expect("valid json");

    assert_eq!(value["doc_id"], "news-1");
    assert_eq!(value["matched"].as_array().map(Vec::len), Some(3));
    assert!(value["slow_queries"].is_array());
}
