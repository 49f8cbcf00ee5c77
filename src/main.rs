use std::error::Error;
use std::sync::Arc;

use qmonitor::{init_tracing, process_document, InputDocument, MonitorConfig, MonitorQuery, Query};

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };
    init_tracing(&cfg.logging)?;

    let doc = InputDocument::builder("release-notes")
        .add_field("title", "Release 2.4")
        .add_field(
            "body",
            "Faster startup, a new query planner and fixes for the slow log.",
        )
        .build()?;

    let queries = vec![
        MonitorQuery::new("planner", Query::phrase("body", ["query", "planner"])),
        MonitorQuery::new(
            "perf",
            Query::or(vec![
                Query::term("body", "faster"),
                Query::term("body", "latency"),
            ]),
        ),
        MonitorQuery::new("security", Query::term("body", "cve")),
    ];

    let report = process_document(Arc::new(doc), &queries, cfg.matcher_config())?;
    println!("{}", report.to_json_pretty()?);

    Ok(())
}
