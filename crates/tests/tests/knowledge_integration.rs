use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use guide_agents::GuideAgent;
use guide_core::{Intent, RawQuery};
use guide_knowledge::{load_knowledge, KnowledgeSource, KnowledgeSummary, REQUIRED_SECTIONS};
use guide_observability::AppMetrics;

fn knowledge_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../kb/bangalore.md")
}

#[test]
fn sample_document_has_every_required_section() -> anyhow::Result<()> {
    let doc = load_knowledge(knowledge_path())?;
    assert_eq!(doc.title, "Bengaluru Local Guide");
    for section in REQUIRED_SECTIONS {
        assert!(doc.has_section(section), "missing {section}");
    }

    let summary = KnowledgeSummary::of(&doc);
    assert_eq!(summary.sections_count, REQUIRED_SECTIONS.len());
    assert!(summary.content_length >= 1000);
    Ok(())
}

#[test]
fn unchanged_document_is_not_reloaded() -> anyhow::Result<()> {
    let source = KnowledgeSource::new(knowledge_path());
    let doc = source.load()?;
    assert!(source.reload_if_changed(&doc)?.is_none());

    let fresh = source.reload()?;
    assert_eq!(fresh.sections.len(), doc.sections.len());
    Ok(())
}

#[test]
fn changed_document_is_reloaded() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("bangalore.md");
    std::fs::copy(knowledge_path(), &path)?;

    let source = KnowledgeSource::new(&path);
    let doc = source.load()?;
    assert_eq!(doc.sections.len(), REQUIRED_SECTIONS.len());

    let mut file = OpenOptions::new().append(true).open(&path)?;
    writeln!(file, "\n## Getting Around\nNamma Metro and autos cover most of the city.")?;
    file.set_modified(SystemTime::now() + Duration::from_secs(5))?;
    drop(file);

    let fresh = source
        .reload_if_changed(&doc)?
        .expect("newer file yields a new snapshot");
    assert_eq!(fresh.sections.len(), REQUIRED_SECTIONS.len() + 1);
    assert!(fresh.has_section("Getting Around"));
    assert!(source.reload_if_changed(&fresh)?.is_none());
    Ok(())
}

#[test]
fn agent_reply_cites_traffic_section() -> anyhow::Result<()> {
    let doc = load_knowledge(knowledge_path())?;
    let agent = GuideAgent::new(AppMetrics::shared());

    let response = agent.handle(&RawQuery::new("Traffic at Silk Board at 6 PM"), Some(&doc));
    let reply = response.reply.expect("successful query has a reply");
    assert_eq!(reply.intent, Intent::Traffic);
    assert_eq!(reply.sources, vec!["Traffic Patterns and Peak Hours".to_string()]);
    assert!(reply.reply_text.contains("Silk Board"));
    assert_eq!(
        reply.json_payload["location"],
        serde_json::json!("silk_board")
    );
    Ok(())
}

#[test]
fn agent_counts_each_outcome() {
    let metrics = AppMetrics::shared();
    let agent = GuideAgent::new(metrics.clone());

    agent.handle(&RawQuery::new("Where can I eat dosa?"), None);
    agent.handle(&RawQuery::new(""), None);
    agent.handle(&RawQuery::new("hello there friend"), None);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.queries_total, 3);
    assert_eq!(snapshot.rejected_total, 1);
    assert_eq!(snapshot.general_fallback_total, 1);
    assert_eq!(snapshot.internal_fault_total, 0);
}
