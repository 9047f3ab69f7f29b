use std::sync::Arc;
use std::thread;

use guide_agents::{QueryPipeline, UNDERSTOOD_NOTHING_MESSAGE};
use guide_core::{
    sanitize, Intent, IntentClassifier, Location, PipelineStage, QueryValidator, TimeSlot,
    DEFAULT_PRIORITY,
};

const SAMPLES: &[&str] = &[
    "What does scene illa maga mean?",
    "Traffic at Silk Board at 6 PM",
    "Where should I eat breakfast in Malleshwaram?",
    "Plan one day in Bangalore with Lalbagh and Cubbon Park",
    "How should I behave in temples during Dasara?",
    "food and traffic near Koramangala at 9am",
    "temple tour tonight",
    "hello there friend",
    "Is 14:30 a good time to drive from Whitefield?",
];

#[test]
fn slang_question_is_understood() {
    let result = QueryPipeline::new().process("What does scene illa maga mean?");
    assert!(result.success);
    assert_eq!(result.classified_query.intent, Intent::Slang);
    assert!(result.classified_query.confidence >= 0.7);
    assert_eq!(result.classified_query.location_slot, None);
}

#[test]
fn empty_query_is_rejected() {
    let result = QueryPipeline::new().process("");
    assert!(!result.success);
    assert_eq!(result.stage, PipelineStage::Rejected);
    assert!(result.error_message.unwrap().to_lowercase().contains("empty"));
}

#[test]
fn single_character_is_too_short() {
    let result = QueryPipeline::new().process("a");
    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("too short"));
}

#[test]
fn overlong_query_mentions_length() {
    let result = QueryPipeline::new().process(&"a".repeat(600));
    assert!(!result.success);
    let message = result.error_message.unwrap();
    assert!(message.contains("too long"));
    assert!(message.contains("length"));
}

#[test]
fn traffic_query_fills_both_slots() {
    let result = QueryPipeline::new().process("Traffic at Silk Board at 6 PM");
    let query = result.classified_query;
    assert_eq!(query.intent, Intent::Traffic);
    assert_eq!(query.time_slot, Some(TimeSlot::Evening));
    assert_eq!(query.location_slot, Some(Location::SilkBoard));
    assert_eq!(query.location_slot.map(|l| l.as_key()), Some("silk_board"));
}

#[test]
fn script_payload_is_rejected_not_stripped() {
    let result = QueryPipeline::new().process("<script>alert(1)</script>");
    assert!(!result.success);
    assert_eq!(result.stage, PipelineStage::Rejected);
    assert_eq!(result.classified_query.intent, Intent::Invalid);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Query contains invalid content")
    );
}

#[test]
fn processing_is_deterministic() {
    let pipeline = QueryPipeline::new();
    for text in SAMPLES {
        let first = pipeline.process(text);
        let second = pipeline.process(text);
        assert_eq!(first.classified_query, second.classified_query, "{text}");
        assert_eq!(first.success, second.success, "{text}");
    }
}

#[test]
fn validation_boundary_holds() {
    let pipeline = QueryPipeline::new();
    for text in ["", " ", "x", "  y  ", "\t\n"] {
        assert!(!pipeline.process(text).success, "{text:?}");
    }

    assert!(!pipeline.process(&"b".repeat(501)).success);
    assert!(pipeline.process(&"b".repeat(500)).success);
    assert!(pipeline.process("ok").success);
}

#[test]
fn confidence_stays_in_range() {
    let pipeline = QueryPipeline::new();
    let long = "food eat lunch dinner dosa idli vada biryani ".repeat(5);
    for text in SAMPLES.iter().copied().chain([long.as_str(), "", "a"]) {
        let confidence = pipeline.process(text).classified_query.confidence;
        assert!((0.0..=0.9).contains(&confidence), "{text}: {confidence}");
    }
}

#[test]
fn unmatched_text_falls_back_to_general() {
    let pipeline = QueryPipeline::new();
    for text in ["hello there friend", "tell me something nice", "ok"] {
        let result = pipeline.process(text);
        assert!(result.success, "{text}");
        assert_eq!(result.classified_query.intent, Intent::General, "{text}");
        assert!((result.classified_query.confidence - 0.5).abs() < 1e-6);
        assert!(result.error_message.is_none());
    }
}

#[test]
fn slots_do_not_depend_on_intent_priority() {
    let mut reversed = DEFAULT_PRIORITY;
    reversed.reverse();
    let classifier = IntentClassifier::with_priority(reversed).expect("permutation");

    let default_pipeline = QueryPipeline::new();
    let reversed_pipeline = QueryPipeline::with_model(QueryValidator::new(), classifier);

    for text in SAMPLES {
        let left = default_pipeline.process(text).classified_query;
        let right = reversed_pipeline.process(text).classified_query;
        assert_eq!(left.time_slot, right.time_slot, "{text}");
        assert_eq!(left.location_slot, right.location_slot, "{text}");
    }

    let tie = "food and traffic";
    assert_eq!(default_pipeline.process(tie).classified_query.intent, Intent::Food);
    assert_eq!(reversed_pipeline.process(tie).classified_query.intent, Intent::Traffic);
}

#[test]
fn sanitization_is_idempotent() {
    let inputs = [
        "  Best   lunch {spots} ",
        "<<x>>  y",
        "a { } b",
        "{ spaced }\tout\n",
        "plain text",
    ];
    for text in inputs {
        let once = sanitize(text);
        assert_eq!(sanitize(&once), once, "{text:?}");
    }
}

#[test]
fn sanitized_text_below_minimum_is_rejected() {
    let result = QueryPipeline::new().process("{ }");
    assert!(!result.success);
    assert_eq!(result.stage, PipelineStage::Rejected);
    assert_ne!(result.error_message.as_deref(), Some(UNDERSTOOD_NOTHING_MESSAGE));
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn pipeline_is_shared_across_threads() {
    assert_send_sync::<QueryPipeline>();

    let pipeline = Arc::new(QueryPipeline::new());
    let workers = (0..4)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || pipeline.process("Traffic at Silk Board at 6 PM"))
        })
        .collect::<Vec<_>>();

    for worker in workers {
        let result = worker.join().expect("worker thread finished");
        assert!(result.success);
        assert_eq!(result.classified_query.intent, Intent::Traffic);
        assert_eq!(result.classified_query.location_slot, Some(Location::SilkBoard));
    }
}
