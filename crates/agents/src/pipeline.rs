use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use guide_core::{
    extract_keywords, extract_slots, Classification, ClassifiedQuery, Intent, IntentClassifier,
    PipelineStage, ProcessingResult, QueryRejection, QueryValidator, RawQuery, ValidationOutcome,
};
use serde::Serialize;
use tracing::{debug, error, warn};

pub const UNDERSTOOD_NOTHING_MESSAGE: &str = "Query could not be understood";
pub const INTERNAL_FAULT_MESSAGE: &str = "Processing error: an internal fault occurred";

pub trait IntentModel: Send + Sync {
    fn model_name(&self) -> &'static str;
    fn classify(&self, text: &str) -> Classification;
    fn priority(&self) -> Vec<Intent>;
}

impl IntentModel for IntentClassifier {
    fn model_name(&self) -> &'static str {
        "rules"
    }

    fn classify(&self, text: &str) -> Classification {
        IntentClassifier::classify(self, text)
    }

    fn priority(&self) -> Vec<Intent> {
        IntentClassifier::priority(self).to_vec()
    }
}

/// Input gate run before classification.
pub trait QueryGate: Send + Sync {
    fn validate(&self, text: &str) -> ValidationOutcome;
    fn min_length(&self) -> usize;
    fn max_length(&self) -> usize;
}

impl QueryGate for QueryValidator {
    fn validate(&self, text: &str) -> ValidationOutcome {
        QueryValidator::validate(self, text)
    }

    fn min_length(&self) -> usize {
        QueryValidator::min_length(self)
    }

    fn max_length(&self) -> usize {
        QueryValidator::max_length(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub model: &'static str,
    pub min_length: usize,
    pub max_length: usize,
    pub tie_break_priority: Vec<Intent>,
}

/// Validator, classifier and slot extractor run in sequence on one query.
#[derive(Debug, Clone)]
pub struct QueryPipeline<M = IntentClassifier, V = QueryValidator> {
    validator: V,
    model: M,
}

impl Default for QueryPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryPipeline {
    pub fn new() -> Self {
        Self {
            validator: QueryValidator::new(),
            model: IntentClassifier::new(),
        }
    }
}

impl<M: IntentModel, V: QueryGate> QueryPipeline<M, V> {
    pub fn with_model(validator: V, model: M) -> Self {
        Self { validator, model }
    }

    pub fn with_validator(mut self, validator: V) -> Self {
        self.validator = validator;
        self
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            model: self.model.model_name(),
            min_length: self.validator.min_length(),
            max_length: self.validator.max_length(),
            tie_break_priority: self.model.priority(),
        }
    }

    pub fn process(&self, raw_text: &str) -> ProcessingResult {
        self.run(raw_text, None)
    }

    pub fn process_query(&self, query: &RawQuery) -> ProcessingResult {
        self.run(&query.text, Some(&query.session_id))
    }

    fn run(&self, raw_text: &str, session_id: Option<&str>) -> ProcessingResult {
        let started = Instant::now();
        let session = session_id.unwrap_or("-");
        let mut stage = PipelineStage::Received;
        let mut sanitized = None;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.drive(raw_text, &mut stage, &mut sanitized, session)
        }));

        match outcome {
            Ok(Ok(classified_query)) => {
                advance(&mut stage, PipelineStage::Complete, session);
                let success = classified_query.is_valid;
                ProcessingResult {
                    classified_query,
                    elapsed_ms: elapsed_ms(started),
                    success,
                    error_message: (!success).then(|| UNDERSTOOD_NOTHING_MESSAGE.to_string()),
                    stage,
                }
            }
            Ok(Err(reason)) => {
                warn!(session_id = %session, reason = %reason, "query rejected");
                ProcessingResult {
                    classified_query: ClassifiedQuery::invalid(raw_text),
                    elapsed_ms: elapsed_ms(started),
                    success: false,
                    error_message: Some(reason.to_string()),
                    stage,
                }
            }
            Err(payload) => {
                error!(
                    session_id = %session,
                    stage = ?stage,
                    panic = %panic_message(payload.as_ref()),
                    "query processing faulted"
                );
                let mut classified_query = ClassifiedQuery::invalid(raw_text);
                classified_query.sanitized_text = sanitized.unwrap_or_default();
                ProcessingResult {
                    classified_query,
                    elapsed_ms: elapsed_ms(started),
                    success: false,
                    error_message: Some(INTERNAL_FAULT_MESSAGE.to_string()),
                    stage: PipelineStage::Faulted,
                }
            }
        }
    }

    fn drive(
        &self,
        raw_text: &str,
        stage: &mut PipelineStage,
        sanitized: &mut Option<String>,
        session: &str,
    ) -> Result<ClassifiedQuery, QueryRejection> {
        advance(stage, PipelineStage::Validating, session);
        let text = match self.validator.validate(raw_text) {
            ValidationOutcome::Accepted { sanitized_text } => sanitized_text,
            ValidationOutcome::Rejected { reason } => {
                advance(stage, PipelineStage::Rejected, session);
                return Err(reason);
            }
        };
        advance(stage, PipelineStage::Validated, session);
        *sanitized = Some(text.clone());

        Ok(self.analyse(raw_text, &text, stage, session))
    }

    fn analyse(
        &self,
        original: &str,
        sanitized: &str,
        stage: &mut PipelineStage,
        session: &str,
    ) -> ClassifiedQuery {
        advance(stage, PipelineStage::Classifying, session);
        let classification = self.model.classify(sanitized);
        let keywords = extract_keywords(sanitized);

        advance(stage, PipelineStage::Slotting, session);
        let slots = extract_slots(sanitized);

        ClassifiedQuery {
            original_text: original.to_string(),
            sanitized_text: sanitized.to_string(),
            intent: classification.intent,
            confidence: classification.confidence,
            keywords,
            time_slot: slots.time,
            location_slot: slots.location,
            is_valid: ClassifiedQuery::is_usable(classification.intent, classification.confidence),
        }
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage, session: &str) {
    debug!(session_id = %session, from = ?*stage, to = ?next, "pipeline stage");
    *stage = next;
}

fn elapsed_ms(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 1000.0).max(f64::MIN_POSITIVE)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
