mod pipeline;

use std::sync::Arc;
use std::time::Duration;

use guide_core::{
    compose_reply, rejection_reply, ClassifiedQuery, GuideReply, Intent, IntentClassifier,
    KnowledgeDoc, PipelineStage, ProcessingResult, RawQuery,
};
use guide_observability::AppMetrics;
use serde::Serialize;
use tracing::{info, instrument};

pub use pipeline::{
    IntentModel, PipelineStats, QueryGate, QueryPipeline, INTERNAL_FAULT_MESSAGE,
    UNDERSTOOD_NOTHING_MESSAGE,
};

/// Turns a classified query into user-facing text.
pub trait ReplyRenderer: Send + Sync {
    fn render(&self, query: &ClassifiedQuery, knowledge: Option<&KnowledgeDoc>) -> GuideReply;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl ReplyRenderer for TemplateRenderer {
    fn render(&self, query: &ClassifiedQuery, knowledge: Option<&KnowledgeDoc>) -> GuideReply {
        compose_reply(query, knowledge)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GuideResponse {
    pub session_id: String,
    pub reply_text: String,
    pub reply: Option<GuideReply>,
    pub result: ProcessingResult,
}

#[derive(Clone)]
pub struct GuideAgent<R = TemplateRenderer, M = IntentClassifier> {
    pipeline: QueryPipeline<M>,
    renderer: R,
    metrics: Arc<AppMetrics>,
}

impl GuideAgent {
    pub fn new(metrics: Arc<AppMetrics>) -> Self {
        Self {
            pipeline: QueryPipeline::new(),
            renderer: TemplateRenderer,
            metrics,
        }
    }
}

impl<R, M> GuideAgent<R, M>
where
    R: ReplyRenderer,
    M: IntentModel,
{
    pub fn with_parts(pipeline: QueryPipeline<M>, renderer: R, metrics: Arc<AppMetrics>) -> Self {
        Self {
            pipeline,
            renderer,
            metrics,
        }
    }

    pub fn pipeline(&self) -> &QueryPipeline<M> {
        &self.pipeline
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    #[instrument(skip(self, query, knowledge), fields(session_id = %query.session_id))]
    pub fn handle(&self, query: &RawQuery, knowledge: Option<&KnowledgeDoc>) -> GuideResponse {
        self.metrics.inc_query();

        let result = self.pipeline.process_query(query);
        self.record_outcome(&result);

        let reply = result
            .success
            .then(|| self.renderer.render(&result.classified_query, knowledge));
        let reply_text = match &reply {
            Some(reply) => reply.reply_text.clone(),
            None => rejection_reply(&result),
        };

        info!(
            session_id = %query.session_id,
            intent = %result.classified_query.intent.as_code(),
            confidence = result.classified_query.confidence,
            time_slot = ?result.classified_query.time_slot,
            location = ?result.classified_query.location_slot,
            success = result.success,
            elapsed_ms = result.elapsed_ms,
            "query handled"
        );

        GuideResponse {
            session_id: query.session_id.clone(),
            reply_text,
            reply,
            result,
        }
    }

    fn record_outcome(&self, result: &ProcessingResult) {
        self.metrics
            .observe_latency(Duration::from_secs_f64(result.elapsed_ms / 1000.0));

        match result.stage {
            PipelineStage::Rejected => self.metrics.inc_rejected(),
            PipelineStage::Faulted => self.metrics.inc_internal_fault(),
            _ if !result.success => self.metrics.inc_low_confidence(),
            _ => {}
        }

        if result.classified_query.intent == Intent::General {
            self.metrics.inc_general_fallback();
        }
    }
}
