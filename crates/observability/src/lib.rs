use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    queries_total: AtomicU64,
    rejected_total: AtomicU64,
    low_confidence_total: AtomicU64,
    general_fallback_total: AtomicU64,
    internal_fault_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub queries_total: u64,
    pub rejected_total: u64,
    pub low_confidence_total: u64,
    pub general_fallback_total: u64,
    pub internal_fault_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_query(&self) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("guide_queries_total").increment(1);
    }

    pub fn inc_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("guide_rejected_total").increment(1);
    }

    pub fn inc_low_confidence(&self) {
        self.low_confidence_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("guide_low_confidence_total").increment(1);
    }

    pub fn inc_general_fallback(&self) {
        self.general_fallback_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("guide_general_fallback_total").increment(1);
    }

    pub fn inc_internal_fault(&self) {
        self.internal_fault_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("guide_internal_fault_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        metrics::histogram!("guide_query_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let queries = self.queries_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            queries_total: queries,
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            low_confidence_total: self.low_confidence_total.load(Ordering::Relaxed),
            general_fallback_total: self.general_fallback_total.load(Ordering::Relaxed),
            internal_fault_total: self.internal_fault_total.load(Ordering::Relaxed),
            avg_latency_millis: if queries == 0 {
                0.0
            } else {
                latency as f64 / queries as f64 / 1000.0
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,guide_agents=info,guide_knowledge=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
