//! Observability infrastructure for the decision engine
//!
//! Provides:
//! - Prometheus metrics (analysis latency, recommendation counts, savings totals)
//! - Structured JSON logging with tracing

use crate::models::{Recommendation, Report};
use prometheus::{
    register_gauge, register_histogram, register_int_gauge, register_int_gauge_vec, Gauge,
    Histogram, IntGauge, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::info;

/// Histogram buckets for analysis-run latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct EngineMetricsInner {
    analysis_latency_seconds: Histogram,
    recommendations_by_action: IntGaugeVec,
    estimated_monthly_savings: Gauge,
    resources_evaluated: IntGauge,
    resources_excluded: IntGauge,
    analysis_runs: IntGauge,
    analysis_errors: IntGauge,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            analysis_latency_seconds: register_histogram!(
                "cost_engine_analysis_latency_seconds",
                "Time spent evaluating a full inventory batch",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register analysis_latency_seconds"),

            recommendations_by_action: register_int_gauge_vec!(
                "cost_engine_recommendations",
                "Recommendations in the latest report, by action",
                &["action"]
            )
            .expect("Failed to register recommendations_by_action"),

            estimated_monthly_savings: register_gauge!(
                "cost_engine_estimated_monthly_savings_dollars",
                "Total estimated monthly savings in the latest report"
            )
            .expect("Failed to register estimated_monthly_savings"),

            resources_evaluated: register_int_gauge!(
                "cost_engine_resources_evaluated",
                "Resources evaluated in the latest analysis run"
            )
            .expect("Failed to register resources_evaluated"),

            resources_excluded: register_int_gauge!(
                "cost_engine_resources_excluded",
                "Resources skipped by exclusion policy in the latest run"
            )
            .expect("Failed to register resources_excluded"),

            analysis_runs: register_int_gauge!(
                "cost_engine_analysis_runs_total",
                "Total number of completed analysis runs"
            )
            .expect("Failed to register analysis_runs"),

            analysis_errors: register_int_gauge!(
                "cost_engine_analysis_errors_total",
                "Total number of failed analysis runs"
            )
            .expect("Failed to register analysis_errors"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record the duration of a full analysis run
    pub fn observe_analysis_latency(&self, duration_secs: f64) {
        self.inner().analysis_latency_seconds.observe(duration_secs);
    }

    /// Publish per-action counts and the savings total from a report
    pub fn record_report(&self, report: &Report, resources_evaluated: usize) {
        let inner = self.inner();
        inner.recommendations_by_action.reset();
        for (action, count) in report.action_counts() {
            inner
                .recommendations_by_action
                .with_label_values(&[action.as_str()])
                .set(count as i64);
        }
        inner
            .estimated_monthly_savings
            .set(report.total_estimated_savings);
        inner.resources_evaluated.set(resources_evaluated as i64);
        inner.analysis_runs.inc();
    }

    /// Update the excluded-resources count for the latest run
    pub fn set_resources_excluded(&self, count: usize) {
        self.inner().resources_excluded.set(count as i64);
    }

    /// Increment the failed-run counter
    pub fn inc_analysis_errors(&self) {
        self.inner().analysis_errors.inc();
    }
}

/// Structured logger for engine events
///
/// Provides consistent JSON-formatted logging for recommendations,
/// reports, and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log a single generated recommendation
    pub fn log_recommendation(&self, rec: &Recommendation) {
        info!(
            event = "recommendation_generated",
            instance = %self.instance,
            resource_id = %rec.resource_id,
            action = %rec.action,
            confidence = ?rec.confidence,
            estimated_monthly_savings = rec.estimated_monthly_savings,
            reason = %rec.reason,
            "Generated recommendation"
        );
    }

    /// Log completion of an analysis run
    pub fn log_report(&self, report: &Report, resources_evaluated: usize, duration_secs: f64) {
        info!(
            event = "report_generated",
            instance = %self.instance,
            resources_evaluated = resources_evaluated,
            recommendations = report.recommendations.len(),
            total_estimated_savings = report.total_estimated_savings,
            duration_secs = duration_secs,
            "Analysis run completed"
        );
    }

    /// Log a resource skipped by exclusion policy
    pub fn log_excluded(&self, resource_id: &str) {
        info!(
            event = "resource_excluded",
            instance = %self.instance,
            resource_id = %resource_id,
            "Resource excluded by policy"
        );
    }

    /// Log analyzer startup
    pub fn log_startup(&self, version: &str) {
        info!(
            event = "analyzer_started",
            instance = %self.instance,
            version = %version,
            "Cost analyzer started"
        );
    }

    /// Log analyzer shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "analyzer_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Cost analyzer shutting down"
        );
    }
}
