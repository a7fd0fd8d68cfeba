//! Periodic analysis loop
//!
//! Each tick loads the inventory snapshot, runs a batch evaluation
//! under the configured deadline, publishes the report to the sinks,
//! and updates health and metrics. A failed run degrades health but
//! never stops the loop.

use crate::api::AppState;
use crate::config::AnalyzerConfig;
use anyhow::Result;
use engine_lib::{
    health::components,
    models::Report,
    notify::ReportSink,
    observability::StructuredLogger,
    DecisionEngine, SnapshotSource,
};
use engine_lib::source::ResourceInventory;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

pub struct Runner {
    config: AnalyzerConfig,
    engine: Arc<DecisionEngine>,
    state: Arc<AppState>,
    logger: StructuredLogger,
    sinks: Vec<Box<dyn ReportSink>>,
}

impl Runner {
    pub fn new(
        config: AnalyzerConfig,
        state: Arc<AppState>,
        logger: StructuredLogger,
        sinks: Vec<Box<dyn ReportSink>>,
    ) -> Result<Self> {
        let engine = Arc::new(DecisionEngine::with_defaults(config.engine_config()?)?);
        Ok(Self {
            config,
            engine,
            state,
            logger,
            sinks,
        })
    }

    /// Run analysis on an interval until shutdown is signalled.
    /// The first run happens immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.analysis_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = self.run_once().await {
                        error!(error = %err, "analysis run failed");
                        self.state.metrics.inc_analysis_errors();
                        self.state
                            .health_registry
                            .set_unhealthy(components::ENGINE, err.to_string())
                            .await;
                    }
                }
                _ = shutdown.changed() => {
                    info!("analysis loop stopping");
                    break;
                }
            }
        }
    }

    /// One complete analysis pass over the snapshot
    pub async fn run_once(&self) -> Result<Report> {
        let started = std::time::Instant::now();

        let source = match SnapshotSource::from_path(&self.config.snapshot_path) {
            Ok(source) => {
                self.state
                    .health_registry
                    .set_healthy(components::INVENTORY)
                    .await;
                source
            }
            Err(err) => {
                self.state
                    .health_registry
                    .set_unhealthy(components::INVENTORY, err.to_string())
                    .await;
                return Err(err.into());
            }
        };

        let inputs = source.load_inputs(self.config.idle_window_hours).await?;
        let attachments = source.attachment_index().await?;
        let resources_evaluated = inputs.len();

        let deadline = Duration::from_secs(self.config.analysis_deadline_secs);
        let report = Arc::clone(&self.engine)
            .evaluate_batch(inputs, attachments, Some(deadline))
            .await;

        let duration = started.elapsed().as_secs_f64();
        self.state.metrics.observe_analysis_latency(duration);
        self.state.metrics.record_report(&report, resources_evaluated);
        self.state
            .health_registry
            .set_healthy(components::ENGINE)
            .await;

        for rec in &report.recommendations {
            self.logger.log_recommendation(rec);
        }
        self.logger
            .log_report(&report, resources_evaluated, duration);

        self.publish(&report).await;

        self.state
            .health_registry
            .mark_run_complete(resources_evaluated, report.recommendations.len())
            .await;
        self.state.set_report(report.clone()).await;

        Ok(report)
    }

    /// Fan out to all sinks; a failing sink degrades health only
    async fn publish(&self, report: &Report) {
        let mut failed = Vec::new();
        for sink in &self.sinks {
            if let Err(err) = sink.publish(report).await {
                error!(sink = sink.name(), error = %err, "report publication failed");
                failed.push(sink.name());
            }
        }
        if failed.is_empty() {
            self.state
                .health_registry
                .set_healthy(components::NOTIFIER)
                .await;
        } else {
            self.state
                .health_registry
                .set_degraded(components::NOTIFIER, format!("failed sinks: {failed:?}"))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_lib::notify::JsonFileSink;
    use engine_lib::{EngineMetrics, HealthRegistry};
    use std::io::Write;

    fn snapshot_json() -> String {
        serde_json::json!({
            "resources": [
                {
                    "id": "i-idle",
                    "provider": "aws",
                    "kind": "compute-instance",
                    "size_class": "t3.medium",
                    "tags": {"Environment": "dev"},
                    "created_at": "2026-01-01T00:00:00Z",
                    "power_state": "running"
                },
                {
                    "id": "vol-orphan",
                    "provider": "aws",
                    "kind": "disk",
                    "size_class": "gp3",
                    "tags": {"size_gb": "100"},
                    "created_at": "2026-01-01T00:00:00Z",
                    "attachment_state": "detached"
                }
            ],
            "samples": {
                "i-idle": (0..24).map(|i| serde_json::json!({
                    "timestamp": 1_700_000_000 + i * 3600,
                    "metric": "cpu_percent",
                    "value": 2.0
                })).collect::<Vec<_>>()
            }
        })
        .to_string()
    }

    fn runner(snapshot_path: &str, report_path: &str) -> (Runner, Arc<AppState>) {
        let config = AnalyzerConfig {
            snapshot_path: snapshot_path.to_string(),
            report_path: report_path.to_string(),
            ..Default::default()
        };
        let state = Arc::new(AppState::new(HealthRegistry::new(), EngineMetrics::new()));
        let sinks: Vec<Box<dyn ReportSink>> =
            vec![Box::new(JsonFileSink::new(report_path))];
        let runner =
            Runner::new(config, Arc::clone(&state), StructuredLogger::new("test"), sinks)
                .unwrap();
        (runner, state)
    }

    #[tokio::test]
    async fn test_run_once_produces_report_and_flips_readiness() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot.json");
        let report_path = dir.path().join("report.json");
        std::fs::File::create(&snapshot_path)
            .unwrap()
            .write_all(snapshot_json().as_bytes())
            .unwrap();

        let (runner, state) = runner(
            snapshot_path.to_str().unwrap(),
            report_path.to_str().unwrap(),
        );
        let report = runner.run_once().await.unwrap();

        // Idle instance and orphaned volume both show up
        let ids: Vec<_> = report
            .recommendations
            .iter()
            .map(|r| r.resource_id.as_str())
            .collect();
        assert!(ids.contains(&"i-idle"));
        assert!(ids.contains(&"vol-orphan"));

        assert!(state.health_registry.readiness().await.ready);
        assert!(state.latest_report.read().await.is_some());
        assert!(report_path.exists());
    }

    #[tokio::test]
    async fn test_missing_snapshot_marks_inventory_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.json");
        let (runner, state) = runner("/nonexistent/snapshot.json", report_path.to_str().unwrap());

        assert!(runner.run_once().await.is_err());
        let health = state.health_registry.health().await;
        assert_eq!(
            health.components[components::INVENTORY].status,
            engine_lib::ComponentStatus::Unhealthy
        );
        assert!(!state.health_registry.readiness().await.ready);
    }
}
