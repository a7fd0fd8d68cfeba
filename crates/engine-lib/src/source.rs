//! Collaborator interfaces for inventory and metric retrieval
//!
//! The engine never calls a cloud API. Enumeration, metric fetching,
//! and attachment cross-referencing happen behind these traits; the
//! snapshot implementation backs the analyzer daemon, the CLI, and
//! tests from a single JSON file.

use crate::classify::AttachmentIndex;
use crate::engine::AnalysisInput;
use crate::error::EngineError;
use crate::models::{metrics, ResourceDescriptor, UtilizationSample};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Supplies the resource population and the attachment cross-index
#[async_trait]
pub trait ResourceInventory: Send + Sync {
    async fn list_resources(&self) -> anyhow::Result<Vec<ResourceDescriptor>>;

    /// Volume ids referenced by known attachments, built by the
    /// collaborator from its own VM enumeration
    async fn attachment_index(&self) -> anyhow::Result<AttachmentIndex>;
}

/// Supplies utilization samples; an empty result is legitimate
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch_samples(
        &self,
        resource_id: &str,
        metric: &str,
        window_hours: u64,
    ) -> anyhow::Result<Vec<UtilizationSample>>;
}

/// Serialized inventory state consumed from disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub resources: Vec<ResourceDescriptor>,
    /// Samples keyed by resource id, mixed metrics per series
    #[serde(default)]
    pub samples: HashMap<String, Vec<UtilizationSample>>,
    /// Volume ids referenced by at least one attachment
    #[serde(default)]
    pub attached_volumes: Vec<String>,
}

/// File-backed implementation of both collaborator traits
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: InventorySnapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Snapshot(format!("failed to read {}: {e}", path.display()))
        })?;
        let snapshot: InventorySnapshot = serde_json::from_str(&content).map_err(|e| {
            EngineError::Snapshot(format!("failed to parse {}: {e}", path.display()))
        })?;
        Ok(Self::new(snapshot))
    }

    /// Assemble full analysis inputs (CPU + memory series per resource)
    pub async fn load_inputs(&self, window_hours: u64) -> anyhow::Result<Vec<AnalysisInput>> {
        let mut inputs = Vec::new();
        for descriptor in self.list_resources().await? {
            let mut samples = self
                .fetch_samples(&descriptor.id, metrics::CPU_PERCENT, window_hours)
                .await?;
            samples.extend(
                self.fetch_samples(&descriptor.id, metrics::MEMORY_PERCENT, window_hours)
                    .await?,
            );
            inputs.push(AnalysisInput {
                descriptor,
                samples,
            });
        }
        Ok(inputs)
    }
}

#[async_trait]
impl ResourceInventory for SnapshotSource {
    async fn list_resources(&self) -> anyhow::Result<Vec<ResourceDescriptor>> {
        Ok(self.snapshot.resources.clone())
    }

    async fn attachment_index(&self) -> anyhow::Result<AttachmentIndex> {
        Ok(AttachmentIndex::new(
            self.snapshot.attached_volumes.iter().cloned(),
        ))
    }
}

#[async_trait]
impl MetricSource for SnapshotSource {
    /// Windowing is anchored to the newest sample in the series so
    /// that recorded snapshots stay analyzable regardless of when the
    /// analysis runs
    async fn fetch_samples(
        &self,
        resource_id: &str,
        metric: &str,
        window_hours: u64,
    ) -> anyhow::Result<Vec<UtilizationSample>> {
        let Some(series) = self.snapshot.samples.get(resource_id) else {
            return Ok(Vec::new());
        };
        let filtered: Vec<UtilizationSample> = series
            .iter()
            .filter(|s| s.metric == metric)
            .cloned()
            .collect();
        let Some(latest) = filtered.iter().map(|s| s.timestamp).max() else {
            return Ok(Vec::new());
        };
        let cutoff = latest - (window_hours as i64) * 3600;
        Ok(filtered
            .into_iter()
            .filter(|s| s.timestamp >= cutoff)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentState, PowerState, ResourceKind};
    use std::io::Write;

    fn snapshot_json() -> String {
        serde_json::json!({
            "resources": [{
                "id": "i-1",
                "provider": "aws",
                "kind": "compute-instance",
                "size_class": "t3.medium",
                "tags": {"Environment": "dev"},
                "created_at": "2026-01-01T00:00:00Z",
                "attachment_state": "unknown",
                "power_state": "running"
            }],
            "samples": {
                "i-1": [
                    {"timestamp": 1700000000, "metric": "cpu_percent", "value": 3.0},
                    {"timestamp": 1700003600, "metric": "cpu_percent", "value": 4.0},
                    {"timestamp": 1700003600, "metric": "memory_percent", "value": 40.0}
                ]
            },
            "attached_volumes": ["vol-9"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(snapshot_json().as_bytes()).unwrap();
        let source = SnapshotSource::from_path(file.path()).unwrap();

        let resources = source.list_resources().await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].kind, ResourceKind::ComputeInstance);
        assert_eq!(resources[0].power_state, PowerState::Running);
        assert_eq!(resources[0].attachment_state, AttachmentState::Unknown);

        let index = source.attachment_index().await.unwrap();
        assert!(index.is_referenced("vol-9"));
        assert!(!index.is_referenced("vol-1"));
    }

    #[tokio::test]
    async fn test_fetch_filters_by_metric() {
        let source = SnapshotSource::new(serde_json::from_str(&snapshot_json()).unwrap());
        let cpu = source.fetch_samples("i-1", "cpu_percent", 168).await.unwrap();
        assert_eq!(cpu.len(), 2);
        let mem = source
            .fetch_samples("i-1", "memory_percent", 168)
            .await
            .unwrap();
        assert_eq!(mem.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_unknown_resource_is_empty_not_error() {
        let source = SnapshotSource::new(serde_json::from_str(&snapshot_json()).unwrap());
        let samples = source
            .fetch_samples("i-missing", "cpu_percent", 168)
            .await
            .unwrap();
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_window_anchored_to_newest_sample() {
        let source = SnapshotSource::new(serde_json::from_str(&snapshot_json()).unwrap());
        // 0-hour window keeps only samples at the newest timestamp
        let cpu = source.fetch_samples("i-1", "cpu_percent", 0).await.unwrap();
        assert_eq!(cpu.len(), 1);
        assert_eq!(cpu[0].timestamp, 1700003600);
    }

    #[tokio::test]
    async fn test_load_inputs_merges_metrics() {
        let source = SnapshotSource::new(serde_json::from_str(&snapshot_json()).unwrap());
        let inputs = source.load_inputs(168).await.unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].samples.len(), 3);
    }

    #[test]
    fn test_malformed_snapshot_is_a_snapshot_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        let err = SnapshotSource::from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
