//! Core data models for the optimization engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category of cloud resource under analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    ComputeInstance,
    ScaleSet,
    Disk,
    Snapshot,
}

impl ResourceKind {
    /// Compute kinds receive idle and right-sizing evaluation
    pub fn is_compute(&self) -> bool {
        matches!(self, ResourceKind::ComputeInstance | ResourceKind::ScaleSet)
    }

    /// Storage kinds receive orphan evaluation
    pub fn is_storage(&self) -> bool {
        matches!(self, ResourceKind::Disk | ResourceKind::Snapshot)
    }
}

/// Attachment state for storage kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentState {
    Attached,
    Detached,
    Unknown,
}

/// Power state reported by the provider at snapshot time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    Running,
    Stopped,
    Deallocated,
    Unknown,
}

impl PowerState {
    pub fn is_powered_down(&self) -> bool {
        matches!(self, PowerState::Stopped | PowerState::Deallocated)
    }
}

/// Immutable snapshot of one resource's state at analysis time.
///
/// Owned by the enumeration collaborator; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub id: String,
    pub provider: String,
    pub kind: ResourceKind,
    /// Current size tier name (e.g. "t3.medium", "Standard_B2s")
    pub size_class: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_attachment_state")]
    pub attachment_state: AttachmentState,
    #[serde(default = "default_power_state")]
    pub power_state: PowerState,
}

fn default_attachment_state() -> AttachmentState {
    AttachmentState::Unknown
}

fn default_power_state() -> PowerState {
    PowerState::Unknown
}

impl ResourceDescriptor {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// One utilization measurement for one metric of one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationSample {
    pub timestamp: i64,
    pub metric: String,
    pub value: f64,
}

/// Metric names the engine understands. Values for a metric share one
/// unit; the engine never mixes units across metrics.
pub mod metrics {
    pub const CPU_PERCENT: &str = "cpu_percent";
    pub const MEMORY_PERCENT: &str = "memory_percent";
}

/// Action recommended for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendedAction {
    None,
    Shutdown,
    Downsize,
    Upsize,
    Delete,
    FlagForReview,
}

impl RecommendedAction {
    /// Whether applying the recommendation mutates cloud state.
    /// Only mutating entries count toward report savings totals.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            RecommendedAction::Shutdown
                | RecommendedAction::Downsize
                | RecommendedAction::Upsize
                | RecommendedAction::Delete
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::None => "none",
            RecommendedAction::Shutdown => "shutdown",
            RecommendedAction::Downsize => "downsize",
            RecommendedAction::Upsize => "upsize",
            RecommendedAction::Delete => "delete",
            RecommendedAction::FlagForReview => "flag-for-review",
        }
    }
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative certainty label, derived from corroborating signal
/// count rather than a statistical probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// One classified, savings-quantified action for one resource.
///
/// Produced once per resource per analysis pass and never mutated; a
/// new pass produces a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub resource_id: String,
    pub action: RecommendedAction,
    pub reason: String,
    pub confidence: Confidence,
    pub estimated_monthly_savings: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_size: Option<String>,
}

impl Recommendation {
    /// Informational entry for a resource the engine could not profile
    pub fn insufficient_data(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            action: RecommendedAction::FlagForReview,
            reason: "insufficient data".to_string(),
            confidence: Confidence::Low,
            estimated_monthly_savings: 0.0,
            from_size: None,
            to_size: None,
        }
    }
}

/// Batch analysis output handed to notification collaborators.
///
/// Constructed fresh each run and discarded afterwards; the engine
/// keeps no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub recommendations: Vec<Recommendation>,
    pub total_estimated_savings: f64,
}

impl Report {
    /// Assemble a report, summing savings over mutating entries only
    pub fn new(recommendations: Vec<Recommendation>) -> Self {
        let total_estimated_savings = recommendations
            .iter()
            .filter(|r| r.action.is_mutating())
            .map(|r| r.estimated_monthly_savings)
            .sum();
        Self {
            generated_at: Utc::now(),
            recommendations,
            total_estimated_savings,
        }
    }

    /// Read-only aggregate for the metrics exporter
    pub fn action_counts(&self) -> HashMap<RecommendedAction, usize> {
        let mut counts = HashMap::new();
        for rec in &self.recommendations {
            *counts.entry(rec.action).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(action: RecommendedAction, savings: f64) -> Recommendation {
        Recommendation {
            resource_id: "i-123".to_string(),
            action,
            reason: "test".to_string(),
            confidence: Confidence::Medium,
            estimated_monthly_savings: savings,
            from_size: None,
            to_size: None,
        }
    }

    #[test]
    fn test_savings_total_ignores_non_mutating_entries() {
        let report = Report::new(vec![
            rec(RecommendedAction::Downsize, 14.98),
            rec(RecommendedAction::Shutdown, 30.0),
            rec(RecommendedAction::FlagForReview, 99.0),
            rec(RecommendedAction::None, 50.0),
        ]);
        assert!((report.total_estimated_savings - 44.98).abs() < 1e-9);
    }

    #[test]
    fn test_action_counts() {
        let report = Report::new(vec![
            rec(RecommendedAction::Delete, 8.0),
            rec(RecommendedAction::Delete, 4.0),
            rec(RecommendedAction::Upsize, 0.0),
        ]);
        let counts = report.action_counts();
        assert_eq!(counts[&RecommendedAction::Delete], 2);
        assert_eq!(counts[&RecommendedAction::Upsize], 1);
        assert!(!counts.contains_key(&RecommendedAction::None));
    }

    #[test]
    fn test_compute_and_storage_kinds() {
        assert!(ResourceKind::ComputeInstance.is_compute());
        assert!(ResourceKind::ScaleSet.is_compute());
        assert!(ResourceKind::Disk.is_storage());
        assert!(ResourceKind::Snapshot.is_storage());
        assert!(!ResourceKind::Disk.is_compute());
    }

    #[test]
    fn test_kind_serde_kebab_case() {
        let json = serde_json::to_string(&ResourceKind::ComputeInstance).unwrap();
        assert_eq!(json, "\"compute-instance\"");
        let back: ResourceKind = serde_json::from_str("\"scale-set\"").unwrap();
        assert_eq!(back, ResourceKind::ScaleSet);
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }
}
