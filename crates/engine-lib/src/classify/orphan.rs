//! Orphan and unused-resource detection
//!
//! Reclaimability of storage artifacts (detached volumes, aged
//! snapshots) plus the stopped-compute review rule. The three
//! sub-rules are independent and order-insensitive; a resource that
//! matches several accumulates one recommendation per flag.

use crate::ladder::VolumePricing;
use crate::models::{
    Confidence, PowerState, Recommendation, RecommendedAction, ResourceDescriptor, ResourceKind,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// Tag marking a snapshot as never reclaimable
const RETENTION_TAG: &str = "Retention";

/// Tag opting a stopped resource out of review flagging
const AUTO_SHUTDOWN_TAG: &str = "AutoShutdown";

/// Descriptor tag carrying the provisioned size for storage kinds
const SIZE_GB_TAG: &str = "size_gb";

/// Descriptor tag carrying the storage SKU for pricing
const SKU_TAG: &str = "sku";

/// Volume ids referenced by at least one known attachment.
///
/// Built by the enumeration collaborator; the engine never walks the
/// provider's VM list itself.
#[derive(Debug, Clone, Default)]
pub struct AttachmentIndex {
    referenced: HashSet<String>,
}

impl AttachmentIndex {
    pub fn new(referenced: impl IntoIterator<Item = String>) -> Self {
        Self {
            referenced: referenced.into_iter().collect(),
        }
    }

    pub fn is_referenced(&self, volume_id: &str) -> bool {
        self.referenced.contains(volume_id)
    }
}

pub struct OrphanClassifier {
    retention_days: i64,
}

impl OrphanClassifier {
    pub fn new(retention_days: i64) -> Self {
        Self { retention_days }
    }

    /// Evaluate every sub-rule, reporting each flag separately.
    /// `now` is injected so tests are deterministic.
    pub fn classify(
        &self,
        descriptor: &ResourceDescriptor,
        attachments: &AttachmentIndex,
        pricing: &VolumePricing,
        now: DateTime<Utc>,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if let Some(rec) = self.detached_volume(descriptor, attachments, pricing) {
            recommendations.push(rec);
        }
        if let Some(rec) = self.aged_snapshot(descriptor, pricing, now) {
            recommendations.push(rec);
        }
        if let Some(rec) = self.stopped_compute(descriptor) {
            recommendations.push(rec);
        }

        recommendations
    }

    fn detached_volume(
        &self,
        descriptor: &ResourceDescriptor,
        attachments: &AttachmentIndex,
        pricing: &VolumePricing,
    ) -> Option<Recommendation> {
        if descriptor.kind != ResourceKind::Disk {
            return None;
        }
        if descriptor.attachment_state != crate::models::AttachmentState::Detached {
            return None;
        }
        // Cross-check: the state flag alone is not trusted
        if attachments.is_referenced(&descriptor.id) {
            return None;
        }

        let (savings, pricing_note) = storage_savings(descriptor, pricing);
        let mut reason = "unattached volume with no attachment references".to_string();
        if let Some(note) = pricing_note {
            reason.push_str(note);
        }

        Some(Recommendation {
            resource_id: descriptor.id.clone(),
            action: RecommendedAction::Delete,
            reason,
            confidence: Confidence::High,
            estimated_monthly_savings: savings,
            from_size: Some(descriptor.size_class.clone()),
            to_size: None,
        })
    }

    fn aged_snapshot(
        &self,
        descriptor: &ResourceDescriptor,
        pricing: &VolumePricing,
        now: DateTime<Utc>,
    ) -> Option<Recommendation> {
        if descriptor.kind != ResourceKind::Snapshot {
            return None;
        }
        let age = now.signed_duration_since(descriptor.created_at);
        if age <= Duration::days(self.retention_days) {
            return None;
        }
        if descriptor
            .tag(RETENTION_TAG)
            .is_some_and(|v| v.eq_ignore_ascii_case("permanent"))
        {
            return None;
        }

        let (savings, pricing_note) = storage_savings(descriptor, pricing);
        let mut reason = format!(
            "snapshot aged {} days exceeds {}-day retention window",
            age.num_days(),
            self.retention_days
        );
        if let Some(note) = pricing_note {
            reason.push_str(note);
        }

        Some(Recommendation {
            resource_id: descriptor.id.clone(),
            action: RecommendedAction::Delete,
            reason,
            confidence: Confidence::Medium,
            estimated_monthly_savings: savings,
            from_size: None,
            to_size: None,
        })
    }

    /// Compute is never auto-deleted; stopped instances are only
    /// flagged for human or automated review.
    fn stopped_compute(&self, descriptor: &ResourceDescriptor) -> Option<Recommendation> {
        if !descriptor.kind.is_compute() {
            return None;
        }
        if !descriptor.power_state.is_powered_down() {
            return None;
        }
        if descriptor
            .tag(AUTO_SHUTDOWN_TAG)
            .is_some_and(|v| v.eq_ignore_ascii_case("false"))
        {
            return None;
        }

        Some(Recommendation {
            resource_id: descriptor.id.clone(),
            action: RecommendedAction::FlagForReview,
            reason: format!(
                "compute resource in {:?} state; consider deallocating or deleting manually",
                descriptor.power_state
            )
            .to_lowercase(),
            confidence: Confidence::Medium,
            estimated_monthly_savings: 0.0,
            from_size: Some(descriptor.size_class.clone()),
            to_size: None,
        })
    }
}

/// Size-based monthly estimate from descriptor metadata. A missing or
/// unparseable size is a lookup miss: zero savings, annotated reason.
fn storage_savings(
    descriptor: &ResourceDescriptor,
    pricing: &VolumePricing,
) -> (f64, Option<&'static str>) {
    let size_gb = descriptor
        .tag(SIZE_GB_TAG)
        .and_then(|v| v.parse::<f64>().ok());
    match size_gb {
        Some(gb) if gb > 0.0 => {
            let sku = descriptor.tag(SKU_TAG).unwrap_or(&descriptor.size_class);
            (pricing.monthly_cost(sku, gb), None)
        }
        _ => (0.0, Some("; pricing unavailable")),
    }
}
