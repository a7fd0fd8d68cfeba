//! Right-sizing classification
//!
//! Decides scale-up / scale-down / optimal from a CPU profile and the
//! size ladder. Rules are evaluated in fixed priority so a resource
//! can never trigger both directions in one pass; memory data only
//! corroborates, it never changes the primary action.

use super::HOURS_PER_MONTH;
use crate::config::Thresholds;
use crate::ladder::SizeLadder;
use crate::models::{Confidence, Recommendation, RecommendedAction, ResourceDescriptor};
use crate::profile::UtilizationProfile;

pub struct RightSizingClassifier {
    thresholds: Thresholds,
}

impl RightSizingClassifier {
    /// Thresholds are assumed validated by the engine constructor
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Classify one compute resource against its current tier.
    ///
    /// Priority: upsize (mean above cpu_high OR max above the hard
    /// ceiling) wins over downsize (mean below cpu_low with a smaller
    /// tier available); anything else is optimal. A pricing lookup
    /// miss degrades savings and confidence but never aborts.
    pub fn classify(
        &self,
        descriptor: &ResourceDescriptor,
        cpu: &UtilizationProfile,
        memory: Option<&UtilizationProfile>,
        ladder: &SizeLadder,
    ) -> Recommendation {
        if !cpu.has_data() {
            return Recommendation::insufficient_data(&descriptor.id);
        }

        let mean = cpu.mean.unwrap_or(0.0);
        let max = cpu.max.unwrap_or(0.0);
        let family = SizeLadder::family_of(&descriptor.size_class);
        let size_class = descriptor.size_class.as_str();

        let mut rec = if mean > self.thresholds.cpu_high || max > self.thresholds.cpu_ceiling {
            self.upsize(descriptor, mean, max, family, ladder)
        } else if mean < self.thresholds.cpu_low {
            self.downsize(descriptor, mean, family, size_class, ladder)
        } else {
            Recommendation {
                resource_id: descriptor.id.clone(),
                action: RecommendedAction::None,
                reason: format!(
                    "optimal: CPU within thresholds (mean {mean:.1}%, max {max:.1}%)"
                ),
                confidence: Confidence::Low,
                estimated_monthly_savings: 0.0,
                from_size: Some(size_class.to_string()),
                to_size: None,
            }
        };

        if let Some(memory) = memory {
            self.corroborate_with_memory(&mut rec, memory);
        }
        rec
    }

    fn upsize(
        &self,
        descriptor: &ResourceDescriptor,
        mean: f64,
        max: f64,
        family: &str,
        ladder: &SizeLadder,
    ) -> Recommendation {
        let reason = format!("high CPU utilization (mean {mean:.1}%, max {max:.1}%) - scale up");
        match ladder.next_larger(family, &descriptor.size_class) {
            Some(target) => Recommendation {
                resource_id: descriptor.id.clone(),
                action: RecommendedAction::Upsize,
                reason,
                confidence: Confidence::High,
                // Performance trade-off, not cost: recorded as exactly zero
                estimated_monthly_savings: 0.0,
                from_size: Some(descriptor.size_class.clone()),
                to_size: Some(target.name.clone()),
            },
            None if ladder.tier(family, &descriptor.size_class).is_some() => Recommendation {
                resource_id: descriptor.id.clone(),
                action: RecommendedAction::FlagForReview,
                reason: format!("{reason}; already at largest tier"),
                confidence: Confidence::High,
                estimated_monthly_savings: 0.0,
                from_size: Some(descriptor.size_class.clone()),
                to_size: None,
            },
            None => Recommendation {
                resource_id: descriptor.id.clone(),
                action: RecommendedAction::FlagForReview,
                reason: format!("{reason}; pricing unavailable"),
                confidence: Confidence::Low,
                estimated_monthly_savings: 0.0,
                from_size: Some(descriptor.size_class.clone()),
                to_size: None,
            },
        }
    }

    fn downsize(
        &self,
        descriptor: &ResourceDescriptor,
        mean: f64,
        family: &str,
        size_class: &str,
        ladder: &SizeLadder,
    ) -> Recommendation {
        let reason = format!("low CPU utilization (mean {mean:.1}%) - scale down");

        if ladder.tier(family, size_class).is_none() {
            return Recommendation {
                resource_id: descriptor.id.clone(),
                action: RecommendedAction::None,
                reason: format!("{reason}; pricing unavailable"),
                confidence: Confidence::Low,
                estimated_monthly_savings: 0.0,
                from_size: Some(size_class.to_string()),
                to_size: None,
            };
        }

        match ladder.next_smaller(family, size_class) {
            Some(target) => {
                let current_rate = ladder.hourly_rate(family, size_class).unwrap_or(0.0);
                // Pricing inconsistency must never produce negative savings
                let savings =
                    ((current_rate - target.hourly_rate) * HOURS_PER_MONTH).max(0.0);
                Recommendation {
                    resource_id: descriptor.id.clone(),
                    action: RecommendedAction::Downsize,
                    reason,
                    confidence: Confidence::Medium,
                    estimated_monthly_savings: savings,
                    from_size: Some(size_class.to_string()),
                    to_size: Some(target.name.clone()),
                }
            }
            None => Recommendation {
                resource_id: descriptor.id.clone(),
                action: RecommendedAction::None,
                reason: format!("{reason}; already at smallest tier"),
                confidence: Confidence::Low,
                estimated_monthly_savings: 0.0,
                from_size: Some(size_class.to_string()),
                to_size: None,
            },
        }
    }

    /// Memory evidence appends to the reason and can upgrade a medium
    /// decision to high when it points the same way. It never
    /// downgrades or redirects a decision already made from CPU.
    fn corroborate_with_memory(&self, rec: &mut Recommendation, memory: &UtilizationProfile) {
        let Some(mem_mean) = memory.mean else {
            return;
        };

        if mem_mean > self.thresholds.memory_high {
            rec.reason
                .push_str(&format!(", high memory utilization ({mem_mean:.1}%)"));
            if rec.action == RecommendedAction::Upsize && rec.confidence == Confidence::Medium {
                rec.confidence = Confidence::High;
            }
        } else if mem_mean < self.thresholds.memory_low {
            rec.reason
                .push_str(&format!(", low memory utilization ({mem_mean:.1}%)"));
            if rec.action == RecommendedAction::Downsize && rec.confidence == Confidence::Medium {
                rec.confidence = Confidence::High;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{metrics, AttachmentState, PowerState, ResourceKind};
    use std::collections::HashMap;

    fn classifier() -> RightSizingClassifier {
        RightSizingClassifier::new(Thresholds::default())
    }

    fn descriptor(size_class: &str) -> ResourceDescriptor {
        ResourceDescriptor {
            id: "i-size".to_string(),
            provider: "aws".to_string(),
            kind: ResourceKind::ComputeInstance,
            size_class: size_class.to_string(),
            tags: HashMap::new(),
            created_at: chrono::Utc::now(),
            attachment_state: AttachmentState::Unknown,
            power_state: PowerState::Running,
        }
    }

    fn cpu(mean: f64, max: f64, count: usize) -> UtilizationProfile {
        UtilizationProfile {
            metric: metrics::CPU_PERCENT.to_string(),
            mean: Some(mean),
            max: Some(max),
            sample_count: count,
            low_fraction: Some(0.0),
        }
    }

    fn mem(mean: f64) -> UtilizationProfile {
        UtilizationProfile {
            metric: metrics::MEMORY_PERCENT.to_string(),
            mean: Some(mean),
            max: Some(mean),
            sample_count: 100,
            low_fraction: Some(0.0),
        }
    }

    #[test]
    fn test_upsize_on_high_mean() {
        // Sustained high mean on a t3.medium
        let rec = classifier().classify(
            &descriptor("t3.medium"),
            &cpu(85.0, 92.0, 100),
            None,
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::Upsize);
        assert_eq!(rec.to_size.as_deref(), Some("t3.large"));
        assert_eq!(rec.confidence, Confidence::High);
        assert_eq!(rec.estimated_monthly_savings, 0.0);
    }

    #[test]
    fn test_max_alone_triggers_upsize() {
        // Spike above the ceiling upsizes even with a modest mean
        let rec = classifier().classify(
            &descriptor("t3.medium"),
            &cpu(40.0, 95.0, 100),
            None,
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::Upsize);
    }

    #[test]
    fn test_upsize_at_top_flags_for_review() {
        let rec = classifier().classify(
            &descriptor("t3.2xlarge"),
            &cpu(90.0, 95.0, 100),
            None,
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::FlagForReview);
        assert!(rec.reason.contains("already at largest tier"));
        assert_eq!(rec.confidence, Confidence::High);
    }

    #[test]
    fn test_downsize_savings() {
        // Underutilized t3.medium steps down to t3.small
        let rec = classifier().classify(
            &descriptor("t3.medium"),
            &cpu(4.0, 8.0, 100),
            None,
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::Downsize);
        assert_eq!(rec.to_size.as_deref(), Some("t3.small"));
        assert_eq!(rec.confidence, Confidence::Medium);
        let expected = (0.0416 - 0.0208) * 24.0 * 30.0;
        assert!((rec.estimated_monthly_savings - expected).abs() < 0.01);
    }

    #[test]
    fn test_downsize_savings_floored_at_zero() {
        // Inconsistent pricing: smaller tier costs more
        let mut ladder = SizeLadder::new();
        ladder.insert(crate::ladder::SizeTier {
            family: "x".to_string(),
            name: "x.small".to_string(),
            hourly_rate: 0.9,
            rank: 0,
        });
        ladder.insert(crate::ladder::SizeTier {
            family: "x".to_string(),
            name: "x.large".to_string(),
            hourly_rate: 0.1,
            rank: 1,
        });
        let rec = classifier().classify(&descriptor("x.large"), &cpu(4.0, 8.0, 100), None, &ladder);
        assert_eq!(rec.action, RecommendedAction::Downsize);
        assert_eq!(rec.estimated_monthly_savings, 0.0);
    }

    #[test]
    fn test_between_thresholds_is_optimal() {
        let rec = classifier().classify(
            &descriptor("t3.medium"),
            &cpu(45.0, 70.0, 100),
            None,
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::None);
        assert_eq!(rec.confidence, Confidence::Low);
        assert_eq!(rec.estimated_monthly_savings, 0.0);
    }

    #[test]
    fn test_downsize_at_bottom_is_none() {
        let rec = classifier().classify(
            &descriptor("t3.nano"),
            &cpu(2.0, 4.0, 100),
            None,
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::None);
        assert!(rec.reason.contains("already at smallest tier"));
    }

    #[test]
    fn test_unknown_tier_annotates_pricing_unavailable() {
        let rec = classifier().classify(
            &descriptor("c6g.medium"),
            &cpu(4.0, 8.0, 100),
            None,
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::None);
        assert_eq!(rec.confidence, Confidence::Low);
        assert!(rec.reason.contains("pricing unavailable"));
    }

    #[test]
    fn test_no_data_flags_for_review() {
        let rec = classifier().classify(
            &descriptor("t3.medium"),
            &UtilizationProfile::no_data(metrics::CPU_PERCENT),
            None,
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::FlagForReview);
        assert_eq!(rec.reason, "insufficient data");
    }

    #[test]
    fn test_memory_upgrades_downsize_confidence() {
        let rec = classifier().classify(
            &descriptor("t3.medium"),
            &cpu(4.0, 8.0, 100),
            Some(&mem(5.0)),
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::Downsize);
        assert_eq!(rec.confidence, Confidence::High);
        assert!(rec.reason.contains("low memory utilization"));
    }

    #[test]
    fn test_memory_never_changes_primary_action() {
        // High memory on a low-CPU resource: still a downsize, with
        // the memory evidence visible in the reason only
        let rec = classifier().classify(
            &descriptor("t3.medium"),
            &cpu(4.0, 8.0, 100),
            Some(&mem(95.0)),
            &SizeLadder::aws_default(),
        );
        assert_eq!(rec.action, RecommendedAction::Downsize);
        assert_eq!(rec.confidence, Confidence::Medium);
        assert!(rec.reason.contains("high memory utilization"));
    }
}
