//! Idle detection
//!
//! A resource is idle when most of its samples sit below the low-CPU
//! threshold, or when no samples exist at all. The no-data rule is
//! deliberate: a resource with no monitoring agent reporting is
//! indistinguishable from one that is powered down or abandoned, so it
//! is flagged for review rather than silently skipped.

use super::HOURS_PER_MONTH;
use crate::config::Thresholds;
use crate::models::{Confidence, Recommendation, RecommendedAction, ResourceDescriptor};
use crate::profile::UtilizationProfile;

pub struct IdleClassifier {
    low_cpu_threshold: f64,
    idle_fraction: f64,
}

impl IdleClassifier {
    pub fn new(low_cpu_threshold: f64, idle_fraction: f64) -> Self {
        Self {
            low_cpu_threshold,
            idle_fraction,
        }
    }

    pub fn from_thresholds(thresholds: &Thresholds) -> Self {
        Self::new(thresholds.low_cpu_threshold, thresholds.idle_fraction)
    }

    /// Dormancy decision over the full requested window.
    ///
    /// The zero-sample branch must come first: with no samples there is
    /// no denominator for the fraction check, and "no activity
    /// recorded" is conservatively idle.
    pub fn is_idle(&self, profile: &UtilizationProfile) -> bool {
        if profile.sample_count == 0 {
            return true;
        }
        match profile.low_fraction {
            Some(fraction) => fraction > self.idle_fraction,
            None => false,
        }
    }

    /// Shutdown candidate for an idle running compute resource.
    ///
    /// Requires a data-backed profile: the no-data case is idle but
    /// carries no evidence for an automated shutdown, so the
    /// orchestrator resolves it to a review flag instead. Savings
    /// assume the instance would otherwise run the full month at its
    /// current rate; a pricing miss yields zero savings with an
    /// annotated reason, never a failure.
    pub fn classify(
        &self,
        descriptor: &ResourceDescriptor,
        profile: &UtilizationProfile,
        hourly_rate: Option<f64>,
    ) -> Option<Recommendation> {
        if !profile.has_data() || !self.is_idle(profile) {
            return None;
        }

        let reason = format!(
            "idle: {:.0}% of samples below {:.1}% CPU over the analysis window",
            profile.low_fraction.unwrap_or(0.0) * 100.0,
            self.low_cpu_threshold
        );
        let confidence = Confidence::Medium;

        let (savings, reason) = match hourly_rate {
            Some(rate) => (rate * HOURS_PER_MONTH, reason),
            None => (0.0, format!("{reason}; pricing unavailable")),
        };

        Some(Recommendation {
            resource_id: descriptor.id.clone(),
            action: RecommendedAction::Shutdown,
            reason,
            confidence,
            estimated_monthly_savings: savings,
            from_size: Some(descriptor.size_class.clone()),
            to_size: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentState, PowerState, ResourceKind};
    use std::collections::HashMap;

    fn classifier() -> IdleClassifier {
        IdleClassifier::new(5.0, 0.8)
    }

    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor {
            id: "i-idle".to_string(),
            provider: "aws".to_string(),
            kind: ResourceKind::ComputeInstance,
            size_class: "t3.medium".to_string(),
            tags: HashMap::new(),
            created_at: chrono::Utc::now(),
            attachment_state: AttachmentState::Unknown,
            power_state: PowerState::Running,
        }
    }

    fn profile(mean: f64, count: usize, low_fraction: f64) -> UtilizationProfile {
        UtilizationProfile {
            metric: "cpu_percent".to_string(),
            mean: Some(mean),
            max: Some(mean),
            sample_count: count,
            low_fraction: Some(low_fraction),
        }
    }

    #[test]
    fn test_no_data_is_idle_regardless_of_thresholds() {
        let empty = UtilizationProfile::no_data("cpu_percent");
        assert!(classifier().is_idle(&empty));
        assert!(IdleClassifier::new(0.0, 1.0).is_idle(&empty));
        assert!(IdleClassifier::new(100.0, 0.0).is_idle(&empty));
    }

    #[test]
    fn test_mostly_low_samples_are_idle() {
        // 95% of samples below threshold, well past the cutoff
        assert!(classifier().is_idle(&profile(3.0, 100, 0.95)));
    }

    #[test]
    fn test_active_resource_not_idle() {
        assert!(!classifier().is_idle(&profile(45.0, 100, 0.1)));
    }

    #[test]
    fn test_fraction_at_boundary_not_idle() {
        // Strict inequality: exactly idle_fraction is not idle
        assert!(!classifier().is_idle(&profile(3.0, 100, 0.8)));
    }

    #[test]
    fn test_shutdown_savings_use_hourly_rate() {
        let rec = classifier()
            .classify(&descriptor(), &profile(3.0, 100, 0.95), Some(0.0416))
            .unwrap();
        assert_eq!(rec.action, RecommendedAction::Shutdown);
        assert_eq!(rec.confidence, Confidence::Medium);
        assert!((rec.estimated_monthly_savings - 0.0416 * 720.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_data_yields_no_shutdown_candidate() {
        // Idle, but without evidence: the orchestrator turns this
        // into a review flag rather than an automated shutdown
        let rec = classifier().classify(
            &descriptor(),
            &UtilizationProfile::no_data("cpu_percent"),
            Some(0.0416),
        );
        assert!(rec.is_none());
    }

    #[test]
    fn test_pricing_miss_yields_zero_savings() {
        let rec = classifier()
            .classify(&descriptor(), &profile(3.0, 100, 0.95), None)
            .unwrap();
        assert_eq!(rec.estimated_monthly_savings, 0.0);
        assert!(rec.reason.contains("pricing unavailable"));
    }

    #[test]
    fn test_busy_resource_yields_no_recommendation() {
        assert!(classifier()
            .classify(&descriptor(), &profile(60.0, 100, 0.0), Some(0.0416))
            .is_none());
    }
}
