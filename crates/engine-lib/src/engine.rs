//! Decision engine orchestration
//!
//! Composes the exclusion policy, summarizer, and classifiers into
//! per-resource evaluation, and batches evaluations into a Report.
//! The engine is stateless and side-effect-free per call; batch
//! evaluation runs resources as independent tasks with no shared
//! mutable state beyond collecting finished results.

use crate::classify::{AttachmentIndex, IdleClassifier, OrphanClassifier, RightSizingClassifier};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ladder::{SizeLadder, VolumePricing};
use crate::models::{
    metrics, Confidence, PowerState, Recommendation, RecommendedAction, Report,
    ResourceDescriptor, UtilizationSample,
};
use crate::policy::ExclusionPolicy;
use crate::profile::summarize;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// One resource plus its fetched samples, supplied by collaborators
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub descriptor: ResourceDescriptor,
    pub samples: Vec<UtilizationSample>,
}

pub struct DecisionEngine {
    config: EngineConfig,
    policy: ExclusionPolicy,
    idle: IdleClassifier,
    rightsizing: RightSizingClassifier,
    orphan: OrphanClassifier,
    ladder: SizeLadder,
    volume_pricing: VolumePricing,
}

impl DecisionEngine {
    /// Validates configuration before anything is evaluated; a
    /// malformed threshold set is fatal here and nowhere else.
    pub fn new(
        config: EngineConfig,
        ladder: SizeLadder,
        volume_pricing: VolumePricing,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let policy = ExclusionPolicy::new(
            config.excluded_tags.clone(),
            config.protected_environment.clone(),
        );
        let idle = IdleClassifier::from_thresholds(&config.thresholds);
        let rightsizing = RightSizingClassifier::new(config.thresholds.clone());
        let orphan = OrphanClassifier::new(config.retention_days);
        Ok(Self {
            config,
            policy,
            idle,
            rightsizing,
            orphan,
            ladder,
            volume_pricing,
        })
    }

    pub fn with_defaults(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(config, SizeLadder::aws_default(), VolumePricing::default())
    }

    /// Evaluate a single resource. May yield zero, one, or several
    /// recommendations; a resource with no usable profile yields an
    /// "insufficient data" flag rather than failing.
    pub fn evaluate(
        &self,
        descriptor: &ResourceDescriptor,
        samples: &[UtilizationSample],
        attachments: &AttachmentIndex,
    ) -> Vec<Recommendation> {
        self.evaluate_at(descriptor, samples, attachments, Utc::now())
    }

    /// Evaluation with an injected clock, for deterministic age rules
    pub fn evaluate_at(
        &self,
        descriptor: &ResourceDescriptor,
        samples: &[UtilizationSample],
        attachments: &AttachmentIndex,
        now: DateTime<Utc>,
    ) -> Vec<Recommendation> {
        if self
            .policy
            .is_excluded(descriptor, self.config.allow_protected)
        {
            debug!(resource_id = %descriptor.id, "resource excluded by policy");
            if self.config.report_excluded {
                return vec![Recommendation {
                    resource_id: descriptor.id.clone(),
                    action: RecommendedAction::FlagForReview,
                    reason: "excluded by policy; no automated action taken".to_string(),
                    confidence: Confidence::High,
                    estimated_monthly_savings: 0.0,
                    from_size: Some(descriptor.size_class.clone()),
                    to_size: None,
                }];
            }
            return Vec::new();
        }

        let mut recommendations = Vec::new();

        if descriptor.kind.is_compute() && !descriptor.power_state.is_powered_down() {
            recommendations.extend(self.evaluate_compute(descriptor, samples));
        }

        // Orphan sub-rules filter by kind/state themselves
        recommendations.extend(self.orphan.classify(
            descriptor,
            attachments,
            &self.volume_pricing,
            now,
        ));

        debug!(
            resource_id = %descriptor.id,
            count = recommendations.len(),
            "resource evaluated"
        );
        recommendations
    }

    /// Compute resources get both idle and right-sizing evaluation
    fn evaluate_compute(
        &self,
        descriptor: &ResourceDescriptor,
        samples: &[UtilizationSample],
    ) -> Vec<Recommendation> {
        let low = self.config.thresholds.low_cpu_threshold;
        let cpu = summarize(metrics::CPU_PERCENT, samples, low);

        // DataGap: one review flag covers both classifiers
        if !cpu.has_data() {
            return vec![Recommendation::insufficient_data(&descriptor.id)];
        }

        let memory = {
            let profile = summarize(metrics::MEMORY_PERCENT, samples, low);
            profile.has_data().then_some(profile)
        };

        let mut recommendations = Vec::new();

        if descriptor.power_state == PowerState::Running {
            let family = SizeLadder::family_of(&descriptor.size_class);
            let rate = self.ladder.hourly_rate(family, &descriptor.size_class);
            if let Some(rec) = self.idle.classify(descriptor, &cpu, rate) {
                recommendations.push(rec);
            }
        }

        let sizing = self
            .rightsizing
            .classify(descriptor, &cpu, memory.as_ref(), &self.ladder);
        if sizing.action != RecommendedAction::None {
            recommendations.push(sizing);
        }

        recommendations
    }

    /// Evaluate a batch of resources concurrently.
    ///
    /// Each resource runs in its own task; the only synchronization is
    /// collecting completed results. When the deadline elapses,
    /// in-flight evaluations are abandoned and the partial results are
    /// returned; the call always yields a Report.
    pub async fn evaluate_batch(
        self: Arc<Self>,
        inputs: Vec<AnalysisInput>,
        attachments: AttachmentIndex,
        deadline: Option<Duration>,
    ) -> Report {
        let started = tokio::time::Instant::now();
        let attachments = Arc::new(attachments);
        let mut tasks = JoinSet::new();

        for input in inputs {
            let engine = Arc::clone(&self);
            let attachments = Arc::clone(&attachments);
            tasks.spawn(async move {
                engine.evaluate(&input.descriptor, &input.samples, &attachments)
            });
        }

        let mut recommendations = Vec::new();
        loop {
            let next = match deadline {
                Some(limit) => {
                    let remaining = limit.saturating_sub(started.elapsed());
                    match tokio::time::timeout(remaining, tasks.join_next()).await {
                        Ok(joined) => joined,
                        Err(_) => {
                            warn!(
                                abandoned = tasks.len(),
                                "analysis deadline reached, returning partial results"
                            );
                            tasks.abort_all();
                            break;
                        }
                    }
                }
                None => tasks.join_next().await,
            };

            match next {
                Some(Ok(recs)) => recommendations.extend(recs),
                Some(Err(err)) => {
                    // Containment: one failed task never aborts the batch
                    warn!(error = %err, "resource evaluation task failed");
                }
                None => break,
            }
        }

        Report::new(recommendations)
    }
}
