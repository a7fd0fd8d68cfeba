//! Utilization summarization
//!
//! Reduces a raw sample series into the statistical profile the
//! classifiers consume. An empty series yields a "no data" profile,
//! which is a distinct signal from confirmed zero utilization.

use crate::models::UtilizationSample;
use std::collections::HashMap;

/// Statistical profile of one metric over the analysis window.
///
/// Derived per resource per pass, never stored. Statistics are `None`
/// when no samples were available.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationProfile {
    pub metric: String,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub sample_count: usize,
    /// Fraction of samples below the caller-supplied low threshold
    pub low_fraction: Option<f64>,
}

impl UtilizationProfile {
    /// "No data" profile for a metric with no samples in the window
    pub fn no_data(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            mean: None,
            max: None,
            sample_count: 0,
            low_fraction: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.sample_count > 0
    }
}

/// Summarize the samples of a single metric.
///
/// Arithmetic mean and true maximum over the raw values, with no
/// outlier trimming: a single spike must be visible in `max` even when
/// it barely moves `mean`, because the right-sizing classifier treats
/// `max` as an independent upsize trigger.
pub fn summarize(metric: &str, samples: &[UtilizationSample], low_threshold: f64) -> UtilizationProfile {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| s.metric == metric)
        .map(|s| s.value)
        .collect();

    if values.is_empty() {
        return UtilizationProfile::no_data(metric);
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let max = values
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    let low = values.iter().filter(|v| **v < low_threshold).count();

    UtilizationProfile {
        metric: metric.to_string(),
        mean: Some(mean),
        max: Some(max),
        sample_count: count,
        low_fraction: Some(low as f64 / count as f64),
    }
}

/// Summarize a mixed series, grouped by metric name
pub fn summarize_all(
    samples: &[UtilizationSample],
    low_threshold: f64,
) -> HashMap<String, UtilizationProfile> {
    let mut metrics: Vec<&str> = samples.iter().map(|s| s.metric.as_str()).collect();
    metrics.sort_unstable();
    metrics.dedup();

    metrics
        .into_iter()
        .map(|m| (m.to_string(), summarize(m, samples, low_threshold)))
        .collect()
}
