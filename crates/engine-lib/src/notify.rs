//! Report publication
//!
//! Completed reports fan out to one or more sinks. The log sink emits
//! a structured summary; the file sink persists the full report as
//! JSON for the API and the CLI to read back.

use crate::models::Report;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Destination for completed reports
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&self, report: &Report) -> anyhow::Result<()>;

    /// Sink name for health tracking and log context
    fn name(&self) -> &'static str;
}

/// Emits a one-line structured summary of the report
pub struct LogSink;

#[async_trait]
impl ReportSink for LogSink {
    async fn publish(&self, report: &Report) -> anyhow::Result<()> {
        info!(
            event = "report_published",
            sink = self.name(),
            recommendations = report.recommendations.len(),
            total_estimated_savings = report.total_estimated_savings,
            summary = %summary_message(report),
            "Published cost report"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Writes the full report as pretty-printed JSON
///
/// The write goes through a temp file in the same directory and a
/// rename, so readers never observe a partially written report.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReportSink for JsonFileSink {
    async fn publish(&self, report: &Report) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        info!(
            event = "report_published",
            sink = self.name(),
            path = %self.path.display(),
            recommendations = report.recommendations.len(),
            "Published cost report"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}

/// Human-readable digest: counts plus the top savings opportunities
pub fn summary_message(report: &Report) -> String {
    if report.is_empty() {
        return "no recommendations".to_string();
    }

    let mut by_savings: Vec<_> = report
        .recommendations
        .iter()
        .filter(|r| r.estimated_monthly_savings > 0.0)
        .collect();
    by_savings.sort_by(|a, b| {
        b.estimated_monthly_savings
            .partial_cmp(&a.estimated_monthly_savings)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top: Vec<String> = by_savings
        .iter()
        .take(5)
        .map(|r| {
            format!(
                "{} {} (${:.2}/mo)",
                r.action, r.resource_id, r.estimated_monthly_savings
            )
        })
        .collect();

    let mut message = format!(
        "{} recommendations, ${:.2}/mo estimated savings",
        report.recommendations.len(),
        report.total_estimated_savings
    );
    if !top.is_empty() {
        message.push_str("; top: ");
        message.push_str(&top.join(", "));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, Recommendation, RecommendedAction};

    fn recommendation(id: &str, action: RecommendedAction, savings: f64) -> Recommendation {
        Recommendation {
            resource_id: id.to_string(),
            action,
            reason: "test".to_string(),
            confidence: Confidence::Medium,
            estimated_monthly_savings: savings,
            from_size: None,
            to_size: None,
        }
    }

    #[test]
    fn test_summary_for_empty_report() {
        let report = Report::new(vec![]);
        assert_eq!(summary_message(&report), "no recommendations");
    }

    #[test]
    fn test_summary_lists_top_savings_first() {
        let report = Report::new(vec![
            recommendation("i-small", RecommendedAction::Downsize, 5.0),
            recommendation("i-big", RecommendedAction::Shutdown, 70.0),
            recommendation("vol-1", RecommendedAction::Delete, 8.0),
        ]);
        let summary = summary_message(&report);
        assert!(summary.starts_with("3 recommendations"));
        let big = summary.find("i-big").unwrap();
        let vol = summary.find("vol-1").unwrap();
        let small = summary.find("i-small").unwrap();
        assert!(big < vol && vol < small);
    }

    #[test]
    fn test_summary_skips_zero_savings_entries() {
        let report = Report::new(vec![recommendation(
            "i-review",
            RecommendedAction::FlagForReview,
            0.0,
        )]);
        let summary = summary_message(&report);
        assert!(!summary.contains("top:"));
    }

    #[tokio::test]
    async fn test_json_file_sink_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let sink = JsonFileSink::new(&path);

        let report = Report::new(vec![recommendation(
            "i-1",
            RecommendedAction::Shutdown,
            29.95,
        )]);
        sink.publish(&report).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: Report = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.recommendations.len(), 1);
        assert_eq!(parsed.recommendations[0].resource_id, "i-1");
    }

    #[tokio::test]
    async fn test_log_sink_publishes_without_error() {
        let report = Report::new(vec![]);
        LogSink.publish(&report).await.unwrap();
    }
}
