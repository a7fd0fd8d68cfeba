//! Local analysis of an inventory snapshot

use anyhow::{Context, Result};
use engine_lib::classify::AttachmentIndex;
use engine_lib::policy::ExclusionRule;
use engine_lib::source::ResourceInventory;
use engine_lib::{
    DecisionEngine, EngineConfig, Report, SizeLadder, SizeTier, SnapshotSource, Thresholds,
    VolumePricing,
};
use std::sync::Arc;
use tabled::Tabled;

use crate::output::{
    color_action, color_confidence, format_savings, print_info, print_warning, OutputFormat,
};

/// Threshold and policy overrides from the command line
pub struct AnalyzeOptions {
    pub snapshot: String,
    pub ladder: Option<String>,
    pub window_hours: u64,
    pub retention_days: i64,
    pub cpu_low: Option<f64>,
    pub cpu_high: Option<f64>,
    pub exclude_tag: Vec<String>,
    pub allow_protected: bool,
    pub include_excluded: bool,
}

/// Row for the recommendations table
#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Resource")]
    resource_id: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "From")]
    from_size: String,
    #[tabled(rename = "To")]
    to_size: String,
    #[tabled(rename = "Savings")]
    savings: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Run the decision engine against a snapshot file
pub async fn run(options: AnalyzeOptions, format: OutputFormat) -> Result<()> {
    let config = build_config(&options)?;
    let ladder = load_ladder(options.ladder.as_deref())?;
    let engine = Arc::new(DecisionEngine::new(
        config,
        ladder,
        VolumePricing::default(),
    )?);

    let source = SnapshotSource::from_path(&options.snapshot)
        .with_context(|| format!("cannot load snapshot {}", options.snapshot))?;
    let inputs = source.load_inputs(options.window_hours).await?;
    let attachments: AttachmentIndex = source.attachment_index().await?;
    let resource_count = inputs.len();

    let report = engine.evaluate_batch(inputs, attachments, None).await;
    render(&report, resource_count, format)?;
    Ok(())
}

fn build_config(options: &AnalyzeOptions) -> Result<EngineConfig> {
    let mut thresholds = Thresholds::default();
    if let Some(low) = options.cpu_low {
        thresholds.cpu_low = low;
    }
    if let Some(high) = options.cpu_high {
        thresholds.cpu_high = high;
    }

    let excluded_tags = options
        .exclude_tag
        .iter()
        .map(|spec| ExclusionRule::parse(spec))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EngineConfig {
        thresholds,
        idle_window_hours: options.window_hours,
        retention_days: options.retention_days,
        excluded_tags,
        allow_protected: options.allow_protected,
        report_excluded: options.include_excluded,
        ..Default::default()
    })
}

/// Load a pricing ladder from a JSON tier list, or fall back to the
/// built-in AWS ladder
fn load_ladder(path: Option<&str>) -> Result<SizeLadder> {
    let Some(path) = path else {
        return Ok(SizeLadder::aws_default());
    };
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read ladder {path}"))?;
    let tiers: Vec<SizeTier> =
        serde_json::from_str(&content).with_context(|| format!("cannot parse ladder {path}"))?;
    let mut ladder = SizeLadder::new();
    for tier in tiers {
        ladder.insert(tier);
    }
    Ok(ladder)
}

fn render(report: &Report, resource_count: usize, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            if report.is_empty() {
                print_warning("No recommendations");
                print_info(&format!("{} resources analyzed", resource_count));
                return Ok(());
            }

            let rows: Vec<RecommendationRow> = report
                .recommendations
                .iter()
                .map(|r| RecommendationRow {
                    resource_id: r.resource_id.clone(),
                    action: color_action(r.action),
                    from_size: r.from_size.clone().unwrap_or_default(),
                    to_size: r.to_size.clone().unwrap_or_default(),
                    savings: format_savings(r.estimated_monthly_savings),
                    confidence: color_confidence(r.confidence),
                    reason: r.reason.clone(),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "\n{} resources analyzed, {} recommendations, estimated savings {}",
                resource_count,
                report.recommendations.len(),
                format_savings(report.total_estimated_savings)
            );
        }
    }
    Ok(())
}
