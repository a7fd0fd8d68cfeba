//! Inspection of previously generated reports

use anyhow::{Context, Result};
use engine_lib::models::{Report, RecommendedAction};
use tabled::Tabled;

use crate::output::{format_savings, format_timestamp, print_warning, OutputFormat};

/// Row for the per-action summary table
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Savings")]
    savings: String,
}

/// Show a report previously written by the analyzer or `costctl analyze`
pub fn show(path: &str, format: OutputFormat) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read report {path}"))?;
    let report: Report =
        serde_json::from_str(&content).with_context(|| format!("cannot parse report {path}"))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!("Generated: {}", format_timestamp(&report.generated_at));
            if report.is_empty() {
                print_warning("Report contains no recommendations");
                return Ok(());
            }

            let mut rows: Vec<SummaryRow> = report
                .action_counts()
                .into_iter()
                .map(|(action, count)| SummaryRow {
                    action: action.as_str().to_string(),
                    count,
                    savings: format_savings(savings_for(&report, action)),
                })
                .collect();
            rows.sort_by(|a, b| b.count.cmp(&a.count));

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "\nTotal: {} recommendations, estimated savings {}",
                report.recommendations.len(),
                format_savings(report.total_estimated_savings)
            );
        }
    }
    Ok(())
}

fn savings_for(report: &Report, action: RecommendedAction) -> f64 {
    report
        .recommendations
        .iter()
        .filter(|r| r.action == action && r.action.is_mutating())
        .map(|r| r.estimated_monthly_savings)
        .sum()
}
