//! Cloud Cost Optimizer CLI
//!
//! A command-line tool for analyzing inventory snapshots and
//! inspecting generated cost reports.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analyze, report};

/// Cloud Cost Optimizer CLI
#[derive(Parser)]
#[command(name = "costctl")]
#[command(author, version, about = "CLI for the Cloud Cost Optimizer", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an inventory snapshot and print recommendations
    Analyze {
        /// Path to the inventory snapshot (can also be set via COSTCTL_SNAPSHOT)
        #[arg(long, env = "COSTCTL_SNAPSHOT", default_value = "snapshot.json")]
        snapshot: String,

        /// Path to a JSON pricing ladder (built-in AWS ladder if omitted)
        #[arg(long)]
        ladder: Option<String>,

        /// Utilization window in hours
        #[arg(long, default_value_t = 168)]
        window_hours: u64,

        /// Snapshot retention in days
        #[arg(long, default_value_t = 30)]
        retention_days: i64,

        /// Override the low-CPU threshold (mean percent)
        #[arg(long)]
        cpu_low: Option<f64>,

        /// Override the high-CPU threshold (mean percent)
        #[arg(long)]
        cpu_high: Option<f64>,

        /// Exclusion rule of the form Key=Value (repeatable)
        #[arg(long)]
        exclude_tag: Vec<String>,

        /// Permit mutating recommendations for protected environments
        #[arg(long)]
        allow_protected: bool,

        /// Report excluded resources as informational entries
        #[arg(long)]
        include_excluded: bool,
    },

    /// Inspect generated reports
    #[command(subcommand)]
    Report(ReportCommands),
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Show a saved report
    Show {
        /// Path to the report JSON file
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            snapshot,
            ladder,
            window_hours,
            retention_days,
            cpu_low,
            cpu_high,
            exclude_tag,
            allow_protected,
            include_excluded,
        } => {
            let options = analyze::AnalyzeOptions {
                snapshot,
                ladder,
                window_hours,
                retention_days,
                cpu_low,
                cpu_high,
                exclude_tag,
                allow_protected,
                include_excluded,
            };
            analyze::run(options, cli.format).await?;
        }
        Commands::Report(report_cmd) => match report_cmd {
            ReportCommands::Show { path } => {
                report::show(&path, cli.format)?;
            }
        },
    }

    Ok(())
}
