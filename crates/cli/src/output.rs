//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use engine_lib::models::{Confidence, RecommendedAction};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
#[allow(dead_code)]
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a monthly dollar amount
pub fn format_savings(amount: f64) -> String {
    if amount > 0.0 {
        format!("${:.2}/mo", amount)
    } else {
        "-".to_string()
    }
}

/// Format a timestamp for display
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Color an action based on how disruptive it is
pub fn color_action(action: RecommendedAction) -> String {
    let name = action.as_str();
    match action {
        RecommendedAction::Delete => name.red().to_string(),
        RecommendedAction::Shutdown => name.red().to_string(),
        RecommendedAction::Downsize | RecommendedAction::Upsize => name.yellow().to_string(),
        RecommendedAction::FlagForReview => name.blue().to_string(),
        RecommendedAction::None => name.to_string(),
    }
}

/// Color a confidence level
pub fn color_confidence(confidence: Confidence) -> String {
    match confidence {
        Confidence::High => "high".green().to_string(),
        Confidence::Medium => "medium".yellow().to_string(),
        Confidence::Low => "low".red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_savings() {
        assert_eq!(format_savings(29.952), "$29.95/mo");
        assert_eq!(format_savings(0.0), "-");
    }
}
