//! Analyzer configuration

use anyhow::Result;
use engine_lib::policy::ExclusionRule;
use engine_lib::{EngineConfig, Thresholds};
use serde::Deserialize;

/// Analyzer configuration, loaded from ANALYZER_-prefixed environment
/// variables
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// API server port for health/metrics/report
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Path to the inventory snapshot to analyze
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Path the JSON report is written to after each run
    #[serde(default = "default_report_path")]
    pub report_path: String,

    /// Interval between analysis runs in seconds
    #[serde(default = "default_analysis_interval")]
    pub analysis_interval_secs: u64,

    /// Per-run deadline in seconds; slower runs return partial results
    #[serde(default = "default_analysis_deadline")]
    pub analysis_deadline_secs: u64,

    /// Utilization window in hours
    #[serde(default = "default_idle_window_hours")]
    pub idle_window_hours: u64,

    /// Snapshot retention in days
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Mean CPU percent below which a downsize is considered
    #[serde(default = "default_cpu_low")]
    pub cpu_low: f64,

    /// Mean CPU percent above which an upsize is recommended
    #[serde(default = "default_cpu_high")]
    pub cpu_high: f64,

    /// Max CPU percent that forces an upsize regardless of the mean
    #[serde(default = "default_cpu_ceiling")]
    pub cpu_ceiling: f64,

    /// Mean memory percent that corroborates a downsize
    #[serde(default = "default_memory_low")]
    pub memory_low: f64,

    /// Mean memory percent that corroborates an upsize
    #[serde(default = "default_memory_high")]
    pub memory_high: f64,

    /// CPU percent under which a sample counts toward the idle fraction
    #[serde(default = "default_low_cpu_threshold")]
    pub low_cpu_threshold: f64,

    /// Fraction of low-CPU samples required to call a resource idle
    #[serde(default = "default_idle_fraction")]
    pub idle_fraction: f64,

    /// Environment tag value that blocks mutating recommendations
    #[serde(default = "default_protected_environment")]
    pub protected_environment: String,

    /// Comma-separated Key=Value exclusion rules
    #[serde(default)]
    pub excluded_tags: String,

    /// Permit mutating recommendations for the protected environment
    #[serde(default)]
    pub allow_protected: bool,

    /// Emit an informational entry for excluded resources
    #[serde(default)]
    pub report_excluded: bool,
}

fn default_api_port() -> u16 {
    8080
}

fn default_snapshot_path() -> String {
    "snapshot.json".to_string()
}

fn default_report_path() -> String {
    "report.json".to_string()
}

fn default_analysis_interval() -> u64 {
    3600
}

fn default_analysis_deadline() -> u64 {
    300
}

fn default_idle_window_hours() -> u64 {
    168
}

fn default_retention_days() -> i64 {
    30
}

fn default_cpu_low() -> f64 {
    10.0
}

fn default_cpu_high() -> f64 {
    80.0
}

fn default_cpu_ceiling() -> f64 {
    90.0
}

fn default_memory_low() -> f64 {
    10.0
}

fn default_memory_high() -> f64 {
    80.0
}

fn default_low_cpu_threshold() -> f64 {
    5.0
}

fn default_idle_fraction() -> f64 {
    0.8
}

fn default_protected_environment() -> String {
    "prod".to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            snapshot_path: default_snapshot_path(),
            report_path: default_report_path(),
            analysis_interval_secs: default_analysis_interval(),
            analysis_deadline_secs: default_analysis_deadline(),
            idle_window_hours: default_idle_window_hours(),
            retention_days: default_retention_days(),
            cpu_low: default_cpu_low(),
            cpu_high: default_cpu_high(),
            cpu_ceiling: default_cpu_ceiling(),
            memory_low: default_memory_low(),
            memory_high: default_memory_high(),
            low_cpu_threshold: default_low_cpu_threshold(),
            idle_fraction: default_idle_fraction(),
            protected_environment: default_protected_environment(),
            excluded_tags: String::new(),
            allow_protected: false,
            report_excluded: false,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ANALYZER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Build the engine configuration, parsing the exclusion rule list
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let excluded_tags = self
            .excluded_tags
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ExclusionRule::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EngineConfig {
            thresholds: Thresholds {
                cpu_low: self.cpu_low,
                cpu_high: self.cpu_high,
                cpu_ceiling: self.cpu_ceiling,
                memory_low: self.memory_low,
                memory_high: self.memory_high,
                low_cpu_threshold: self.low_cpu_threshold,
                idle_fraction: self.idle_fraction,
            },
            idle_window_hours: self.idle_window_hours,
            retention_days: self.retention_days,
            protected_environment: self.protected_environment.clone(),
            excluded_tags,
            allow_protected: self.allow_protected,
            report_excluded: self.report_excluded,
        })
    }
}
