//! Engine configuration and threshold validation
//!
//! All thresholds are caller-supplied; the defaults here mirror the
//! documented contract rather than being baked into classifier code.
//! Validation fails fast at engine construction and is never partially
//! applied.

use crate::error::EngineError;
use crate::policy::{ExclusionRule, DEFAULT_PROTECTED_ENVIRONMENT};
use serde::{Deserialize, Serialize};

/// Classification thresholds, in percent of capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Mean CPU below this triggers downsize consideration
    pub cpu_low: f64,
    /// Mean CPU above this triggers upsize
    pub cpu_high: f64,
    /// Max CPU above this hard ceiling triggers upsize independent of mean
    pub cpu_ceiling: f64,
    pub memory_low: f64,
    pub memory_high: f64,
    /// Samples below this count as "low" for idle detection
    pub low_cpu_threshold: f64,
    /// Fraction of low samples above which a resource is idle
    pub idle_fraction: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_low: 10.0,
            cpu_high: 80.0,
            cpu_ceiling: 90.0,
            memory_low: 10.0,
            memory_high: 80.0,
            low_cpu_threshold: 5.0,
            idle_fraction: 0.8,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.cpu_low >= self.cpu_high {
            return Err(EngineError::configuration(format!(
                "cpu_low ({}) must be below cpu_high ({})",
                self.cpu_low, self.cpu_high
            )));
        }
        if self.memory_low >= self.memory_high {
            return Err(EngineError::configuration(format!(
                "memory_low ({}) must be below memory_high ({})",
                self.memory_low, self.memory_high
            )));
        }
        if self.cpu_ceiling < self.cpu_high {
            return Err(EngineError::configuration(format!(
                "cpu_ceiling ({}) must be at least cpu_high ({})",
                self.cpu_ceiling, self.cpu_high
            )));
        }
        for (name, value) in [
            ("cpu_low", self.cpu_low),
            ("cpu_high", self.cpu_high),
            ("cpu_ceiling", self.cpu_ceiling),
            ("memory_low", self.memory_low),
            ("memory_high", self.memory_high),
            ("low_cpu_threshold", self.low_cpu_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(EngineError::configuration(format!(
                    "{name} ({value}) must be within 0..=100 percent"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.idle_fraction) {
            return Err(EngineError::configuration(format!(
                "idle_fraction ({}) must be within 0..=1",
                self.idle_fraction
            )));
        }
        Ok(())
    }
}

/// Full configuration surface of the decision engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Analysis window for idle detection, in hours (default 7 days)
    #[serde(default = "default_idle_window_hours")]
    pub idle_window_hours: u64,
    /// Snapshots older than this are delete candidates
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_protected_environment")]
    pub protected_environment: String,
    #[serde(default)]
    pub excluded_tags: Vec<ExclusionRule>,
    /// Explicit override of the unconditional environment guard
    #[serde(default)]
    pub allow_protected: bool,
    /// Emit an informational flag-for-review entry for excluded resources
    #[serde(default)]
    pub report_excluded: bool,
}

fn default_idle_window_hours() -> u64 {
    168
}

fn default_retention_days() -> i64 {
    30
}

fn default_protected_environment() -> String {
    DEFAULT_PROTECTED_ENVIRONMENT.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            idle_window_hours: default_idle_window_hours(),
            retention_days: default_retention_days(),
            protected_environment: default_protected_environment(),
            excluded_tags: Vec::new(),
            allow_protected: false,
            report_excluded: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.thresholds.validate()?;
        if self.idle_window_hours == 0 {
            return Err(EngineError::configuration(
                "idle_window_hours must be positive",
            ));
        }
        if self.retention_days <= 0 {
            return Err(EngineError::configuration(
                "retention_days must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_inverted_cpu_thresholds_rejected() {
        let mut thresholds = Thresholds::default();
        thresholds.cpu_low = 80.0;
        thresholds.cpu_high = 10.0;
        let err = thresholds.validate().unwrap_err();
        assert!(err.to_string().contains("cpu_low"));
    }

    #[test]
    fn test_equal_thresholds_rejected() {
        let mut thresholds = Thresholds::default();
        thresholds.cpu_low = 50.0;
        thresholds.cpu_high = 50.0;
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_ceiling_below_high_rejected() {
        let mut thresholds = Thresholds::default();
        thresholds.cpu_ceiling = 70.0;
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_out_of_range_percent_rejected() {
        let mut thresholds = Thresholds::default();
        thresholds.cpu_ceiling = 130.0;
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_zero_windows_rejected() {
        let mut config = EngineConfig::default();
        config.idle_window_hours = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.retention_days = 0;
        assert!(config.validate().is_err());
    }
}
