//! Exclusion policy
//!
//! Pure predicate over resource metadata deciding protection from
//! automated action. Excluded resources produce no mutating
//! recommendations; they may still appear in read-only reports.

use crate::error::EngineError;
use crate::models::ResourceDescriptor;
use serde::{Deserialize, Serialize};

/// Tag key carrying the environment guard
pub const ENVIRONMENT_TAG: &str = "Environment";

/// Default protected environment value
pub const DEFAULT_PROTECTED_ENVIRONMENT: &str = "prod";

/// A single tag-match exclusion rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub tag_key: String,
    pub tag_value: String,
}

impl ExclusionRule {
    pub fn new(tag_key: impl Into<String>, tag_value: impl Into<String>) -> Self {
        Self {
            tag_key: tag_key.into(),
            tag_value: tag_value.into(),
        }
    }

    /// Parse a `Key=Value` rule string, as configured via the
    /// excluded-tags list (e.g. `AutoShutdown=false`)
    pub fn parse(spec: &str) -> Result<Self, EngineError> {
        match spec.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key.trim(), value.trim())),
            _ => Err(EngineError::configuration(format!(
                "exclusion rule '{spec}' is not of the form Key=Value"
            ))),
        }
    }

    fn matches(&self, descriptor: &ResourceDescriptor) -> bool {
        descriptor.tag(&self.tag_key) == Some(self.tag_value.as_str())
    }
}

/// Decides whether a resource is protected from automated action
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    rules: Vec<ExclusionRule>,
    protected_environment: String,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_PROTECTED_ENVIRONMENT)
    }
}

impl ExclusionPolicy {
    pub fn new(rules: Vec<ExclusionRule>, protected_environment: impl Into<String>) -> Self {
        Self {
            rules,
            protected_environment: protected_environment.into(),
        }
    }

    /// Whether the descriptor is excluded from mutating recommendations.
    ///
    /// The environment guard is unconditional: a resource tagged with
    /// the protected environment is excluded regardless of the rule
    /// list, and only the explicit `allow_protected` flag passed at the
    /// call site bypasses it. Pure, total, never fails.
    pub fn is_excluded(&self, descriptor: &ResourceDescriptor, allow_protected: bool) -> bool {
        if !allow_protected && self.is_protected_environment(descriptor) {
            return true;
        }
        self.rules.iter().any(|rule| rule.matches(descriptor))
    }

    fn is_protected_environment(&self, descriptor: &ResourceDescriptor) -> bool {
        descriptor.tag(ENVIRONMENT_TAG) == Some(self.protected_environment.as_str())
    }
}
