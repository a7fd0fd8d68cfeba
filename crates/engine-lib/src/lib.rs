//! Decision engine library for cloud cost governance
//!
//! This crate provides the core functionality for:
//! - Utilization summarization over metric samples
//! - Idle, right-sizing, and orphan classification
//! - Tag-based exclusion policy with a production guard
//! - Report assembly and publication
//! - Health checks and observability

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod ladder;
pub mod models;
pub mod notify;
pub mod observability;
pub mod policy;
pub mod profile;
pub mod source;

pub use config::{EngineConfig, Thresholds};
pub use engine::{AnalysisInput, DecisionEngine};
pub use error::EngineError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use ladder::{SizeLadder, SizeTier, VolumePricing};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use policy::{ExclusionPolicy, ExclusionRule};
pub use profile::{summarize, summarize_all, UtilizationProfile};
pub use source::{InventorySnapshot, MetricSource, ResourceInventory, SnapshotSource};
