//! Resource classifiers
//!
//! Each classifier turns a utilization profile and/or resource
//! metadata into recommendation candidates:
//! - Idle: dormancy from sustained low or absent activity
//! - Right-sizing: scale up/down/optimal against the size ladder
//! - Orphan: reclaimability of storage artifacts and stopped compute

mod idle;
mod orphan;
mod rightsizing;

pub use idle::IdleClassifier;
pub use orphan::{AttachmentIndex, OrphanClassifier};
pub use rightsizing::RightSizingClassifier;

/// Hours in the billing month used for savings math
pub const HOURS_PER_MONTH: f64 = 24.0 * 30.0;
