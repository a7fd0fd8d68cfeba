//! Size ladder and pricing lookups
//!
//! Ordered catalog of size tiers per resource family. Families and
//! tiers are data, not code: the ladder can be seeded from the built-in
//! rate table or loaded from JSON. Rank is the sole ordering key; tier
//! names are opaque strings with no implied numeric meaning.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One size tier within a family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTier {
    pub family: String,
    pub name: String,
    pub hourly_rate: f64,
    pub rank: u32,
}

/// Ordered catalog of tiers, queryable for neighbors and rates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SizeLadder {
    /// Per-family tier lists, kept sorted by rank
    families: HashMap<String, Vec<SizeTier>>,
}

impl SizeLadder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ladder with the built-in AWS burstable/general-purpose rates
    /// used when no pricing file is supplied
    pub fn aws_default() -> Self {
        let mut ladder = Self::new();
        for (family, name, rate, rank) in [
            ("t3", "t3.nano", 0.0052, 0),
            ("t3", "t3.micro", 0.0104, 1),
            ("t3", "t3.small", 0.0208, 2),
            ("t3", "t3.medium", 0.0416, 3),
            ("t3", "t3.large", 0.0832, 4),
            ("t3", "t3.xlarge", 0.1664, 5),
            ("t3", "t3.2xlarge", 0.3328, 6),
            ("m5", "m5.large", 0.096, 0),
            ("m5", "m5.xlarge", 0.192, 1),
            ("m5", "m5.2xlarge", 0.384, 2),
            ("m5", "m5.4xlarge", 0.768, 3),
        ] {
            ladder.insert(SizeTier {
                family: family.to_string(),
                name: name.to_string(),
                hourly_rate: rate,
                rank,
            });
        }
        ladder
    }

    /// Insert a tier, keeping the family sorted by rank
    pub fn insert(&mut self, tier: SizeTier) {
        let tiers = self.families.entry(tier.family.clone()).or_default();
        tiers.push(tier);
        tiers.sort_by_key(|t| t.rank);
    }

    pub fn tier(&self, family: &str, name: &str) -> Option<&SizeTier> {
        self.families
            .get(family)?
            .iter()
            .find(|t| t.name == name)
    }

    /// Next tier up the ladder; `None` at the top signals "already at
    /// extremum", not an error
    pub fn next_larger(&self, family: &str, name: &str) -> Option<&SizeTier> {
        let tiers = self.families.get(family)?;
        let current = tiers.iter().find(|t| t.name == name)?;
        tiers.iter().find(|t| t.rank > current.rank)
    }

    /// Next tier down the ladder; `None` at the bottom signals
    /// "already at extremum"
    pub fn next_smaller(&self, family: &str, name: &str) -> Option<&SizeTier> {
        let tiers = self.families.get(family)?;
        let current = tiers.iter().find(|t| t.name == name)?;
        tiers.iter().rev().find(|t| t.rank < current.rank)
    }

    /// Hourly rate lookup; `None` is a lookup miss, resolved by
    /// callers to savings 0 / confidence low
    pub fn hourly_rate(&self, family: &str, name: &str) -> Option<f64> {
        self.tier(family, name).map(|t| t.hourly_rate)
    }

    /// Split a tier name like `t3.medium` into its family prefix.
    /// Names without a family separator map to themselves.
    pub fn family_of(size_class: &str) -> &str {
        size_class.split('.').next().unwrap_or(size_class)
    }
}

/// Pricing lookup for storage artifacts, USD per GB-month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumePricing {
    pub default_rate_gb_month: f64,
    #[serde(default)]
    pub sku_rates: HashMap<String, f64>,
}

impl Default for VolumePricing {
    fn default() -> Self {
        // gp3-equivalent default rate
        Self {
            default_rate_gb_month: 0.08,
            sku_rates: HashMap::new(),
        }
    }
}

impl VolumePricing {
    pub fn rate_gb_month(&self, sku: &str) -> f64 {
        self.sku_rates
            .get(sku)
            .copied()
            .unwrap_or(self.default_rate_gb_month)
    }

    pub fn monthly_cost(&self, sku: &str, size_gb: f64) -> f64 {
        self.rate_gb_month(sku) * size_gb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_queries() {
        let ladder = SizeLadder::aws_default();
        assert_eq!(
            ladder.next_larger("t3", "t3.medium").unwrap().name,
            "t3.large"
        );
        assert_eq!(
            ladder.next_smaller("t3", "t3.medium").unwrap().name,
            "t3.small"
        );
    }

    #[test]
    fn test_extremes_return_none() {
        let ladder = SizeLadder::aws_default();
        assert!(ladder.next_smaller("t3", "t3.nano").is_none());
        assert!(ladder.next_larger("t3", "t3.2xlarge").is_none());
    }

    #[test]
    fn test_round_trip() {
        // next_larger(next_smaller(t)) == t whenever both exist
        let ladder = SizeLadder::aws_default();
        for name in ["t3.micro", "t3.small", "t3.medium", "t3.large", "m5.xlarge"] {
            let family = SizeLadder::family_of(name);
            let down = ladder.next_smaller(family, name).unwrap();
            let back = ladder.next_larger(family, &down.name).unwrap();
            assert_eq!(back.name, name);
        }
    }

    #[test]
    fn test_unknown_family_and_tier_miss() {
        let ladder = SizeLadder::aws_default();
        assert!(ladder.tier("c6g", "c6g.large").is_none());
        assert!(ladder.hourly_rate("t3", "t3.mega").is_none());
        assert!(ladder.next_larger("c6g", "c6g.large").is_none());
    }

    #[test]
    fn test_rank_not_name_orders_tiers() {
        // Opaque names: ordering must follow rank even when names
        // would sort differently
        let mut ladder = SizeLadder::new();
        for (name, rank) in [("Standard_B2s", 0), ("Standard_B1ms", 1), ("Standard_A9", 2)] {
            ladder.insert(SizeTier {
                family: "B".to_string(),
                name: name.to_string(),
                hourly_rate: 0.01 * (rank + 1) as f64,
                rank,
            });
        }
        assert_eq!(
            ladder.next_larger("B", "Standard_B2s").unwrap().name,
            "Standard_B1ms"
        );
        assert_eq!(
            ladder.next_larger("B", "Standard_B1ms").unwrap().name,
            "Standard_A9"
        );
    }

    #[test]
    fn test_volume_pricing() {
        let mut pricing = VolumePricing::default();
        pricing.sku_rates.insert("premium-ssd".to_string(), 0.15);
        assert!((pricing.monthly_cost("premium-ssd", 100.0) - 15.0).abs() < 1e-9);
        assert!((pricing.monthly_cost("unknown-sku", 100.0) - 8.0).abs() < 1e-9);
    }
}
