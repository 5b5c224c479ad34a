//! Configuration types for the balancer.

use crate::types::TableId;

/// Which balancing strategy a run uses.
///
/// The two strategies stay separate on purpose: the pairwise balancer is
/// approximate but runs against live per-table snapshots, while the exact
/// planner guarantees precise per-node targets. Neither subsumes the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Greedy most-loaded/least-loaded pair walk toward the simple average.
    #[default]
    Pairwise,
    /// Exact proportional planner with fair remainder distribution.
    Exact,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Pairwise => write!(f, "pairwise"),
            Strategy::Exact => write!(f, "exact"),
        }
    }
}

/// Configuration for one balancing run.
#[derive(Debug, Clone)]
pub struct BalanceConfig {
    /// Table whose regions are balanced.
    pub table_id: TableId,

    /// Restrict balanceable nodes to this zone label.
    pub zone: Option<String>,

    /// Restrict balanceable nodes to this region label.
    pub region: Option<String>,

    /// Log the operator commands without sending them.
    pub dry_run: bool,

    /// Print the region distribution and stop; no planning, no moves.
    pub show_only: bool,

    /// Strategy used to produce the migration operations.
    pub strategy: Strategy,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            table_id: 0,
            zone: None,
            region: None,
            dry_run: true,
            show_only: false,
            strategy: Strategy::default(),
        }
    }
}

impl BalanceConfig {
    /// Create a configuration for the given table.
    pub fn new(table_id: TableId) -> Self {
        Self {
            table_id,
            ..Default::default()
        }
    }

    /// Restrict node discovery to a zone label.
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Restrict node discovery to a region label.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Only show the distribution, without planning anything.
    pub fn with_show_only(mut self, show_only: bool) -> Self {
        self.show_only = show_only;
        self
    }

    /// Select the balancing strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_safe() {
        let config = BalanceConfig::new(42);
        assert_eq!(config.table_id, 42);
        assert!(config.dry_run, "default must not send operators");
        assert!(!config.show_only);
        assert_eq!(config.strategy, Strategy::Pairwise);
    }

    #[test]
    fn test_builder_chain() {
        let config = BalanceConfig::new(7)
            .with_zone("z1")
            .with_region("r1")
            .with_dry_run(false)
            .with_strategy(Strategy::Exact);

        assert_eq!(config.zone.as_deref(), Some("z1"));
        assert_eq!(config.region.as_deref(), Some("r1"));
        assert!(!config.dry_run);
        assert_eq!(config.strategy, Strategy::Exact);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Pairwise.to_string(), "pairwise");
        assert_eq!(Strategy::Exact.to_string(), "exact");
    }
}
