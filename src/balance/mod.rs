//! Balancing strategies.
//!
//! Two strategies share one seam (produce migration operations from node
//! snapshots) and stay separate behind it:
//!
//! - [`PairwiseBalancer`]: greedy most-loaded/least-loaded pair walk.
//!   Approximate (drives toward the truncated average), meant to run
//!   against live per-table snapshots.
//! - [`ExactBalancer`]: fair-target planner. Hits precise per-node counts,
//!   computed offline from any snapshot set.
//!
//! Their guarantees differ, so neither replaces the other; callers pick by
//! [`Strategy`](crate::config::Strategy).

pub mod allocation;
pub mod pairwise;
pub mod plan;

pub use pairwise::balance_pairwise;
pub use plan::{pick_regions, plan_migrations, MigrationPlan};

use crate::config::Strategy;
use crate::types::{MigrationOp, NodeRegionSet};

/// A strategy that turns node snapshots into migration operations.
///
/// Implementations mutate the snapshots to the planned end state; the
/// snapshots belong to the calling pass and must not outlive it.
pub trait RegionBalancer: Send + Sync {
    /// Strategy name, for logging.
    fn name(&self) -> &'static str;

    /// Produce the operations for one balancing pass.
    fn plan(&self, nodes: &mut [NodeRegionSet]) -> Vec<MigrationOp>;
}

/// Greedy pairwise strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseBalancer;

impl RegionBalancer for PairwiseBalancer {
    fn name(&self) -> &'static str {
        "pairwise"
    }

    fn plan(&self, nodes: &mut [NodeRegionSet]) -> Vec<MigrationOp> {
        balance_pairwise(nodes)
    }
}

/// Exact fair-target strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactBalancer;

impl RegionBalancer for ExactBalancer {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn plan(&self, nodes: &mut [NodeRegionSet]) -> Vec<MigrationOp> {
        let plan = plan_migrations(nodes);
        plan.ops.into_iter().filter(|op| !op.is_empty()).collect()
    }
}

/// Resolve a configured strategy to its implementation.
pub fn balancer_for(strategy: Strategy) -> Box<dyn RegionBalancer> {
    match strategy {
        Strategy::Pairwise => Box::new(PairwiseBalancer),
        Strategy::Exact => Box::new(ExactBalancer),
    }
}
