//! Core types used throughout the balancer.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Node identifier in the cluster.
pub type NodeId = u64;

/// Region identifier. A region is an indivisible unit of data assigned to
/// exactly one balanceable node at a time.
pub type RegionId = u64;

/// Table identifier, as issued by the metadata service.
pub type TableId = i64;

/// Snapshot of one node's region assignment.
///
/// Fetched from the metadata service at the start of a balancing pass and
/// mutated in place while the pass plans moves. A snapshot is owned by a
/// single pass and discarded afterwards; it is never shared across passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRegionSet {
    /// Node identifier.
    pub id: NodeId,
    /// Regions currently assigned to this node.
    pub regions: HashSet<RegionId>,
}

impl NodeRegionSet {
    /// Create a snapshot from a list of region IDs.
    pub fn new(id: NodeId, regions: impl IntoIterator<Item = RegionId>) -> Self {
        Self {
            id,
            regions: regions.into_iter().collect(),
        }
    }

    /// Number of regions currently assigned to this node.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Check whether this node holds a specific region.
    pub fn holds(&self, region: RegionId) -> bool {
        self.regions.contains(&region)
    }
}

/// A single sender→receiver transfer covering one or more regions.
///
/// Produced by a balancing strategy, consumed by the operator emitter.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOp {
    /// Node the regions leave.
    pub from_node: NodeId,
    /// Node the regions arrive at.
    pub to_node: NodeId,
    /// Regions moved by this operation.
    pub regions: HashSet<RegionId>,
}

impl MigrationOp {
    /// Create a new migration operation.
    pub fn new(from_node: NodeId, to_node: NodeId) -> Self {
        Self {
            from_node,
            to_node,
            regions: HashSet::new(),
        }
    }

    /// Number of regions this operation moves.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Check if the operation moves nothing.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Summary of one balancing run.
#[derive(Debug, Clone, Default)]
pub struct BalanceReport {
    /// Number of balanceable nodes discovered.
    pub node_count: usize,
    /// Total regions found in the requested range.
    pub total_regions: usize,
    /// Per-node region count everyone is driven toward.
    pub expected_per_node: usize,
    /// Operations produced by the strategy.
    pub ops_planned: usize,
    /// Regions actually sent to the metadata service (zero in dry run).
    pub regions_issued: usize,
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Whether the run stopped after showing the distribution.
    pub show_only: bool,
}

/// Sum of region counts across a set of snapshots.
pub fn total_regions(nodes: &[NodeRegionSet]) -> usize {
    nodes.iter().map(NodeRegionSet::region_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_region_set_basics() {
        let node = NodeRegionSet::new(1, [10, 11, 12]);
        assert_eq!(node.id, 1);
        assert_eq!(node.region_count(), 3);
        assert!(node.holds(11));
        assert!(!node.holds(99));
    }

    #[test]
    fn test_node_region_set_dedups() {
        let node = NodeRegionSet::new(1, [7, 7, 7]);
        assert_eq!(node.region_count(), 1);
    }

    #[test]
    fn test_migration_op() {
        let mut op = MigrationOp::new(1, 2);
        assert!(op.is_empty());

        op.regions.insert(42);
        assert_eq!(op.region_count(), 1);
        assert_eq!(op.from_node, 1);
        assert_eq!(op.to_node, 2);
    }

    #[test]
    fn test_total_regions() {
        let nodes = vec![
            NodeRegionSet::new(1, [1, 2, 3]),
            NodeRegionSet::new(2, [4, 5]),
            NodeRegionSet::new(3, []),
        ];
        assert_eq!(total_regions(&nodes), 5);
    }

    #[test]
    fn test_snapshot_serialization() {
        let node = NodeRegionSet::new(3, [1, 2]);
        let bytes = bincode::serialize(&node).unwrap();
        let decoded: NodeRegionSet = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded.id, 3);
        assert_eq!(decoded.regions, node.regions);
    }
}
