//! Exact migration planning.
//!
//! Computes fair per-node targets and the transfer operations that hit
//! them exactly: classify nodes into senders and receivers by comparing
//! current count against target, then match every sender against the
//! receiver list until its excess is drained. Which specific regions move
//! is unconstrained; only the aggregate counts are guaranteed.

use tracing::debug;

use super::allocation::{fair_targets, sort_by_load_desc};
use crate::types::{total_regions, MigrationOp, NodeRegionSet, RegionId};

/// Output of one exact planning pass.
///
/// Sender and receiver indices refer to the load-descending order the
/// planner sorts the snapshots into.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    /// Indices of nodes above their target.
    pub senders: Vec<usize>,
    /// Indices of nodes below their target.
    pub receivers: Vec<usize>,
    /// Transfer operations, in planning order.
    pub ops: Vec<MigrationOp>,
}

impl MigrationPlan {
    /// Check if the plan moves nothing.
    pub fn is_empty(&self) -> bool {
        self.ops.iter().all(MigrationOp::is_empty)
    }

    /// Total number of regions moved across all operations.
    pub fn regions_moved(&self) -> usize {
        self.ops.iter().map(MigrationOp::region_count).sum()
    }
}

/// Plan the transfers that bring every node to its fair target.
///
/// Sorts the snapshots by load descending (stable) and mutates them as it
/// selects regions, so after the call the snapshots reflect the planned
/// end state. A cluster already at its targets yields an empty plan.
pub fn plan_migrations(nodes: &mut [NodeRegionSet]) -> MigrationPlan {
    let total = total_regions(nodes);
    sort_by_load_desc(nodes);
    let targets = fair_targets(total, nodes.len());

    let mut senders = Vec::new();
    let mut receivers = Vec::new();
    let mut sender_volumes = Vec::new();
    let mut receiver_volumes = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        let count = node.region_count();
        if count > targets[i] {
            senders.push(i);
            sender_volumes.push(count - targets[i]);
        }
        if count < targets[i] {
            receivers.push(i);
            receiver_volumes.push(targets[i] - count);
        }
    }

    let mut ops = Vec::new();

    for (si, &sender) in senders.iter().enumerate() {
        // One sender may feed many receivers; keep scanning the receiver
        // list until this sender's excess is gone.
        while sender_volumes[si] > 0 {
            for (ri, &receiver) in receivers.iter().enumerate() {
                if sender_volumes[si] == 0 {
                    break;
                }
                if receiver_volumes[ri] == 0 {
                    continue;
                }

                let batch = sender_volumes[si].min(receiver_volumes[ri]);
                sender_volumes[si] -= batch;
                receiver_volumes[ri] -= batch;

                let (from, to) = pair_mut(nodes, sender, receiver);
                debug!(
                    from_node = from.id,
                    to_node = to.id,
                    regions = batch,
                    "matched sender to receiver"
                );
                ops.push(pick_regions(batch, from, to));
            }
        }
    }

    MigrationPlan {
        senders,
        receivers,
        ops,
    }
}

/// Select `count` regions from the sender and build the operation moving
/// them to the receiver.
///
/// Regions the receiver already holds are skipped without consuming the
/// request counter, so the operation carries exactly `count` distinct
/// regions whenever the sender has that many the receiver lacks. Selected
/// regions move between the two sets immediately, which keeps them from
/// being picked again later in the same pass.
pub fn pick_regions(
    count: usize,
    from: &mut NodeRegionSet,
    to: &mut NodeRegionSet,
) -> MigrationOp {
    let mut op = MigrationOp::new(from.id, to.id);
    if count == 0 {
        return op;
    }

    let candidates: Vec<RegionId> = from.regions.iter().copied().collect();
    for region in candidates {
        if op.region_count() == count {
            break;
        }
        if to.holds(region) {
            continue;
        }
        from.regions.remove(&region);
        to.regions.insert(region);
        op.regions.insert(region);
    }

    op
}

/// Mutable references to two distinct slice elements.
fn pair_mut(
    nodes: &mut [NodeRegionSet],
    a: usize,
    b: usize,
) -> (&mut NodeRegionSet, &mut NodeRegionSet) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = nodes.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = nodes.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;
    use std::collections::HashSet;

    fn moved_out(ops: &[MigrationOp], node: NodeId) -> HashSet<RegionId> {
        ops.iter()
            .filter(|op| op.from_node == node)
            .flat_map(|op| op.regions.iter().copied())
            .collect()
    }

    fn moved_in(ops: &[MigrationOp], node: NodeId) -> HashSet<RegionId> {
        ops.iter()
            .filter(|op| op.to_node == node)
            .flat_map(|op| op.regions.iter().copied())
            .collect()
    }

    #[test]
    fn test_single_sender_single_receiver() {
        let mut nodes = vec![
            NodeRegionSet::new(1, [1, 2, 3]),
            NodeRegionSet::new(2, [4, 5]),
            NodeRegionSet::new(3, [6]),
        ];

        let plan = plan_migrations(&mut nodes);

        assert_eq!(plan.senders, vec![0]);
        assert_eq!(plan.receivers, vec![2]);
        assert_eq!(moved_out(&plan.ops, 1).len(), 1);
        assert_eq!(plan.regions_moved(), 1);
    }

    #[test]
    fn test_one_sender_many_receivers() {
        let mut nodes = vec![
            NodeRegionSet::new(1, [1, 2, 3, 4, 5]),
            NodeRegionSet::new(2, [6]),
            NodeRegionSet::new(3, [7]),
            NodeRegionSet::new(4, [8]),
            NodeRegionSet::new(5, [9]),
        ];

        let plan = plan_migrations(&mut nodes);

        // Targets after the descending sort are [2, 2, 2, 2, 1]: node 5
        // keeps its single region, the rest fill up from node 1.
        assert_eq!(plan.senders, vec![0]);
        assert_eq!(plan.receivers, vec![1, 2, 3]);

        let out = moved_out(&plan.ops, 1);
        assert_eq!(out.len(), 3);
        for receiver in [2, 3, 4] {
            assert_eq!(moved_in(&plan.ops, receiver).len(), 1);
        }

        let all_in: HashSet<_> = [2, 3, 4]
            .iter()
            .flat_map(|&r| moved_in(&plan.ops, r))
            .collect();
        assert_eq!(out, all_in);
    }

    #[test]
    fn test_many_senders_one_receiver() {
        let mut nodes = vec![
            NodeRegionSet::new(1, [1, 2, 3, 4, 5]),
            NodeRegionSet::new(2, [6, 7, 8, 9, 10]),
            NodeRegionSet::new(3, [11]),
        ];

        let plan = plan_migrations(&mut nodes);

        // Targets [4, 4, 3]: each loaded node sheds one region.
        assert_eq!(plan.senders, vec![0, 1]);
        assert_eq!(plan.receivers, vec![2]);
        assert_eq!(moved_out(&plan.ops, 1).len(), 1);
        assert_eq!(moved_out(&plan.ops, 2).len(), 1);

        let into_3 = moved_in(&plan.ops, 3);
        assert_eq!(into_3.len(), 2);

        let out: HashSet<_> = moved_out(&plan.ops, 1)
            .union(&moved_out(&plan.ops, 2))
            .copied()
            .collect();
        assert_eq!(out, into_3);
    }

    #[test]
    fn test_sender_volume_matches_excess() {
        let mut nodes = vec![
            NodeRegionSet::new(1, 0..9),
            NodeRegionSet::new(2, 9..12),
            NodeRegionSet::new(3, 12..14),
            NodeRegionSet::new(4, 14..15),
        ];
        // Total 15 over 4 nodes: targets [4, 4, 4, 3].
        let plan = plan_migrations(&mut nodes);

        assert_eq!(moved_out(&plan.ops, 1).len(), 5);
        assert_eq!(moved_in(&plan.ops, 2).len(), 1);
        assert_eq!(moved_in(&plan.ops, 3).len(), 2);
        assert_eq!(moved_in(&plan.ops, 4).len(), 2);
        assert_eq!(plan.regions_moved(), 5);
    }

    #[test]
    fn test_conservation() {
        let mut nodes = vec![
            NodeRegionSet::new(1, 0..10),
            NodeRegionSet::new(2, 10..13),
            NodeRegionSet::new(3, 13..15),
            NodeRegionSet::new(4, 15..16),
            NodeRegionSet::new(5, []),
        ];
        let plan = plan_migrations(&mut nodes);

        let all_out: HashSet<_> = (1..=5).flat_map(|n| moved_out(&plan.ops, n)).collect();
        let all_in: HashSet<_> = (1..=5).flat_map(|n| moved_in(&plan.ops, n)).collect();
        assert_eq!(all_out, all_in);

        // Every region still lives on exactly one node.
        let mut seen = HashSet::new();
        for node in &nodes {
            for &region in &node.regions {
                assert!(seen.insert(region), "region {region} duplicated");
            }
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn test_replanning_is_idempotent() {
        let mut nodes = vec![
            NodeRegionSet::new(1, 0..9),
            NodeRegionSet::new(2, 9..12),
            NodeRegionSet::new(3, 12..14),
        ];

        let first = plan_migrations(&mut nodes);
        assert!(!first.is_empty());

        // The pass left the snapshots at the planned end state; planning
        // again must find nothing to do.
        let second = plan_migrations(&mut nodes);
        assert!(second.senders.is_empty());
        assert!(second.receivers.is_empty());
        assert!(second.is_empty());
    }

    #[test]
    fn test_balanced_cluster_plans_nothing() {
        let mut nodes = vec![
            NodeRegionSet::new(1, [1, 2]),
            NodeRegionSet::new(2, [3, 4]),
            NodeRegionSet::new(3, [5, 6]),
        ];
        let plan = plan_migrations(&mut nodes);
        assert!(plan.senders.is_empty());
        assert!(plan.receivers.is_empty());
        assert!(plan.ops.is_empty());
    }

    #[test]
    fn test_node_with_zero_regions_is_not_an_error() {
        let mut nodes = vec![NodeRegionSet::new(1, 0..4), NodeRegionSet::new(2, [])];
        let plan = plan_migrations(&mut nodes);

        assert_eq!(plan.regions_moved(), 2);
        assert_eq!(nodes[0].region_count(), 2);
        assert_eq!(nodes[1].region_count(), 2);
    }

    #[test]
    fn test_picker_skips_shared_regions_without_charging() {
        // Region 3 already lives on both nodes; the picker must still
        // deliver one real move and must not touch the shared region.
        let mut from = NodeRegionSet::new(1, [1, 2, 3, 4]);
        let mut to = NodeRegionSet::new(2, [3, 9]);

        let op = pick_regions(1, &mut from, &mut to);

        assert_eq!(op.region_count(), 1);
        assert!(!op.regions.contains(&3));
        assert!(from.holds(3));
        assert_eq!(from.region_count(), 3);
    }

    #[test]
    fn test_picker_stops_at_exhausted_sender() {
        let mut from = NodeRegionSet::new(1, [1, 2]);
        let mut to = NodeRegionSet::new(2, []);

        let op = pick_regions(5, &mut from, &mut to);

        assert_eq!(op.region_count(), 2);
        assert_eq!(from.region_count(), 0);
        assert_eq!(to.region_count(), 2);
    }

    #[test]
    fn test_op_count_bounded_by_pairings() {
        let mut nodes = vec![
            NodeRegionSet::new(1, 0..12),
            NodeRegionSet::new(2, 12..20),
            NodeRegionSet::new(3, 20..21),
            NodeRegionSet::new(4, 21..22),
            NodeRegionSet::new(5, []),
        ];
        let plan = plan_migrations(&mut nodes);
        assert!(plan.ops.len() <= plan.senders.len() * plan.receivers.len());
    }
}
