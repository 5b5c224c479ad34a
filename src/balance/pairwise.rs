//! Greedy pairwise balancing.
//!
//! Walks pairs of (most-loaded, least-loaded) nodes and moves regions from
//! the heavy side to the light side until both approach the truncated
//! average. The result is approximate: with a non-zero remainder, up to
//! `n - 1` regions stay where they are.

use tracing::debug;

use super::allocation::{even_target, sort_by_load_desc};
use crate::types::{total_regions, MigrationOp, NodeRegionSet, RegionId};

/// Balance the snapshots toward the truncated average.
///
/// Sorts the nodes by load descending (stable) and mutates them as it
/// moves regions. Each moved region becomes its own single-region
/// operation, in move order, so the caller can issue them one at a time
/// and stop cleanly on the first failure.
pub fn balance_pairwise(nodes: &mut [NodeRegionSet]) -> Vec<MigrationOp> {
    let expected = even_target(total_regions(nodes), nodes.len());
    sort_by_load_desc(nodes);

    let mut ops = Vec::new();

    for i in 0..nodes.len().saturating_sub(1) {
        for j in (i + 1..nodes.len()).rev() {
            let (left, right) = nodes.split_at_mut(j);
            let from = &mut left[i];
            let to = &mut right[0];

            let from_before = from.region_count();
            let to_before = to.region_count();

            let candidates: Vec<RegionId> = from.regions.iter().copied().collect();
            let mut moved = 0;
            for region in candidates {
                // Re-check before every candidate: either side reaching
                // the average ends this pair.
                if from.region_count() <= expected || to.region_count() >= expected {
                    break;
                }
                if to.holds(region) {
                    continue;
                }

                from.regions.remove(&region);
                to.regions.insert(region);

                let mut op = MigrationOp::new(from.id, to.id);
                op.regions.insert(region);
                ops.push(op);
                moved += 1;
            }

            debug!(
                from_node = from.id,
                to_node = to.id,
                from_before,
                from_after = from.region_count(),
                to_before,
                to_after = to.region_count(),
                moved,
                "checked transfer pair"
            );
        }
    }

    ops
}
