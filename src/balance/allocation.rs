//! Pure target-count calculations.
//!
//! Both balancing strategies start from the same question: given the total
//! region count, how many regions should each node end up with? The two
//! policies answer it differently: the pairwise balancer only drives nodes
//! toward the truncated average, while the exact planner needs targets
//! that sum to the total exactly.

use crate::types::NodeRegionSet;

/// Truncated-average target used by the pairwise balancer.
///
/// The remainder (`total mod node_count`) is never explicitly assigned;
/// up to `node_count - 1` regions stay unbalanced.
pub fn even_target(total: usize, node_count: usize) -> usize {
    if node_count == 0 {
        return 0;
    }
    total / node_count
}

/// Fair per-node targets used by the exact planner.
///
/// Index-aligned with a load-descending sort of the nodes: the first
/// `total mod node_count` (most loaded) nodes get `⌊total/node_count⌋ + 1`
/// regions, the rest get `⌊total/node_count⌋`. Targets always sum to
/// `total` exactly.
pub fn fair_targets(total: usize, node_count: usize) -> Vec<usize> {
    if node_count == 0 {
        return Vec::new();
    }

    let average = total / node_count;
    let remainder = total % node_count;

    let mut targets = Vec::with_capacity(node_count);
    for i in 0..node_count {
        let extra = if i < remainder { 1 } else { 0 };
        targets.push(average + extra);
    }
    targets
}

/// Stable sort by region count, descending. Ties keep input order.
pub fn sort_by_load_desc(nodes: &mut [NodeRegionSet]) {
    nodes.sort_by(|lhs, rhs| rhs.region_count().cmp(&lhs.region_count()));
}
