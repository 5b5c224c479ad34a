//! One balancing pass, end to end.
//!
//! Discovery, preconditions, snapshot fetch, distribution report, strategy
//! run, operator emission. Every collaborator call is awaited in turn from
//! this single path; a failing call surfaces immediately and the pass
//! performs no further work.

use tracing::info;

use crate::balance::allocation::even_target;
use crate::balance::balancer_for;
use crate::config::BalanceConfig;
use crate::error::{Error, Result};
use crate::meta::MetaClient;
use crate::operator::OperatorEmitter;
use crate::types::{total_regions, BalanceReport};

/// Run one balancing pass for a table.
///
/// Preconditions are checked before any planning: fewer than two
/// balanceable nodes and a table with no regions in range are distinct
/// errors reported with no partial work done. A cluster that is already
/// balanced is not an error; the pass simply emits nothing.
pub async fn balance_table(meta: &dyn MetaClient, config: &BalanceConfig) -> Result<BalanceReport> {
    let node_ids = meta
        .list_balanceable_nodes(config.zone.as_deref(), config.region.as_deref())
        .await?;
    if node_ids.len() < 2 {
        return Err(Error::NotEnoughNodes {
            found: node_ids.len(),
        });
    }

    info!(
        table_id = config.table_id,
        zone = config.zone.as_deref().unwrap_or(""),
        region = config.region.as_deref().unwrap_or(""),
        dry_run = config.dry_run,
        show_only = config.show_only,
        strategy = %config.strategy,
        nodes = node_ids.len(),
        node_ids = ?node_ids,
        "balance run"
    );
    if config.dry_run && !config.show_only {
        info!("dry-run mode: operator commands are logged, not sent");
    }

    let (start_key, end_key) = meta.table_key_range(config.table_id).await?;
    info!(
        table_id = config.table_id,
        start_key = %hex(&start_key),
        end_key = %hex(&end_key),
        "table key range"
    );

    let mut snapshots = meta
        .node_snapshots(&node_ids, &start_key, &end_key)
        .await?;
    if snapshots.is_empty() {
        return Err(Error::NoRegionsInRange {
            table_id: config.table_id,
        });
    }

    let total = total_regions(&snapshots);
    for node in &snapshots {
        let percentage = 100.0 * node.region_count() as f64 / total as f64;
        info!(
            node_id = node.id,
            regions = node.region_count(),
            percentage = format!("{percentage:.2}%"),
            "node region distribution"
        );
    }
    let expected = even_target(total, snapshots.len());
    info!(
        total_regions = total,
        expected_per_node = expected,
        "distribution summary"
    );

    let mut report = BalanceReport {
        node_count: node_ids.len(),
        total_regions: total,
        expected_per_node: expected,
        dry_run: config.dry_run,
        show_only: config.show_only,
        ..Default::default()
    };

    if config.show_only {
        return Ok(report);
    }

    let balancer = balancer_for(config.strategy);
    info!(strategy = balancer.name(), "balance begin");
    let ops = balancer.plan(&mut snapshots);
    report.ops_planned = ops.len();

    let mut emitter = OperatorEmitter::new(meta, config.dry_run);
    for op in &ops {
        // An emit failure aborts here: operations already issued stand,
        // the rest of the pass is dropped.
        emitter.emit(op).await?;
    }
    report.regions_issued = emitter.issued();

    info!(
        ops = report.ops_planned,
        issued = report.regions_issued,
        "balance end"
    );

    Ok(report)
}

/// Lowercase hex rendering of a key for logs.
fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
