//! Operator emission.
//!
//! Turns planned migration operations into effects: log lines in dry-run
//! mode, `transfer_region` calls against the metadata service otherwise.
//! Issuance is strictly sequential and the first failure aborts the rest
//! of the pass. Transfers already accepted by the service stand (there is
//! no rollback); re-running the balancer converges from wherever the
//! aborted pass left the cluster.

use tracing::info;

use crate::error::Result;
use crate::meta::MetaClient;
use crate::types::MigrationOp;

/// Emits migration operations, one region transfer at a time.
#[derive(Debug)]
pub struct OperatorEmitter<'a> {
    meta: &'a dyn MetaClient,
    dry_run: bool,
    issued: usize,
}

impl<'a> OperatorEmitter<'a> {
    /// Create an emitter for one balancing pass.
    pub fn new(meta: &'a dyn MetaClient, dry_run: bool) -> Self {
        Self {
            meta,
            dry_run,
            issued: 0,
        }
    }

    /// Regions issued to the service so far (always zero in dry run).
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Emit one operation.
    ///
    /// Errors propagate immediately; the caller must not emit further
    /// operations from the same pass afterwards.
    pub async fn emit(&mut self, op: &MigrationOp) -> Result<()> {
        for &region in &op.regions {
            if self.dry_run {
                info!(
                    "operator add transfer-region {} {} {}",
                    region, op.from_node, op.to_node
                );
            } else {
                info!(
                    region_id = region,
                    from_node = op.from_node,
                    to_node = op.to_node,
                    "transfer region"
                );
                self.meta
                    .transfer_region(region, op.from_node, op.to_node)
                    .await?;
                self.issued += 1;
            }
        }
        Ok(())
    }
}
