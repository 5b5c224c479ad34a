//! Cluster-metadata service interface.
//!
//! This module defines a generic trait for the external metadata service
//! the balancer collaborates with, so different backends can be plugged in
//! (an RPC endpoint, an in-memory fixture for tests, etc.).
//!
//! The balancer itself never touches region data: it asks the service which
//! nodes exist, what key range a table covers, and which regions each node
//! holds in that range, then asks it to move regions one at a time.

pub mod rpc;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::MetaError;
use crate::types::{NodeId, NodeRegionSet, RegionId, TableId};

pub use rpc::{RpcConfig, RpcMetaClient};

/// Collaborator interface to the cluster-metadata service.
///
/// All calls are made sequentially from a single balancing pass; a failing
/// call aborts the pass and is surfaced to the caller unchanged.
#[async_trait]
pub trait MetaClient: Send + Sync + std::fmt::Debug {
    /// List the nodes eligible for balancing, optionally filtered by zone
    /// and region labels.
    ///
    /// Fails if the service is unreachable or the filters match no
    /// eligible node.
    async fn list_balanceable_nodes(
        &self,
        zone: Option<&str>,
        region: Option<&str>,
    ) -> Result<Vec<NodeId>, MetaError>;

    /// Resolve a table to its `[start_key, end_key)` byte range.
    async fn table_key_range(&self, table_id: TableId) -> Result<(Vec<u8>, Vec<u8>), MetaError>;

    /// Fetch the region assignment of each node within a key range.
    ///
    /// Only nodes holding at least one region in range are returned; an
    /// empty result means there is nothing to balance.
    async fn node_snapshots(
        &self,
        nodes: &[NodeId],
        start_key: &[u8],
        end_key: &[u8],
    ) -> Result<Vec<NodeRegionSet>, MetaError>;

    /// Ask the service to move one region between nodes.
    ///
    /// Fire-and-forget: success means the request was accepted, not that
    /// the move has completed.
    async fn transfer_region(
        &self,
        region: RegionId,
        from: NodeId,
        to: NodeId,
    ) -> Result<(), MetaError>;
}

/// In-memory metadata service backed by a fixed cluster state.
///
/// Useful in tests and demos: it serves a static assignment for a single
/// table and records every transfer it accepts. An optional failure point
/// makes the Nth transfer call fail, for exercising the abort path.
#[derive(Debug, Default)]
pub struct StaticMetaClient {
    nodes: Vec<NodeRegionSet>,
    key_ranges: HashMap<TableId, (Vec<u8>, Vec<u8>)>,
    issued: Mutex<Vec<(RegionId, NodeId, NodeId)>>,
    fail_after: Option<usize>,
}

impl StaticMetaClient {
    /// Create a fixture serving the given assignment.
    pub fn new(nodes: Vec<NodeRegionSet>) -> Self {
        Self {
            nodes,
            ..Default::default()
        }
    }

    /// Register a key range for a table.
    pub fn with_table(mut self, table_id: TableId, start: Vec<u8>, end: Vec<u8>) -> Self {
        self.key_ranges.insert(table_id, (start, end));
        self
    }

    /// Make the transfer call fail once `n` transfers have been accepted.
    pub fn with_fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Transfers accepted so far, in issue order.
    pub fn issued(&self) -> Vec<(RegionId, NodeId, NodeId)> {
        self.issued.lock().clone()
    }
}

#[async_trait]
impl MetaClient for StaticMetaClient {
    async fn list_balanceable_nodes(
        &self,
        _zone: Option<&str>,
        _region: Option<&str>,
    ) -> Result<Vec<NodeId>, MetaError> {
        if self.nodes.is_empty() {
            return Err(MetaError::Remote("no eligible nodes".to_string()));
        }
        Ok(self.nodes.iter().map(|n| n.id).collect())
    }

    async fn table_key_range(&self, table_id: TableId) -> Result<(Vec<u8>, Vec<u8>), MetaError> {
        self.key_ranges
            .get(&table_id)
            .cloned()
            .ok_or_else(|| MetaError::Remote(format!("unknown table {table_id}")))
    }

    async fn node_snapshots(
        &self,
        nodes: &[NodeId],
        _start_key: &[u8],
        _end_key: &[u8],
    ) -> Result<Vec<NodeRegionSet>, MetaError> {
        Ok(self
            .nodes
            .iter()
            .filter(|n| nodes.contains(&n.id) && n.region_count() > 0)
            .cloned()
            .collect())
    }

    async fn transfer_region(
        &self,
        region: RegionId,
        from: NodeId,
        to: NodeId,
    ) -> Result<(), MetaError> {
        let mut issued = self.issued.lock();
        if let Some(limit) = self.fail_after {
            if issued.len() >= limit {
                return Err(MetaError::Remote("transfer rejected".to_string()));
            }
        }
        issued.push((region, from, to));
        Ok(())
    }
}
