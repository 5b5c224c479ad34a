//! RPC client for the cluster-metadata service.
//!
//! Wire format: a bincode-serialized request or response enum behind a
//! u32 big-endian length prefix. The client opens one connection per
//! request; the balancer issues calls strictly sequentially, so there is
//! nothing to pool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::MetaClient;
use crate::error::MetaError;
use crate::types::{NodeId, NodeRegionSet, RegionId, TableId};

/// Upper bound on a single frame; a snapshot response for a large table
/// stays well under this.
const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

/// Request sent to the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetaRequest {
    /// List nodes eligible for balancing.
    ListNodes {
        zone: Option<String>,
        region: Option<String>,
    },

    /// Resolve a table's key range.
    TableKeyRange { table_id: TableId },

    /// Fetch per-node region assignments within a key range.
    NodeSnapshots {
        nodes: Vec<NodeId>,
        start_key: Vec<u8>,
        end_key: Vec<u8>,
    },

    /// Request a single-region move.
    TransferRegion {
        region: RegionId,
        from: NodeId,
        to: NodeId,
    },
}

/// Response from the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetaResponse {
    /// Eligible node IDs.
    Nodes(Vec<NodeId>),

    /// A table's key range.
    KeyRange {
        start_key: Vec<u8>,
        end_key: Vec<u8>,
    },

    /// Per-node region assignments.
    Snapshots(Vec<NodeRegionSet>),

    /// A transfer request was accepted.
    Accepted,

    /// The service rejected the request.
    Error(String),
}

/// Encode a message to bytes.
pub fn encode_message<T: Serialize>(msg: &T) -> Result<Vec<u8>, MetaError> {
    Ok(bincode::serialize(msg)?)
}

/// Decode a message from bytes.
pub fn decode_message<'a, T: Deserialize<'a>>(data: &'a [u8]) -> Result<T, MetaError> {
    Ok(bincode::deserialize(data)?)
}

/// Frame a message with a length prefix for TCP transmission.
pub fn frame_message<T: Serialize>(msg: &T) -> Result<Vec<u8>, MetaError> {
    let data = encode_message(msg)?;
    let len = data.len() as u32;

    let mut framed = Vec::with_capacity(4 + data.len());
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(&data);

    Ok(framed)
}

/// Configuration for the RPC metadata client.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Address of the metadata service.
    pub addr: String,

    /// Timeout for a full request/response round trip.
    pub request_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:2379".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RpcConfig {
    /// Create a configuration for the given service address.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Metadata client speaking the framed bincode protocol over TCP.
#[derive(Debug, Clone)]
pub struct RpcMetaClient {
    config: RpcConfig,
}

impl RpcMetaClient {
    /// Create a client from a configuration.
    pub fn new(config: RpcConfig) -> Self {
        Self { config }
    }

    /// Create a client for the given address with default timeouts.
    pub fn connect_to(addr: impl Into<String>) -> Self {
        Self::new(RpcConfig::new(addr))
    }

    /// Send one request and wait for its response.
    async fn call(&self, request: &MetaRequest) -> Result<MetaResponse, MetaError> {
        let round_trip = async {
            let mut stream = TcpStream::connect(&self.config.addr).await.map_err(|e| {
                MetaError::ConnectionFailed {
                    addr: self.config.addr.clone(),
                    reason: e.to_string(),
                }
            })?;

            stream.write_all(&frame_message(request)?).await?;
            stream.flush().await?;

            let mut len_buf = [0u8; 4];
            stream.read_exact(&mut len_buf).await?;
            let len = u32::from_be_bytes(len_buf);
            if len > MAX_FRAME_LEN {
                return Err(MetaError::Serialization(format!(
                    "frame of {len} bytes exceeds limit"
                )));
            }

            let mut data = vec![0u8; len as usize];
            stream.read_exact(&mut data).await?;
            decode_message::<MetaResponse>(&data)
        };

        match tokio::time::timeout(self.config.request_timeout, round_trip).await {
            Ok(result) => match result? {
                MetaResponse::Error(msg) => Err(MetaError::Remote(msg)),
                response => Ok(response),
            },
            Err(_) => Err(MetaError::Timeout),
        }
    }
}

#[async_trait]
impl MetaClient for RpcMetaClient {
    async fn list_balanceable_nodes(
        &self,
        zone: Option<&str>,
        region: Option<&str>,
    ) -> Result<Vec<NodeId>, MetaError> {
        let request = MetaRequest::ListNodes {
            zone: zone.map(str::to_string),
            region: region.map(str::to_string),
        };
        match self.call(&request).await? {
            MetaResponse::Nodes(nodes) => Ok(nodes),
            other => Err(MetaError::UnexpectedResponse(format!("{other:?}"))),
        }
    }

    async fn table_key_range(&self, table_id: TableId) -> Result<(Vec<u8>, Vec<u8>), MetaError> {
        match self.call(&MetaRequest::TableKeyRange { table_id }).await? {
            MetaResponse::KeyRange { start_key, end_key } => Ok((start_key, end_key)),
            other => Err(MetaError::UnexpectedResponse(format!("{other:?}"))),
        }
    }

    async fn node_snapshots(
        &self,
        nodes: &[NodeId],
        start_key: &[u8],
        end_key: &[u8],
    ) -> Result<Vec<NodeRegionSet>, MetaError> {
        let request = MetaRequest::NodeSnapshots {
            nodes: nodes.to_vec(),
            start_key: start_key.to_vec(),
            end_key: end_key.to_vec(),
        };
        match self.call(&request).await? {
            MetaResponse::Snapshots(snapshots) => Ok(snapshots),
            other => Err(MetaError::UnexpectedResponse(format!("{other:?}"))),
        }
    }

    async fn transfer_region(
        &self,
        region: RegionId,
        from: NodeId,
        to: NodeId,
    ) -> Result<(), MetaError> {
        match self
            .call(&MetaRequest::TransferRegion { region, from, to })
            .await?
        {
            MetaResponse::Accepted => Ok(()),
            other => Err(MetaError::UnexpectedResponse(format!("{other:?}"))),
        }
    }
}
