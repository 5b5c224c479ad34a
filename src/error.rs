//! Error types for the balancer.

use std::io;
use thiserror::Error;

use crate::types::TableId;

/// Result type alias for balancer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the balancer.
#[derive(Error, Debug)]
pub enum Error {
    /// Metadata-service (collaborator) failures. Propagated unchanged,
    /// never retried here.
    #[error("meta service error: {0}")]
    Meta(#[from] MetaError),

    /// Fewer than two balanceable nodes matched the filters.
    #[error("balanceable nodes less than 2 (found {found})")]
    NotEnoughNodes { found: usize },

    /// The table holds no regions on any balanceable node in the
    /// requested range.
    #[error("table {table_id} has no regions on balanceable nodes")]
    NoRegionsInRange { table_id: TableId },

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
}

/// Metadata-service communication errors.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Connection to the service failed.
    #[error("connection failed to {addr}: {reason}")]
    ConnectionFailed { addr: String, reason: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Wire serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The service answered with a response of the wrong kind.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Error reported by the service itself.
    #[error("remote error: {0}")]
    Remote(String),

    /// I/O error on the connection.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<bincode::Error> for MetaError {
    fn from(e: bincode::Error) -> Self {
        MetaError::Serialization(e.to_string())
    }
}
