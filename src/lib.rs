//! Region replica balancer for distributed storage clusters.
//!
//! This crate computes minimal-disruption region moves that equalize the
//! per-node region count for one table, and issues them through an
//! external cluster-metadata service:
//!
//! - **Pairwise strategy** for live balancing toward the simple average
//! - **Exact strategy** for precise per-node targets with fair remainder
//!   distribution
//! - **Pluggable metadata backend** behind the [`MetaClient`] trait
//!
//! The balancer never touches region data itself: discovery, key-range
//! resolution, snapshot fetch, and the actual transfer are all delegated
//! to the metadata service. It keeps no state between runs, so a pass that
//! aborts half-way is safe to re-run: the next pass converges from
//! wherever the cluster ended up.
//!
//! # Example
//!
//! ```rust
//! use rebalancer::{balance_table, BalanceConfig, NodeRegionSet, StaticMetaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // An in-memory stand-in for the metadata service.
//!     let meta = StaticMetaClient::new(vec![
//!         NodeRegionSet::new(1, [1, 2, 3, 4]),
//!         NodeRegionSet::new(2, [5, 6]),
//!     ])
//!     .with_table(42, b"t\x2a_r".to_vec(), b"t\x2a_s".to_vec());
//!
//!     // Dry run by default: operator commands are logged, not sent.
//!     let report = balance_table(&meta, &BalanceConfig::new(42)).await?;
//!     println!("planned {} operations", report.ops_planned);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! CLI ──▶ balance_table
//!             │
//!             ├─▶ MetaClient       discovery, key range, snapshots
//!             │
//!             ├─▶ RegionBalancer   pairwise | exact
//!             │
//!             └─▶ OperatorEmitter  dry-run log | transfer_region
//! ```
//!
//! A balancing pass owns its snapshots exclusively: they are fetched,
//! mutated in place while planning, and discarded. Nothing is shared
//! across passes or concurrent callers.

pub mod balance;
pub mod config;
pub mod error;
pub mod meta;
pub mod operator;
pub mod schedule;
pub mod types;

// Re-export main types for convenience
pub use config::{BalanceConfig, Strategy};
pub use error::{Error, MetaError, Result};
pub use schedule::balance_table;
pub use types::{BalanceReport, MigrationOp, NodeId, NodeRegionSet, RegionId, TableId};

// Re-export strategy types
pub use balance::{
    balance_pairwise, plan_migrations, ExactBalancer, MigrationPlan, PairwiseBalancer,
    RegionBalancer,
};

// Re-export metadata backends
pub use meta::{MetaClient, RpcConfig, RpcMetaClient, StaticMetaClient};

// Re-export the emitter for callers driving their own passes
pub use operator::OperatorEmitter;
