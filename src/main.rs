//! `rebalancer` — CLI entry point.
//!
//! Thin wrapper around [`rebalancer::balance_table`]: parse flags, set up
//! tracing, point an RPC client at the metadata service, run one pass.
//!
//! # Usage
//!
//! ```text
//! rebalancer --table-id 74                       # dry run (default)
//! rebalancer --table-id 74 --dry-run=false       # send the operators
//! rebalancer --table-id 74 --show-only           # distribution only
//! rebalancer --table-id 74 --zone z1 --region r1 # filter nodes
//! rebalancer --table-id 74 --strategy exact      # exact targets
//! ```

use clap::{Parser, ValueEnum};
use tracing::error;

use rebalancer::{balance_table, BalanceConfig, RpcConfig, RpcMetaClient, Strategy, TableId};

#[derive(Parser)]
#[command(
    name = "rebalancer",
    version,
    about = "Region replica balancer for distributed storage clusters"
)]
struct Cli {
    /// Table whose regions are balanced.
    #[arg(long)]
    table_id: TableId,

    /// Restrict balanceable nodes to this zone label.
    #[arg(long)]
    zone: Option<String>,

    /// Restrict balanceable nodes to this region label.
    #[arg(long)]
    region: Option<String>,

    /// Log the operator commands without sending them.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    dry_run: bool,

    /// Print the region distribution and stop.
    #[arg(long)]
    show_only: bool,

    /// Balancing strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::Pairwise)]
    strategy: StrategyArg,

    /// Address of the cluster-metadata service.
    #[arg(long, default_value = "127.0.0.1:2379")]
    meta_addr: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Greedy pairwise balancing toward the simple average.
    Pairwise,
    /// Exact per-node targets with fair remainder distribution.
    Exact,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Pairwise => Strategy::Pairwise,
            StrategyArg::Exact => Strategy::Exact,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_tracing();

    let config = {
        let mut config = BalanceConfig::new(cli.table_id)
            .with_dry_run(cli.dry_run)
            .with_show_only(cli.show_only)
            .with_strategy(cli.strategy.into());
        if let Some(zone) = cli.zone {
            config = config.with_zone(zone);
        }
        if let Some(region) = cli.region {
            config = config.with_region(region);
        }
        config
    };

    let meta = RpcMetaClient::new(RpcConfig::new(cli.meta_addr));

    match balance_table(&meta, &config).await {
        Ok(report) => {
            println!(
                "balanced table {}: {} nodes, {} regions, {} operations planned, {} regions issued{}",
                config.table_id,
                report.node_count,
                report.total_regions,
                report.ops_planned,
                report.regions_issued,
                if report.dry_run { " (dry run)" } else { "" },
            );
        }
        Err(e) => {
            error!("balance failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Initialize the `tracing` subscriber.
///
/// Respects `RUST_LOG` if set, defaults to `info` otherwise.
fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_table_id() {
        assert!(Cli::try_parse_from(["rebalancer"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["rebalancer", "--table-id", "74"]).unwrap();
        assert_eq!(cli.table_id, 74);
        assert!(cli.dry_run, "dry run must be the default");
        assert!(!cli.show_only);
        assert!(matches!(cli.strategy, StrategyArg::Pairwise));
        assert_eq!(cli.meta_addr, "127.0.0.1:2379");
    }

    #[test]
    fn test_cli_dry_run_can_be_disabled() {
        let cli =
            Cli::try_parse_from(["rebalancer", "--table-id", "74", "--dry-run", "false"]).unwrap();
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_strategy_and_filters() {
        let cli = Cli::try_parse_from([
            "rebalancer",
            "--table-id",
            "74",
            "--strategy",
            "exact",
            "--zone",
            "z1",
            "--region",
            "r1",
        ])
        .unwrap();

        assert!(matches!(cli.strategy, StrategyArg::Exact));
        assert_eq!(cli.zone.as_deref(), Some("z1"));
        assert_eq!(cli.region.as_deref(), Some("r1"));
    }
}
