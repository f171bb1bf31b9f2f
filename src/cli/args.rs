use crate::config::LedgerConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay account and transfer files through the ledger engine
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Replay account and transfer files through the ledger engine", long_about = None)]
pub struct CliArgs {
    /// Accounts CSV file (owner,kind,balance) opened before any transfer
    #[arg(long = "accounts", value_name = "ACCOUNTS", help = "Path to the accounts CSV file")]
    pub accounts_file: PathBuf,

    /// Transfers CSV file (from,to,amount)
    #[arg(value_name = "TRANSFERS", help = "Path to the transfers CSV file")]
    pub transfers_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' for file order or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of transfers per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transfers per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads applying a batch (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Worker threads applying a batch (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// TOML configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Report written to stdout after the replay
    #[arg(long = "report", value_name = "REPORT", default_value = "accounts")]
    pub report: ReportKind,
}

/// Available replay strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Final state of every account
    Accounts,
    /// Every recorded ledger entry
    Transactions,
}

impl CliArgs {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_overrides(&self, mut config: LedgerConfig) -> LedgerConfig {
        if let Some(batch_size) = self.batch_size {
            config.replay.batch_size = batch_size;
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.replay.max_concurrent = max_concurrent;
        }
        config
    }
}
