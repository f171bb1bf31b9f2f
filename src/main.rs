//! Ledger engine replay CLI
//!
//! Opens the accounts listed in one CSV file, replays the transfers listed in
//! another through the ledger engine, and prints a report to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --accounts accounts.csv transfers.csv > balances.csv
//! cargo run -- --accounts accounts.csv --report transactions transfers.csv
//! cargo run -- --accounts accounts.csv --strategy async --batch-size 2000 --max-concurrent 8 transfers.csv
//! cargo run -- --config ledger.toml --accounts accounts.csv transfers.csv
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the configured level.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (bad configuration, file not found, file not readable, etc.)

use rust_ledger_engine::cli;
use rust_ledger_engine::config::LedgerConfig;
use rust_ledger_engine::core::LedgerEngine;
use rust_ledger_engine::strategy::{self, BatchConfig, ReplayInput};
use rust_ledger_engine::telemetry;
use std::process;

fn main() {
    let args = cli::parse_args();

    let config = match LedgerConfig::load(args.config_file.as_deref()) {
        Ok(config) => args.apply_overrides(config),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    telemetry::init(&config.logging);

    let engine = LedgerEngine::in_memory().with_reference_prefix(config.reference_prefix.clone());

    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(BatchConfig::from(&config.replay))
        } else {
            None
        };
        strategy::create_strategy(args.strategy, batch_config)
    };

    let input = ReplayInput {
        accounts_path: &args.accounts_file,
        transfers_path: &args.transfers_file,
        report: args.report,
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy::replay(&engine, strategy.as_ref(), &input, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
