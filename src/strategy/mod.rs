//! Replay strategies for driving the ledger engine from CSV files
//!
//! A replay opens the accounts listed in one file, submits the transfers
//! listed in another, then writes a report. This module defines the Strategy
//! pattern for the transfer phase, so that synchronous in-order replay and
//! concurrent batch replay can be selected at runtime, plus the pipeline
//! around it.

use crate::cli::{ReportKind, StrategyType};
use crate::core::LedgerEngine;
use crate::io::csv_format::{write_accounts_csv, write_transactions_csv, AccountSeedRecord};
use crate::io::{SyncReader, TransferRequest};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

pub mod r#async;
pub mod batch_processor;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use batch_processor::BatchProcessor;
pub use sync::SyncProcessingStrategy;

/// Outcome counts of one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Transfers the engine completed
    pub applied: usize,
    /// Transfers the engine refused
    pub rejected: usize,
    /// Rows that never reached the engine
    pub malformed: usize,
}

impl ReplaySummary {
    /// Count one transfer outcome
    pub fn record(&mut self, applied: bool) {
        if applied {
            self.applied += 1;
        } else {
            self.rejected += 1;
        }
    }

    /// Add the counts of another summary
    pub fn merge(&mut self, other: ReplaySummary) {
        self.applied += other.applied;
        self.rejected += other.rejected;
        self.malformed += other.malformed;
    }

    /// Every row seen
    pub fn total(&self) -> usize {
        self.applied + self.rejected + self.malformed
    }
}

/// Transfer phase of a replay
pub trait ProcessingStrategy: Send + Sync {
    /// Submit every transfer in `transfers_path` to `engine`
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine whose accounts are already open
    /// * `transfers_path` - CSV file with `from,to,amount` rows
    ///
    /// # Returns
    ///
    /// * `Ok(ReplaySummary)` once every row has been handled
    /// * `Err(String)` if a fatal error occurred (file not found, runtime failure)
    ///
    /// Malformed rows and refused transfers are logged at `warn` and counted;
    /// they never abort the replay.
    fn process(&self, engine: &LedgerEngine, transfers_path: &Path) -> Result<ReplaySummary, String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Batch configuration for the async strategy (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}

/// Files and report selection of one replay
#[derive(Debug, Clone, Copy)]
pub struct ReplayInput<'a> {
    pub accounts_path: &'a Path,
    pub transfers_path: &'a Path,
    pub report: ReportKind,
}

/// Run a full replay: seed accounts, replay transfers, write the report
pub fn replay(
    engine: &LedgerEngine,
    strategy: &dyn ProcessingStrategy,
    input: &ReplayInput<'_>,
    output: &mut dyn Write,
) -> Result<ReplaySummary, String> {
    let opened = seed_accounts(engine, input.accounts_path)?;
    info!(accounts = opened, "accounts seeded");

    let summary = strategy.process(engine, input.transfers_path)?;
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        malformed = summary.malformed,
        "replay finished"
    );

    write_report(engine, input.report, output)?;
    Ok(summary)
}

/// Open every account listed in `path`, in file order
///
/// Returns the number of accounts opened. Rows that fail to parse or that
/// the engine refuses are logged and skipped.
pub fn seed_accounts(engine: &LedgerEngine, path: &Path) -> Result<usize, String> {
    let mut opened = 0;

    for result in SyncReader::<AccountSeedRecord>::new(path)? {
        match result {
            Ok(seed) => match engine.open_account(seed.owner_id, seed.kind, seed.balance) {
                Ok(_) => opened += 1,
                Err(e) => warn!(error = %e, "account rejected"),
            },
            Err(e) => warn!(error = %e, "skipping malformed account row"),
        }
    }

    Ok(opened)
}

/// Write the selected report of the engine's current state
pub fn write_report(
    engine: &LedgerEngine,
    report: ReportKind,
    output: &mut dyn Write,
) -> Result<(), String> {
    match report {
        ReportKind::Accounts => {
            let accounts = engine.accounts().map_err(|e| e.to_string())?;
            write_accounts_csv(&accounts, output)
        }
        ReportKind::Transactions => {
            let transactions = engine
                .transactions_between(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
                .map_err(|e| e.to_string())?;
            write_transactions_csv(&transactions, output)
        }
    }
}

/// Submit one transfer, logging a refusal
///
/// Returns whether the engine completed it.
pub(crate) fn apply_transfer(engine: &LedgerEngine, request: &TransferRequest) -> bool {
    match engine.transfer(request.from, request.to, request.amount) {
        Ok(_) => true,
        Err(e) => {
            warn!(
                from = request.from,
                to = request.to,
                amount = %request.amount,
                error = %e,
                "transfer rejected"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_seed_accounts_assigns_ids_in_file_order() {
        let file = create_temp_csv(
            "owner,kind,balance\n1001,SAVINGS,5000.00\n1002,CHECKING,-1.00\nbad,SAVINGS,1\n1003,CHECKING,2500.00\n",
        );
        let engine = LedgerEngine::in_memory();

        let opened = seed_accounts(&engine, file.path()).unwrap();

        assert_eq!(opened, 2);
        let accounts = engine.accounts().unwrap();
        assert_eq!(accounts[0].id, 1);
        assert_eq!(accounts[0].owner_id, 1001);
        assert_eq!(accounts[1].id, 2);
        assert_eq!(accounts[1].owner_id, 1003);
    }

    #[test]
    fn test_replay_writes_transactions_report() {
        let accounts = create_temp_csv("owner,kind,balance\n1,SAVINGS,100.00\n2,SAVINGS,0\n");
        let transfers = create_temp_csv("from,to,amount\n1,2,40.00\n1,2,90.00\n");
        let engine = LedgerEngine::in_memory().with_reference_prefix("RPL");
        let input = ReplayInput {
            accounts_path: accounts.path(),
            transfers_path: transfers.path(),
            report: ReportKind::Transactions,
        };
        let mut output = Vec::new();

        let summary = replay(&engine, &SyncProcessingStrategy, &input, &mut output).unwrap();

        assert_eq!(summary, ReplaySummary { applied: 1, rejected: 1, malformed: 0 });
        let report = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "id,reference,from,to,amount,type,status");
        assert_eq!(lines.len(), 2);
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields[0], "1");
        assert!(fields[1].starts_with("RPL"));
        assert_eq!(&fields[2..], &["1", "2", "40.00", "TRANSFER", "COMPLETED"]);
    }

    #[test]
    fn test_replay_fails_on_missing_accounts_file() {
        let transfers = create_temp_csv("from,to,amount\n");
        let engine = LedgerEngine::in_memory();
        let input = ReplayInput {
            accounts_path: Path::new("missing-accounts.csv"),
            transfers_path: transfers.path(),
            report: ReportKind::Accounts,
        };
        let mut output = Vec::new();

        let result = replay(&engine, &SyncProcessingStrategy, &input, &mut output);

        assert!(result.unwrap_err().contains("Failed to open file"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_summary_merge_and_total() {
        let mut summary = ReplaySummary::default();
        summary.record(true);
        summary.record(false);
        summary.merge(ReplaySummary { applied: 2, rejected: 0, malformed: 3 });

        assert_eq!(summary, ReplaySummary { applied: 3, rejected: 1, malformed: 3 });
        assert_eq!(summary.total(), 7);
    }

    #[test]
    fn test_apply_transfer_reports_outcome() {
        let engine = LedgerEngine::in_memory();
        let a = engine.open_account(1, "SAVINGS", Decimal::TEN).unwrap();
        let b = engine.open_account(2, "SAVINGS", Decimal::ZERO).unwrap();

        let ok = TransferRequest { from: a.id, to: b.id, amount: Decimal::ONE };
        let too_much = TransferRequest { from: a.id, to: b.id, amount: Decimal::ONE_HUNDRED };

        assert!(apply_transfer(&engine, &ok));
        assert!(!apply_transfer(&engine, &too_much));
    }
}
