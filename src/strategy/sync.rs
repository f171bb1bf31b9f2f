//! Synchronous replay strategy
//!
//! Submits transfers one at a time, in file order, on the calling thread.
//! Given the same input files this strategy always produces the same final
//! balances, which makes it the reference for the async strategy.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Transfer execution to `LedgerEngine`
//!
//! Rows are streamed; memory use does not grow with the transfers file.

use crate::core::LedgerEngine;
use crate::io::csv_format::TransferRecord;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{apply_transfer, ProcessingStrategy, ReplaySummary};
use std::path::Path;
use tracing::warn;

/// Synchronous replay strategy
///
/// # Examples
///
/// ```no_run
/// use rust_ledger_engine::core::LedgerEngine;
/// use rust_ledger_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
///
/// let engine = LedgerEngine::in_memory();
/// let summary = SyncProcessingStrategy
///     .process(&engine, Path::new("transfers.csv"))
///     .expect("Replay failed");
/// println!("{} transfers applied", summary.applied);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, engine: &LedgerEngine, transfers_path: &Path) -> Result<ReplaySummary, String> {
        let reader = SyncReader::<TransferRecord>::new(transfers_path)?;
        let mut summary = ReplaySummary::default();

        for result in reader {
            match result {
                Ok(request) => summary.record(apply_transfer(engine, &request)),
                Err(e) => {
                    warn!(error = %e, "skipping malformed transfer row");
                    summary.malformed += 1;
                }
            }
        }

        Ok(summary)
    }
}
