//! Asynchronous batch replay strategy
//!
//! Reads transfers in batches and applies each batch concurrently on a tokio
//! multi-thread runtime. Batches run one after another; within a batch,
//! transfers debiting different accounts run in parallel.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (source partitioning + blocking pool)
//!         └── LedgerEngine (shared clone)
//! ```
//!
//! # Ordering
//!
//! Transfers debiting the same account keep their file order within a batch
//! and across batches. Transfers from different accounts may interleave, so
//! final balances can differ from a sync replay of the same file when some
//! transfer depends on funds credited by another. Conservation and
//! non-negative balances hold either way.

use crate::core::LedgerEngine;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::TransferRecord;
use crate::strategy::{BatchProcessor, ProcessingStrategy, ReplaySummary};
use std::path::Path;
use tracing::{debug, warn};

/// Configuration for batch processing
///
/// Controls how transfers are batched and how many threads apply a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of transfers per batch
    pub batch_size: usize,
    /// Worker threads applying a batch
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                requested = batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                requested = max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

impl From<&crate::config::ReplayConfig> for BatchConfig {
    fn from(config: &crate::config::ReplayConfig) -> Self {
        Self::new(config.batch_size, config.max_concurrent)
    }
}

/// Asynchronous batch replay strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay transfers batch by batch
    ///
    /// Builds a dedicated runtime whose worker and blocking pools are both
    /// sized to `max_concurrent_batches`, so at most that many transfers are
    /// in flight at once.
    fn process(&self, engine: &LedgerEngine, transfers_path: &Path) -> Result<ReplaySummary, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .max_blocking_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let processor = BatchProcessor::new(engine.clone());

            let file = tokio::fs::File::open(transfers_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", transfers_path.display(), e))?;

            // csv-async reads futures-io, tokio files speak tokio-io
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::<_, TransferRecord>::new(compat_file);

            let mut summary = ReplaySummary::default();
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                debug!(size = batch.len(), "applying batch");
                summary.merge(processor.process_batch(batch).await?);
            }

            summary.malformed = reader.malformed();
            Ok(summary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[rstest]
    #[case::valid(500, 4, 500, 4)]
    #[case::zero_batch_size(0, 4, 1000, 4)]
    #[case::zero_concurrency(500, 0, 500, num_cpus::get())]
    fn test_batch_config_new(
        #[case] batch_size: usize,
        #[case] max_concurrent: usize,
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let config = BatchConfig::new(batch_size, max_concurrent);

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent_batches, expected_max_concurrent);
    }

    #[test]
    fn test_async_strategy_keeps_per_source_order_across_batches() {
        // Account 1's three debits, spread over three batches, drain it exactly
        let file = create_temp_csv("from,to,amount\n1,2,30.00\n2,3,5.00\n1,3,20.00\n3,2,1.00\n1,2,50.00\n");
        let engine = LedgerEngine::in_memory();
        engine.open_account(1, "SAVINGS", Decimal::new(10000, 2)).unwrap();
        engine.open_account(2, "SAVINGS", Decimal::new(1000, 2)).unwrap();
        engine.open_account(3, "SAVINGS", Decimal::new(1000, 2)).unwrap();
        let strategy = AsyncProcessingStrategy::new(BatchConfig::new(2, 4));

        let summary = strategy.process(&engine, file.path()).unwrap();

        assert_eq!(summary, ReplaySummary { applied: 5, rejected: 0, malformed: 0 });
        assert_eq!(engine.account(1).unwrap().balance, Decimal::ZERO);
        assert_eq!(engine.total_balance().unwrap(), Decimal::new(12000, 2));
    }

    #[test]
    fn test_async_strategy_counts_malformed_rows() {
        let file = create_temp_csv("from,to,amount\n1,2,1.00\nnope,2,1.00\n1,2,oops\n");
        let engine = LedgerEngine::in_memory();
        engine.open_account(1, "SAVINGS", Decimal::TEN).unwrap();
        engine.open_account(2, "SAVINGS", Decimal::ZERO).unwrap();
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default());

        let summary = strategy.process(&engine, file.path()).unwrap();

        assert_eq!(summary, ReplaySummary { applied: 1, rejected: 0, malformed: 2 });
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let engine = LedgerEngine::in_memory();
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default());

        let result = strategy.process(&engine, Path::new("nonexistent.csv"));

        assert!(result.unwrap_err().contains("Failed to open file"));
    }
}
