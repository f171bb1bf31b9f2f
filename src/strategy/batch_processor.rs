//! Concurrent batch execution with source-account partitioning
//!
//! This module provides the `BatchProcessor`, which applies a batch of
//! transfers on tokio's blocking pool while keeping the file order of
//! transfers that debit the same account.
//!
//! # Design
//!
//! A batch is partitioned by source account. Each partition runs on its own
//! blocking task and submits its transfers sequentially; partitions run
//! concurrently. The engine's per-account locks keep every transfer atomic
//! whatever the interleaving, so partitioning only decides ordering, not
//! safety.
//!
//! ```text
//! batch ──► partition_by_source ──► spawn_blocking(partition 1) ─┐
//!                                  ├► spawn_blocking(partition 2) ─┼► join_all ──► ReplaySummary
//!                                  └► spawn_blocking(partition n) ─┘
//! ```

use crate::core::LedgerEngine;
use crate::io::TransferRequest;
use crate::strategy::{apply_transfer, ReplaySummary};
use crate::types::AccountId;
use futures::future::join_all;
use std::collections::HashMap;

/// Batch processor with source-account partitioning
///
/// Cheap to clone; clones share the engine.
#[derive(Clone)]
pub struct BatchProcessor {
    engine: LedgerEngine,
}

impl BatchProcessor {
    pub fn new(engine: LedgerEngine) -> Self {
        Self { engine }
    }

    /// Split a batch into per-source sub-batches
    ///
    /// # Guarantees
    ///
    /// - Each transfer appears in exactly one sub-batch
    /// - Transfers of one source keep their original order
    pub fn partition_by_source(
        &self,
        batch: Vec<TransferRequest>,
    ) -> HashMap<AccountId, Vec<TransferRequest>> {
        let mut partitions: HashMap<AccountId, Vec<TransferRequest>> = HashMap::new();

        for request in batch {
            partitions.entry(request.from).or_default().push(request);
        }

        partitions
    }

    /// Apply a whole batch and wait for every transfer to finish
    ///
    /// # Errors
    ///
    /// Returns an error if a worker task panicked or was cancelled. Transfer
    /// refusals are counted, never returned.
    pub async fn process_batch(&self, batch: Vec<TransferRequest>) -> Result<ReplaySummary, String> {
        let tasks: Vec<_> = self
            .partition_by_source(batch)
            .into_values()
            .map(|requests| {
                let engine = self.engine.clone();
                tokio::task::spawn_blocking(move || {
                    let mut summary = ReplaySummary::default();
                    for request in &requests {
                        summary.record(apply_transfer(&engine, request));
                    }
                    summary
                })
            })
            .collect();

        let mut summary = ReplaySummary::default();
        for joined in join_all(tasks).await {
            let partial = joined.map_err(|e| format!("Replay worker failed: {}", e))?;
            summary.merge(partial);
        }

        Ok(summary)
    }
}
