//! Thread-safe in-memory transaction log
//!
//! This module provides `MemoryTransactionLog`, the in-process implementation
//! of the [`TransactionLog`] contract.
//!
//! # Design
//!
//! Entries are stored in a `DashMap` keyed by transaction id. A second map
//! indexes entry ids by account so history queries do not scan the whole log.
//! Identifiers come from an atomic sequence, so the log is free of update
//! conflicts: the only possible conflict is an insert on an existing id, which
//! is refused rather than overwritten.

use crate::core::traits::TransactionLog;
use crate::types::{AccountId, LedgerError, NewTransaction, Transaction, TransactionId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory, append-only transaction log backed by `DashMap`
#[derive(Debug)]
pub struct MemoryTransactionLog {
    /// Ledger entries by id
    entries: DashMap<TransactionId, Transaction>,

    /// Entry ids touching each account, in append order
    by_account: DashMap<AccountId, Vec<TransactionId>>,

    /// Next identifier to hand out
    next_id: AtomicU64,
}

impl MemoryTransactionLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            by_account: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn index(&self, account_id: AccountId, id: TransactionId) {
        self.by_account.entry(account_id).or_default().push(id);
    }
}

impl Default for MemoryTransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLog for MemoryTransactionLog {
    fn append(&self, entry: NewTransaction) -> Result<Transaction, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        if self.entries.contains_key(&id) {
            return Err(LedgerError::store_failure(
                "append",
                format!("duplicate transaction id {}", id),
            ));
        }

        let transaction = entry.with_id(id);
        self.entries.insert(id, transaction.clone());

        self.index(transaction.from_account_id, id);
        if transaction.to_account_id != transaction.from_account_id {
            self.index(transaction.to_account_id, id);
        }

        Ok(transaction)
    }

    fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, LedgerError> {
        let ids = match self.by_account.get(&account_id) {
            Some(ids) => ids.value().clone(),
            None => return Ok(Vec::new()),
        };

        Ok(ids
            .into_iter()
            .filter_map(|id| self.entries.get(&id).map(|entry| entry.value().clone()))
            .collect())
    }

    fn find_by_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| {
                let created_at = entry.value().created_at;
                created_at >= start && created_at <= end
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
