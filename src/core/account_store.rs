//! Thread-safe in-memory account store
//!
//! This module provides `MemoryAccountStore`, the in-process implementation of
//! the [`AccountStore`] contract.
//!
//! # Design
//!
//! Accounts live in a `DashMap` keyed by account id, which gives fine-grained
//! locking through internal sharding: reads and writes on different accounts
//! never block each other. Identifiers come from an atomic sequence starting
//! at 1, so concurrent `create` calls never hand out the same id.
//!
//! The store does not serialise read-modify-write cycles across calls; that is
//! the job of the unit of work the engine wraps around every mutation.

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountId, AccountRole, AccountStatus, LedgerError, OwnerId};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory account store backed by `DashMap`
#[derive(Debug)]
pub struct MemoryAccountStore {
    /// Account records by id
    accounts: DashMap<AccountId, Account>,

    /// Next identifier to hand out
    next_id: AtomicU64,
}

impl MemoryAccountStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of accounts created so far
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no account has been created yet
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn collect_where<F>(&self, predicate: F) -> Vec<Account>
    where
        F: Fn(&Account) -> bool,
    {
        self.accounts
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for MemoryAccountStore {
    fn get(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .get(&account_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LedgerError::account_not_found(account_id, AccountRole::Subject))
    }

    fn exists(&self, account_id: AccountId) -> Result<bool, LedgerError> {
        Ok(self.accounts.contains_key(&account_id))
    }

    fn create(
        &self,
        owner_id: OwnerId,
        kind: &str,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_amount(
                initial_balance,
                "initial balance must not be negative",
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let account = Account::new(id, owner_id, kind, initial_balance);
        self.accounts.insert(id, account.clone());

        Ok(account)
    }

    fn save(&self, account: &Account) -> Result<(), LedgerError> {
        match self.accounts.get_mut(&account.id) {
            Some(mut entry) => {
                *entry.value_mut() = account.clone();
                Ok(())
            }
            None => Err(LedgerError::account_not_found(
                account.id,
                AccountRole::Subject,
            )),
        }
    }

    fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Account>, LedgerError> {
        Ok(self.collect_where(|account| account.owner_id == owner_id))
    }

    fn find_by_status(&self, status: AccountStatus) -> Result<Vec<Account>, LedgerError> {
        Ok(self.collect_where(|account| account.status == status))
    }

    fn all(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.collect_where(|_| true))
    }
}
