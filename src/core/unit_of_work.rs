//! Unit of work spanning the account store and the transaction log
//!
//! A [`UnitOfWork`] is the transactional boundary around every balance
//! mutation. It gives three guarantees:
//!
//! - **Isolation**: the accounts it touches are locked through the
//!   [`LockTable`] in ascending id order before anything is read, so two
//!   transfers moving funds in opposite directions between the same pair can
//!   never deadlock, and no other mutation can interleave its
//!   read-modify-write cycle.
//! - **Atomic visibility**: writes are only staged until commit. Commit holds
//!   the write side of the commit gate while it saves every staged account and
//!   appends the ledger entry; readers hold the read side, so they never see a
//!   debit without its credit or a balance change without its log entry.
//! - **Rollback**: dropping an uncommitted unit of work discards its staged
//!   writes. If a save or the append fails during commit, the saves already
//!   applied are restored from their before-images.
//!
//! Lock table entries live only while some unit of work holds or waits on
//! them, so ids that never name an account do not accumulate.
//!
//! ```text
//! begin(ids) ──► lock ids (ascending) ──► load / stage ──► commit
//!                                              │              │
//!                                              ▼              ▼
//!                                        drop = rollback  gate.write(): save*, append
//! ```

use crate::core::traits::{AccountStore, TransactionLog};
use crate::types::{Account, AccountId, AccountRole, LedgerError, NewTransaction, Transaction};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex, RwLock};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Guard held on one account for the lifetime of a unit of work
type AccountGuard = ArcMutexGuard<RawMutex, ()>;

/// One mutex per account, created on first use and evicted once idle
#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl LockTable {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Lock every account in `ids`, in ascending id order
    ///
    /// Duplicates are locked once. Blocks until every lock is held.
    fn lock_ordered(&self, ids: &[AccountId]) -> (Vec<AccountId>, Vec<AccountGuard>) {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let guards = ordered
            .iter()
            .map(|id| self.handle(*id).lock_arc())
            .collect();

        (ordered, guards)
    }

    /// The mutex for one account
    ///
    /// The map entry is released before the caller blocks on the mutex.
    fn handle(&self, id: AccountId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Evict the mutexes of `ids` that nobody holds or waits on
    ///
    /// `handle` clones under the same shard lock `remove_if` takes, so an
    /// entry is never evicted between a lookup and the lock it feeds.
    fn release(&self, ids: &[AccountId]) {
        for id in ids {
            self.locks.remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        }
    }

    /// Number of accounts with a live mutex
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no account currently has a mutex
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Transactional scope around one ledger mutation
pub struct UnitOfWork<'a> {
    accounts: &'a dyn AccountStore,
    log: &'a dyn TransactionLog,
    gate: &'a RwLock<()>,
    locks: &'a LockTable,

    /// Accounts locked by this unit, ascending
    locked: Vec<AccountId>,
    guards: Vec<AccountGuard>,

    /// Account images to persist at commit, at most one per id
    staged: Vec<Account>,
    committed: bool,
}

impl<'a> UnitOfWork<'a> {
    /// Open a unit of work over `ids`, blocking until all are locked
    pub fn begin(
        accounts: &'a dyn AccountStore,
        log: &'a dyn TransactionLog,
        locks: &'a LockTable,
        gate: &'a RwLock<()>,
        ids: &[AccountId],
    ) -> Self {
        let (locked, guards) = locks.lock_ordered(ids);

        Self {
            accounts,
            log,
            gate,
            locks,
            locked,
            guards,
            staged: Vec::with_capacity(ids.len()),
            committed: false,
        }
    }

    /// Current image of a locked account
    ///
    /// Returns the staged image if one exists, otherwise reads the store. A
    /// missing account is reported with the given role.
    pub fn load(&self, account_id: AccountId, role: AccountRole) -> Result<Account, LedgerError> {
        debug_assert!(
            self.locked.binary_search(&account_id).is_ok(),
            "account {} read outside its lock",
            account_id
        );

        if let Some(staged) = self.staged.iter().find(|a| a.id == account_id) {
            return Ok(staged.clone());
        }

        self.accounts.get(account_id).map_err(|e| match e {
            LedgerError::AccountNotFound { .. } => LedgerError::account_not_found(account_id, role),
            other => other,
        })
    }

    /// Stage the new image of a locked account
    pub fn stage(&mut self, account: Account) {
        debug_assert!(
            self.locked.binary_search(&account.id).is_ok(),
            "account {} staged outside its lock",
            account.id
        );

        match self.staged.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => self.staged.push(account),
        }
    }

    /// Persist the staged accounts
    pub fn commit(mut self) -> Result<(), LedgerError> {
        let gate = self.gate;
        let _write = gate.write();

        self.apply_staged()?;
        self.committed = true;
        Ok(())
    }

    /// Persist the staged accounts and append `entry` as one atomic step
    ///
    /// The entry is stamped with the commit time, under the gate, so creation
    /// order matches commit order.
    pub fn commit_entry(mut self, mut entry: NewTransaction) -> Result<Transaction, LedgerError> {
        let gate = self.gate;
        let _write = gate.write();
        entry.created_at = Utc::now();

        let before_images = self.apply_staged()?;

        match self.log.append(entry) {
            Ok(transaction) => {
                self.committed = true;
                Ok(transaction)
            }
            Err(e) => {
                warn!(error = %e, "ledger append failed, restoring balances");
                self.restore(&before_images);
                Err(into_store_failure("append", e))
            }
        }
    }

    /// Save every staged account, returning before-images of what was saved
    ///
    /// On failure, restores the saves already applied.
    fn apply_staged(&self) -> Result<Vec<Account>, LedgerError> {
        let mut before_images = Vec::with_capacity(self.staged.len());

        for account in &self.staged {
            let saved = self
                .accounts
                .get(account.id)
                .and_then(|before| self.accounts.save(account).map(|_| before));

            match saved {
                Ok(before) => before_images.push(before),
                Err(e) => {
                    warn!(account = account.id, error = %e, "account save failed, restoring balances");
                    self.restore(&before_images);
                    return Err(into_store_failure("save", e));
                }
            }
        }

        Ok(before_images)
    }

    fn restore(&self, before_images: &[Account]) {
        for before in before_images.iter().rev() {
            if let Err(e) = self.accounts.save(before) {
                error!(account = before.id, error = %e, "failed to restore account during rollback");
            }
        }
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.staged.is_empty() {
            debug!(accounts = ?self.locked, "unit of work rolled back");
        }

        self.guards.clear();
        self.locks.release(&self.locked);
    }
}

fn into_store_failure(operation: &str, error: LedgerError) -> LedgerError {
    match error {
        LedgerError::StoreFailure { .. } => error,
        other => LedgerError::store_failure(operation, other.to_string()),
    }
}
