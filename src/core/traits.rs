//! Persistence contracts for accounts and ledger entries
//!
//! The ledger engine talks to storage only through these traits, so an
//! in-memory implementation and a database-backed one are interchangeable.
//! Both traits own physical persistence only: business rules (when a
//! transaction exists, whether a balance may go negative) live in the engine.

use crate::types::{
    Account, AccountId, AccountStatus, LedgerError, NewTransaction, OwnerId, Transaction,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Durable key→record store for accounts
pub trait AccountStore: Send + Sync {
    /// Fetch an account by identity
    ///
    /// Fails with `AccountNotFound` if no such account exists.
    fn get(&self, account_id: AccountId) -> Result<Account, LedgerError>;

    /// Whether an account with this identity exists
    fn exists(&self, account_id: AccountId) -> Result<bool, LedgerError>;

    /// Create a new `ACTIVE` account with a fresh identity
    ///
    /// Fails with `InvalidAmount` if `initial_balance` is negative.
    fn create(
        &self,
        owner_id: OwnerId,
        kind: &str,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError>;

    /// Persist the full current state of an existing account
    ///
    /// Overwrites the stored balance and status. Fails with
    /// `AccountNotFound` if the account was never created.
    fn save(&self, account: &Account) -> Result<(), LedgerError>;

    /// All accounts of one owner, in no particular order
    fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Account>, LedgerError>;

    /// All accounts in the given status, in no particular order
    fn find_by_status(&self, status: AccountStatus) -> Result<Vec<Account>, LedgerError>;

    /// Every account, in no particular order
    fn all(&self) -> Result<Vec<Account>, LedgerError>;
}

/// Append-only store for ledger entries
pub trait TransactionLog: Send + Sync {
    /// Assign an identifier to the entry and persist it
    ///
    /// Entries are write-once: an identifier is never reused.
    fn append(&self, entry: NewTransaction) -> Result<Transaction, LedgerError>;

    /// Every entry where the account is source or destination
    ///
    /// No ordering is guaranteed.
    fn find_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, LedgerError>;

    /// Every entry created within `[start, end]`, in no particular order
    fn find_by_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// Number of entries appended so far
    fn len(&self) -> usize;

    /// Whether nothing has been appended yet
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
