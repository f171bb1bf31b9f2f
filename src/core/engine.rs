//! Funds-transfer ledger engine
//!
//! This module provides the `LedgerEngine`, which moves value between two
//! accounts as one atomic unit and records exactly one ledger entry per
//! successful transfer. It coordinates an [`AccountStore`], a
//! [`TransactionLog`] and the [`UnitOfWork`] that ties them together.
//!
//! The engine enforces business rules such as:
//! - Positive transfer amounts, never to the same account
//! - Both parties exist and are `ACTIVE`
//! - The source holds at least the amount being moved
//!
//! # Architecture
//!
//! ```text
//! LedgerEngine (Clone, shares everything below)
//!     ├── Arc<dyn AccountStore>     (account records)
//!     ├── Arc<dyn TransactionLog>   (append-only ledger)
//!     ├── Arc<LockTable>            (one mutex per account)
//!     ├── Arc<RwLock<()>>           (commit gate)
//!     └── Arc<ReferenceGenerator>   (reference numbers)
//! ```
//!
//! # Thread Safety
//!
//! A cloned engine shares state with the original, so any number of threads
//! can call `transfer` concurrently. Mutations on the same account serialise
//! on that account's lock; reads hold the commit gate so they only observe
//! fully committed transfers.

use crate::core::account_store::MemoryAccountStore;
use crate::core::reference::ReferenceGenerator;
use crate::core::traits::{AccountStore, TransactionLog};
use crate::core::transaction_log::MemoryTransactionLog;
use crate::core::unit_of_work::{LockTable, UnitOfWork};
use crate::types::{
    Account, AccountId, AccountRole, AccountStatus, LedgerError, NewTransaction, OwnerId,
    Transaction,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ledger engine shared by all callers
///
/// Cheap to clone: every clone operates on the same stores.
#[derive(Clone)]
pub struct LedgerEngine {
    accounts: Arc<dyn AccountStore>,
    log: Arc<dyn TransactionLog>,
    locks: Arc<LockTable>,

    /// Write side held while a unit of work commits, read side by every query
    gate: Arc<RwLock<()>>,

    references: Arc<ReferenceGenerator>,
}

impl LedgerEngine {
    /// Create an engine over the given stores
    ///
    /// # Arguments
    ///
    /// * `accounts` - Account persistence
    /// * `log` - Ledger entry persistence
    ///
    /// # Returns
    ///
    /// An engine issuing references with the default `TXN` prefix
    pub fn new(accounts: Arc<dyn AccountStore>, log: Arc<dyn TransactionLog>) -> Self {
        Self {
            accounts,
            log,
            locks: Arc::new(LockTable::new()),
            gate: Arc::new(RwLock::new(())),
            references: Arc::new(ReferenceGenerator::default()),
        }
    }

    /// Create an engine backed by empty in-memory stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryTransactionLog::new()),
        )
    }

    /// Use `prefix` for every reference number issued from now on
    ///
    /// The reference sequence stays shared with earlier clones, so tokens
    /// issued through them never collide with tokens issued through this one.
    pub fn with_reference_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.references = Arc::new(self.references.with_prefix(prefix));
        self
    }

    /// Move `amount` from one account to another
    ///
    /// Debits `from`, credits `to` and appends one `TRANSFER` entry, all as a
    /// single atomic unit. On any error nothing is written.
    ///
    /// # Arguments
    ///
    /// * `from` - Account to debit
    /// * `to` - Account to credit
    /// * `amount` - Strictly positive amount to move
    ///
    /// # Returns
    ///
    /// * `Ok(Transaction)` - The recorded ledger entry
    /// * `Err(LedgerError)` - Why the transfer was refused
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `InvalidAmount` if `amount` is zero or negative
    /// - `SelfTransfer` if `from == to`
    /// - `AccountNotFound` if either account is missing (source checked first)
    /// - `AccountInactive` if either account is not `ACTIVE`
    /// - `InsufficientFunds` if the source balance is below `amount`
    /// - `ArithmeticOverflow` if the credit does not fit a decimal
    /// - `StoreFailure` if persistence fails; balances are restored
    #[instrument(skip(self))]
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(
                amount,
                "transfer amount must be positive",
            ));
        }
        if from == to {
            return Err(LedgerError::self_transfer(from));
        }

        let mut uow = self.begin(&[from, to]);

        let mut source = uow.load(from, AccountRole::Source)?;
        let mut destination = uow.load(to, AccountRole::Destination)?;

        ensure_active(&source)?;
        ensure_active(&destination)?;

        if source.balance < amount {
            debug!(available = %source.balance, "transfer refused, insufficient funds");
            return Err(LedgerError::insufficient_funds(from, source.balance, amount));
        }

        source.balance = source
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("debit", from))?;
        destination.balance = destination
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("credit", to))?;

        uow.stage(source);
        uow.stage(destination);

        let entry = NewTransaction::completed_transfer(from, to, amount, self.references.next_reference());
        let transaction = uow.commit_entry(entry)?;

        info!(
            id = transaction.id,
            reference = %transaction.reference_number,
            "transfer completed"
        );

        Ok(transaction)
    }

    /// Every ledger entry where the account is source or destination
    ///
    /// Sorted by creation time, then by id.
    pub fn account_transaction_history(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let _read = self.gate.read();

        if !self.accounts.exists(account_id)? {
            return Err(LedgerError::account_not_found(account_id, AccountRole::Subject));
        }

        let mut history = self.log.find_by_account(account_id)?;
        sort_chronologically(&mut history);
        Ok(history)
    }

    /// Ledger entries created within `[start, end]`, sorted like history
    pub fn transactions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let _read = self.gate.read();

        let mut entries = self.log.find_by_created_between(start, end)?;
        sort_chronologically(&mut entries);
        Ok(entries)
    }

    /// Open a new `ACTIVE` account
    ///
    /// Fails with `InvalidAmount` if `initial_balance` is negative.
    pub fn open_account(
        &self,
        owner_id: OwnerId,
        kind: impl Into<String>,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        let kind = kind.into();
        let account = self.accounts.create(owner_id, &kind, initial_balance)?;

        info!(
            account = account.id,
            owner = owner_id,
            kind = %account.kind,
            balance = %account.balance,
            "account opened"
        );

        Ok(account)
    }

    pub fn account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        let _read = self.gate.read();
        self.accounts.get(account_id)
    }

    /// Every account, sorted by id
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let _read = self.gate.read();
        self.accounts.all().map(sorted_by_id)
    }

    /// Accounts of one owner, sorted by id
    pub fn accounts_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Account>, LedgerError> {
        let _read = self.gate.read();
        self.accounts.find_by_owner(owner_id).map(sorted_by_id)
    }

    /// Accounts in one status, sorted by id
    pub fn accounts_by_status(&self, status: AccountStatus) -> Result<Vec<Account>, LedgerError> {
        let _read = self.gate.read();
        self.accounts.find_by_status(status).map(sorted_by_id)
    }

    /// Sum of every account balance
    ///
    /// Constant across transfers; only `open_account` and `adjust_balance`
    /// change it.
    pub fn total_balance(&self) -> Result<Decimal, LedgerError> {
        let _read = self.gate.read();

        self.accounts.all()?.iter().try_fold(Decimal::ZERO, |total, account| {
            total
                .checked_add(account.balance)
                .ok_or_else(|| LedgerError::arithmetic_overflow("total", account.id))
        })
    }

    /// Change the lifecycle status of an account
    pub fn update_status(
        &self,
        account_id: AccountId,
        status: AccountStatus,
    ) -> Result<Account, LedgerError> {
        let mut uow = self.begin(&[account_id]);

        let mut account = uow.load(account_id, AccountRole::Subject)?;
        let previous = account.status;
        account.status = status;
        uow.stage(account.clone());
        uow.commit()?;

        info!(account = account_id, %previous, %status, "account status changed");
        Ok(account)
    }

    /// Overwrite the balance of an account outside of any transfer
    ///
    /// Serialised with transfers through the account lock. Changes the total
    /// balance, so it is logged at `warn`.
    pub fn adjust_balance(
        &self,
        account_id: AccountId,
        new_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_amount(
                new_balance,
                "balance must not be negative",
            ));
        }

        let mut uow = self.begin(&[account_id]);

        let mut account = uow.load(account_id, AccountRole::Subject)?;
        let previous = account.balance;
        account.balance = new_balance;
        uow.stage(account.clone());
        uow.commit()?;

        warn!(
            account = account_id,
            %previous,
            balance = %new_balance,
            "account balance adjusted"
        );
        Ok(account)
    }

    fn begin(&self, ids: &[AccountId]) -> UnitOfWork<'_> {
        UnitOfWork::begin(
            self.accounts.as_ref(),
            self.log.as_ref(),
            &self.locks,
            &self.gate,
            ids,
        )
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn ensure_active(account: &Account) -> Result<(), LedgerError> {
    if account.is_active() {
        Ok(())
    } else {
        Err(LedgerError::account_inactive(account.id, account.status))
    }
}

fn sort_chronologically(entries: &mut [Transaction]) {
    entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

fn sorted_by_id(mut accounts: Vec<Account>) -> Vec<Account> {
    accounts.sort_by_key(|account| account.id);
    accounts
}
