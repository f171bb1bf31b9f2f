//! Error types for the ledger engine
//!
//! Every failure the engine can report is a variant of [`LedgerError`]. The
//! engine never retries internally; callers decide what to do based on
//! [`LedgerError::kind`] and [`LedgerError::is_retryable`].
//!
//! # Error Categories
//!
//! - **Not found**: the source, destination or queried account does not exist
//! - **Rejected**: deterministic business-rule failures (insufficient funds,
//!   invalid amount, self-transfer, inactive account)
//! - **Internal**: the store could not commit, or decimal arithmetic overflowed

use super::account::{AccountId, AccountStatus};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Which side of an operation an account identifier was given for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    /// The account funds are drawn from
    Source,
    /// The account funds are paid into
    Destination,
    /// A plain lookup or administrative operation
    Subject,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRole::Source => f.write_str("Source account"),
            AccountRole::Destination => f.write_str("Destination account"),
            AccountRole::Subject => f.write_str("Account"),
        }
    }
}

/// Coarse classification used by the boundary layer to pick a response class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An identifier did not resolve
    NotFound,
    /// The request broke a business rule; retrying changes nothing
    Rejected,
    /// Persistence or arithmetic failure inside the engine
    Internal,
}

/// Main error type for the ledger engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Account identifier does not resolve
    #[error("{role} not found with ID: {account}")]
    AccountNotFound {
        /// The identifier that was looked up
        account: AccountId,
        /// Whether it was the source, destination or a plain lookup
        role: AccountRole,
    },

    /// Source balance is lower than the requested amount
    ///
    /// No state is mutated when this is returned.
    #[error("Insufficient funds in account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Decimal,
        requested: Decimal,
    },

    /// Amount is not acceptable for the operation
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Why it was rejected
        reason: String,
    },

    /// Source and destination are the same account
    #[error("Cannot transfer from account {account} to itself")]
    SelfTransfer { account: AccountId },

    /// One side of a transfer is not `ACTIVE`
    #[error("Account {account} is {status} and cannot take part in transfers")]
    AccountInactive {
        account: AccountId,
        status: AccountStatus,
    },

    /// Decimal arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        operation: String,
        account: AccountId,
    },

    /// The underlying store could not commit
    ///
    /// A failed attempt leaves no partial state, so the identical request
    /// may be re-issued.
    #[error("Store failure during {operation}: {message}")]
    StoreFailure { operation: String, message: String },
}

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId, role: AccountRole) -> Self {
        LedgerError::AccountNotFound { account, role }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, reason: &str) -> Self {
        LedgerError::InvalidAmount {
            amount,
            reason: reason.to_string(),
        }
    }

    /// Create a SelfTransfer error
    pub fn self_transfer(account: AccountId) -> Self {
        LedgerError::SelfTransfer { account }
    }

    /// Create an AccountInactive error
    pub fn account_inactive(account: AccountId, status: AccountStatus) -> Self {
        LedgerError::AccountInactive { account, status }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a StoreFailure error
    pub fn store_failure(operation: &str, message: impl Into<String>) -> Self {
        LedgerError::StoreFailure {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Classify the error for the boundary layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::AccountNotFound { .. } => ErrorKind::NotFound,
            LedgerError::InsufficientFunds { .. }
            | LedgerError::InvalidAmount { .. }
            | LedgerError::SelfTransfer { .. }
            | LedgerError::AccountInactive { .. } => ErrorKind::Rejected,
            LedgerError::ArithmeticOverflow { .. } | LedgerError::StoreFailure { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether re-issuing the identical request can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::StoreFailure { .. })
    }
}
