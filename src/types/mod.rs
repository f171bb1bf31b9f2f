//! Types module
//!
//! Contains core data structures used throughout the ledger.
//! This module organizes types into logical submodules:
//! - `account`: Account record, status and identifiers
//! - `transaction`: Ledger entry types and identifiers
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId, AccountStatus, OwnerId};
pub use error::{AccountRole, ErrorKind, LedgerError};
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionStatus, TransactionType,
};
