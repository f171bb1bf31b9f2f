//! Core ledger logic
//!
//! This module contains the funds-transfer components:
//! - `traits` - Persistence contracts for accounts and ledger entries
//! - `account_store` - In-memory account store
//! - `transaction_log` - In-memory append-only transaction log
//! - `reference` - Reference-number generation
//! - `unit_of_work` - Ordered locking, staged writes and rollback
//! - `engine` - Transfer orchestration and account administration

pub mod account_store;
pub mod engine;
pub mod reference;
pub mod traits;
pub mod transaction_log;
pub mod unit_of_work;

pub use account_store::MemoryAccountStore;
pub use engine::LedgerEngine;
pub use reference::{ReferenceGenerator, DEFAULT_REFERENCE_PREFIX};
pub use traits::{AccountStore, TransactionLog};
pub use transaction_log::MemoryTransactionLog;
pub use unit_of_work::{LockTable, UnitOfWork};
