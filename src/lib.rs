//! Rust Ledger Engine Library
//! # Overview
//!
//! This library moves value between accounts as atomic, audited transfers.
//! Each successful transfer debits one account, credits another and records
//! exactly one ledger entry; a failed transfer leaves no trace.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, LedgerError)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Transfer orchestration and account administration
//!   - [`core::unit_of_work`] - Ordered per-account locking, staged writes, rollback
//!   - [`core::account_store`] / [`core::transaction_log`] - In-memory persistence
//! - [`config`] - Layered configuration (defaults, TOML file, environment)
//! - [`telemetry`] - Tracing subscriber setup
//! - [`io`] / [`strategy`] / [`cli`] - CSV replay harness
//!
//! # Guarantees
//!
//! - **Conservation**: a transfer never changes the sum of all balances
//! - **No partial effect**: a refused or failed transfer changes nothing
//! - **Exactly one record**: every completed transfer has one ledger entry
//! - **Non-negative balances**: a transfer never overdraws its source
//!
//! ```
//! use rust_ledger_engine::LedgerEngine;
//! use rust_decimal::Decimal;
//!
//! let engine = LedgerEngine::in_memory();
//! let a = engine.open_account(1001, "SAVINGS", Decimal::new(500000, 2)).unwrap();
//! let b = engine.open_account(1002, "CHECKING", Decimal::new(250000, 2)).unwrap();
//!
//! let tx = engine.transfer(a.id, b.id, Decimal::new(50000, 2)).unwrap();
//!
//! assert_eq!(engine.account(a.id).unwrap().balance, Decimal::new(450000, 2));
//! assert_eq!(engine.account(b.id).unwrap().balance, Decimal::new(300000, 2));
//! assert_eq!(engine.account_transaction_history(a.id).unwrap(), vec![tx]);
//! ```

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod telemetry;
pub mod types;

pub use config::{ConfigError, LedgerConfig};
pub use core::{AccountStore, LedgerEngine, MemoryAccountStore, MemoryTransactionLog, TransactionLog};
pub use types::{
    Account, AccountId, AccountStatus, ErrorKind, LedgerError, OwnerId, Transaction, TransactionId,
};
