//! I/O module
//!
//! Handles the replay harness CSV input and report output.
//!
//! # Components
//!
//! - `csv_format` - Row types, conversion and report serialization
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    write_accounts_csv, write_transactions_csv, AccountSeed, AccountSeedRecord, CsvRow,
    TransferRecord, TransferRequest,
};
pub use sync_reader::SyncReader;
