//! Transaction-related types for the ledger engine
//!
//! A transaction is an immutable ledger entry describing one completed
//! transfer between two accounts.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier
///
/// Assigned by the transaction log at append time.
pub type TransactionId = u64;

/// Classification of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Movement of funds from one account to another
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Transfer => f.write_str("TRANSFER"),
        }
    }
}

/// Terminal state of a ledger entry
///
/// Only completed transfers are recorded; there is no pending or
/// rolled-back state visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Completed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Completed => f.write_str("COMPLETED"),
        }
    }
}

/// A ledger entry that has not been appended yet
///
/// Built by the engine inside a unit of work; the log assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Decimal,
    pub kind: TransactionType,
    pub status: TransactionStatus,
    pub reference_number: String,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    /// Describe a completed transfer, stamped with the current time
    pub fn completed_transfer(
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Decimal,
        reference_number: String,
    ) -> Self {
        NewTransaction {
            from_account_id,
            to_account_id,
            amount,
            kind: TransactionType::Transfer,
            status: TransactionStatus::Completed,
            reference_number,
            created_at: Utc::now(),
        }
    }

    /// Attach the identifier assigned by the log
    pub fn with_id(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            from_account_id: self.from_account_id,
            to_account_id: self.to_account_id,
            amount: self.amount,
            kind: self.kind,
            status: self.status,
            reference_number: self.reference_number,
            created_at: self.created_at,
        }
    }
}

/// An immutable record of one completed transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Internal identifier assigned by the log
    pub id: TransactionId,

    /// Account the funds left
    pub from_account_id: AccountId,

    /// Account the funds arrived in
    pub to_account_id: AccountId,

    /// Amount moved, strictly positive
    pub amount: Decimal,

    /// Entry classification
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Terminal status at creation time
    pub status: TransactionStatus,

    /// Externally-facing unique token, independent of `id`
    pub reference_number: String,

    /// Completion timestamp
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether the given account is the source or destination of this entry
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.from_account_id == account_id || self.to_account_id == account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_transfer_carries_call_values() {
        let entry =
            NewTransaction::completed_transfer(1, 2, Decimal::new(50000, 2), "TXN1".to_string());

        assert_eq!(entry.from_account_id, 1);
        assert_eq!(entry.to_account_id, 2);
        assert_eq!(entry.amount, Decimal::new(50000, 2));
        assert_eq!(entry.kind, TransactionType::Transfer);
        assert_eq!(entry.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_with_id_preserves_fields() {
        let entry =
            NewTransaction::completed_transfer(3, 4, Decimal::new(1, 0), "TXN2".to_string());
        let created_at = entry.created_at;

        let transaction = entry.with_id(42);

        assert_eq!(transaction.id, 42);
        assert_eq!(transaction.reference_number, "TXN2");
        assert_eq!(transaction.created_at, created_at);
    }

    #[test]
    fn test_involves_source_and_destination() {
        let transaction =
            NewTransaction::completed_transfer(3, 4, Decimal::new(1, 0), "TXN3".to_string())
                .with_id(1);

        assert!(transaction.involves(3));
        assert!(transaction.involves(4));
        assert!(!transaction.involves(5));
    }

    #[test]
    fn test_transaction_serializes_type_tag() {
        let transaction =
            NewTransaction::completed_transfer(1, 2, Decimal::new(50000, 2), "TXN4".to_string())
                .with_id(9);

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["type"], "TRANSFER");
        assert_eq!(json["status"], "COMPLETED");
        assert_eq!(json["amount"], "500.00");
    }
}
