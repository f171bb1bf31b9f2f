//! Account-related types for the ledger engine
//!
//! This module defines the Account record and its status, along with the
//! identifier types used to address accounts and their owners.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier
///
/// Assigned by the account store from a monotonically increasing sequence
/// starting at 1.
pub type AccountId = u64;

/// Identifier of the customer owning an account
pub type OwnerId = u64;

/// Lifecycle status of an account
///
/// Only `Active` accounts may take part in a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Normal operating state, set at creation
    Active,

    /// Temporarily barred from transfers by an administrator
    Suspended,

    /// Permanently closed
    Closed,
}

impl AccountStatus {
    /// Upper-case tag used in reports and log output
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Suspended => "SUSPENDED",
            AccountStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A balance-holding account owned by a customer
///
/// `balance` only changes through a recorded transfer or an explicit
/// administrative adjustment, both of which go through the ledger engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier, immutable after creation
    pub id: AccountId,

    /// The owning customer; many accounts may share an owner
    pub owner_id: OwnerId,

    /// Classification tag such as "SAVINGS" or "CHECKING"
    ///
    /// Opaque to the engine.
    pub kind: String,

    /// Current balance, exact decimal
    pub balance: Decimal,

    /// Lifecycle status
    pub status: AccountStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active account stamped with the current time
    pub fn new(id: AccountId, owner_id: OwnerId, kind: impl Into<String>, balance: Decimal) -> Self {
        Account {
            id,
            owner_id,
            kind: kind.into(),
            balance,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Whether the account may currently send or receive transfers
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_account_is_active() {
        let account = Account::new(1, 1001, "SAVINGS", Decimal::new(500000, 2));

        assert_eq!(account.id, 1);
        assert_eq!(account.owner_id, 1001);
        assert_eq!(account.kind, "SAVINGS");
        assert_eq!(account.balance, Decimal::new(500000, 2));
        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.is_active());
    }

    #[rstest]
    #[case::active(AccountStatus::Active, "ACTIVE")]
    #[case::suspended(AccountStatus::Suspended, "SUSPENDED")]
    #[case::closed(AccountStatus::Closed, "CLOSED")]
    fn test_status_display(#[case] status: AccountStatus, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
    }

    #[test]
    fn test_account_serializes_with_upper_case_status() {
        let account = Account::new(7, 1002, "CHECKING", Decimal::new(300000, 2));

        let json = serde_json::to_value(&account).unwrap();

        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["balance"], "3000.00");
        assert_eq!(json["owner_id"], 1002);
    }
}
