//! CSV format handling for replay input and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for the accounts and transfers input files
//! - Conversion from raw rows to validated requests
//! - Account and transaction report serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Input formats
//!
//! ```text
//! accounts.csv              transfers.csv
//! owner,kind,balance        from,to,amount
//! 1001,SAVINGS,5000.00      1,2,500.00
//! ```

use crate::types::{Account, AccountId, OwnerId, Transaction};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// A CSV row type that converts into a validated request
pub trait CsvRow: DeserializeOwned {
    type Output;

    /// Validate the raw row; the error names the offending field
    fn convert(self) -> Result<Self::Output, String>;
}

/// Raw row of the accounts file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountSeedRecord {
    pub owner: OwnerId,
    pub kind: String,
    pub balance: String,
}

/// Account to open before replaying transfers
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSeed {
    pub owner_id: OwnerId,
    pub kind: String,
    pub balance: Decimal,
}

/// Raw row of the transfers file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferRecord {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: String,
}

/// Transfer to submit to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferRequest {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
}

impl CsvRow for AccountSeedRecord {
    type Output = AccountSeed;

    fn convert(self) -> Result<AccountSeed, String> {
        let kind = self.kind.trim();
        if kind.is_empty() {
            return Err(format!("Missing account kind for owner {}", self.owner));
        }

        Ok(AccountSeed {
            owner_id: self.owner,
            kind: kind.to_string(),
            balance: parse_decimal("balance", &self.balance)?,
        })
    }
}

impl CsvRow for TransferRecord {
    type Output = TransferRequest;

    /// Sign and zero checks are left to the engine so they are reported
    /// the same way as for any other caller.
    fn convert(self) -> Result<TransferRequest, String> {
        Ok(TransferRequest {
            from: self.from,
            to: self.to,
            amount: parse_decimal("amount", &self.amount)?,
        })
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("Missing {}", field));
    }

    Decimal::from_str(trimmed).map_err(|_| format!("Invalid {} '{}'", field, raw))
}

/// Write account states to CSV format
///
/// Columns: id, owner, kind, balance, status. Accounts are sorted by id for
/// deterministic output; balances are printed with two decimal places.
///
/// # Arguments
///
/// * `accounts` - Slice of accounts to write
/// * `output` - Writer receiving the CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["id", "owner", "kind", "balance", "status"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.id.to_string(),
                account.owner_id.to_string(),
                account.kind.clone(),
                format_amount(account.balance),
                account.status.to_string(),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}

/// Write ledger entries to CSV format
///
/// Columns: id, reference, from, to, amount, type, status, sorted by id.
pub fn write_transactions_csv(
    transactions: &[Transaction],
    output: &mut dyn Write,
) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["id", "reference", "from", "to", "amount", "type", "status"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = transactions.to_vec();
    sorted.sort_by_key(|tx| tx.id);

    for tx in sorted {
        writer
            .write_record(&[
                tx.id.to_string(),
                tx.reference_number.clone(),
                tx.from_account_id.to_string(),
                tx.to_account_id.to_string(),
                format_amount(tx.amount),
                tx.kind.to_string(),
                tx.status.to_string(),
            ])
            .map_err(|e| format!("Failed to write transaction record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}

/// Render an amount exactly, padded to at least two decimal places
fn format_amount(amount: Decimal) -> String {
    let mut amount = amount.normalize();
    if amount.scale() < 2 {
        amount.rescale(2);
    }
    amount.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountStatus, NewTransaction};
    use rstest::rstest;

    fn seed(owner: OwnerId, kind: &str, balance: &str) -> AccountSeedRecord {
        AccountSeedRecord {
            owner,
            kind: kind.to_string(),
            balance: balance.to_string(),
        }
    }

    #[rstest]
    #[case::plain("5000.00", Decimal::new(500000, 2))]
    #[case::whitespace("  12.5 ", Decimal::new(125, 1))]
    #[case::zero("0", Decimal::ZERO)]
    #[case::negative_passes_through("-3.00", Decimal::new(-300, 2))]
    fn test_convert_account_seed(#[case] balance: &str, #[case] expected: Decimal) {
        let converted = seed(1001, "SAVINGS", balance).convert().unwrap();

        assert_eq!(converted.owner_id, 1001);
        assert_eq!(converted.kind, "SAVINGS");
        assert_eq!(converted.balance, expected);
    }

    #[rstest]
    #[case::empty_kind(seed(1, "  ", "1.00"), "Missing account kind")]
    #[case::empty_balance(seed(1, "SAVINGS", ""), "Missing balance")]
    #[case::bad_balance(seed(1, "SAVINGS", "lots"), "Invalid balance")]
    fn test_convert_account_seed_errors(#[case] record: AccountSeedRecord, #[case] expected: &str) {
        let err = record.convert().unwrap_err();

        assert!(err.contains(expected), "unexpected error: {}", err);
    }

    #[rstest]
    #[case::valid("500.00", Ok(Decimal::new(50000, 2)))]
    #[case::negative_left_to_engine("-5.00", Ok(Decimal::new(-500, 2)))]
    #[case::missing("", Err("Missing amount"))]
    #[case::garbage("1.2.3", Err("Invalid amount"))]
    fn test_convert_transfer(#[case] amount: &str, #[case] expected: Result<Decimal, &str>) {
        let record = TransferRecord {
            from: 1,
            to: 2,
            amount: amount.to_string(),
        };

        match (record.convert(), expected) {
            (Ok(request), Ok(amount)) => {
                assert_eq!(request, TransferRequest { from: 1, to: 2, amount });
            }
            (Err(err), Err(fragment)) => assert!(err.contains(fragment)),
            (got, want) => panic!("expected {:?}, got {:?}", want, got),
        }
    }

    #[rstest]
    #[case::whole(Decimal::new(100, 0), "100.00")]
    #[case::one_place(Decimal::new(125, 1), "12.50")]
    #[case::trailing_zeros(Decimal::new(7450000, 5), "74.50")]
    #[case::sub_cent(Decimal::new(99999, 3), "99.999")]
    #[case::zero(Decimal::ZERO, "0.00")]
    fn test_format_amount(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_amount(amount), expected);
    }

    #[test]
    fn test_write_accounts_csv_sorted_by_id() {
        let mut closed = Account::new(2, 1002, "CHECKING", Decimal::new(3, 0));
        closed.status = AccountStatus::Closed;
        let accounts = vec![closed, Account::new(1, 1001, "SAVINGS", Decimal::new(45000, 1))];
        let mut output = Vec::new();

        write_accounts_csv(&accounts, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "id,owner,kind,balance,status\n\
             1,1001,SAVINGS,4500.00,ACTIVE\n\
             2,1002,CHECKING,3.00,CLOSED\n"
        );
    }

    #[test]
    fn test_write_transactions_csv() {
        let tx = NewTransaction::completed_transfer(1, 2, Decimal::new(5, 0), "TXN1-000001".into())
            .with_id(7);
        let mut output = Vec::new();

        write_transactions_csv(&[tx], &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "id,reference,from,to,amount,type,status\n\
             7,TXN1-000001,1,2,5.00,TRANSFER,COMPLETED\n"
        );
    }
}
