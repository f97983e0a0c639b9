use serde::Deserialize;
use std::str::FromStr;

use crate::engine::amount::AmountError;
use crate::engine::{Amount, Transaction};

/// A transaction row exactly as the feed produced it
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawTransactionRow {
    pub date: String,
    #[serde(rename = "name")]
    pub card_name: String,
    pub description: String,
    pub amount: String,
}

impl RawTransactionRow {
    pub fn to_transaction(&self) -> Result<Transaction, AmountError> {
        Ok(Transaction {
            amount: Amount::from_str(&self.amount)?,
            date: self.date.clone(),
            description: self.description.clone(),
            card_name: self.card_name.clone(),
        })
    }
}

/// Account balances exactly as the feed produced them
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawAccountSummary {
    pub current_balance: String,
    pub available_credit: String,
    pub credit_limit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSummary {
    pub current_balance: Amount,
    pub available_credit: Amount,
    pub credit_limit: Amount,
}

impl RawAccountSummary {
    pub fn to_summary(&self) -> Result<AccountSummary, AmountError> {
        Ok(AccountSummary {
            current_balance: Amount::from_str(&self.current_balance)?,
            available_credit: Amount::from_str(&self.available_credit)?,
            credit_limit: Amount::from_str(&self.credit_limit)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_that_row_is_converted_into_transaction() {
        let row = RawTransactionRow {
            date: "2024-01-01".into(),
            card_name: "J".into(),
            description: "Coffee".into(),
            amount: "$4.50".into(),
        };
        let tx = row.to_transaction().unwrap();
        assert_eq!(tx, Transaction::new("2024-01-01", "J", "Coffee", Amount::from_cents(450)));
    }

    #[test]
    fn test_that_bad_amount_is_a_parse_error() {
        let summary = RawAccountSummary {
            current_balance: "$100.00".into(),
            available_credit: "n/a".into(),
            credit_limit: "$1,000.00".into(),
        };
        assert!(matches!(summary.to_summary(), Err(AmountError::Parse(_))));
    }
}
