use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::Amount;

/// Suffix appended to the description of a pending transaction that disappeared
pub const PROCESSED_SUFFIX: &str = " - PROCESSED";

/// One ledger line as presented upstream.
///
/// There is no upstream identifier: two transactions are the same transaction
/// when date, card name, description and amount all match. Distinct charges
/// sharing all four fields collapse into one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transaction {
    pub amount: Amount,
    pub date: String,
    pub description: String,
    #[serde(rename = "name")]
    pub card_name: String,
}

impl Transaction {
    pub fn new(
        date: impl Into<String>,
        card_name: impl Into<String>,
        description: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Transaction {
            amount,
            date: date.into(),
            description: description.into(),
            card_name: card_name.into(),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.date, self.card_name, self.description, self.amount
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NewPending,
    ClearedPending,
    NewSettled,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewPending => "pending",
            EventKind::ClearedPending => "cleared",
            EventKind::NewSettled => "settled",
        }
    }
}

/// A transaction together with the reason it is being reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEvent {
    NewPending(Transaction),
    /// A previously pending transaction that is no longer pending. It either
    /// settled or was reversed, the pending list cannot tell which.
    ClearedPending(Transaction),
    NewSettled(Transaction),
}

impl TransactionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TransactionEvent::NewPending(_) => EventKind::NewPending,
            TransactionEvent::ClearedPending(_) => EventKind::ClearedPending,
            TransactionEvent::NewSettled(_) => EventKind::NewSettled,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        match self {
            TransactionEvent::NewPending(tx)
            | TransactionEvent::ClearedPending(tx)
            | TransactionEvent::NewSettled(tx) => tx,
        }
    }

    /// Cleared entries are reported but left out of the pending total
    pub fn ignore_transaction(&self) -> bool {
        matches!(self, TransactionEvent::ClearedPending(_))
    }

    pub fn description(&self) -> String {
        match self {
            TransactionEvent::ClearedPending(tx) => format!("{}{}", tx.description, PROCESSED_SUFFIX),
            other => other.transaction().description.clone(),
        }
    }
}
