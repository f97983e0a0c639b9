use serde::{Deserialize, Serialize};

use crate::engine::{Amount, Transaction};

/// Last known state of the watched account, as persisted between cycles.
/// Fields are declared in key order so the serialised form has sorted keys
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_credit: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<Amount>,
    #[serde(default)]
    pub pending: Vec<Transaction>,
    /// Most recent first, bounded by the settled window cap
    #[serde(default)]
    pub processed: Vec<Transaction>,
}

impl AccountSnapshot {
    /// Most recent settled transaction known, used to bound the next settled fetch
    pub fn watermark(&self) -> Option<&Transaction> {
        self.processed.first()
    }
}
