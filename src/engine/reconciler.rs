use std::collections::HashSet;

use crate::engine::{AccountSnapshot, AccountSummary, Transaction, TransactionEvent};

/// Default number of settled transactions retrieved per cycle
pub const DEFAULT_MAX_TRANSACTIONS: usize = 50;

/// Most-recent-first settled transactions retrieved in one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettledWindow {
    pub transactions: Vec<Transaction>,
    /// The cap was reached before the watermark showed up, so transactions
    /// older than the window may have been missed.
    pub over_cap: bool,
}

impl SettledWindow {
    /// Takes settled transactions until the watermark is re-encountered
    /// (inclusive) or `cap` transactions were taken, whichever comes first.
    pub fn collect(
        fetched: impl IntoIterator<Item = Transaction>,
        cap: usize,
        watermark: Option<&Transaction>,
    ) -> Self {
        let mut transactions = Vec::new();

        for tx in fetched {
            let is_watermark = watermark == Some(&tx);
            transactions.push(tx);

            if is_watermark {
                return SettledWindow {
                    transactions,
                    over_cap: false,
                };
            }
            if transactions.len() >= cap {
                return SettledWindow {
                    transactions,
                    over_cap: true,
                };
            }
        }

        SettledWindow {
            transactions,
            over_cap: false,
        }
    }
}

/// Classified changes found by one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    events: Vec<TransactionEvent>,
}

impl Diff {
    pub fn from_events(events: Vec<TransactionEvent>) -> Self {
        Diff { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[TransactionEvent] {
        &self.events
    }

    pub fn new_pending(&self) -> impl Iterator<Item = &Transaction> {
        self.events.iter().filter_map(|e| match e {
            TransactionEvent::NewPending(tx) => Some(tx),
            _ => None,
        })
    }

    pub fn cleared_pending(&self) -> impl Iterator<Item = &Transaction> {
        self.events.iter().filter_map(|e| match e {
            TransactionEvent::ClearedPending(tx) => Some(tx),
            _ => None,
        })
    }

    pub fn new_settled(&self) -> impl Iterator<Item = &Transaction> {
        self.events.iter().filter_map(|e| match e {
            TransactionEvent::NewSettled(tx) => Some(tx),
            _ => None,
        })
    }
}

/// New pending transactions in `current` order, followed by the previously
/// pending ones that are gone, in `previous` order.
pub fn diff_pending(previous: &[Transaction], current: &[Transaction]) -> Vec<TransactionEvent> {
    let known: HashSet<&Transaction> = previous.iter().collect();
    let still_pending: HashSet<&Transaction> = current.iter().collect();

    let added = current
        .iter()
        .filter(|tx| !known.contains(tx))
        .cloned()
        .map(TransactionEvent::NewPending);
    let cleared = previous
        .iter()
        .filter(|tx| !still_pending.contains(tx))
        .cloned()
        .map(TransactionEvent::ClearedPending);

    added.chain(cleared).collect()
}

pub fn diff_settled(previous: &[Transaction], current: &[Transaction]) -> Vec<TransactionEvent> {
    let known: HashSet<&Transaction> = previous.iter().collect();

    current
        .iter()
        .filter(|tx| !known.contains(tx))
        .cloned()
        .map(TransactionEvent::NewSettled)
        .collect()
}

/// Outcome of comparing a fresh fetch with the last snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub diff: Diff,
    pub balance_changed: bool,
    /// State to persist if this cycle reports
    pub snapshot: AccountSnapshot,
}

impl Reconciliation {
    pub fn has_activity(&self) -> bool {
        self.balance_changed || !self.diff.is_empty()
    }
}

/// Diffs the freshly fetched state against `previous`.
///
/// The new snapshot replaces both transaction lists outright. A missing
/// previous balance counts as zero and missing available credit counts as the
/// full credit limit.
pub fn reconcile(
    previous: &AccountSnapshot,
    summary: &AccountSummary,
    pending: Vec<Transaction>,
    settled: SettledWindow,
) -> Reconciliation {
    let mut events = diff_pending(&previous.pending, &pending);
    events.extend(diff_settled(&previous.processed, &settled.transactions));

    let previous_balance = previous.current_balance.unwrap_or_default();
    let previous_credit = previous.available_credit.unwrap_or(summary.credit_limit);
    let balance_changed = previous_balance != summary.current_balance
        || previous_credit != summary.available_credit;

    Reconciliation {
        diff: Diff { events },
        balance_changed,
        snapshot: AccountSnapshot {
            available_credit: Some(summary.available_credit),
            current_balance: Some(summary.current_balance),
            pending,
            processed: settled.transactions,
        },
    }
}
