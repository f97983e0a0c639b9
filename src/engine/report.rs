use crate::engine::amount::AmountError;
use crate::engine::{AccountSummary, Amount, Diff, TransactionEvent};

/// Pending total ignores cleared entries. Over-limit is how far the pending
/// total exceeds the room left under the credit limit, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub pending_total: Amount,
    pub settled_total: Amount,
    pub over_limit: Amount,
}

impl Totals {
    pub fn compute(diff: &Diff, summary: &AccountSummary) -> Result<Totals, AmountError> {
        let pending_total = Amount::sum(
            diff.events()
                .iter()
                .filter(|e| !matches!(e, TransactionEvent::NewSettled(_)))
                .filter(|e| !e.ignore_transaction())
                .map(|e| &e.transaction().amount),
        )?;
        let settled_total = Amount::sum(diff.new_settled().map(|tx| &tx.amount))?;

        let headroom = summary.credit_limit.sub(&summary.current_balance)?;
        let excess = pending_total.sub(&headroom)?;
        let over_limit = if excess.is_positive() {
            excess
        } else {
            Amount::new()
        };

        Ok(Totals {
            pending_total,
            settled_total,
            over_limit,
        })
    }
}

/// Everything handed to the notifier for a reporting cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub summary: AccountSummary,
    pub diff: Diff,
    pub totals: Totals,
}

impl Report {
    pub fn new(summary: AccountSummary, diff: Diff) -> Result<Report, AmountError> {
        let totals = Totals::compute(&diff, &summary)?;
        Ok(Report {
            summary,
            diff,
            totals,
        })
    }
}
