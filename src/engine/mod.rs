mod account_snapshot;
pub mod amount;
mod reconciler;
mod record;
mod report;
mod transaction;

pub use account_snapshot::AccountSnapshot;
pub use amount::{Amount, AmountError};
pub use reconciler::{
    DEFAULT_MAX_TRANSACTIONS, Diff, Reconciliation, SettledWindow, diff_pending, diff_settled,
    reconcile,
};
pub use record::{AccountSummary, RawAccountSummary, RawTransactionRow};
pub use report::{Report, Totals};
pub use transaction::{EventKind, PROCESSED_SUFFIX, Transaction, TransactionEvent};
