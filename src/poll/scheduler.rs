use std::time::Duration;

use crate::engine::{
    AccountSnapshot, AccountSummary, DEFAULT_MAX_TRANSACTIONS, RawTransactionRow,
    Reconciliation, Report, SettledWindow, reconcile,
};
use crate::error::CycleError;
use crate::feed::AccountFeed;
use crate::notify::Notifier;
use crate::poll::{Backoff, CycleOutcome};
use crate::store::StateStore;

/// Source of the pause between cycles
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Settled window cap
    pub max_transactions: usize,
    /// Abort the cycle instead of warning when the cap is hit before the watermark
    pub strict_cap: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings {
            max_transactions: DEFAULT_MAX_TRANSACTIONS,
            strict_cap: false,
        }
    }
}

/// Runs fetch -> reconcile -> notify -> persist cycles one after the other
pub struct Poller<F, N, C> {
    feed: F,
    notifier: N,
    clock: C,
    store: StateStore,
    backoff: Backoff,
    settings: PollSettings,
}

impl<F: AccountFeed, N: Notifier, C: Clock> Poller<F, N, C> {
    pub fn new(
        feed: F,
        notifier: N,
        clock: C,
        store: StateStore,
        backoff: Backoff,
        settings: PollSettings,
    ) -> Self {
        Poller {
            feed,
            notifier,
            clock,
            store,
            backoff,
            settings,
        }
    }

    pub fn feed_mut(&mut self) -> &mut F {
        &mut self.feed
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Runs `limit` cycles, or forever when `limit` is `None`, sleeping between them.
    ///
    /// Returns only when the limit is reached or when a failed cycle could not
    /// be rolled back.
    pub fn run(&mut self, limit: Option<usize>) -> Result<(), CycleError> {
        let mut cycles = 0;
        loop {
            let outcome = self.run_cycle()?;
            cycles += 1;
            if limit.is_some_and(|limit| cycles >= limit) {
                return Ok(());
            }

            let interval = self.backoff.next_interval(outcome);
            log::info!("Next check in {} mins", interval.as_secs() / 60);
            self.clock.sleep(interval);
        }
    }

    /// One cycle. Ordinary failures are logged and rolled back; the error
    /// is only returned when the snapshot could not be restored.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        log::info!("Processing started");

        self.store.recover()?;

        let outcome = match self.attempt() {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Failed to process new account activity: {e}");
                if let Err(restore) = self.store.rollback() {
                    log::error!("Snapshot could not be restored: {restore}");
                    return Err(restore.into());
                }
                CycleOutcome::Recovered
            }
        };

        log::info!("Processing completed: {outcome:?}");
        Ok(outcome)
    }

    fn attempt(&mut self) -> Result<CycleOutcome, CycleError> {
        let previous = self.store.load()?;
        self.store.backup()?;

        let observed = self.observe(&previous);
        self.feed.close_session();
        let (summary, reconciliation) = observed?;

        if !reconciliation.has_activity() {
            log::info!("No account activity - Nothing to report");
            self.store.discard_backup()?;
            return Ok(CycleOutcome::Quiet);
        }

        let Reconciliation { diff, snapshot, .. } = reconciliation;
        let report = Report::new(summary, diff)?;
        for event in report.diff.events() {
            log::debug!("{:?}: {}", event.kind(), event.transaction());
        }

        log::debug!("Notifying: Starting");
        match self.notifier.notify(&report) {
            Ok(()) => log::debug!("Notifying: Done"),
            Err(e) => log::warn!("Failed to notify user of account activity: {e}"),
        }

        self.store.commit(&snapshot)?;
        Ok(CycleOutcome::Reported)
    }

    fn observe(
        &mut self,
        previous: &AccountSnapshot,
    ) -> Result<(AccountSummary, Reconciliation), CycleError> {
        self.feed.open_session()?;

        log::debug!("Account summary: Fetching");
        let summary = self.feed.fetch_account_summary()?.to_summary()?;

        log::debug!("Pending transactions: Fetching");
        let pending = self
            .feed
            .fetch_pending()?
            .iter()
            .map(RawTransactionRow::to_transaction)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Settled transactions: Fetching");
        let cap = self.settings.max_transactions;
        let watermark = previous.watermark();
        let rows = self.feed.fetch_settled_window(cap, watermark)?;

        // Rows past the end of the window are never parsed
        let mut parse_error = None;
        let parsed = rows.iter().map_while(|row| match row.to_transaction() {
            Ok(tx) => Some(tx),
            Err(e) => {
                parse_error = Some(e);
                None
            }
        });
        let window = SettledWindow::collect(parsed, cap, watermark);
        if let Some(e) = parse_error {
            return Err(e.into());
        }

        if window.over_cap {
            if self.settings.strict_cap {
                return Err(CycleError::TooManyTransactions { cap });
            }
            log::warn!(
                "Max transactions ({cap}) retrieved before the last known transaction, some may have been missed"
            );
        }

        log::debug!("Reconciling");
        let reconciliation = reconcile(previous, &summary, pending, window);
        Ok((summary, reconciliation))
    }
}
