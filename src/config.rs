use clap::Parser;
use clap::builder::TypedValueParser;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::DEFAULT_MAX_TRANSACTIONS;
use crate::poll::{Backoff, PollSettings};
use crate::store::DEFAULT_STATE_FILE;

/// Longest accepted interval flag, one week in minutes
const MAX_MINUTES: u64 = 7 * 24 * 60;

/// Watch an account feed and report new and cleared transactions
#[derive(Parser, Debug, Clone)]
#[command(name = "txn_watch", version, about)]
pub struct Args {
    /// Directory holding summary.csv, pending.csv and settled.csv
    #[arg(long)]
    pub feed_dir: PathBuf,

    /// Snapshot file; its backup lives next to it with a .bak suffix
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Minutes between checks while there is activity
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..=MAX_MINUTES))]
    pub base_interval: u64,

    /// Minutes added to the interval after every quiet or failed check
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(0..=MAX_MINUTES))]
    pub interval_step: u64,

    /// Longest interval between checks, in minutes
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=MAX_MINUTES))]
    pub max_interval: u64,

    /// Settled transactions retrieved per check
    #[arg(long, default_value_t = DEFAULT_MAX_TRANSACTIONS, value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize))]
    pub max_transactions: usize,

    /// Fail the check instead of warning when the settled cap is reached
    #[arg(long)]
    pub strict_cap: bool,

    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

impl Args {
    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            minutes(self.base_interval),
            minutes(self.interval_step),
            minutes(self.max_interval),
        )
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            max_transactions: self.max_transactions,
            strict_cap: self.strict_cap,
        }
    }

    pub fn cycle_limit(&self) -> Option<usize> {
        self.once.then_some(1)
    }
}
