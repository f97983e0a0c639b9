//! Producers of raw account data.
mod csv_feed;

pub use csv_feed::CsvFeed;

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::{RawAccountSummary, RawTransactionRow, Transaction};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Feed unreachable: {0}")]
    Unreachable(String),

    #[error("Feed source {path:?} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected feed shape in {path:?}: {source}")]
    Shape {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Feed returned no account summary")]
    MissingSummary,
}

/// Source of the watched account's transactions and balances.
///
/// Calls are blocking. Timeouts are the implementation's business and should
/// surface as a `FetchError`.
pub trait AccountFeed {
    /// Called before any fetch in a cycle (login)
    fn open_session(&mut self) -> Result<(), FetchError> {
        Ok(())
    }

    fn fetch_account_summary(&mut self) -> Result<RawAccountSummary, FetchError>;

    fn fetch_pending(&mut self) -> Result<Vec<RawTransactionRow>, FetchError>;

    /// Settled rows, most recent first. Implementations may stop early once
    /// `watermark` or `cap` rows are reached; the caller bounds the window
    /// either way.
    fn fetch_settled_window(
        &mut self,
        cap: usize,
        watermark: Option<&Transaction>,
    ) -> Result<Vec<RawTransactionRow>, FetchError>;

    /// Called at the end of every cycle, whether or not it succeeded (logout)
    fn close_session(&mut self) {}
}
