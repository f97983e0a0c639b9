use thiserror::Error;

use crate::engine::AmountError;
use crate::feed::FetchError;
use crate::store::PersistenceError;

/// Anything that aborts a polling cycle
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse failed: {0}")]
    Parse(#[from] AmountError),

    #[error("Settled window cap ({cap}) reached before the last known transaction")]
    TooManyTransactions { cap: usize },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}
