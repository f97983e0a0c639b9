use csv::Trim;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::PathBuf;

use crate::engine::{RawAccountSummary, RawTransactionRow, Transaction};
use crate::feed::{AccountFeed, FetchError};

pub const SUMMARY_FILE: &str = "summary.csv";
pub const PENDING_FILE: &str = "pending.csv";
pub const SETTLED_FILE: &str = "settled.csv";

/// Reads the account from CSV exports dropped in a directory:
/// `summary.csv`, `pending.csv` and `settled.csv` (most recent first).
#[derive(Debug, Clone)]
pub struct CsvFeed {
    dir: PathBuf,
}

impl CsvFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvFeed { dir: dir.into() }
    }

    fn read_records<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, FetchError> {
        let path = self.dir.join(name);
        let file = File::open(&path).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;

        let mut rdr = csv::ReaderBuilder::new().trim(Trim::All).from_reader(file);

        log::debug!("Started deserialising records from {path:?}");
        rdr.deserialize::<T>()
            .collect::<Result<Vec<T>, csv::Error>>()
            .map_err(|source| FetchError::Shape { path, source })
    }
}

impl AccountFeed for CsvFeed {
    fn open_session(&mut self) -> Result<(), FetchError> {
        if !self.dir.is_dir() {
            return Err(FetchError::Unreachable(format!(
                "{:?} is not a directory",
                self.dir
            )));
        }
        Ok(())
    }

    fn fetch_account_summary(&mut self) -> Result<RawAccountSummary, FetchError> {
        self.read_records::<RawAccountSummary>(SUMMARY_FILE)?
            .into_iter()
            .next()
            .ok_or(FetchError::MissingSummary)
    }

    fn fetch_pending(&mut self) -> Result<Vec<RawTransactionRow>, FetchError> {
        self.read_records(PENDING_FILE)
    }

    fn fetch_settled_window(
        &mut self,
        cap: usize,
        _watermark: Option<&Transaction>,
    ) -> Result<Vec<RawTransactionRow>, FetchError> {
        let mut rows: Vec<RawTransactionRow> = self.read_records(SETTLED_FILE)?;
        rows.truncate(cap);
        Ok(rows)
    }
}
