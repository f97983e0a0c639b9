use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::engine::AccountSnapshot;

/// Default location of the live snapshot
pub const DEFAULT_STATE_FILE: &str = "transactions.json";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Snapshot IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Snapshot format error in {path:?}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> PersistenceError + '_ {
        move |source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Live snapshot file plus the backup taken at the start of every cycle.
///
/// A backup that is still present when a cycle starts means the previous
/// cycle never finished, and the live file is not trusted.
#[derive(Debug, Clone)]
pub struct StateStore {
    live: PathBuf,
    backup: PathBuf,
}

impl StateStore {
    pub fn new(live: impl Into<PathBuf>) -> Self {
        let live = live.into();
        let mut backup: OsString = live.clone().into_os_string();
        backup.push(".bak");

        StateStore {
            live,
            backup: PathBuf::from(backup),
        }
    }

    pub fn live_path(&self) -> &Path {
        &self.live
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    pub fn has_backup(&self) -> bool {
        self.backup.exists()
    }

    /// Puts a leftover backup back in place of the live file.
    /// Returns whether anything was restored.
    pub fn recover(&self) -> Result<bool, PersistenceError> {
        if !self.has_backup() {
            return Ok(false);
        }

        log::warn!(
            "Found leftover backup {:?}, restoring it over {:?}",
            self.backup,
            self.live
        );
        self.restore()?;
        Ok(true)
    }

    /// Last committed snapshot, or an empty one when nothing was committed yet
    pub fn load(&self) -> Result<AccountSnapshot, PersistenceError> {
        if !self.live.exists() {
            log::debug!("No snapshot at {:?}, starting empty", self.live);
            return Ok(AccountSnapshot::default());
        }

        let content = fs::read_to_string(&self.live).map_err(PersistenceError::io(&self.live))?;
        serde_json::from_str(&content).map_err(|source| PersistenceError::Format {
            path: self.live.clone(),
            source,
        })
    }

    /// Copies the live snapshot aside before the cycle touches anything.
    /// The backup path only ever holds a complete copy.
    pub fn backup(&self) -> Result<(), PersistenceError> {
        if !self.live.exists() {
            return Ok(());
        }
        let mut source = File::open(&self.live).map_err(PersistenceError::io(&self.live))?;
        Self::write_atomically(&self.backup, |file| io::copy(&mut source, file).map(|_| ()))?;
        log::debug!("Snapshot backed up to {:?}", self.backup);
        Ok(())
    }

    /// Atomically replaces the live snapshot, then drops the backup
    pub fn commit(&self, snapshot: &AccountSnapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(snapshot).map_err(|source| {
            PersistenceError::Format {
                path: self.live.clone(),
                source,
            }
        })?;

        Self::write_atomically(&self.live, |file| writeln!(file, "{json}"))?;

        log::debug!("Snapshot committed to {:?}", self.live);
        self.discard_backup()
    }

    /// Writes into a temp file next to `target` and renames it into place
    fn write_atomically(
        target: &Path,
        write: impl FnOnce(&mut NamedTempFile) -> io::Result<()>,
    ) -> Result<(), PersistenceError> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(PersistenceError::io(dir))?;
        write(&mut file).map_err(PersistenceError::io(target))?;
        file.as_file()
            .sync_all()
            .map_err(PersistenceError::io(target))?;
        file.persist(target)
            .map_err(|e| PersistenceError::io(target)(e.error))?;
        Ok(())
    }

    /// Brings back the pre-cycle snapshot after a failed cycle
    pub fn rollback(&self) -> Result<(), PersistenceError> {
        if !self.has_backup() {
            log::debug!("No backup to roll back to, live snapshot left untouched");
            return Ok(());
        }
        self.restore()
    }

    pub fn discard_backup(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.backup) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::io(&self.backup)(e)),
        }
    }

    fn restore(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.live) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(PersistenceError::io(&self.live)(e)),
        }
        fs::rename(&self.backup, &self.live).map_err(PersistenceError::io(&self.live))?;
        log::info!("Snapshot restored from {:?}", self.backup);
        Ok(())
    }
}
