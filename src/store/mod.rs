//! Record Store
//!
//! Loads and holds the raw expense records in memory. The snapshot is
//! loaded lazily on first access and is immutable until an explicit
//! [`DatasetStore::reload`]; readers share it through an `Arc`, so a reload
//! installs a new snapshot atomically and concurrent readers never observe
//! a partially-updated table.

pub mod loader;
pub mod types;

pub use types::{normalize_cnpj, ExpenseRecord, Snapshot};

use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::info;

/// Errors from loading the expense source.
///
/// An absent source file is deliberately *not* represented here: it degrades
/// to an empty snapshot. These variants cover structurally unreadable input.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The source file could not be read or a record failed CSV parsing.
    #[error("failed to read expense source: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks one of the required columns.
    #[error("expense source is missing required column {0:?}")]
    MissingColumn(&'static str),

    /// Raw I/O error without CSV context.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Lazily-loaded, atomically-swappable holder of the current [`Snapshot`].
pub struct DatasetStore {
    source: PathBuf,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl DatasetStore {
    /// Create a store reading from `source`. Nothing is loaded until the
    /// first [`snapshot`](Self::snapshot) call.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            current: RwLock::new(None),
        }
    }

    /// Return the current snapshot, loading it on first call.
    ///
    /// The load is single-flight: a second caller arriving during the load
    /// blocks on the write lock and then reuses the installed snapshot.
    pub fn snapshot(&self) -> StoreResult<Arc<Snapshot>> {
        if let Some(snap) = self.read_lock().as_ref() {
            return Ok(Arc::clone(snap));
        }

        let mut guard = self.write_lock();
        // Re-check: another caller may have finished the load while we
        // waited for the write lock.
        if let Some(snap) = guard.as_ref() {
            return Ok(Arc::clone(snap));
        }

        let snap = Arc::new(loader::load_snapshot(&self.source)?);
        info!(records = snap.len(), "expense snapshot loaded");
        *guard = Some(Arc::clone(&snap));
        Ok(snap)
    }

    /// Load a fresh snapshot and install it, replacing the current one.
    ///
    /// Readers holding the old `Arc` keep a consistent view; the old table
    /// is dropped once the last of them finishes.
    pub fn reload(&self) -> StoreResult<Arc<Snapshot>> {
        let snap = Arc::new(loader::load_snapshot(&self.source)?);
        info!(records = snap.len(), "expense snapshot reloaded");
        *self.write_lock() = Some(Arc::clone(&snap));
        Ok(snap)
    }

    /// Path of the backing source file.
    pub fn source(&self) -> &std::path::Path {
        &self.source
    }

    // A poisoned lock only means another thread panicked mid-update of the
    // Option; the Arc inside is still coherent, so recover the guard.
    fn read_lock(&self) -> RwLockReadGuard<'_, Option<Arc<Snapshot>>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Option<Arc<Snapshot>>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "CNPJ;RazaoSocial;RegistroANS;Modalidade;UF;Trimestre;Ano;ValorDespesas\n";

    fn write_source(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("despesas.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}{}", HEADER, body).unwrap();
        path
    }

    #[test]
    fn test_snapshot_loaded_once_and_shared() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "11111111000100;Alfa;;;SP;1T2023;2023;10\n");
        let store = DatasetStore::new(&path);

        let first = store.snapshot().unwrap();
        let second = store.snapshot().unwrap();
        // Same Arc, no re-read.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_absent_source_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path().join("missing.csv"));
        let snap = store.snapshot().unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn test_reload_installs_new_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "11111111000100;Alfa;;;SP;1T2023;2023;10\n");
        let store = DatasetStore::new(&path);

        let before = store.snapshot().unwrap();
        assert_eq!(before.len(), 1);

        std::fs::write(
            &path,
            format!(
                "{HEADER}11111111000100;Alfa;;;SP;1T2023;2023;10\n\
                 22222222000100;Beta;;;RJ;1T2023;2023;20\n"
            ),
        )
        .unwrap();

        let after = store.reload().unwrap();
        assert_eq!(after.len(), 2);
        // Old readers keep their view.
        assert_eq!(before.len(), 1);
        // New readers see the fresh snapshot.
        assert!(Arc::ptr_eq(&after, &store.snapshot().unwrap()));
    }

    #[test]
    fn test_missing_column_surfaces_as_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("despesas.csv");
        std::fs::write(&path, "RazaoSocial;Trimestre\nAlfa;1T2023\n").unwrap();

        let store = DatasetStore::new(&path);
        assert!(store.snapshot().is_err());
    }
}
