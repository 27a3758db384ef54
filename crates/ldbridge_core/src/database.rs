//! Database session.

use crate::batch::WriteBatch;
use crate::buffer::ReturnedBuffer;
use crate::cursor::Cursor;
use crate::error::{BridgeError, BridgeResult, StatusKind};
use crate::options::Options;
use crate::snapshot::Snapshot;
use rocksdb::{ReadOptions, WriteOptions, DB};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Durability of a single write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteFlags {
    /// Flush the write durably before returning.
    pub sync: bool,
}

impl WriteFlags {
    /// Flags for a write that is flushed before returning.
    pub const SYNC: WriteFlags = WriteFlags { sync: true };

    fn to_engine(self) -> WriteOptions {
        let mut options = WriteOptions::default();
        options.set_sync(self.sync);
        options
    }
}

/// Per-read options.
#[derive(Debug, Clone, Copy)]
pub struct ReadFlags<'a> {
    /// Verify block checksums on read.
    pub verify_checksums: bool,
    /// Populate the block cache with what the read touches.
    pub fill_cache: bool,
    /// Read as of this snapshot instead of the latest state.
    pub snapshot: Option<&'a Snapshot>,
}

impl Default for ReadFlags<'_> {
    fn default() -> Self {
        Self {
            verify_checksums: false,
            fill_cache: true,
            snapshot: None,
        }
    }
}

impl<'a> ReadFlags<'a> {
    /// Default flags reading as of `snapshot`.
    pub fn at(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            ..Self::default()
        }
    }

    fn to_engine(self) -> ReadOptions {
        let mut options = ReadOptions::default();
        options.set_verify_checksums(self.verify_checksums);
        options.fill_cache(self.fill_cache);
        options
    }
}

/// An open engine instance for one path.
///
/// Safe to share across threads for reads, writes, cursor creation and
/// snapshot acquisition. Snapshots and cursors keep the engine alive, so
/// releasing the session while they are outstanding defers the close until
/// the last of them is released.
pub struct Database {
    engine: Arc<DB>,
    path: PathBuf,
}

impl Database {
    /// Opens the database at `path`.
    ///
    /// When the open fails with a corruption status and `repair_on_corruption`
    /// is set, the engine's repair runs once and the open is retried once.
    pub fn open(
        path: impl AsRef<Path>,
        options: &Options,
        repair_on_corruption: bool,
    ) -> BridgeResult<Self> {
        let path = path.as_ref();
        let engine = match DB::open(options.engine(), path) {
            Ok(engine) => engine,
            Err(err)
                if repair_on_corruption
                    && StatusKind::from(err.kind()) == StatusKind::Corruption =>
            {
                warn!(path = %path.display(), error = %err, "corruption detected at open, repairing");
                DB::repair(options.engine(), path)?;
                info!(path = %path.display(), "repair complete, reopening");
                DB::open(options.engine(), path)?
            }
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), "opened database");
        Ok(Self {
            engine: Arc::new(engine),
            path: path.to_path_buf(),
        })
    }

    /// Removes every persisted file at `path`.
    ///
    /// No session may be open on `path`.
    pub fn destroy(path: impl AsRef<Path>, options: &Options) -> BridgeResult<()> {
        let path = path.as_ref();
        DB::destroy(options.engine(), path)?;
        debug!(path = %path.display(), "destroyed database");
        Ok(())
    }

    /// Runs the engine's repair procedure on `path`.
    pub fn repair(path: impl AsRef<Path>, options: &Options) -> BridgeResult<()> {
        let path = path.as_ref();
        DB::repair(options.engine(), path)?;
        info!(path = %path.display(), "repaired database");
        Ok(())
    }

    /// Path this session was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a single entry.
    pub fn put(&self, key: &[u8], value: &[u8], flags: WriteFlags) -> BridgeResult<()> {
        Ok(self.engine.put_opt(key, value, &flags.to_engine())?)
    }

    /// Removes a single entry. Removing a missing key is not an error.
    pub fn delete(&self, key: &[u8], flags: WriteFlags) -> BridgeResult<()> {
        Ok(self.engine.delete_opt(key, &flags.to_engine())?)
    }

    /// Applies every operation of `batch` atomically.
    pub fn write(&self, batch: &WriteBatch, flags: WriteFlags) -> BridgeResult<()> {
        Ok(self.engine.write_opt(batch.to_engine(), &flags.to_engine())?)
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get(&self, key: &[u8], flags: ReadFlags<'_>) -> BridgeResult<Option<ReturnedBuffer>> {
        let read = flags.to_engine();
        let value = match flags.snapshot {
            Some(snapshot) => {
                self.check_owner(snapshot)?;
                snapshot.get(key, read)?
            }
            None => self.engine.get_opt(key, &read)?,
        };
        Ok(value.map(ReturnedBuffer::new))
    }

    /// Opens a cursor, pinned to `flags.snapshot` when given.
    pub fn cursor(&self, flags: ReadFlags<'_>) -> BridgeResult<Cursor> {
        if let Some(snapshot) = flags.snapshot {
            self.check_owner(snapshot)?;
        }
        Ok(Cursor::new(&self.engine, flags.snapshot, flags.to_engine()))
    }

    /// Acquires a snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::acquire(&self.engine)
    }

    /// Releases a snapshot acquired from this database.
    ///
    /// The snapshot is consumed either way; one taken on another database is
    /// reported as [`BridgeError::ForeignSnapshot`].
    pub fn release_snapshot(&self, snapshot: Snapshot) -> BridgeResult<()> {
        let owned = snapshot.belongs_to(&self.engine);
        snapshot.release();
        if owned {
            Ok(())
        } else {
            Err(BridgeError::ForeignSnapshot)
        }
    }

    /// Closes the session.
    ///
    /// The engine closes now, or when the last snapshot or cursor derived
    /// from it is released.
    pub fn release(self) {
        let outstanding = Arc::strong_count(&self.engine) - 1;
        if outstanding > 0 {
            warn!(
                path = %self.path.display(),
                outstanding,
                "database released with live snapshots or cursors, close deferred"
            );
        } else {
            debug!(path = %self.path.display(), "closing database");
        }
    }

    fn check_owner(&self, snapshot: &Snapshot) -> BridgeResult<()> {
        if snapshot.belongs_to(&self.engine) {
            Ok(())
        } else {
            Err(BridgeError::ForeignSnapshot)
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
