//! Point-in-time read consistency.

use crate::error::BridgeResult;
use rocksdb::{ReadOptions, DB};
use std::sync::Arc;

/// Engine snapshot plus the engine it reads from.
///
/// Field order matters: the snapshot is dropped (and released by the engine)
/// before the engine reference.
pub(crate) struct SnapshotInner {
    snapshot: rocksdb::Snapshot<'static>,
    engine: Arc<DB>,
}

impl SnapshotInner {
    pub(crate) fn snapshot(&self) -> &rocksdb::Snapshot<'static> {
        &self.snapshot
    }
}

/// An immutable read-consistency token.
///
/// Reads through a snapshot observe every write committed before it was
/// acquired and none after. The token is tied to the database that produced
/// it and keeps that database's engine alive.
pub struct Snapshot {
    inner: Arc<SnapshotInner>,
}

impl Snapshot {
    #[allow(unsafe_code)]
    pub(crate) fn acquire(engine: &Arc<DB>) -> Self {
        let engine = Arc::clone(engine);
        let snapshot = engine.snapshot();
        // SAFETY: the snapshot borrows the engine behind `engine`, whose heap
        // location is stable and which is kept alive by the `Arc` stored next
        // to it. `SnapshotInner` drops the snapshot first.
        let snapshot = unsafe {
            std::mem::transmute::<rocksdb::Snapshot<'_>, rocksdb::Snapshot<'static>>(snapshot)
        };
        Self {
            inner: Arc::new(SnapshotInner { snapshot, engine }),
        }
    }

    /// Releases the snapshot.
    ///
    /// Needs no live session: once the database that created the snapshot has
    /// been released, this drops the last hold on its engine and closes it.
    pub fn release(self) {}

    pub(crate) fn belongs_to(&self, engine: &Arc<DB>) -> bool {
        Arc::ptr_eq(&self.inner.engine, engine)
    }

    pub(crate) fn get(&self, key: &[u8], read: ReadOptions) -> BridgeResult<Option<Vec<u8>>> {
        Ok(self.inner.snapshot.get_opt(key, read)?)
    }

    pub(crate) fn share(&self) -> Arc<SnapshotInner> {
        Arc::clone(&self.inner)
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("shared", &Arc::strong_count(&self.inner))
            .finish()
    }
}
