//! Keyspace cursor with explicit validity.

use crate::error::{BridgeError, BridgeResult};
use crate::snapshot::{Snapshot, SnapshotInner};
use rocksdb::{ReadOptions, DB};
use std::sync::Arc;

/// Whether a cursor is positioned on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Positioned on an entry; key and value are readable.
    Valid,
    /// Not positioned; only seeks may be called.
    Invalid,
}

/// Key and value lengths reported after each positioning call.
///
/// Both are `-1` when the cursor ended up [`CursorState::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lengths {
    /// Current key length.
    pub key: i32,
    /// Current value length.
    pub value: i32,
}

impl Lengths {
    /// Lengths of an invalid cursor.
    pub const INVALID: Lengths = Lengths { key: -1, value: -1 };

    fn of(key: &[u8], value: &[u8]) -> Self {
        Self {
            key: i32::try_from(key.len()).unwrap_or(i32::MAX),
            value: i32::try_from(value.len()).unwrap_or(i32::MAX),
        }
    }
}

/// A cursor over one database, optionally pinned to a snapshot.
///
/// Starts [`CursorState::Invalid`]; every seek, `next` and `prev` moves it
/// between the two states. Not safe to drive from two threads at once.
pub struct Cursor {
    // Dropped first: the raw iterator borrows both fields below.
    raw: rocksdb::DBRawIterator<'static>,
    state: CursorState,
    _snapshot: Option<Arc<SnapshotInner>>,
    _engine: Arc<DB>,
}

impl Cursor {
    #[allow(unsafe_code)]
    pub(crate) fn new(engine: &Arc<DB>, snapshot: Option<&Snapshot>, read: ReadOptions) -> Self {
        let engine = Arc::clone(engine);
        let snapshot = snapshot.map(Snapshot::share);
        let raw = match &snapshot {
            Some(inner) => inner.snapshot().raw_iterator_opt(read),
            None => engine.raw_iterator_opt(read),
        };
        // SAFETY: the iterator borrows the engine, and the snapshot when there
        // is one. Both live behind `Arc`s owned by this cursor, so their
        // addresses are stable, and `raw` is declared first so it is dropped
        // before either of them.
        let raw = unsafe {
            std::mem::transmute::<rocksdb::DBRawIterator<'_>, rocksdb::DBRawIterator<'static>>(raw)
        };
        Self {
            raw,
            state: CursorState::Invalid,
            _snapshot: snapshot,
            _engine: engine,
        }
    }

    /// Current state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Returns true if positioned on an entry.
    pub fn is_valid(&self) -> bool {
        self.state == CursorState::Valid
    }

    /// Positions on the smallest key.
    pub fn seek_to_first(&mut self) -> BridgeResult<Lengths> {
        self.raw.seek_to_first();
        self.settle()
    }

    /// Positions on the largest key.
    pub fn seek_to_last(&mut self) -> BridgeResult<Lengths> {
        self.raw.seek_to_last();
        self.settle()
    }

    /// Positions on the smallest key greater than or equal to `key`.
    pub fn seek(&mut self, key: &[u8]) -> BridgeResult<Lengths> {
        self.raw.seek(key);
        self.settle()
    }

    /// Advances to the next larger key.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> BridgeResult<Lengths> {
        self.ensure_valid()?;
        self.raw.next();
        self.settle()
    }

    /// Moves back to the next smaller key.
    pub fn prev(&mut self) -> BridgeResult<Lengths> {
        self.ensure_valid()?;
        self.raw.prev();
        self.settle()
    }

    /// Current key, borrowed from the engine until the next move.
    pub fn key(&self) -> BridgeResult<&[u8]> {
        self.ensure_valid()?;
        self.raw.key().ok_or(BridgeError::CursorNotValid)
    }

    /// Current value, borrowed from the engine until the next move.
    pub fn value(&self) -> BridgeResult<&[u8]> {
        self.ensure_valid()?;
        self.raw.value().ok_or(BridgeError::CursorNotValid)
    }

    /// Lengths of the current entry, or [`Lengths::INVALID`].
    pub fn lengths(&self) -> Lengths {
        match (self.state, self.raw.key(), self.raw.value()) {
            (CursorState::Valid, Some(key), Some(value)) => Lengths::of(key, value),
            _ => Lengths::INVALID,
        }
    }

    /// Releases the cursor, and with it its hold on the snapshot and engine.
    pub fn release(self) {}

    fn ensure_valid(&self) -> BridgeResult<()> {
        match self.state {
            CursorState::Valid => Ok(()),
            CursorState::Invalid => Err(BridgeError::CursorNotValid),
        }
    }

    fn settle(&mut self) -> BridgeResult<Lengths> {
        if let Err(err) = self.raw.status() {
            self.state = CursorState::Invalid;
            return Err(err.into());
        }
        self.state = if self.raw.valid() {
            CursorState::Valid
        } else {
            CursorState::Invalid
        };
        Ok(self.lengths())
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("state", &self.state)
            .field("snapshot", &self._snapshot.is_some())
            .finish()
    }
}
