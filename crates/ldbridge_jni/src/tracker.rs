//! Live handle accounting.
//!
//! Every handle handed to the JVM is counted by kind when it is created and
//! uncounted when it is released. The counts back `liveHandles` and the leak
//! report emitted when the library is unloaded.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Kinds of native resources exposed as handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Engine options with their block cache.
    Options,
    /// An open database session.
    Database,
    /// A read snapshot.
    Snapshot,
    /// An iterator cursor.
    Iterator,
    /// A write batch.
    WriteBatch,
    /// A buffer holding a value returned by a read.
    Buffer,
}

impl ResourceKind {
    /// All kinds, in the order `liveHandles` reports them.
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Options,
        ResourceKind::Database,
        ResourceKind::Snapshot,
        ResourceKind::Iterator,
        ResourceKind::WriteBatch,
        ResourceKind::Buffer,
    ];

    /// Position of this kind in [`ResourceKind::ALL`].
    pub const fn index(self) -> usize {
        match self {
            ResourceKind::Options => 0,
            ResourceKind::Database => 1,
            ResourceKind::Snapshot => 2,
            ResourceKind::Iterator => 3,
            ResourceKind::WriteBatch => 4,
            ResourceKind::Buffer => 5,
        }
    }

    /// Human-readable name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            ResourceKind::Options => "options",
            ResourceKind::Database => "database",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::Iterator => "iterator",
            ResourceKind::WriteBatch => "write batch",
            ResourceKind::Buffer => "buffer",
        }
    }
}

/// Per-kind live counters.
#[derive(Debug)]
pub struct Tracker {
    live: [AtomicUsize; 6],
}

impl Tracker {
    /// Creates a tracker with every count at zero.
    pub const fn new() -> Self {
        Self {
            live: [
                AtomicUsize::new(0),
                AtomicUsize::new(0),
                AtomicUsize::new(0),
                AtomicUsize::new(0),
                AtomicUsize::new(0),
                AtomicUsize::new(0),
            ],
        }
    }

    /// Records a newly created handle.
    pub fn acquired(&self, kind: ResourceKind) {
        self.live[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Records a released handle.
    pub fn released(&self, kind: ResourceKind) {
        // Saturate: a count never wraps even if a release is double-reported.
        let _ = self.live[kind.index()].fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
            n.checked_sub(1)
        });
    }

    /// Number of live handles of `kind`.
    pub fn live(&self, kind: ResourceKind) -> usize {
        self.live[kind.index()].load(Ordering::Relaxed)
    }

    /// Live counts for every kind, in [`ResourceKind::ALL`] order.
    pub fn snapshot(&self) -> [usize; 6] {
        ResourceKind::ALL.map(|kind| self.live(kind))
    }

    /// Kinds with outstanding handles and their counts.
    pub fn leaks(&self) -> Vec<(ResourceKind, usize)> {
        ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.live(kind)))
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

static TRACKER: Tracker = Tracker::new();

/// The process-wide tracker.
pub fn global() -> &'static Tracker {
    &TRACKER
}

/// Logs every kind that still has live handles.
pub fn report_leaks() {
    for (kind, count) in TRACKER.leaks() {
        tracing::warn!(kind = kind.name(), count, "native handles were never released");
    }
}
