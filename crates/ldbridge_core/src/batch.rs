//! Pending mutations applied atomically.

/// A single batched mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Insert or overwrite a key.
    Put {
        /// Key bytes.
        key: Vec<u8>,
        /// Value bytes.
        value: Vec<u8>,
    },
    /// Remove a key.
    Delete {
        /// Key bytes.
        key: Vec<u8>,
    },
}

/// An ordered sequence of puts and deletes, independent of any database until
/// written.
///
/// Appending never touches the engine; everything is validated and applied by
/// [`Database::write`](crate::Database::write), which may be called any
/// number of times with the same batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
    data_size: usize,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a put.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.data_size += key.len() + value.len();
        self.ops.push(BatchOp::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    /// Appends a delete.
    pub fn delete(&mut self, key: &[u8]) {
        self.data_size += key.len();
        self.ops.push(BatchOp::Delete { key: key.to_vec() });
    }

    /// Drops every pending operation.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.data_size = 0;
    }

    /// Appends every operation of `other`, in order. `other` is left as is.
    pub fn append(&mut self, other: &WriteBatch) {
        self.ops.extend_from_slice(&other.ops);
        self.data_size += other.data_size;
    }

    /// Pending operations in application order.
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Number of pending operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Total key and value bytes held by the batch.
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    /// Releases the batch.
    pub fn release(self) {}

    pub(crate) fn to_engine(&self) -> rocksdb::WriteBatch {
        let mut batch = rocksdb::WriteBatch::default();
        for op in &self.ops {
            match op {
                BatchOp::Put { key, value } => batch.put(key, value),
                BatchOp::Delete { key } => batch.delete(key),
            }
        }
        batch
    }
}
