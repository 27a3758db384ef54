//! Owned result of a read.

/// Bytes handed back by a successful read.
///
/// The storage is owned by the bridge, not by the caller's runtime. A view
/// obtained from [`as_view`](Self::as_view) is valid until
/// [`release`](Self::release) consumes the buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct ReturnedBuffer {
    data: Vec<u8>,
}

impl ReturnedBuffer {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Borrows the bytes without copying.
    pub fn as_view(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the value is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Releases the storage.
    pub fn release(self) {}
}
