//! Opaque `jlong` handles over boxed native resources.

use crate::error::{JniError, JniResult};
use crate::snapshot::SessionSnapshot;
use crate::tracker::{self, ResourceKind};
use jni::sys::jlong;
use ldbridge_core::{Cursor, Database, Options, ReturnedBuffer, WriteBatch};
use std::marker::PhantomData;

/// A native resource that can be handed to the JVM.
pub trait Resource: Sized {
    /// Accounting bucket of the resource.
    const KIND: ResourceKind;
}

impl Resource for Options {
    const KIND: ResourceKind = ResourceKind::Options;
}

impl Resource for Database {
    const KIND: ResourceKind = ResourceKind::Database;
}

impl Resource for SessionSnapshot {
    const KIND: ResourceKind = ResourceKind::Snapshot;
}

impl Resource for Cursor {
    const KIND: ResourceKind = ResourceKind::Iterator;
}

impl Resource for WriteBatch {
    const KIND: ResourceKind = ResourceKind::WriteBatch;
}

impl Resource for ReturnedBuffer {
    const KIND: ResourceKind = ResourceKind::Buffer;
}

/// A typed view of a raw handle.
///
/// `0` is reserved for "absent"; every other value must come from
/// [`Handle::into_raw`] for the same `T` and not have been released.
pub struct Handle<T: Resource> {
    raw: jlong,
    _marker: PhantomData<*mut T>,
}

impl<T: Resource> Handle<T> {
    /// Boxes `value` and returns its raw handle.
    pub fn into_raw(value: T) -> jlong {
        tracker::global().acquired(T::KIND);
        Box::into_raw(Box::new(value)) as jlong
    }

    /// Wraps a raw handle received from the JVM.
    pub fn from_raw(raw: jlong) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// True for the absent handle.
    pub fn is_null(&self) -> bool {
        self.raw == 0
    }

    fn ptr(&self) -> JniResult<*mut T> {
        if self.is_null() {
            return Err(JniError::NullHandle(T::KIND.name()));
        }
        Ok(self.raw as *mut T)
    }

    /// Borrows the resource.
    ///
    /// # Safety
    ///
    /// The handle must be `0` or live, and no mutable borrow of it may be
    /// active for `'a`.
    pub unsafe fn as_ref<'a>(&self) -> JniResult<&'a T> {
        Ok(&*self.ptr()?)
    }

    /// Borrows the resource, `None` for the absent handle.
    ///
    /// # Safety
    ///
    /// Same as [`Handle::as_ref`].
    pub unsafe fn as_option<'a>(&self) -> Option<&'a T> {
        self.ptr().ok().map(|ptr| &*ptr)
    }

    /// Mutably borrows the resource.
    ///
    /// # Safety
    ///
    /// The handle must be `0` or live, and no other borrow of it may be
    /// active for `'a`.
    pub unsafe fn as_mut<'a>(&self) -> JniResult<&'a mut T> {
        Ok(&mut *self.ptr()?)
    }

    /// Takes the resource back, ending the handle.
    ///
    /// # Safety
    ///
    /// The handle must be `0` or live, and must not be used afterwards.
    pub unsafe fn release(self) -> JniResult<T> {
        let boxed = Box::from_raw(self.ptr()?);
        tracker::global().released(T::KIND);
        Ok(*boxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serial;

    #[test]
    fn roundtrip_through_raw() {
        let _serial = serial();
        let mut batch = WriteBatch::new();
        batch.put(b"k", b"v");
        let raw = Handle::into_raw(batch);
        assert_ne!(raw, 0);

        let handle = Handle::<WriteBatch>::from_raw(raw);
        unsafe {
            assert_eq!(handle.as_ref().unwrap().len(), 1);
            handle.as_mut().unwrap().delete(b"k");
            let batch = Handle::<WriteBatch>::from_raw(raw).release().unwrap();
            assert_eq!(batch.len(), 2);
        }
    }

    #[test]
    fn null_handle_is_rejected() {
        let handle = Handle::<Database>::from_raw(0);
        assert!(handle.is_null());
        unsafe {
            let err = handle.as_ref().unwrap_err();
            assert!(matches!(err, JniError::NullHandle("database")));
            assert!(handle.as_option().is_none());
            assert!(Handle::<Cursor>::from_raw(0).release().is_err());
        }
    }

    #[test]
    fn kinds_per_resource() {
        assert_eq!(Options::KIND, ResourceKind::Options);
        assert_eq!(Cursor::KIND, ResourceKind::Iterator);
        assert_eq!(ReturnedBuffer::KIND, ResourceKind::Buffer);
        assert_eq!(SessionSnapshot::KIND, ResourceKind::Snapshot);
    }
}
