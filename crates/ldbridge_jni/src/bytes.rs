//! Scoped read-only byte views over JVM memory.
//!
//! A byte argument arrives either as a direct `ByteBuffer` plus a length, or
//! as a `byte[]` plus an offset and a length. Each call turns its arguments
//! into [`ByteView`]s in two phases:
//!
//! 1. *resolve*: every range is checked and every JNI query (buffer address,
//!    capacity, array length) is made. Nothing is pinned yet.
//! 2. *pin*: arrays are pinned, direct buffers first.
//!
//! Views release their pin when dropped with `JNI_ABORT`, so the managed
//! array is never written back. Callers raise exceptions only after their
//! views are gone, which keeps every JNI call out of critical regions.

use crate::error::{JniError, JniResult};
use jni::objects::{AutoElements, JByteArray, JByteBuffer, ReleaseMode};
use jni::sys::{jbyte, jint, JNI_ABORT};
use jni::JNIEnv;
use std::marker::PhantomData;
use std::ops::Range;
use std::ptr;

/// How an array argument is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// `GetByteArrayElements`: a stable pointer, other JNI calls stay legal
    /// while the view is live.
    Synchronized,
    /// `GetPrimitiveArrayCritical`: the raw array, no JNI call may run while
    /// the view is live.
    Critical,
}

/// Where a byte argument lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Off-heap memory behind a direct `ByteBuffer`.
    Direct,
    /// A relocatable `byte[]`.
    Array,
}

/// Order in which the two views of a call are pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// First argument, then second.
    AsGiven,
    /// Second argument, then first.
    Swapped,
}

/// Direct buffers are always pinned before arrays.
pub fn acquisition_order(first: Source, second: Source) -> Order {
    match (first, second) {
        (Source::Array, Source::Direct) => Order::Swapped,
        _ => Order::AsGiven,
    }
}

/// Validates `offset..offset + len` against `available` bytes.
pub fn check_range(offset: jint, len: jint, available: usize) -> JniResult<Range<usize>> {
    let Ok(len) = usize::try_from(len) else {
        return Err(JniError::invalid_argument(format!("negative length {len}")));
    };
    let Ok(offset) = usize::try_from(offset) else {
        return Err(JniError::invalid_argument(format!("negative offset {offset}")));
    };
    match offset.checked_add(len) {
        Some(end) if end <= available => Ok(offset..end),
        _ => Err(JniError::invalid_argument(format!(
            "range {offset}+{len} exceeds {available} available bytes"
        ))),
    }
}

/// A byte argument as received from the JVM.
#[derive(Clone, Copy)]
pub enum ByteArg<'a, 'local> {
    /// A direct buffer and the number of bytes to read from its start.
    Direct {
        /// The buffer.
        buffer: &'a JByteBuffer<'local>,
        /// Bytes to read.
        len: jint,
    },
    /// A slice of a byte array.
    Array {
        /// The array.
        array: &'a JByteArray<'local>,
        /// First byte of the slice.
        offset: jint,
        /// Bytes to read.
        len: jint,
    },
}

impl<'a, 'local> ByteArg<'a, 'local> {
    /// A direct buffer argument.
    pub fn direct(buffer: &'a JByteBuffer<'local>, len: jint) -> Self {
        ByteArg::Direct { buffer, len }
    }

    /// A byte array argument.
    pub fn array(array: &'a JByteArray<'local>, offset: jint, len: jint) -> Self {
        ByteArg::Array { array, offset, len }
    }

    /// Where the bytes live.
    pub fn source(&self) -> Source {
        match self {
            ByteArg::Direct { .. } => Source::Direct,
            ByteArg::Array { .. } => Source::Array,
        }
    }

    fn len(&self) -> jint {
        match *self {
            ByteArg::Direct { len, .. } | ByteArg::Array { len, .. } => len,
        }
    }

    fn resolve(self, env: &JNIEnv<'local>) -> JniResult<Resolved<'a, 'local>> {
        if self.len() == 0 {
            return Ok(Resolved::Empty);
        }
        match self {
            ByteArg::Direct { buffer, len } => {
                let capacity = env
                    .get_direct_buffer_capacity(buffer)
                    .map_err(|_| JniError::invalid_argument("not a direct ByteBuffer"))?;
                let range = check_range(0, len, capacity)?;
                let address = env
                    .get_direct_buffer_address(buffer)
                    .map_err(|_| JniError::invalid_argument("not a direct ByteBuffer"))?;
                Ok(Resolved::Direct {
                    ptr: address.cast_const(),
                    len: range.len(),
                })
            }
            ByteArg::Array { array, offset, len } => {
                let available = env.get_array_length(array).map_err(|err| match err {
                    jni::errors::Error::NullPtr(_) => JniError::invalid_argument("null byte array"),
                    other => other.into(),
                })?;
                let range = check_range(offset, len, usize::try_from(available).unwrap_or(0))?;
                Ok(Resolved::Array { array, range })
            }
        }
    }
}

enum Resolved<'a, 'local> {
    Empty,
    Direct {
        ptr: *const u8,
        len: usize,
    },
    Array {
        array: &'a JByteArray<'local>,
        range: Range<usize>,
    },
}

impl<'a, 'local> Resolved<'a, 'local> {
    fn pin(self, env: &mut JNIEnv<'local>, mode: AccessMode) -> JniResult<ByteView<'a, 'local>> {
        let pinned = match self {
            Resolved::Empty => Pinned::Empty,
            Resolved::Direct { ptr, len } => Pinned::Direct { ptr, len },
            Resolved::Array { array, range } => match mode {
                AccessMode::Synchronized => {
                    // SAFETY: the array outlives the view and the elements are
                    // only read; NoCopyBack releases with JNI_ABORT.
                    let elements = unsafe { env.get_array_elements(array, ReleaseMode::NoCopyBack)? };
                    Pinned::Elements { elements, range }
                }
                AccessMode::Critical => Pinned::Critical {
                    pin: CriticalPin::acquire(env, array)?,
                    range,
                },
            },
        };
        Ok(ByteView { pinned })
    }
}

/// Pins a single argument.
pub fn pin<'a, 'local>(
    env: &mut JNIEnv<'local>,
    arg: ByteArg<'a, 'local>,
    mode: AccessMode,
) -> JniResult<ByteView<'a, 'local>> {
    let resolved = arg.resolve(env)?;
    resolved.pin(env, mode)
}

/// Pins two arguments, direct buffers first.
///
/// Both arguments are resolved before either is pinned.
pub fn pin_pair<'a, 'local>(
    env: &mut JNIEnv<'local>,
    first: ByteArg<'a, 'local>,
    second: ByteArg<'a, 'local>,
    mode: AccessMode,
) -> JniResult<(ByteView<'a, 'local>, ByteView<'a, 'local>)> {
    let order = acquisition_order(first.source(), second.source());
    let first = first.resolve(env)?;
    let second = second.resolve(env)?;
    match order {
        Order::AsGiven => {
            let first = first.pin(env, mode)?;
            let second = second.pin(env, mode)?;
            Ok((first, second))
        }
        Order::Swapped => {
            let second = second.pin(env, mode)?;
            let first = first.pin(env, mode)?;
            Ok((first, second))
        }
    }
}

/// A read-only view valid for the rest of the call.
pub struct ByteView<'a, 'local> {
    pinned: Pinned<'a, 'local>,
}

enum Pinned<'a, 'local> {
    Empty,
    Direct {
        ptr: *const u8,
        len: usize,
    },
    Elements {
        elements: AutoElements<'local, 'local, 'a, jbyte>,
        range: Range<usize>,
    },
    Critical {
        pin: CriticalPin<'a>,
        range: Range<usize>,
    },
}

impl ByteView<'_, '_> {
    /// The viewed bytes.
    pub fn as_slice(&self) -> &[u8] {
        match &self.pinned {
            Pinned::Empty => &[],
            // SAFETY: the range was checked against the buffer capacity and
            // the buffer object is alive for the whole call.
            Pinned::Direct { ptr, len } => unsafe { std::slice::from_raw_parts(*ptr, *len) },
            Pinned::Elements { elements, range } => match elements.get(range.clone()) {
                // SAFETY: i8 and u8 share size and alignment.
                Some(bytes) => unsafe {
                    std::slice::from_raw_parts(bytes.as_ptr().cast::<u8>(), bytes.len())
                },
                None => &[],
            },
            // SAFETY: the range was checked against the array length and the
            // array stays pinned until `pin` drops.
            Pinned::Critical { pin, range } => unsafe {
                std::slice::from_raw_parts(pin.ptr.cast_const().add(range.start), range.len())
            },
        }
    }

    /// Number of viewed bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True for a zero-length view.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `GetPrimitiveArrayCritical` pin.
///
/// The `jni` crate's own critical guard borrows the environment mutably,
/// which rules out the two nested pins a key/value call needs.
struct CriticalPin<'a> {
    env: *mut jni::sys::JNIEnv,
    array: jni::sys::jarray,
    ptr: *mut u8,
    _array: PhantomData<&'a ()>,
}

impl<'a> CriticalPin<'a> {
    fn acquire(env: &JNIEnv<'_>, array: &'a JByteArray<'_>) -> JniResult<Self> {
        let raw = env.get_raw();
        // SAFETY: `raw` is the live environment of the calling thread.
        let get = unsafe { (**raw).GetPrimitiveArrayCritical }.ok_or(
            jni::errors::Error::JNIEnvMethodNotFound("GetPrimitiveArrayCritical"),
        )?;
        let array = array.as_raw();
        // SAFETY: `array` is a live, non-null byte array reference.
        let ptr = unsafe { get(raw, array, ptr::null_mut()) }.cast::<u8>();
        if ptr.is_null() {
            return Err(jni::errors::Error::NullPtr("GetPrimitiveArrayCritical").into());
        }
        Ok(Self {
            env: raw,
            array,
            ptr,
            _array: PhantomData,
        })
    }
}

impl Drop for CriticalPin<'_> {
    fn drop(&mut self) {
        // SAFETY: pairs with the successful acquire above on the same thread.
        unsafe {
            if let Some(release) = (**self.env).ReleasePrimitiveArrayCritical {
                release(self.env, self.array, self.ptr.cast(), JNI_ABORT);
            }
        }
    }
}
