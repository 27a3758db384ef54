//! Returned buffer exports.
//!
//! A read that finds its key returns a buffer handle. `bufferNew` wraps the
//! bytes in a direct `ByteBuffer` without copying; the JVM reads through it
//! and then hands the handle to `bufferRelease`.

use crate::error::{or_throw, JniResult};
use crate::handle::Handle;
use jni::objects::{JClass, JObject};
use jni::sys::{jlong, jobject};
use jni::JNIEnv;
use ldbridge_core::ReturnedBuffer;
use std::ptr::{self, NonNull};

/// Wraps native bytes in a direct `ByteBuffer` aliasing them.
///
/// The JVM must stop reading the buffer before the bytes are freed.
pub(crate) fn direct_view(env: &mut JNIEnv<'_>, bytes: &[u8]) -> JniResult<jobject> {
    let data = if bytes.is_empty() {
        // NewDirectByteBuffer rejects null even for zero capacity.
        NonNull::<u8>::dangling().as_ptr()
    } else {
        bytes.as_ptr().cast_mut()
    };
    // SAFETY: `data` is valid for `bytes.len()` bytes for as long as the
    // owning resource is live; the JVM side never writes through it.
    let buffer = unsafe { env.new_direct_byte_buffer(data, bytes.len())? };
    Ok(JObject::from(buffer).into_raw())
}

/// `static native ByteBuffer bufferNew(long buffer)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_bufferNew<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    buffer: jlong,
) -> jobject {
    let result = unsafe { Handle::<ReturnedBuffer>::from_raw(buffer).as_ref() }
        .and_then(|buffer| direct_view(&mut env, buffer.as_view()));
    or_throw(&mut env, result, ptr::null_mut())
}

/// `static native void bufferRelease(long buffer)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_bufferRelease<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    buffer: jlong,
) {
    let result =
        unsafe { Handle::<ReturnedBuffer>::from_raw(buffer).release() }.map(ReturnedBuffer::release);
    or_throw(&mut env, result, ());
}
