//! Write batch exports.
//!
//! Appending to a batch never touches the engine and cannot fail once its
//! arguments are validated, so keys and values are pinned in critical mode.

use crate::bytes::{self, AccessMode, ByteArg};
use crate::error::{or_throw, JniResult};
use crate::handle::Handle;
use jni::objects::{JByteArray, JByteBuffer, JClass};
use jni::sys::{jint, jlong};
use jni::JNIEnv;
use ldbridge_core::WriteBatch;

fn batch<'a>(handle: jlong) -> JniResult<&'a mut WriteBatch> {
    // SAFETY: batches are never mutated concurrently, and the JVM only
    // passes handles it has not released.
    unsafe { Handle::<WriteBatch>::from_raw(handle).as_mut() }
}

/// `static native long writeBatchNew()`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchNew<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jlong {
    Handle::into_raw(WriteBatch::new())
}

/// `static native void writeBatchRelease(long batch)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchRelease<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
) {
    let result = unsafe { Handle::<WriteBatch>::from_raw(batch).release() }.map(WriteBatch::release);
    or_throw(&mut env, result, ());
}

fn put<'local>(
    env: &mut JNIEnv<'local>,
    batch: jlong,
    key: ByteArg<'_, 'local>,
    value: ByteArg<'_, 'local>,
) -> JniResult<()> {
    let batch = self::batch(batch)?;
    let (key, value) = bytes::pin_pair(env, key, value, AccessMode::Critical)?;
    batch.put(key.as_slice(), value.as_slice());
    Ok(())
}

/// `static native void writeBatchPutBB(long batch, ByteBuffer key, int keyLen, ByteBuffer value, int valueLen)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchPutBB<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
    key: JByteBuffer<'local>,
    key_len: jint,
    value: JByteBuffer<'local>,
    value_len: jint,
) {
    let result = put(
        &mut env,
        batch,
        ByteArg::direct(&key, key_len),
        ByteArg::direct(&value, value_len),
    );
    or_throw(&mut env, result, ());
}

/// `static native void writeBatchPutAB(long batch, byte[] key, int keyOffset, int keyLen, ByteBuffer value, int valueLen)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchPutAB<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
    key: JByteArray<'local>,
    key_offset: jint,
    key_len: jint,
    value: JByteBuffer<'local>,
    value_len: jint,
) {
    let result = put(
        &mut env,
        batch,
        ByteArg::array(&key, key_offset, key_len),
        ByteArg::direct(&value, value_len),
    );
    or_throw(&mut env, result, ());
}

/// `static native void writeBatchPutBA(long batch, ByteBuffer key, int keyLen, byte[] value, int valueOffset, int valueLen)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchPutBA<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
    key: JByteBuffer<'local>,
    key_len: jint,
    value: JByteArray<'local>,
    value_offset: jint,
    value_len: jint,
) {
    let result = put(
        &mut env,
        batch,
        ByteArg::direct(&key, key_len),
        ByteArg::array(&value, value_offset, value_len),
    );
    or_throw(&mut env, result, ());
}

/// `static native void writeBatchPutAA(long batch, byte[] key, int keyOffset, int keyLen, byte[] value, int valueOffset, int valueLen)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchPutAA<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
    key: JByteArray<'local>,
    key_offset: jint,
    key_len: jint,
    value: JByteArray<'local>,
    value_offset: jint,
    value_len: jint,
) {
    let result = put(
        &mut env,
        batch,
        ByteArg::array(&key, key_offset, key_len),
        ByteArg::array(&value, value_offset, value_len),
    );
    or_throw(&mut env, result, ());
}

fn delete<'local>(env: &mut JNIEnv<'local>, batch: jlong, key: ByteArg<'_, 'local>) -> JniResult<()> {
    let batch = self::batch(batch)?;
    let key = bytes::pin(env, key, AccessMode::Critical)?;
    batch.delete(key.as_slice());
    Ok(())
}

/// `static native void writeBatchDeleteB(long batch, ByteBuffer key, int keyLen)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchDeleteB<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
    key: JByteBuffer<'local>,
    key_len: jint,
) {
    let result = delete(&mut env, batch, ByteArg::direct(&key, key_len));
    or_throw(&mut env, result, ());
}

/// `static native void writeBatchDeleteA(long batch, byte[] key, int keyOffset, int keyLen)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchDeleteA<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
    key: JByteArray<'local>,
    key_offset: jint,
    key_len: jint,
) {
    let result = delete(&mut env, batch, ByteArg::array(&key, key_offset, key_len));
    or_throw(&mut env, result, ());
}

/// `static native void writeBatchClear(long batch)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchClear<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
) {
    let result = self::batch(batch).map(WriteBatch::clear);
    or_throw(&mut env, result, ());
}

/// Appends `source` onto `target`; both may name the same batch.
fn append(target: jlong, source: jlong) -> JniResult<()> {
    if target == source {
        let batch = batch(target)?;
        let copy = batch.clone();
        batch.append(&copy);
        return Ok(());
    }
    // SAFETY: distinct handles name distinct batches.
    let source = unsafe { Handle::<WriteBatch>::from_raw(source).as_ref()? };
    batch(target)?.append(source);
    Ok(())
}

/// `static native void writeBatchAppend(long batch, long source)`
///
/// `source` is left unchanged.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_writeBatchAppend<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    batch: jlong,
    source: jlong,
) {
    let result = append(batch, source);
    or_throw(&mut env, result, ());
}
