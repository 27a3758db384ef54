//! Iterator exports.
//!
//! Every positioning call writes the key and value lengths of the new entry
//! into a caller-supplied `int[2]`, `{-1, -1}` once the cursor is no longer
//! valid.

use crate::buffer::direct_view;
use crate::bytes::{self, AccessMode, ByteArg};
use crate::database::read_flags;
use crate::error::{or_throw, JniError, JniResult};
use crate::handle::Handle;
use jni::objects::{JByteArray, JByteBuffer, JClass, JIntArray};
use jni::sys::{jboolean, jint, jlong, jobject};
use jni::JNIEnv;
use ldbridge_core::{BridgeResult, Cursor, Database, Lengths};
use std::ptr;

fn cursor<'a>(handle: jlong) -> JniResult<&'a mut Cursor> {
    // SAFETY: iterators are confined to one thread at a time, and the JVM
    // only passes handles it has not released.
    unsafe { Handle::<Cursor>::from_raw(handle).as_mut() }
}

fn report(env: &JNIEnv<'_>, lens: &JIntArray<'_>, lengths: Lengths) -> JniResult<()> {
    env.set_int_array_region(lens, 0, &[lengths.key, lengths.value])?;
    Ok(())
}

fn position(
    env: &mut JNIEnv<'_>,
    it: jlong,
    lens: &JIntArray<'_>,
    step: fn(&mut Cursor) -> BridgeResult<Lengths>,
) {
    let result = cursor(it).and_then(|cursor| {
        let lengths = step(cursor)?;
        report(env, lens, lengths)
    });
    or_throw(env, result, ());
}

/// `static native long iteratorNew(long db, boolean verifyChecksum, boolean fillCache, long snapshot)`
///
/// The new iterator is not positioned.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorNew<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    verify_checksums: jboolean,
    fill_cache: jboolean,
    snapshot: jlong,
) -> jlong {
    let result = unsafe { Handle::<Database>::from_raw(db).as_ref() }.and_then(|db| {
        let flags = unsafe { read_flags(verify_checksums, fill_cache, snapshot) };
        let cursor = db.cursor(flags)?;
        Ok(Handle::into_raw(cursor))
    });
    or_throw(&mut env, result, 0)
}

/// `static native void iteratorRelease(long it)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorRelease<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
) {
    let result = unsafe { Handle::<Cursor>::from_raw(it).release() }.map(Cursor::release);
    or_throw(&mut env, result, ());
}

/// `static native void iteratorSeekToFirst(long it, int[] lens)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorSeekToFirst<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
    lens: JIntArray<'local>,
) {
    position(&mut env, it, &lens, Cursor::seek_to_first);
}

/// `static native void iteratorSeekToLast(long it, int[] lens)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorSeekToLast<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
    lens: JIntArray<'local>,
) {
    position(&mut env, it, &lens, Cursor::seek_to_last);
}

/// `static native void iteratorNext(long it, int[] lens)`
///
/// Raises if the iterator is not valid.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorNext<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
    lens: JIntArray<'local>,
) {
    position(&mut env, it, &lens, Cursor::next);
}

/// `static native void iteratorPrev(long it, int[] lens)`
///
/// Raises if the iterator is not valid.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorPrev<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
    lens: JIntArray<'local>,
) {
    position(&mut env, it, &lens, Cursor::prev);
}

fn seek<'local>(
    env: &mut JNIEnv<'local>,
    it: jlong,
    key: ByteArg<'_, 'local>,
    lens: &JIntArray<'local>,
) -> JniResult<()> {
    let cursor = cursor(it)?;
    let lengths = {
        let key = bytes::pin(env, key, AccessMode::Synchronized)?;
        cursor.seek(key.as_slice())?
    };
    report(env, lens, lengths)
}

/// `static native void iteratorSeekB(long it, ByteBuffer key, int keyLen, int[] lens)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorSeekB<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
    key: JByteBuffer<'local>,
    key_len: jint,
    lens: JIntArray<'local>,
) {
    let result = seek(&mut env, it, ByteArg::direct(&key, key_len), &lens);
    or_throw(&mut env, result, ());
}

/// `static native void iteratorSeekA(long it, byte[] key, int keyOffset, int keyLen, int[] lens)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorSeekA<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
    key: JByteArray<'local>,
    key_offset: jint,
    key_len: jint,
    lens: JIntArray<'local>,
) {
    let result = seek(&mut env, it, ByteArg::array(&key, key_offset, key_len), &lens);
    or_throw(&mut env, result, ());
}

fn entry_view(
    env: &mut JNIEnv<'_>,
    it: jlong,
    part: fn(&Cursor) -> BridgeResult<&[u8]>,
) -> JniResult<jobject> {
    let cursor = cursor(it)?;
    let bytes = part(cursor).map_err(JniError::from)?;
    direct_view(env, bytes)
}

/// `static native ByteBuffer iteratorKey(long it)`
///
/// The buffer aliases engine memory and is valid until the iterator moves
/// or is released.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorKey<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
) -> jobject {
    let result = entry_view(&mut env, it, Cursor::key);
    or_throw(&mut env, result, ptr::null_mut())
}

/// `static native ByteBuffer iteratorValue(long it)`
///
/// The buffer aliases engine memory and is valid until the iterator moves
/// or is released.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_iteratorValue<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    it: jlong,
) -> jobject {
    let result = entry_view(&mut env, it, Cursor::value);
    or_throw(&mut env, result, ptr::null_mut())
}
