//! Database exports.
//!
//! Suffixes name the byte argument shapes: `B` is a direct `ByteBuffer` plus
//! a length, `A` is a `byte[]` plus an offset and a length. Keys and values
//! are pinned in synchronized mode since every call here can fail.

use crate::bytes::{self, AccessMode, ByteArg};
use crate::error::{or_throw, JniError, JniResult};
use crate::flag;
use crate::handle::Handle;
use crate::snapshot::SessionSnapshot;
use jni::objects::{JByteArray, JByteBuffer, JClass, JString};
use jni::sys::{jboolean, jint, jlong};
use jni::JNIEnv;
use ldbridge_core::{Database, Options, ReadFlags, WriteBatch, WriteFlags};

fn java_path(env: &mut JNIEnv<'_>, path: &JString<'_>) -> JniResult<String> {
    if path.is_null() {
        return Err(JniError::invalid_argument("null path"));
    }
    Ok(env.get_string(path)?.into())
}

fn write_flags(sync: jboolean) -> WriteFlags {
    WriteFlags { sync: flag(sync) }
}

/// Read flags for a call, `snapshot == 0` meaning the latest state.
///
/// # Safety
///
/// `snapshot` must be `0` or a live snapshot handle.
pub(crate) unsafe fn read_flags<'a>(
    verify_checksums: jboolean,
    fill_cache: jboolean,
    snapshot: jlong,
) -> ReadFlags<'a> {
    ReadFlags {
        verify_checksums: flag(verify_checksums),
        fill_cache: flag(fill_cache),
        snapshot: Handle::<SessionSnapshot>::from_raw(snapshot)
            .as_option()
            .map(SessionSnapshot::snapshot),
    }
}

fn db<'a>(handle: jlong) -> JniResult<&'a Database> {
    // SAFETY: the JVM only passes database handles it has not released.
    unsafe { Handle::<Database>::from_raw(handle).as_ref() }
}

fn open(
    env: &mut JNIEnv<'_>,
    path: &JString<'_>,
    options: jlong,
    repair_on_corruption: jboolean,
) -> JniResult<jlong> {
    let path = java_path(env, path)?;
    let options = unsafe { Handle::<Options>::from_raw(options).as_ref()? };
    let db = Database::open(path, options, flag(repair_on_corruption))?;
    Ok(Handle::into_raw(db))
}

/// `static native long dbOpen(String path, long options, boolean repairOnCorruption)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_dbOpen<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    path: JString<'local>,
    options: jlong,
    repair_on_corruption: jboolean,
) -> jlong {
    let result = open(&mut env, &path, options, repair_on_corruption);
    or_throw(&mut env, result, 0)
}

/// `static native void dbRelease(long db)`
///
/// Snapshots and iterators still open on the database keep the engine
/// running until they are released.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_dbRelease<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
) {
    let result = unsafe { Handle::<Database>::from_raw(db).release() }.map(Database::release);
    or_throw(&mut env, result, ());
}

fn with_path(
    env: &mut JNIEnv<'_>,
    path: &JString<'_>,
    options: jlong,
    action: fn(String, &Options) -> ldbridge_core::BridgeResult<()>,
) -> JniResult<()> {
    let path = java_path(env, path)?;
    let options = unsafe { Handle::<Options>::from_raw(options).as_ref()? };
    action(path, options)?;
    Ok(())
}

/// `static native void dbDestroy(String path, long options)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_dbDestroy<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    path: JString<'local>,
    options: jlong,
) {
    let result = with_path(&mut env, &path, options, |path, options| {
        Database::destroy(path, options)
    });
    or_throw(&mut env, result, ());
}

/// `static native void dbRepair(String path, long options)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_dbRepair<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    path: JString<'local>,
    options: jlong,
) {
    let result = with_path(&mut env, &path, options, |path, options| {
        Database::repair(path, options)
    });
    or_throw(&mut env, result, ());
}

fn put<'local>(
    env: &mut JNIEnv<'local>,
    db: jlong,
    key: ByteArg<'_, 'local>,
    value: ByteArg<'_, 'local>,
    sync: jboolean,
) -> JniResult<()> {
    let db = self::db(db)?;
    let (key, value) = bytes::pin_pair(env, key, value, AccessMode::Synchronized)?;
    db.put(key.as_slice(), value.as_slice(), write_flags(sync))?;
    Ok(())
}

/// `static native void putBB(long db, ByteBuffer key, int keyLen, ByteBuffer value, int valueLen, boolean sync)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_putBB<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    key: JByteBuffer<'local>,
    key_len: jint,
    value: JByteBuffer<'local>,
    value_len: jint,
    sync: jboolean,
) {
    let result = put(
        &mut env,
        db,
        ByteArg::direct(&key, key_len),
        ByteArg::direct(&value, value_len),
        sync,
    );
    or_throw(&mut env, result, ());
}

/// `static native void putAB(long db, byte[] key, int keyOffset, int keyLen, ByteBuffer value, int valueLen, boolean sync)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_putAB<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    key: JByteArray<'local>,
    key_offset: jint,
    key_len: jint,
    value: JByteBuffer<'local>,
    value_len: jint,
    sync: jboolean,
) {
    let result = put(
        &mut env,
        db,
        ByteArg::array(&key, key_offset, key_len),
        ByteArg::direct(&value, value_len),
        sync,
    );
    or_throw(&mut env, result, ());
}

/// `static native void putBA(long db, ByteBuffer key, int keyLen, byte[] value, int valueOffset, int valueLen, boolean sync)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_putBA<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    key: JByteBuffer<'local>,
    key_len: jint,
    value: JByteArray<'local>,
    value_offset: jint,
    value_len: jint,
    sync: jboolean,
) {
    let result = put(
        &mut env,
        db,
        ByteArg::direct(&key, key_len),
        ByteArg::array(&value, value_offset, value_len),
        sync,
    );
    or_throw(&mut env, result, ());
}

/// `static native void putAA(long db, byte[] key, int keyOffset, int keyLen, byte[] value, int valueOffset, int valueLen, boolean sync)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_putAA<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    key: JByteArray<'local>,
    key_offset: jint,
    key_len: jint,
    value: JByteArray<'local>,
    value_offset: jint,
    value_len: jint,
    sync: jboolean,
) {
    let result = put(
        &mut env,
        db,
        ByteArg::array(&key, key_offset, key_len),
        ByteArg::array(&value, value_offset, value_len),
        sync,
    );
    or_throw(&mut env, result, ());
}

fn delete<'local>(
    env: &mut JNIEnv<'local>,
    db: jlong,
    key: ByteArg<'_, 'local>,
    sync: jboolean,
) -> JniResult<()> {
    let db = self::db(db)?;
    let key = bytes::pin(env, key, AccessMode::Synchronized)?;
    db.delete(key.as_slice(), write_flags(sync))?;
    Ok(())
}

/// `static native void deleteB(long db, ByteBuffer key, int keyLen, boolean sync)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_deleteB<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    key: JByteBuffer<'local>,
    key_len: jint,
    sync: jboolean,
) {
    let result = delete(&mut env, db, ByteArg::direct(&key, key_len), sync);
    or_throw(&mut env, result, ());
}

/// `static native void deleteA(long db, byte[] key, int keyOffset, int keyLen, boolean sync)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_deleteA<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    key: JByteArray<'local>,
    key_offset: jint,
    key_len: jint,
    sync: jboolean,
) {
    let result = delete(&mut env, db, ByteArg::array(&key, key_offset, key_len), sync);
    or_throw(&mut env, result, ());
}

/// `static native void write(long db, long batch, boolean sync)`
///
/// Applies the whole batch atomically. The batch stays live and reusable.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_write<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    batch: jlong,
    sync: jboolean,
) {
    let result = self::db(db).and_then(|db| {
        let batch = unsafe { Handle::<WriteBatch>::from_raw(batch).as_ref()? };
        db.write(batch, write_flags(sync)).map_err(JniError::from)
    });
    or_throw(&mut env, result, ());
}

fn get<'local>(
    env: &mut JNIEnv<'local>,
    db: jlong,
    key: ByteArg<'_, 'local>,
    verify_checksums: jboolean,
    fill_cache: jboolean,
    snapshot: jlong,
) -> JniResult<jlong> {
    let db = self::db(db)?;
    let flags = unsafe { read_flags(verify_checksums, fill_cache, snapshot) };
    let key = bytes::pin(env, key, AccessMode::Synchronized)?;
    let found = db.get(key.as_slice(), flags)?;
    Ok(found.map_or(0, Handle::into_raw))
}

/// `static native long getB(long db, ByteBuffer key, int keyLen, boolean verifyChecksum, boolean fillCache, long snapshot)`
///
/// Returns a buffer handle, or `0` when the key is absent.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_getB<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    key: JByteBuffer<'local>,
    key_len: jint,
    verify_checksums: jboolean,
    fill_cache: jboolean,
    snapshot: jlong,
) -> jlong {
    let result = get(
        &mut env,
        db,
        ByteArg::direct(&key, key_len),
        verify_checksums,
        fill_cache,
        snapshot,
    );
    or_throw(&mut env, result, 0)
}

/// `static native long getA(long db, byte[] key, int keyOffset, int keyLen, boolean verifyChecksum, boolean fillCache, long snapshot)`
///
/// Returns a buffer handle, or `0` when the key is absent.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_getA<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    key: JByteArray<'local>,
    key_offset: jint,
    key_len: jint,
    verify_checksums: jboolean,
    fill_cache: jboolean,
    snapshot: jlong,
) -> jlong {
    let result = get(
        &mut env,
        db,
        ByteArg::array(&key, key_offset, key_len),
        verify_checksums,
        fill_cache,
        snapshot,
    );
    or_throw(&mut env, result, 0)
}
