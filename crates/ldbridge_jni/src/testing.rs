//! In-process JVM for tests that drive the exports through a real `JNIEnv`.

use crate::buffer::{
    Java_org_kodein_db_leveldb_jni_Native_bufferNew,
    Java_org_kodein_db_leveldb_jni_Native_bufferRelease,
};
use crate::database::{
    Java_org_kodein_db_leveldb_jni_Native_dbOpen, Java_org_kodein_db_leveldb_jni_Native_dbRelease,
    Java_org_kodein_db_leveldb_jni_Native_getA, Java_org_kodein_db_leveldb_jni_Native_putAA,
};
use crate::error;
use crate::options::{
    Java_org_kodein_db_leveldb_jni_Native_optionsNew,
    Java_org_kodein_db_leveldb_jni_Native_optionsRelease,
};
use jni::objects::{JByteArray, JByteBuffer, JClass, JObject, JString};
use jni::sys::{jint, jlong, jobject, JNI_FALSE, JNI_TRUE};
use jni::{InitArgsBuilder, JNIEnv, JNIVersion, JavaVM};
use parking_lot::{Mutex, MutexGuard};
use std::ptr;
use std::sync::OnceLock;
use tempfile::TempDir;

/// Raised in place of `LevelDBException`, which is not on the test class path.
pub const RAISED_CLASS: &str = "java/lang/IllegalStateException";

static HANDLES: Mutex<()> = Mutex::new(());

/// Serializes tests that create handles, so live counts stay exact.
pub fn serial() -> MutexGuard<'static, ()> {
    HANDLES.lock()
}

fn jvm() -> &'static JavaVM {
    static JVM: OnceLock<JavaVM> = OnceLock::new();
    JVM.get_or_init(|| {
        let args = InitArgsBuilder::new()
            .version(JNIVersion::V8)
            .build()
            .expect("JVM init args");
        let vm = JavaVM::new(args).expect("JVM start");
        let mut env = vm.attach_current_thread().expect("attach init thread");
        error::cache_class(&mut env, RAISED_CLASS).expect("cache raised class");
        drop(env);
        vm
    })
}

/// Environment of the calling test thread.
pub fn env() -> JNIEnv<'static> {
    jvm()
        .attach_current_thread_permanently()
        .expect("attach test thread")
}

/// Second environment value for passing to an export by value.
pub fn call(env: &JNIEnv<'static>) -> JNIEnv<'static> {
    // SAFETY: both values refer to the current thread's environment and the
    // copy is consumed by a single export call.
    unsafe { env.unsafe_clone() }
}

/// The `Native` class argument; no export reads it.
pub fn class() -> JClass<'static> {
    JClass::from(JObject::null())
}

/// A `byte[]` holding `bytes`.
pub fn array(env: &mut JNIEnv<'static>, bytes: &[u8]) -> JByteArray<'static> {
    env.byte_array_from_slice(bytes).expect("byte array")
}

/// Length of `bytes` as a JNI int.
pub fn len(bytes: &[u8]) -> jint {
    jint::try_from(bytes.len()).expect("length fits in jint")
}

/// A null `byte[]` reference.
pub fn null_array() -> JByteArray<'static> {
    // SAFETY: a null reference is a valid array argument value.
    unsafe { JByteArray::from_raw(ptr::null_mut()) }
}

/// A direct `ByteBuffer` over `bytes`, which must outlive the buffer's use.
pub fn direct(env: &mut JNIEnv<'static>, bytes: &mut [u8]) -> JByteBuffer<'static> {
    // SAFETY: the caller keeps `bytes` alive and unmoved while Java may read it.
    unsafe { env.new_direct_byte_buffer(bytes.as_mut_ptr(), bytes.len()) }.expect("direct buffer")
}

/// Copies the contents of a direct `ByteBuffer` returned by an export.
pub fn read_direct(env: &mut JNIEnv<'static>, buffer: jobject) -> Option<Vec<u8>> {
    if buffer.is_null() {
        return None;
    }
    // SAFETY: `buffer` is a live local reference to a direct ByteBuffer.
    let buffer = unsafe { JByteBuffer::from_raw(buffer) };
    let len = env.get_direct_buffer_capacity(&buffer).expect("capacity");
    if len == 0 {
        return Some(Vec::new());
    }
    let address = env.get_direct_buffer_address(&buffer).expect("address");
    // SAFETY: the export aliases `len` live bytes at `address`.
    Some(unsafe { std::slice::from_raw_parts(address, len) }.to_vec())
}

/// Clears the pending exception, returning its message.
///
/// Panics if the pending exception is not of [`RAISED_CLASS`].
pub fn take_exception(env: &mut JNIEnv<'static>) -> Option<String> {
    if !env.exception_check().expect("exception check") {
        return None;
    }
    let throwable = env.exception_occurred().expect("pending exception");
    env.exception_clear().expect("clear exception");
    assert!(env.is_instance_of(&throwable, RAISED_CLASS).expect("instance check"));
    let message = env
        .call_method(&throwable, "getMessage", "()Ljava/lang/String;", &[])
        .and_then(|value| value.l())
        .expect("exception message");
    let message = JString::from(message);
    Some(env.get_string(&message).expect("message string").into())
}

/// A database opened through `optionsNew` and `dbOpen`.
pub struct JvmDatabase {
    /// Options handle.
    pub options: jlong,
    /// Database handle.
    pub db: jlong,
    dir: TempDir,
}

impl JvmDatabase {
    /// Opens a fresh database in a temp directory with default settings.
    pub fn open(env: &mut JNIEnv<'static>) -> Self {
        let options = Java_org_kodein_db_leveldb_jni_Native_optionsNew(
            call(env),
            class(),
            JNI_FALSE,
            JNI_TRUE,
            JNI_FALSE,
            JNI_FALSE,
            4 * 1024 * 1024,
            1000,
            8 * 1024 * 1024,
            4 * 1024,
            16,
            2 * 1024 * 1024,
            JNI_TRUE,
            JNI_FALSE,
            10,
        );
        assert_eq!(take_exception(env), None);
        assert_ne!(options, 0);

        let dir = TempDir::new().expect("temp dir");
        let path = env
            .new_string(dir.path().join("db").to_string_lossy())
            .expect("path string");
        let db = Java_org_kodein_db_leveldb_jni_Native_dbOpen(call(env), class(), path, options, JNI_FALSE);
        assert_eq!(take_exception(env), None);
        assert_ne!(db, 0);

        Self { options, db, dir }
    }

    /// Releases the database handle alone, returning its old value.
    pub fn release_db(&mut self, env: &mut JNIEnv<'static>) -> jlong {
        let db = std::mem::take(&mut self.db);
        Java_org_kodein_db_leveldb_jni_Native_dbRelease(call(env), class(), db);
        assert_eq!(take_exception(env), None);
        db
    }

    /// Releases the database, unless already released, and its options.
    pub fn close(mut self, env: &mut JNIEnv<'static>) {
        if self.db != 0 {
            self.release_db(env);
        }
        Java_org_kodein_db_leveldb_jni_Native_optionsRelease(call(env), class(), self.options);
        assert_eq!(take_exception(env), None);
        drop(self.dir);
    }
}

/// Stores `value` under `key` through `putAA`.
pub fn put_entry(env: &mut JNIEnv<'static>, db: jlong, key: &[u8], value: &[u8]) {
    let key_array = array(env, key);
    let value_array = array(env, value);
    Java_org_kodein_db_leveldb_jni_Native_putAA(
        call(env),
        class(),
        db,
        key_array,
        0,
        len(key),
        value_array,
        0,
        len(value),
        JNI_FALSE,
    );
    assert_eq!(take_exception(env), None);
}

/// Reads `key` through `getA`, `bufferNew` and `bufferRelease`.
pub fn get_entry(env: &mut JNIEnv<'static>, db: jlong, key: &[u8], snapshot: jlong) -> Option<Vec<u8>> {
    let key_array = array(env, key);
    let buffer = Java_org_kodein_db_leveldb_jni_Native_getA(
        call(env),
        class(),
        db,
        key_array,
        0,
        len(key),
        JNI_FALSE,
        JNI_TRUE,
        snapshot,
    );
    assert_eq!(take_exception(env), None);
    if buffer == 0 {
        return None;
    }
    let view = Java_org_kodein_db_leveldb_jni_Native_bufferNew(call(env), class(), buffer);
    assert_eq!(take_exception(env), None);
    let bytes = read_direct(env, view);
    Java_org_kodein_db_leveldb_jni_Native_bufferRelease(call(env), class(), buffer);
    assert_eq!(take_exception(env), None);
    bytes
}
