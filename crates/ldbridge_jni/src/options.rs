//! Options exports.

use crate::error::{or_throw, JniError};
use crate::flag;
use crate::handle::Handle;
use jni::objects::JClass;
use jni::sys::{jboolean, jint, jlong};
use jni::JNIEnv;
use ldbridge_core::{Compression, Options, OptionsConfig};

/// `static native long optionsNew(...)`
///
/// Builds engine options from every setting at once. Raises on a
/// non-positive cache or size.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_optionsNew<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    print_logs: jboolean,
    create_if_missing: jboolean,
    error_if_exists: jboolean,
    paranoid_checks: jboolean,
    write_buffer_size: jint,
    max_open_files: jint,
    cache_size: jint,
    block_size: jint,
    block_restart_interval: jint,
    max_file_size: jint,
    snappy_compression: jboolean,
    reuse_logs: jboolean,
    bloom_filter_bits_per_key: jint,
) -> jlong {
    let compression = if flag(snappy_compression) {
        Compression::Snappy
    } else {
        Compression::None
    };
    let config = OptionsConfig::new()
        .print_logs(flag(print_logs))
        .create_if_missing(flag(create_if_missing))
        .error_if_exists(flag(error_if_exists))
        .paranoid_checks(flag(paranoid_checks))
        .write_buffer_size(write_buffer_size)
        .max_open_files(max_open_files)
        .cache_size(cache_size)
        .block_size(block_size)
        .block_restart_interval(block_restart_interval)
        .max_file_size(max_file_size)
        .compression(compression)
        .reuse_logs(flag(reuse_logs))
        .bloom_filter_bits_per_key(bloom_filter_bits_per_key);

    let result = Options::new(config)
        .map(Handle::into_raw)
        .map_err(JniError::from);
    or_throw(&mut env, result, 0)
}

/// `static native void optionsRelease(long options)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_optionsRelease<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    options: jlong,
) {
    // SAFETY: the JVM hands back a handle from optionsNew exactly once.
    let result = unsafe { Handle::<Options>::from_raw(options).release() }.map(Options::release);
    or_throw(&mut env, result, ());
}
