//! # ldbridge JNI
//!
//! Native half of `org.kodein.db.leveldb.jni.Native`.
//!
//! This crate provides:
//! - One `Java_org_kodein_db_leveldb_jni_Native_*` export per native method
//! - Opaque `jlong` handles over boxed session resources
//! - Scoped read-only views over direct buffers and byte arrays
//! - `LevelDBException` raising for every failure
//!
//! Handle `0` means "absent": reads return it for not-found, and the JVM
//! passes it for "no snapshot". Every other handle is created by exactly one
//! export and must be handed back to exactly one release export.

#![warn(missing_docs)]
#![allow(non_snake_case)]

pub mod batch;
pub mod buffer;
pub mod bytes;
pub mod database;
pub mod error;
pub mod handle;
pub mod iterator;
pub mod options;
pub mod snapshot;
pub mod tracker;

#[cfg(test)]
mod testing;

use crate::error::{or_throw, JniError};
use jni::objects::{JClass, JIntArray};
use jni::sys::{jboolean, jint, JNI_ERR, JNI_FALSE, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use std::ffi::c_void;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "LDBRIDGE_LOG";

pub(crate) fn flag(value: jboolean) -> bool {
    value != JNI_FALSE
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // The host may already have installed a subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Library load hook.
///
/// Caches the exception class; loading fails if it cannot be resolved.
///
/// # Safety
///
/// Called by the JVM with its own pointer.
#[no_mangle]
pub unsafe extern "system" fn JNI_OnLoad(vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    init_logging();

    let Ok(vm) = JavaVM::from_raw(vm) else {
        return JNI_ERR;
    };
    let mut env = match vm.get_env() {
        Ok(env) => env,
        Err(e) => {
            tracing::error!(error = %e, "no JNI environment on load");
            return JNI_ERR;
        }
    };

    match error::cache_exception_class(&mut env) {
        Ok(()) => {
            tracing::debug!(version = ldbridge_core::VERSION, "native library loaded");
            JNI_VERSION_1_6
        }
        Err(e) => {
            tracing::error!(error = %e, class = error::EXCEPTION_CLASS, "cannot resolve exception class");
            JNI_ERR
        }
    }
}

/// Library unload hook.
///
/// Drops the cached exception class and reports leaked handles.
///
/// # Safety
///
/// Called by the JVM with its own pointer.
#[no_mangle]
pub unsafe extern "system" fn JNI_OnUnload(_vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) {
    error::clear_exception_class();
    tracker::report_leaks();
}

/// `static native void liveHandles(int[] counts)`
///
/// Fills `counts` with the live handle count of each kind: options,
/// database, snapshot, iterator, write batch, buffer.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_liveHandles<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    counts: JIntArray<'local>,
) {
    let live = tracker::global()
        .snapshot()
        .map(|count| jint::try_from(count).unwrap_or(jint::MAX));
    let result = env
        .set_int_array_region(&counts, 0, &live)
        .map_err(JniError::from);
    or_throw(&mut env, result, ());
}
