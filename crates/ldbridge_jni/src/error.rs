//! Error types and exception raising.

use jni::objects::{GlobalRef, JClass};
use jni::JNIEnv;
use ldbridge_core::BridgeError;
use parking_lot::RwLock;
use thiserror::Error;

/// JNI name of the exception class raised for every failure.
pub const EXCEPTION_CLASS: &str = "org/kodein/db/leveldb/LevelDBException";

/// Result type for export bodies.
pub type JniResult<T> = Result<T, JniError>;

/// Errors raised across the JNI boundary.
#[derive(Debug, Error)]
pub enum JniError {
    /// Failure reported by the session layer.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// A JNI call failed.
    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),

    /// Handle `0` was passed where a live handle is required.
    #[error("invalid argument: null {0} handle")]
    NullHandle(&'static str),
}

impl JniError {
    /// Shorthand for an invalid-argument failure.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        JniError::Bridge(BridgeError::invalid_argument(message))
    }

    /// True if the failing JNI call already left a Java exception pending.
    pub fn is_pending_exception(&self) -> bool {
        matches!(self, JniError::Jni(jni::errors::Error::JavaException))
    }
}

static EXCEPTION: RwLock<Option<GlobalRef>> = RwLock::new(None);

/// Resolves and pins the exception class.
pub fn cache_exception_class(env: &mut JNIEnv<'_>) -> JniResult<()> {
    cache_class(env, EXCEPTION_CLASS)
}

/// Pins `name` as the class raised for every failure.
pub(crate) fn cache_class(env: &mut JNIEnv<'_>, name: &str) -> JniResult<()> {
    let class = env.find_class(name)?;
    let global = env.new_global_ref(&class)?;
    *EXCEPTION.write() = Some(global);
    Ok(())
}

/// Drops the pinned exception class.
pub fn clear_exception_class() {
    EXCEPTION.write().take();
}

/// Raises `err` as a `LevelDBException` on the calling thread.
///
/// Nothing is raised when a Java exception is already pending.
pub fn throw(env: &mut JNIEnv<'_>, err: &JniError) {
    if err.is_pending_exception() || env.exception_check().unwrap_or(false) {
        return;
    }

    let message = err.to_string();
    tracing::debug!(%message, "raising LevelDBException");

    let cached = EXCEPTION.read();
    let thrown = match cached.as_ref() {
        Some(class) => env.throw_new(<&JClass>::from(class.as_obj()), &message),
        None => env.throw_new(EXCEPTION_CLASS, &message),
    };
    if let Err(e) = thrown {
        tracing::error!(error = %e, %message, "failed to raise LevelDBException");
    }
}

/// Unwraps `result`, raising its error and returning `fallback` on failure.
pub fn or_throw<T>(env: &mut JNIEnv<'_>, result: JniResult<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            throw(env, &err);
            fallback
        }
    }
}
