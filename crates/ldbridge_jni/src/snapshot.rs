//! Snapshot exports.
//!
//! A snapshot handle records the database handle it was taken on, so
//! `snapshotRelease` can check ownership without touching a database that
//! may already have been released.

use crate::error::{or_throw, JniError, JniResult};
use crate::handle::Handle;
use jni::objects::JClass;
use jni::sys::jlong;
use jni::JNIEnv;
use ldbridge_core::{BridgeError, Database, Snapshot};

/// A snapshot together with the handle of the database that created it.
pub struct SessionSnapshot {
    db: jlong,
    snapshot: Snapshot,
}

impl SessionSnapshot {
    /// The engine snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Releases the snapshot, which must have been taken on `db`.
    ///
    /// The snapshot is dropped either way.
    fn release(self, db: jlong) -> JniResult<()> {
        let owned = self.db == db;
        self.snapshot.release();
        if owned {
            Ok(())
        } else {
            Err(BridgeError::ForeignSnapshot.into())
        }
    }
}

fn acquire(db: jlong) -> JniResult<jlong> {
    // SAFETY: the JVM only passes database handles it has not released.
    let session = unsafe { Handle::<Database>::from_raw(db).as_ref()? };
    Ok(Handle::into_raw(SessionSnapshot {
        db,
        snapshot: session.snapshot(),
    }))
}

fn release(db: jlong, snapshot: jlong) -> JniResult<()> {
    if db == 0 {
        return Err(JniError::NullHandle("database"));
    }
    // SAFETY: the JVM hands back a handle from snapshotNew exactly once.
    let snapshot = unsafe { Handle::<SessionSnapshot>::from_raw(snapshot).release()? };
    snapshot.release(db)
}

/// `static native long snapshotNew(long db)`
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_snapshotNew<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
) -> jlong {
    let result = acquire(db);
    or_throw(&mut env, result, 0)
}

/// `static native void snapshotRelease(long db, long snapshot)`
///
/// Valid after `dbRelease`, in which case it closes the engine if nothing
/// else holds it. Raises if the snapshot was taken on another database; the
/// handle is consumed either way.
#[no_mangle]
pub extern "system" fn Java_org_kodein_db_leveldb_jni_Native_snapshotRelease<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    db: jlong,
    snapshot: jlong,
) {
    let result = release(db, snapshot);
    or_throw(&mut env, result, ());
}
