//! Put and delete command implementations.

use super::open_or_create;
use ldbridge_core::WriteFlags;
use std::path::Path;
use tracing::info;

/// Runs the put command.
pub fn put(
    path: &Path,
    key: &[u8],
    value: &[u8],
    sync: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (db, _options) = open_or_create(path)?;
    db.put(key, value, WriteFlags { sync })?;
    db.release();
    info!(key_len = key.len(), value_len = value.len(), "stored entry");
    Ok(())
}

/// Runs the delete command.
pub fn delete(path: &Path, key: &[u8], sync: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (db, _options) = open_or_create(path)?;
    db.delete(key, WriteFlags { sync })?;
    db.release();
    info!(key_len = key.len(), "removed entry");
    Ok(())
}
