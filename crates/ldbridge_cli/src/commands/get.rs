//! Get command implementation.

use super::{open_existing, Encoding};
use ldbridge_core::ReadFlags;
use std::path::Path;

/// Runs the get command.
pub fn run(path: &Path, key: &[u8], encoding: Encoding) -> Result<(), Box<dyn std::error::Error>> {
    let (db, _options) = open_existing(path)?;
    let found = db.get(key, ReadFlags::default())?;
    db.release();

    match found {
        Some(buffer) => {
            println!("{}", encoding.render(buffer.as_view()));
            buffer.release();
            Ok(())
        }
        None => Err(format!("Key not found: {}", encoding.render(key)).into()),
    }
}
