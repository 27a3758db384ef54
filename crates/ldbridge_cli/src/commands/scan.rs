//! Scan command implementation.

use super::{open_existing, Encoding};
use ldbridge_core::{BridgeResult, Cursor, Database, ReadFlags};
use serde::Serialize;
use std::path::Path;

/// Where a scan starts and how far it goes.
#[derive(Debug, Default)]
pub struct ScanOptions {
    /// First key to consider; the first or last entry when absent.
    pub from: Option<Vec<u8>>,
    /// Maximum number of entries.
    pub limit: Option<usize>,
    /// Walk in descending key order.
    pub reverse: bool,
}

/// One listed entry.
#[derive(Debug, Serialize)]
pub struct ScanEntry {
    /// Rendered key.
    pub key: String,
    /// Rendered value.
    pub value: String,
}

/// Runs the scan command.
pub fn run(
    path: &Path,
    options: &ScanOptions,
    encoding: Encoding,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (db, _options) = open_existing(path)?;
    let entries = collect(&db, options)?;
    db.release();

    match format {
        "json" => {
            let rendered: Vec<ScanEntry> = entries
                .iter()
                .map(|(key, value)| ScanEntry {
                    key: encoding.render(key),
                    value: encoding.render(value),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
        "text" => {
            for (key, value) in &entries {
                println!("{} = {}", encoding.render(key), encoding.render(value));
            }
            println!();
            println!("{} entries", entries.len());
        }
        other => return Err(format!("Unknown output format: {other}").into()),
    }

    Ok(())
}

/// Reads the entries selected by `options`, in walk order.
pub fn collect(db: &Database, options: &ScanOptions) -> BridgeResult<Vec<(Vec<u8>, Vec<u8>)>> {
    let mut cursor = db.cursor(ReadFlags {
        fill_cache: false,
        ..ReadFlags::default()
    })?;

    match (&options.from, options.reverse) {
        (Some(from), false) => {
            cursor.seek(from)?;
        }
        (None, false) => {
            cursor.seek_to_first()?;
        }
        (Some(from), true) => seek_at_or_before(&mut cursor, from)?,
        (None, true) => {
            cursor.seek_to_last()?;
        }
    }

    let limit = options.limit.unwrap_or(usize::MAX);
    let mut entries = Vec::new();
    while cursor.is_valid() && entries.len() < limit {
        entries.push((cursor.key()?.to_vec(), cursor.value()?.to_vec()));
        if options.reverse {
            cursor.prev()?;
        } else {
            cursor.next()?;
        }
    }
    cursor.release();
    Ok(entries)
}

/// Positions on the last key `<= key`.
fn seek_at_or_before(cursor: &mut Cursor, key: &[u8]) -> BridgeResult<()> {
    cursor.seek(key)?;
    if !cursor.is_valid() {
        cursor.seek_to_last()?;
    } else if cursor.key()? != key {
        cursor.prev()?;
    }
    Ok(())
}
