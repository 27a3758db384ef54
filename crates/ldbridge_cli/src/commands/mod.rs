//! CLI command implementations.

pub mod get;
pub mod maintenance;
pub mod scan;
pub mod write;

use ldbridge_core::{BridgeResult, Database, Options, OptionsConfig};
use std::path::Path;

/// How keys and values are typed on the command line and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Plain text; non-UTF-8 bytes print as replacement characters.
    Utf8,
    /// Lowercase hex digits.
    Hex,
}

impl Encoding {
    /// Parses a command-line argument into bytes.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Hex => {
                if text.len() % 2 != 0 {
                    return Err(format!("Odd number of hex digits in {text:?}").into());
                }
                (0..text.len())
                    .step_by(2)
                    .map(|i| {
                        text.get(i..i + 2)
                            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                            .ok_or_else(|| format!("Invalid hex in {text:?}").into())
                    })
                    .collect()
            }
        }
    }

    /// Renders bytes for display.
    pub fn render(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Hex => bytes.iter().map(|b| format!("{b:02x}")).collect(),
        }
    }
}

/// Opens an existing database with default options.
pub fn open_existing(path: &Path) -> BridgeResult<(Database, Options)> {
    let options = Options::new(OptionsConfig::new().create_if_missing(false))?;
    let db = Database::open(path, &options, false)?;
    Ok((db, options))
}

/// Opens a database, creating it if needed.
pub fn open_or_create(path: &Path) -> BridgeResult<(Database, Options)> {
    let options = Options::new(OptionsConfig::new())?;
    let db = Database::open(path, &options, false)?;
    Ok((db, options))
}
