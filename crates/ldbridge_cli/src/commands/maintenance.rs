//! Repair and destroy command implementations.

use ldbridge_core::{Database, Options, OptionsConfig};
use std::path::Path;

/// Runs the repair command.
pub fn repair(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No database found at {:?}", path).into());
    }
    let options = Options::new(OptionsConfig::new().create_if_missing(false))?;
    println!("Repairing database at {:?}", path);
    Database::repair(path, &options)?;
    println!("Repair complete");
    Ok(())
}

/// Runs the destroy command.
pub fn destroy(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options = Options::new(OptionsConfig::new())?;
    Database::destroy(path, &options)?;
    println!("Destroyed database at {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::open_existing;
    use ldbridge_testkit::prelude::*;

    #[test]
    fn repair_restores_corrupted_database() {
        let closed = seeded(&[("k", "v")]).close();
        closed.corrupt_current_file();
        assert!(open_existing(&closed.path()).is_err());

        repair(&closed.path()).unwrap();

        let (db, _options) = open_existing(&closed.path()).unwrap();
        assert_eq!(get_bytes(&db, b"k"), Some(b"v".to_vec()));
    }

    #[test]
    fn repair_requires_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(repair(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn destroy_removes_database() {
        let closed = seeded(&[("k", "v")]).close();
        destroy(&closed.path()).unwrap();
        assert!(open_existing(&closed.path()).is_err());
    }
}
