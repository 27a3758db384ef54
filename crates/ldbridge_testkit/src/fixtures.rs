//! Test fixtures and database helpers.
//!
//! Provides temporary databases and common test scenarios.

use ldbridge_core::{
    BridgeResult, Cursor, Database, Options, OptionsConfig, ReadFlags, Snapshot, WriteFlags,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// An open test database with automatic cleanup.
pub struct TestDatabase {
    /// The session.
    pub db: Database,
    options: Options,
    // Kept alive to prevent cleanup.
    temp_dir: TempDir,
}

impl TestDatabase {
    /// Opens a fresh database with default options.
    pub fn new() -> Self {
        Self::with_config(OptionsConfig::default())
    }

    /// Opens a fresh database with the given options.
    pub fn with_config(config: OptionsConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let options = Options::new(config).expect("Failed to build options");
        let db = Database::open(temp_dir.path().join("db"), &options, false)
            .expect("Failed to open test database");
        Self {
            db,
            options,
            temp_dir,
        }
    }

    /// Path of the database directory.
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join("db")
    }

    /// Options the database was opened with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Releases the session, keeping the files for a later reopen.
    pub fn close(self) -> ClosedDatabase {
        self.db.release();
        ClosedDatabase {
            options: self.options,
            temp_dir: self.temp_dir,
        }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Files of a released test database.
pub struct ClosedDatabase {
    options: Options,
    temp_dir: TempDir,
}

impl ClosedDatabase {
    /// Path of the database directory.
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join("db")
    }

    /// Options the database was opened with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Attempts an open without taking ownership of the files.
    pub fn try_open(&self, repair_on_corruption: bool) -> BridgeResult<Database> {
        Database::open(self.path(), &self.options, repair_on_corruption)
    }

    /// Reopens the database.
    pub fn reopen(self, repair_on_corruption: bool) -> BridgeResult<TestDatabase> {
        let db = self.try_open(repair_on_corruption)?;
        Ok(TestDatabase {
            db,
            options: self.options,
            temp_dir: self.temp_dir,
        })
    }

    /// Replaces the engine's `CURRENT` pointer with bytes it rejects as
    /// corrupt, leaving every data file intact.
    pub fn corrupt_current_file(&self) {
        std::fs::write(self.path().join("CURRENT"), b"garbage")
            .expect("Failed to overwrite CURRENT");
    }
}

/// Runs a test with a temporary database.
///
/// # Example
///
/// ```rust,ignore
/// use ldbridge_testkit::with_temp_db;
///
/// #[test]
/// fn my_test() {
///     with_temp_db(|db| {
///         db.put(b"k", b"v", Default::default()).unwrap();
///     });
/// }
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::new();
    f(&test_db.db)
}

/// Opens a temporary database holding `pairs`.
pub fn seeded<K: AsRef<[u8]>, V: AsRef<[u8]>>(pairs: &[(K, V)]) -> TestDatabase {
    let test_db = TestDatabase::new();
    for (key, value) in pairs {
        test_db
            .put(key.as_ref(), value.as_ref(), WriteFlags::default())
            .expect("Failed to seed entry");
    }
    test_db
}

/// The `{a: 1, b: 2, c: 3}` dataset.
pub fn abc() -> TestDatabase {
    seeded(&[("a", "1"), ("b", "2"), ("c", "3")])
}

/// Reads `key` with default flags and copies the value out.
pub fn get_bytes(db: &Database, key: &[u8]) -> Option<Vec<u8>> {
    read_copy(db, key, ReadFlags::default())
}

/// Reads `key` as of `snapshot` and copies the value out.
pub fn get_bytes_at(db: &Database, key: &[u8], snapshot: &Snapshot) -> Option<Vec<u8>> {
    read_copy(db, key, ReadFlags::at(snapshot))
}

fn read_copy(db: &Database, key: &[u8], flags: ReadFlags<'_>) -> Option<Vec<u8>> {
    let buffer = db.get(key, flags).expect("Failed to read")?;
    let bytes = buffer.as_view().to_vec();
    buffer.release();
    Some(bytes)
}

/// Drains a cursor from its first entry, in ascending order.
pub fn collect_forward(cursor: &mut Cursor) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut entries = Vec::new();
    cursor.seek_to_first().expect("Failed to seek");
    while cursor.is_valid() {
        entries.push((
            cursor.key().expect("valid key").to_vec(),
            cursor.value().expect("valid value").to_vec(),
        ));
        cursor.next().expect("Failed to advance");
    }
    entries
}
