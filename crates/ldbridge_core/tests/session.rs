//! Integration tests for opening, writing, reading and destroying sessions.

use ldbridge_core::{
    BridgeError, Database, Options, OptionsConfig, ReadFlags, StatusKind, WriteFlags,
};
use ldbridge_testkit::prelude::*;
use tempfile::TempDir;

#[test]
fn put_then_get() {
    with_temp_db(|db| {
        db.put(b"key", b"value", WriteFlags::default()).unwrap();

        let buffer = db.get(b"key", ReadFlags::default()).unwrap().unwrap();
        assert_eq!(buffer.as_view(), b"value");
        buffer.release();
    });
}

#[test]
fn empty_key_and_value() {
    with_temp_db(|db| {
        db.put(b"", b"", WriteFlags::SYNC).unwrap();
        assert_eq!(get_bytes(db, b""), Some(Vec::new()));
    });
}

#[test]
fn missing_key_is_not_an_error() {
    with_temp_db(|db| {
        assert!(db.get(b"nope", ReadFlags::default()).unwrap().is_none());
    });
}

#[test]
fn delete_after_put() {
    with_temp_db(|db| {
        db.put(b"k", b"v", WriteFlags::default()).unwrap();
        db.delete(b"k", WriteFlags::SYNC).unwrap();
        assert_eq!(get_bytes(db, b"k"), None);

        // Deleting again is fine.
        db.delete(b"k", WriteFlags::default()).unwrap();
    });
}

#[test]
fn overwrite_keeps_latest() {
    with_temp_db(|db| {
        db.put(b"k", b"one", WriteFlags::default()).unwrap();
        db.put(b"k", b"two", WriteFlags::default()).unwrap();
        assert_eq!(get_bytes(db, b"k"), Some(b"two".to_vec()));
    });
}

#[test]
fn read_flags_do_not_change_results() {
    with_temp_db(|db| {
        db.put(b"k", b"v", WriteFlags::default()).unwrap();
        let flags = ReadFlags {
            verify_checksums: true,
            fill_cache: false,
            snapshot: None,
        };
        let buffer = db.get(b"k", flags).unwrap().unwrap();
        assert_eq!(buffer.as_view(), b"v");
    });
}

#[test]
fn data_survives_reopen() {
    let test_db = seeded(&[(b"k", b"v")]);
    let test_db = test_db.close().reopen(false).unwrap();
    assert_eq!(get_bytes(&test_db, b"k"), Some(b"v".to_vec()));
}

#[test]
fn missing_database_without_create() {
    let dir = TempDir::new().unwrap();
    let options = Options::new(OptionsConfig::new().create_if_missing(false)).unwrap();

    let err = Database::open(dir.path().join("absent"), &options, false).unwrap_err();
    assert_eq!(err.status_kind(), Some(StatusKind::InvalidArgument));
}

#[test]
fn error_if_exists() {
    let closed = seeded(&[(b"k", b"v")]).close();
    let options = Options::new(OptionsConfig::new().error_if_exists(true)).unwrap();

    let err = Database::open(closed.path(), &options, false).unwrap_err();
    assert!(matches!(err, BridgeError::Engine(_)));
    assert!(!err.to_string().is_empty());
}

#[test]
fn destroy_removes_data() {
    let closed = seeded(&[(b"k", b"v")]).close();
    Database::destroy(closed.path(), closed.options()).unwrap();

    let strict = Options::new(OptionsConfig::new().create_if_missing(false)).unwrap();
    assert!(Database::open(closed.path(), &strict, false).is_err());

    let test_db = closed.reopen(false).unwrap();
    assert_eq!(get_bytes(&test_db, b"k"), None);
}

#[test]
fn corruption_raises_without_repair() {
    let closed = seeded(&[(b"k", b"v")]).close();
    closed.corrupt_current_file();

    let err = closed.try_open(false).unwrap_err();
    assert!(err.is_corruption());
}

#[test]
fn corruption_repaired_at_open() {
    let test_db = TestDatabase::new();
    test_db.put(b"k", b"v", WriteFlags::SYNC).unwrap();
    let closed = test_db.close();
    closed.corrupt_current_file();

    let test_db = closed.reopen(true).unwrap();
    assert_eq!(get_bytes(&test_db, b"k"), Some(b"v".to_vec()));
}

#[test]
fn explicit_repair() {
    let closed = seeded(&[(b"k", b"v")]).close();
    closed.corrupt_current_file();

    Database::repair(closed.path(), closed.options()).unwrap();
    let test_db = closed.reopen(false).unwrap();
    assert_eq!(get_bytes(&test_db, b"k"), Some(b"v".to_vec()));
}

#[test]
fn uncompressed_without_filter() {
    let config = OptionsConfig::new()
        .compression(ldbridge_core::Compression::None)
        .bloom_filter_bits_per_key(0)
        .cache_size(64 * 1024);
    let test_db = TestDatabase::with_config(config);
    test_db.put(b"k", b"v", WriteFlags::default()).unwrap();
    assert_eq!(get_bytes(&test_db, b"k"), Some(b"v".to_vec()));
}

#[test]
fn concurrent_writers() {
    let test_db = TestDatabase::new();
    std::thread::scope(|scope| {
        for t in 0..4u8 {
            let db = &test_db.db;
            scope.spawn(move || {
                for i in 0..50u8 {
                    db.put(&[t, i], &[i], WriteFlags::default()).unwrap();
                }
            });
        }
    });

    let mut cursor = test_db.cursor(ReadFlags::default()).unwrap();
    assert_eq!(collect_forward(&mut cursor).len(), 200);
}

#[test]
fn release_with_live_cursor_defers_close() {
    let test_db = abc();
    let mut cursor = test_db.cursor(ReadFlags::default()).unwrap();
    let closed = test_db.close();

    cursor.seek_to_first().unwrap();
    assert_eq!(cursor.key().unwrap(), b"a");
    cursor.release();

    // The engine lock is gone once the cursor is released.
    let test_db = closed.reopen(false).unwrap();
    assert_eq!(get_bytes(&test_db, b"c"), Some(b"3".to_vec()));
}
