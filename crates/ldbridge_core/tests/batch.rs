//! Integration tests for write batches.

use ldbridge_core::{WriteBatch, WriteFlags};
use ldbridge_testkit::prelude::*;

#[test]
fn batch_is_invisible_until_written() {
    with_temp_db(|db| {
        let mut batch = WriteBatch::new();
        batch.put(&[1], b"one");
        batch.put(&[2], b"two");

        assert_eq!(get_bytes(db, &[1]), None);
        assert_eq!(get_bytes(db, &[2]), None);

        db.write(&batch, WriteFlags::default()).unwrap();
        batch.release();

        assert_eq!(get_bytes(db, &[1]), Some(b"one".to_vec()));
        assert_eq!(get_bytes(db, &[2]), Some(b"two".to_vec()));
    });
}

#[test]
fn synced_batch() {
    with_temp_db(|db| {
        let mut batch = WriteBatch::new();
        batch.put(&[1], b"one");
        batch.put(&[2], b"two");
        batch.put(&[3], b"three");
        db.write(&batch, WriteFlags::SYNC).unwrap();

        assert_eq!(get_bytes(db, &[3]), Some(b"three".to_vec()));
    });
}

#[test]
fn batched_deletes() {
    with_temp_db(|db| {
        db.put(&[1], b"one", WriteFlags::default()).unwrap();
        db.put(&[2], b"two", WriteFlags::default()).unwrap();

        let mut batch = WriteBatch::new();
        batch.delete(&[1]);
        batch.delete(&[2]);

        assert_eq!(get_bytes(db, &[1]), Some(b"one".to_vec()));
        db.write(&batch, WriteFlags::default()).unwrap();

        assert_eq!(get_bytes(db, &[1]), None);
        assert_eq!(get_bytes(db, &[2]), None);
    });
}

#[test]
fn operations_apply_in_order() {
    with_temp_db(|db| {
        let mut batch = WriteBatch::new();
        batch.put(b"k1", b"v1");
        batch.delete(b"k1");
        batch.put(b"k1", b"v2");
        db.write(&batch, WriteFlags::default()).unwrap();

        assert_eq!(get_bytes(db, b"k1"), Some(b"v2".to_vec()));
    });
}

#[test]
fn append_then_write() {
    with_temp_db(|db| {
        db.put(b"k2", b"old", WriteFlags::default()).unwrap();

        let mut first = WriteBatch::new();
        first.put(b"k1", b"v1");
        let mut second = WriteBatch::new();
        second.delete(b"k2");

        first.append(&second);
        assert_eq!(second.len(), 1);

        db.write(&first, WriteFlags::default()).unwrap();
        assert_eq!(get_bytes(db, b"k1"), Some(b"v1".to_vec()));
        assert_eq!(get_bytes(db, b"k2"), None);

        // The appended batch is still usable on its own.
        db.put(b"k2", b"again", WriteFlags::default()).unwrap();
        db.write(&second, WriteFlags::default()).unwrap();
        assert_eq!(get_bytes(db, b"k2"), None);
    });
}

#[test]
fn same_batch_written_twice() {
    with_temp_db(|db| {
        let mut batch = WriteBatch::new();
        batch.put(b"k", b"v");
        db.write(&batch, WriteFlags::default()).unwrap();

        db.delete(b"k", WriteFlags::default()).unwrap();
        db.write(&batch, WriteFlags::default()).unwrap();
        assert_eq!(get_bytes(db, b"k"), Some(b"v".to_vec()));
    });
}

#[test]
fn cleared_batch_writes_nothing() {
    with_temp_db(|db| {
        let mut batch = WriteBatch::new();
        batch.put(b"k", b"v");
        batch.clear();
        db.write(&batch, WriteFlags::default()).unwrap();
        assert_eq!(get_bytes(db, b"k"), None);
    });
}
