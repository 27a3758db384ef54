//! Property-based test generators using proptest.

use proptest::prelude::*;
use std::collections::BTreeMap;

/// Arbitrary key bytes, empty included.
pub fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Arbitrary value bytes, empty included.
pub fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..4096)
}

/// A small dataset with distinct keys, in key order.
pub fn dataset_strategy() -> impl Strategy<Value = BTreeMap<Vec<u8>, Vec<u8>>> {
    prop::collection::btree_map(
        prop::collection::vec(any::<u8>(), 1..16),
        prop::collection::vec(any::<u8>(), 0..64),
        0..32,
    )
}

/// A batch operation as generated data: `Some(value)` puts, `None` deletes.
pub fn batch_ops_strategy() -> impl Strategy<Value = Vec<(Vec<u8>, Option<Vec<u8>>)>> {
    prop::collection::vec(
        (
            prop::collection::vec(any::<u8>(), 1..4),
            prop::option::of(prop::collection::vec(any::<u8>(), 0..16)),
        ),
        0..24,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn dataset_keys_are_non_empty() {
        let mut runner = TestRunner::default();
        for _ in 0..16 {
            let dataset = dataset_strategy().new_tree(&mut runner).unwrap().current();
            assert!(dataset.keys().all(|k| !k.is_empty()));
        }
    }
}
