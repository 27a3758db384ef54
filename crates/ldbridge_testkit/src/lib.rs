//! # ldbridge testkit
//!
//! Test utilities for ldbridge.
//!
//! This crate provides:
//! - Temporary on-disk databases that clean up after themselves
//! - Seeded datasets for cursor and snapshot tests
//! - Property-based generators for keys and values
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ldbridge_testkit::prelude::*;
//!
//! #[test]
//! fn put_then_get() {
//!     with_temp_db(|db| {
//!         db.put(b"k", b"v", WriteFlags::default()).unwrap();
//!         assert_eq!(get_bytes(db, b"k"), Some(b"v".to_vec()));
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use ldbridge_core::{ReadFlags, WriteFlags};
}

pub use fixtures::*;
pub use generators::*;
