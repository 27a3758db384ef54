//! # ldbridge core
//!
//! Safe Rust layer over an embedded ordered key-value engine, shaped for
//! handle-based bindings.
//!
//! This crate provides:
//! - Options built atomically from a [`OptionsConfig`]
//! - A [`Database`] session with optional repair-on-corruption at open
//! - [`WriteBatch`] accumulation and atomic application
//! - A [`Cursor`] with an explicit [`CursorState`]
//! - [`Snapshot`] read-consistency tokens
//! - [`ReturnedBuffer`], the owned result of a read
//!
//! Every resource is a distinct owned type with a consuming `release`, so a
//! resource cannot be used or released after it has been released.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod buffer;
mod config;
mod cursor;
mod database;
mod error;
mod options;
mod snapshot;

pub use batch::{BatchOp, WriteBatch};
pub use buffer::ReturnedBuffer;
pub use config::{Compression, OptionsConfig};
pub use cursor::{Cursor, CursorState, Lengths};
pub use database::{Database, ReadFlags, WriteFlags};
pub use error::{BridgeError, BridgeResult, StatusKind};
pub use options::Options;
pub use snapshot::Snapshot;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
