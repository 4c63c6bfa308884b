#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A string-keyed dictionary that owns its keys and releases its values.
///
/// This module provides a `Dict` that wraps the `HashTable`, hashing keys
/// with [`hasher::string_hash`] and copying them into owned storage.
pub mod dict;

/// Errors reported by insertions.
pub mod error;

/// C ABI for host runtimes.
#[cfg(feature = "ffi")]
pub mod ffi;

pub mod hash_table;

pub mod hasher;

mod log;

pub mod probe;

pub mod release;

pub use dict::Dict;
pub use error::PutError;
pub use hash_table::HashTable;
pub use release::DropRelease;
pub use release::Release;
