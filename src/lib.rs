#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod cache;

/// Builder and identifier bounds for a [`Cache`].
pub mod config;

mod error;

/// Hash functions a [`Cache`] can be built with.
pub mod hasher;

/// Prime capacity selection.
pub mod prime;

mod probe;
mod record;

/// Introspection helpers, available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
pub mod stats;

mod table;

pub use cache::Cache;
pub use config::CacheBuilder;
pub use error::CacheError;
pub use probe::DOUBLE_HASH_MODULUS;
pub use probe::ProbePolicy;
pub use record::Record;
