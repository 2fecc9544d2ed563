//! kvsync: a key-value datastore mirrored to files or Redis.
//!
//! This crate binds the consistency protocol in `kvsync_core` to real
//! destinations:
//! - TOML and YAML files (`file`, features `toml` and `yaml`)
//! - Redis (`redis_impl`, feature `redis`)
//!
//! and provides environment-driven configuration plus factory functions.

pub mod config;
pub mod error;
pub mod factory;

#[cfg(any(feature = "toml", feature = "yaml"))]
pub mod file;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use config::{BackendKind, Config};
pub use error::{Error, Result};
pub use factory::create_datastore;
pub use kvsync_core::{Backend, DataMap, Datastore, Fallback, StoreError, Write};
