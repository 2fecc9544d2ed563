//! Core types and consistency protocol for kvsync.
//!
//! This crate provides:
//! - An in-memory key-value container (`store::MemoryStore`)
//! - The external sync policy decorator (`store::SyncedStore`) that mirrors
//!   the container to a file or remote destination
//! - A remote key-value destination over a narrow client seam (`kv`)
//! - The `Datastore` façade that owns exactly one backend
//! - Config variables with validators and environment helpers

pub mod config;
pub mod datastore;
pub mod env;
pub mod kv;
pub mod store;

pub use datastore::Datastore;
pub use store::{Backend, DataMap, Fallback, StoreError, Write};
