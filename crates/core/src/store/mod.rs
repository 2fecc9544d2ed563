//! Key-value store building blocks.
//!
//! - [`MemoryStore`]: the plain in-memory container
//! - [`SyncedStore`]: a `MemoryStore` composed with an external
//!   [`Destination`], adding write-through and read-through behavior
//!
//! Concrete destinations (files, remote key-value services) only implement
//! the narrow [`Destination`] / [`AsyncDestination`] traits; the decorator
//! enforces the capability contract at the boundary.

mod error;
mod memory;
mod synced;
mod traits;
mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use synced::SyncedStore;
pub use traits::{AsyncDestination, Backend, Destination};
pub use types::{Capabilities, DataMap, Fallback, Write};
