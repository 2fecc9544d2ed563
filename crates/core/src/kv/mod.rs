//! Remote key-value destination.
//!
//! [`RemoteDestination`] mirrors a backend to a remote key-value service
//! through the narrow [`KvClient`] / [`AsyncKvClient`] seam. Concrete clients
//! (e.g. Redis) live in the `kvsync` crate; tests use an in-memory fake.

mod codec;
mod destination;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{decode_value, encode_value};
pub use destination::{RemoteDestination, DEFAULT_BATCH_SIZE, SCAN_ALL};
pub use traits::{AsyncKvClient, KvClient};
