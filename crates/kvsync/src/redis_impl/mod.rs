//! Redis clients for the remote key-value destination.
//!
//! [`RedisClient`] wraps a blocking `redis::Connection` and
//! [`RedisAsyncClient`] a `redis::aio::ConnectionManager`. Both implement the
//! client seam used by `kvsync_core::kv::RemoteDestination`.

mod client;
mod error;

pub use client::{RedisAsyncClient, RedisClient, RedisDestination};
pub use error::map_redis_error;
