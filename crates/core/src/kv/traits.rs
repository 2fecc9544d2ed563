use async_trait::async_trait;

use crate::store::Result;

/// Synchronous connection to a remote key-value service.
///
/// Keys and values cross the wire as strings.
pub trait KvClient: Send {
    /// Gets a single key, `None` if absent.
    fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Sets a single key.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Gets many keys at once. The result has one slot per requested key.
    fn mget(&mut self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Sets many keys at once.
    fn mset(&mut self, pairs: &[(String, String)]) -> Result<()>;

    /// Runs one step of a cursor scan over keys matching `pattern`.
    ///
    /// Returns the next cursor (`0` once exhausted) and the keys of this step.
    /// `count` is a hint; a step may return more or fewer keys.
    fn scan(&mut self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)>;

    /// Checks liveness.
    fn ping(&mut self) -> Result<String>;

    /// Releases the connection. Later calls fail.
    fn close(&mut self) -> Result<()>;
}

/// Asynchronous connection to a remote key-value service.
///
/// Same contract as [`KvClient`].
#[async_trait]
pub trait AsyncKvClient: Send {
    async fn get(&mut self, key: &str) -> Result<Option<String>>;

    async fn set(&mut self, key: &str, value: &str) -> Result<()>;

    async fn mget(&mut self, keys: &[String]) -> Result<Vec<Option<String>>>;

    async fn mset(&mut self, pairs: &[(String, String)]) -> Result<()>;

    async fn scan(&mut self, cursor: u64, pattern: &str, count: usize)
        -> Result<(u64, Vec<String>)>;

    async fn ping(&mut self) -> Result<String>;

    async fn close(&mut self) -> Result<()>;
}
