//! Remote key-value destination with batched full reads.

use async_trait::async_trait;
use serde_json::Value;

use super::{decode_value, encode_value, AsyncKvClient, KvClient};
use crate::store::{AsyncDestination, Capabilities, DataMap, Destination, Result, StoreError};

/// Default number of keys fetched per `MGET` during a full read.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Scan pattern matching every key.
pub const SCAN_ALL: &str = "*";

/// A destination backed by a remote key-value service.
///
/// Holds a synchronous and an asynchronous client side by side so the sync
/// and async call paths never wait on each other's connection.
///
/// # Type Parameters
///
/// * `C` - The synchronous client
/// * `A` - The asynchronous client
pub struct RemoteDestination<C, A> {
    client: C,
    async_client: A,
    batch_size: usize,
}

impl<C, A> RemoteDestination<C, A>
where
    C: KvClient,
    A: AsyncKvClient,
{
    /// Creates a new remote destination.
    ///
    /// # Arguments
    ///
    /// * `client` - Synchronous connection
    /// * `async_client` - Asynchronous connection
    /// * `batch_size` - Maximum number of keys fetched per batch in full reads
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidData` if `batch_size` is zero.
    pub fn new(client: C, async_client: A, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(StoreError::InvalidData(
                "batch size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            client,
            async_client,
            batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn async_client(&self) -> &A {
        &self.async_client
    }

    /// Checks that the remote service is reachable.
    pub fn ping(&mut self) -> Result<String> {
        self.client.ping()
    }

    pub async fn ping_async(&mut self) -> Result<String> {
        self.async_client.ping().await
    }

    /// Releases the synchronous connection.
    pub fn disconnect(&mut self) -> Result<()> {
        self.client.close()
    }

    /// Releases the asynchronous connection.
    pub async fn disconnect_async(&mut self) -> Result<()> {
        self.async_client.close().await
    }
}

/// Encodes a whole map into `MSET` pairs.
fn encode_pairs(data: &DataMap) -> Vec<(String, String)> {
    data.iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Moves one fetched batch into `data`, draining `batch`.
///
/// Keys whose value disappeared between the scan and the fetch are skipped.
fn collect_batch(
    batch: &mut Vec<String>,
    values: Vec<Option<String>>,
    data: &mut DataMap,
) -> Result<()> {
    if values.len() != batch.len() {
        return Err(StoreError::Remote(format!(
            "MGET returned {} values for {} keys",
            values.len(),
            batch.len()
        )));
    }
    for (key, value) in batch.drain(..).zip(values) {
        if let Some(raw) = value {
            data.insert(key, decode_value(raw));
        }
    }
    Ok(())
}

impl<C, A> Destination for RemoteDestination<C, A>
where
    C: KvClient,
    A: AsyncKvClient,
{
    fn name(&self) -> &'static str {
        "remote kv"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::per_key()
    }

    fn read_all(&mut self) -> Result<DataMap> {
        let mut data = DataMap::new();
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut cursor = 0;

        loop {
            let (next, keys) = self.client.scan(cursor, SCAN_ALL, self.batch_size)?;
            for key in keys {
                batch.push(key);
                if batch.len() >= self.batch_size {
                    let values = self.client.mget(&batch)?;
                    collect_batch(&mut batch, values, &mut data)?;
                }
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // Trailing partial batch
        if !batch.is_empty() {
            let values = self.client.mget(&batch)?;
            collect_batch(&mut batch, values, &mut data)?;
        }

        Ok(data)
    }

    fn write_all(&mut self, data: &DataMap) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.client.mset(&encode_pairs(data))
    }

    fn read_one(&mut self, key: &str) -> Result<Option<Value>> {
        Ok(self.client.get(key)?.map(decode_value))
    }

    fn write_one(&mut self, key: &str, value: &Value) -> Result<()> {
        self.client.set(key, &encode_value(value))
    }
}

#[async_trait]
impl<C, A> AsyncDestination for RemoteDestination<C, A>
where
    C: KvClient,
    A: AsyncKvClient,
{
    async fn read_all_async(&mut self) -> Result<DataMap> {
        let mut data = DataMap::new();
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut cursor = 0;

        loop {
            let (next, keys) = self
                .async_client
                .scan(cursor, SCAN_ALL, self.batch_size)
                .await?;
            for key in keys {
                batch.push(key);
                if batch.len() >= self.batch_size {
                    let values = self.async_client.mget(&batch).await?;
                    collect_batch(&mut batch, values, &mut data)?;
                }
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        if !batch.is_empty() {
            let values = self.async_client.mget(&batch).await?;
            collect_batch(&mut batch, values, &mut data)?;
        }

        Ok(data)
    }

    async fn write_all_async(&mut self, data: &DataMap) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let pairs = encode_pairs(data);
        self.async_client.mset(&pairs).await
    }

    async fn read_one_async(&mut self, key: &str) -> Result<Option<Value>> {
        Ok(self.async_client.get(key).await?.map(decode_value))
    }

    async fn write_one_async(&mut self, key: &str, value: &Value) -> Result<()> {
        let encoded = encode_value(value);
        self.async_client.set(key, &encoded).await
    }
}
