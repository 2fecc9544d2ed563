//! In-memory key-value server fake shared by sync and async clients.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{AsyncKvClient, KvClient};
use crate::store::{Result, StoreError};

#[derive(Debug, Default)]
pub(crate) struct ServerState {
    pub data: BTreeMap<String, String>,
    pub mget_sizes: Vec<usize>,
    pub mset_calls: usize,
    pub fail: bool,
}

/// A fake server. Clients created from the same server see the same data.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeKvServer {
    state: Arc<Mutex<ServerState>>,
    /// Keys returned per scan step, independent of the count hint.
    page_size: Option<usize>,
}

impl FakeKvServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn client(&self) -> FakeKvClient {
        FakeKvClient {
            server: self.clone(),
            closed: false,
        }
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.state()
            .data
            .insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.state().data.get(key).cloned()
    }

    pub fn set_failing(&self, fail: bool) {
        self.state().fail = fail;
    }

    pub fn mget_sizes(&self) -> Vec<usize> {
        self.state().mget_sizes.clone()
    }

    pub fn mset_calls(&self) -> usize {
        self.state().mset_calls
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.state.lock().expect("fake server lock poisoned")
    }
}

#[derive(Debug)]
pub(crate) struct FakeKvClient {
    server: FakeKvServer,
    closed: bool,
}

impl FakeKvClient {
    fn state(&self) -> Result<std::sync::MutexGuard<'_, ServerState>> {
        if self.closed {
            return Err(StoreError::ConnectionFailed("client closed".to_string()));
        }
        let state = self.server.state();
        if state.fail {
            return Err(StoreError::ConnectionFailed("simulated outage".to_string()));
        }
        Ok(state)
    }

    fn scan_step(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        let state = self.state()?;
        let prefix = pattern.trim_end_matches('*');
        let matching: Vec<&String> = state
            .data
            .keys()
            .filter(|key| key.starts_with(prefix))
            .collect();

        let start = cursor as usize;
        let end = (start + self.server.page_size.unwrap_or(count)).min(matching.len());
        let keys = matching[start.min(end)..end]
            .iter()
            .map(|key| (*key).clone())
            .collect();
        let next = if end >= matching.len() { 0 } else { end as u64 };
        Ok((next, keys))
    }
}

impl KvClient for FakeKvClient {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.state()?.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.state()?
            .data
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn mget(&mut self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut state = self.state()?;
        state.mget_sizes.push(keys.len());
        Ok(keys.iter().map(|key| state.data.get(key).cloned()).collect())
    }

    fn mset(&mut self, pairs: &[(String, String)]) -> Result<()> {
        let mut state = self.state()?;
        state.mset_calls += 1;
        state.data.extend(pairs.iter().cloned());
        Ok(())
    }

    fn scan(&mut self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        self.scan_step(cursor, pattern, count)
    }

    fn ping(&mut self) -> Result<String> {
        self.state()?;
        Ok("PONG".to_string())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[async_trait]
impl AsyncKvClient for FakeKvClient {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        KvClient::get(self, key)
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        KvClient::set(self, key, value)
    }

    async fn mget(&mut self, keys: &[String]) -> Result<Vec<Option<String>>> {
        KvClient::mget(self, keys)
    }

    async fn mset(&mut self, pairs: &[(String, String)]) -> Result<()> {
        KvClient::mset(self, pairs)
    }

    async fn scan(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>)> {
        self.scan_step(cursor, pattern, count)
    }

    async fn ping(&mut self) -> Result<String> {
        KvClient::ping(self)
    }

    async fn close(&mut self) -> Result<()> {
        KvClient::close(self)
    }
}
