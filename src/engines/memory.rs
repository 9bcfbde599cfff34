use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;

use crate::{KvsEngine, Result};

/// An in-process engine with the same expiry and set-if-absent semantics
/// as a remote store.
///
/// Expired entries are invisible at once but only freed when their key is
/// read or written again, or on [`MemoryKvsEngine::purge_expired`].
#[derive(Clone, Default)]
pub struct MemoryKvsEngine(Arc<Mutex<HashMap<String, Entry>>>);

struct Entry {
    value: Vec<u8>,
    // `None` never expires.
    deadline: Option<Instant>,
}

impl Entry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let deadline = ttl
            .filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| Instant::now().checked_add(ttl));
        Entry { value, deadline }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| now < deadline)
    }
}

impl MemoryKvsEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        MemoryKvsEngine::default()
    }

    /// Number of keys that have not expired.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.0.lock().await.values().filter(|e| e.is_live(now)).count()
    }

    /// Frees every expired entry and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.0.lock().await;
        let before = store.len();
        store.retain(|_, entry| entry.is_live(now));
        before - store.len()
    }

    /// Whether every key is absent or expired.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvsEngine for MemoryKvsEngine {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.0.lock().await;
        match store.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        store.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.0
            .lock()
            .await
            .insert(key.to_owned(), Entry::new(value, ttl));
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool> {
        let mut store = self.0.lock().await;
        if let Some(entry) = store.get(key) {
            if entry.is_live(Instant::now()) {
                return Ok(false);
            }
        }
        store.insert(key.to_owned(), Entry::new(value, ttl));
        Ok(true)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        debug!("Closing memory engine");
        Ok(())
    }
}
