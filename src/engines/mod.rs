use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Trait for the byte-level client a `KvStore` forwards to.
///
/// Engines are cheap to clone; clones share the same underlying store.
#[async_trait]
pub trait KvsEngine: Clone + Send + Sync + 'static {
    /// Get the bytes stored under `key`. If the key does not exist or has
    /// expired, return `None`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, overwriting any previous value.
    /// `ttl` of `None` (or zero) keeps the key until it is overwritten.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Store `value` under `key` only if the key holds no value, as one
    /// atomic step. Return whether the write happened.
    async fn set_if_absent(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
        -> Result<bool>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Release the resources held by this handle.
    async fn close(&self) -> Result<()>;
}

mod memory;
mod redis;

pub use self::memory::MemoryKvsEngine;
pub use self::redis::RedisKvsEngine;
