use std::time::{Duration, SystemTime};

use log::{debug, trace};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{Codec, Expiry, Json, KvsEngine, KvsError, RedisKvsEngine, Result, StoreConfig};

/// A typed key-value store over a `KvsEngine`.
///
/// Values go through the codec `C` on the way in and out; the engine only
/// ever sees bytes.
///
/// ```no_run
/// # async fn demo() -> kvs_redis::Result<()> {
/// use kvs_redis::KvStore;
///
/// let store = KvStore::open("127.0.0.1:6379", None)?;
/// store.set("greeting", "hello").await?;
/// let greeting: Option<String> = store.get("greeting").await?;
/// assert_eq!(greeting.as_deref(), Some("hello"));
/// store.close().await
/// # }
/// ```
#[derive(Clone)]
pub struct KvStore<E = RedisKvsEngine, C = Json> {
    engine: E,
    codec: C,
}

impl KvStore<RedisKvsEngine, Json> {
    /// Creates a `KvStore` for the Redis server at `address` (`host:port`),
    /// authenticating with `password` if given.
    ///
    /// No connection is made here; use [`KvStore::ping`] to check the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the client cannot be built.
    pub fn open(address: &str, password: Option<&str>) -> Result<Self> {
        Ok(KvStore::new(RedisKvsEngine::open(address, password)?))
    }

    /// Creates a `KvStore` from a `StoreConfig`.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self> {
        Self::open(&config.address, config.password.as_deref())
    }
}

impl<E: KvsEngine> KvStore<E, Json> {
    /// Wraps `engine`, encoding values as JSON.
    pub fn new(engine: E) -> Self {
        KvStore::with_codec(engine, Json)
    }
}

impl<E: KvsEngine, C: Codec> KvStore<E, C> {
    /// Wraps `engine`, encoding values with `codec`.
    pub fn with_codec(engine: E, codec: C) -> Self {
        KvStore { engine, codec }
    }

    /// The engine this store forwards to.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Releases the engine.
    pub async fn close(self) -> Result<()> {
        self.engine.close().await
    }

    /// Checks that the backing store answers.
    pub async fn ping(&self) -> Result<()> {
        self.engine.ping().await
    }

    /// Gets the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist or has expired. A value
    /// that the codec cannot decode into `T` is an error, not `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        debug!("GET {}", key);
        match self.engine.get(key).await? {
            Some(bytes) => {
                trace!("GET {} returned {} bytes", key, bytes.len());
                Ok(Some(self.codec.decode(&bytes)?))
            }
            None => Ok(None),
        }
    }

    /// Sets `key` to `value`, overwriting any previous value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set_with_expiry(key, value, Expiry::Never).await
    }

    /// Sets `key` to `value`; the key is dropped after `timeout`.
    pub async fn set_with_timeout<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        timeout: Duration,
    ) -> Result<()> {
        self.set_with_expiry(key, value, Expiry::After(timeout)).await
    }

    /// Sets `key` to `value`; the key is dropped at `deadline`.
    pub async fn set_with_deadline<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        deadline: SystemTime,
    ) -> Result<()> {
        self.set_with_expiry(key, value, Expiry::At(deadline)).await
    }

    /// Sets `key` to `value` with the given expiry, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Encoding errors and elapsed deadlines are returned before the engine
    /// is contacted.
    pub async fn set_with_expiry<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expiry: Expiry,
    ) -> Result<()> {
        let bytes = self.codec.encode(value)?;
        let ttl = expiry.ttl()?;
        debug!("SET {} ({} bytes, ttl {:?})", key, bytes.len(), ttl);
        self.engine.set(key, bytes, ttl).await
    }

    /// Stores `value` only if nothing is stored under the key yet, and
    /// returns the key.
    ///
    /// With `key` of `None`, a random UUIDv4 key is generated.
    ///
    /// # Errors
    ///
    /// Returns `KvsError::DuplicateKey` if the key already holds a value;
    /// nothing is written in that case.
    pub async fn add<T: Serialize + ?Sized>(&self, key: Option<&str>, value: &T) -> Result<String> {
        self.add_with_expiry(key, value, Expiry::Never).await
    }

    /// Like [`KvStore::add`], with an expiry on the new key.
    pub async fn add_with_expiry<T: Serialize + ?Sized>(
        &self,
        key: Option<&str>,
        value: &T,
        expiry: Expiry,
    ) -> Result<String> {
        let bytes = self.codec.encode(value)?;
        let ttl = expiry.ttl()?;
        let key = key.map_or_else(generate_key, str::to_owned);
        debug!("ADD {} ({} bytes, ttl {:?})", key, bytes.len(), ttl);
        if self.engine.set_if_absent(&key, bytes, ttl).await? {
            Ok(key)
        } else {
            Err(KvsError::DuplicateKey(key))
        }
    }
}

fn generate_key() -> String {
    Uuid::new_v4().to_string()
}
