use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::debug;
use redis::{
    aio::MultiplexedConnection, Client, Cmd, ConnectionAddr, ConnectionInfo, FromRedisValue,
    RedisConnectionInfo, RedisResult, Value,
};
use tokio::sync::Mutex;

use crate::{KvsEngine, KvsError, Result};

/// Wrapper of `redis::Client` holding one multiplexed connection.
///
/// The connection is opened by the first request and shared by every clone
/// after that. If the server drops it, the failing request returns the
/// error and the next request connects again. `close` drops it.
#[derive(Clone)]
pub struct RedisKvsEngine {
    client: Client,
    connection: Arc<Mutex<Option<MultiplexedConnection>>>,
}

impl RedisKvsEngine {
    /// Creates a `RedisKvsEngine` from `redis::Client`.
    pub fn new(client: Client) -> Self {
        RedisKvsEngine {
            client,
            connection: Arc::new(Mutex::new(None)),
        }
    }

    /// Builds a client for the store at `address` (`host:port`).
    /// Nothing is sent to the server until the first request.
    ///
    /// # Errors
    ///
    /// Returns `KvsError::InvalidAddress` if `address` is not a `host:port`
    /// pair, or `KvsError::Connection` if the client rejects the settings.
    pub fn open(address: &str, password: Option<&str>) -> Result<Self> {
        let (host, port) = parse_address(address)?;
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host, port),
            redis: RedisConnectionInfo {
                password: password.map(str::to_owned),
                ..Default::default()
            },
        };
        let client = Client::open(info).map_err(KvsError::Connection)?;
        Ok(RedisKvsEngine::new(client))
    }

    async fn connection(&self) -> RedisResult<MultiplexedConnection> {
        let mut held = self.connection.lock().await;
        if let Some(con) = held.as_ref() {
            return Ok(con.clone());
        }
        debug!("Connecting to {:?}", self.client.get_connection_info().addr);
        let con = self.client.get_multiplexed_async_connection().await?;
        *held = Some(con.clone());
        Ok(con)
    }

    async fn query<T: FromRedisValue + Send>(&self, cmd: &Cmd) -> RedisResult<T> {
        let mut con = self.connection().await?;
        let reply = cmd.query_async::<_, T>(&mut con).await;
        let broken = match &reply {
            Err(err) if err.is_connection_dropped() || err.is_io_error() => {
                debug!("Dropping redis connection: {}", err);
                true
            }
            _ => false,
        };
        if broken {
            self.connection.lock().await.take();
        }
        reply
    }
}

#[async_trait]
impl KvsEngine for RedisKvsEngine {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .query::<Option<Vec<u8>>>(redis::cmd("GET").arg(key))
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.query::<()>(&set_command(key, value, ttl)).await?;
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool> {
        let reply = self
            .query::<Value>(set_command(key, value, ttl).arg("NX"))
            .await?;
        // NX answers nil when the key was already there.
        Ok(!matches!(reply, Value::Nil))
    }

    async fn ping(&self) -> Result<()> {
        self.query::<()>(&redis::cmd("PING"))
            .await
            .map_err(KvsError::Connection)
    }

    async fn close(&self) -> Result<()> {
        if self.connection.lock().await.take().is_some() {
            debug!(
                "Closed redis connection to {:?}",
                self.client.get_connection_info().addr
            );
        }
        Ok(())
    }
}

fn set_command(key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);
    if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
        cmd.arg("PX").arg(ttl_millis(ttl));
    }
    cmd
}

/// Milliseconds for `PX`, rounded up so a positive TTL never becomes 0.
fn ttl_millis(ttl: Duration) -> u64 {
    let mut millis = ttl.as_millis();
    if ttl.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }
    u64::try_from(millis).unwrap_or(u64::MAX)
}

fn parse_address(address: &str) -> Result<(String, u16)> {
    let invalid = || KvsError::InvalidAddress(address.to_owned());
    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_owned(), port))
}
