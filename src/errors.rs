use thiserror::Error;

/// Error type for kvs-redis.
#[derive(Debug, Error)]
pub enum KvsError {
    /// The store address is not a valid `host:port` pair.
    #[error("invalid store address: {0}")]
    InvalidAddress(String),
    /// The client could not be built, or the store did not answer a ping.
    #[error("connection error: {0}")]
    Connection(#[source] redis::RedisError),
    /// A request reached the store but failed on the way there or back.
    #[error("{0}")]
    Communication(#[from] redis::RedisError),
    /// `add` found a value already stored under the key.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    /// JSON serialization or deserialization error.
    #[error("serde_json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Binary serialization or deserialization error.
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    /// The absolute expiry deadline is not in the future.
    #[error("expiry deadline has already passed")]
    DeadlineElapsed,
}

impl KvsError {
    /// Whether the error was raised by a codec rather than by the store.
    pub fn is_codec(&self) -> bool {
        matches!(self, KvsError::Json(_) | KvsError::Bincode(_))
    }
}

/// Result type for kvs-redis.
pub type Result<T> = std::result::Result<T, KvsError>;
