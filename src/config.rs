use std::env;

use serde::{Deserialize, Serialize};

/// Address used when none is configured.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:6379";
/// Environment variable holding the store address.
pub const ADDRESS_ENV: &str = "REDIS_ADDR";
/// Environment variable holding the store password.
pub const PASSWORD_ENV: &str = "REDIS_PASS";

/// Where the backing store lives and how to authenticate to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `host:port` of the store.
    pub address: String,
    /// Password sent on connect, if any.
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            address: DEFAULT_ADDRESS.to_owned(),
            password: None,
        }
    }
}

impl StoreConfig {
    /// Creates a config for `address` with no password.
    pub fn new(address: impl Into<String>) -> Self {
        StoreConfig {
            address: address.into(),
            password: None,
        }
    }

    /// Sets the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Reads `REDIS_ADDR` and `REDIS_PASS`.
    /// Unset or empty variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());
        StoreConfig {
            address: non_empty(ADDRESS_ENV).unwrap_or_else(|| DEFAULT_ADDRESS.to_owned()),
            password: non_empty(PASSWORD_ENV),
        }
    }
}
