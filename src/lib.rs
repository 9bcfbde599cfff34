#![deny(missing_docs)]
//! A typed key-value store backed by Redis.

mod codec;
mod config;
mod engines;
mod errors;
mod expiry;
mod kv;

pub use codec::{Bincode, Codec, Json};
pub use config::{StoreConfig, ADDRESS_ENV, DEFAULT_ADDRESS, PASSWORD_ENV};
pub use engines::{KvsEngine, MemoryKvsEngine, RedisKvsEngine};
pub use errors::{KvsError, Result};
pub use expiry::Expiry;
pub use kv::KvStore;
