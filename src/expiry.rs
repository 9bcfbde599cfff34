use std::time::{Duration, SystemTime};

use crate::{KvsError, Result};

/// When a written key should be dropped by the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Expiry {
    /// Keep the key until it is overwritten.
    #[default]
    Never,
    /// Drop the key once this much time has passed since the write.
    /// A zero duration means no expiry.
    After(Duration),
    /// Drop the key at this wall-clock instant.
    At(SystemTime),
}

impl Expiry {
    /// The TTL to send along with the write, computed against the current time.
    ///
    /// # Errors
    ///
    /// Returns `KvsError::DeadlineElapsed` if an absolute deadline is not
    /// strictly in the future.
    pub fn ttl(&self) -> Result<Option<Duration>> {
        self.ttl_at(SystemTime::now())
    }

    fn ttl_at(&self, now: SystemTime) -> Result<Option<Duration>> {
        match *self {
            Expiry::Never => Ok(None),
            Expiry::After(timeout) if timeout.is_zero() => Ok(None),
            Expiry::After(timeout) => Ok(Some(timeout)),
            Expiry::At(deadline) => match deadline.duration_since(now) {
                Ok(remaining) if !remaining.is_zero() => Ok(Some(remaining)),
                _ => Err(KvsError::DeadlineElapsed),
            },
        }
    }
}

impl From<Duration> for Expiry {
    fn from(timeout: Duration) -> Self {
        Expiry::After(timeout)
    }
}

impl From<SystemTime> for Expiry {
    fn from(deadline: SystemTime) -> Self {
        Expiry::At(deadline)
    }
}
