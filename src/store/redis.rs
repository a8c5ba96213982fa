//! A Redis-backed implementation of the [`RecordStore`][super::RecordStore] trait.
//!
//! Records live under `<domain>:<TYPE>` string keys. One [`ConnectionManager`] multiplexes all
//! callers over a single connection and reconnects after failures.
use crate::error::Error;
use crate::store::{Domain, RecordStore, RecordType, StoreKey};
use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, RedisResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Deletes `KEYS[1]` only when it holds `ARGV[1]`. Returns the number of keys removed.
const COMPARE_AND_DELETE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

/// A record store kept in a Redis server.
///
/// Every call races the shutdown token it was created with, so a hung backend call ends with
/// [`Error::Cancelled`] once the process starts shutting down.
#[derive(Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct RedisRecordStore {
    connection: ConnectionManager,
    shutdown: CancellationToken,
}

impl RedisRecordStore {
    /// Connect to the Redis server at `url` (e.g. `redis://localhost:6379`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the URL is invalid or the server can't be reached.
    pub async fn connect(url: &str, shutdown: CancellationToken) -> Result<Self, Error> {
        let client = ::redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::debug!("connected to redis at {url}");
        Ok(Self {
            connection,
            shutdown,
        })
    }

    async fn cancellable<T>(&self, call: impl Future<Output = RedisResult<T>>) -> Result<T, Error> {
        tokio::select! {
            res = call => Ok(res?),
            () = self.shutdown.cancelled() => Err(Error::Cancelled),
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for RedisRecordStore {
    async fn set(
        &self,
        domain: &Domain,
        record_type: RecordType,
        value: String,
    ) -> Result<(), Error> {
        let key = StoreKey::new(domain, record_type).to_string();
        let mut connection = self.connection.clone();
        self.cancellable(connection.set::<_, _, ()>(key, value))
            .await
    }

    async fn get(&self, domain: &Domain, record_type: RecordType) -> Result<Option<String>, Error> {
        let key = StoreKey::new(domain, record_type).to_string();
        let mut connection = self.connection.clone();
        self.cancellable(connection.get::<_, Option<String>>(key))
            .await
    }

    async fn conditional_delete(
        &self,
        domain: &Domain,
        record_type: RecordType,
        expected: &str,
    ) -> Result<(), Error> {
        let key = StoreKey::new(domain, record_type);
        let mut connection = self.connection.clone();
        // Sent in full with EVAL every time, never EVALSHA.
        let mut cmd = ::redis::cmd("EVAL");
        cmd.arg(COMPARE_AND_DELETE)
            .arg(1)
            .arg(key.to_string())
            .arg(expected);
        let removed: i64 = self
            .cancellable(cmd.query_async(&mut connection))
            .await?;
        match removed {
            0 => Err(Error::DeleteMismatch(key.domain, key.record_type)),
            _ => Ok(()),
        }
    }
}
