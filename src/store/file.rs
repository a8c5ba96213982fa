//! A JSON file-backed implementation of the [`RecordStore`][super::RecordStore] trait.
//!
//! Holds a [`Records`][super::memory::Records] map in memory, persisting it to a JSON file on
//! disk after every mutation so it can be reloaded across restarts.
use crate::error::Error;
use crate::store::memory::Records;
use crate::store::{Domain, RecordStore, RecordType};
use std::io::ErrorKind;
use tokio::fs::File;
use tokio::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

/// A file-backed record store. After each mutation the JSON file on disk is rewritten with the
/// new data. The state file can be reloaded across restarts to avoid losing records.
///
/// The lock is held while the file is written, so the file never lags behind a mutation that
/// another caller has already observed. A mutation only becomes visible once it has been written:
/// if writing fails, the call returns the error and the record is unchanged.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FileRecordStore {
    records: Mutex<Records>,
    path: String,
}

impl FileRecordStore {
    /// Load a [`FileRecordStore`] from the JSON state located at the given path, creating an
    /// empty state file if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the JSON state file is invalid.
    ///
    /// Returns [`Error::IO`] if the path can't be opened, created or read.
    pub async fn try_from_file(p: &str) -> Result<Self, Error> {
        let contents = match File::open(p).await {
            Ok(mut f) => {
                let mut buf = vec![];
                f.read_to_end(&mut buf).await?;
                buf
            }
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Self::write_empty_state(File::create(&p).await?).await?,
                _ => return Err(Error::IO(err)),
            },
        };

        let records: Records = serde_json::from_slice(&contents)?;
        tracing::debug!("loaded {} records from {p}", records.len());
        Ok(Self {
            records: Mutex::new(records),
            path: p.to_string(),
        })
    }

    async fn save(&self, records: &Records) -> Result<(), Error> {
        let data = serde_json::to_string_pretty(records)?;
        let mut output_file = File::create(&self.path).await?;
        output_file.write_all(data.as_bytes()).await?;
        output_file.flush().await?;
        Ok(())
    }

    async fn write_empty_state(mut f: File) -> io::Result<Vec<u8>> {
        let default_data = serde_json::to_string_pretty(&Records::default())?;
        let default_bytes = default_data.as_bytes();
        f.write_all(default_bytes).await?;
        f.flush().await?;
        Ok(default_bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl RecordStore for FileRecordStore {
    async fn set(
        &self,
        domain: &Domain,
        record_type: RecordType,
        value: String,
    ) -> Result<(), Error> {
        let mut records = self.records.lock().await;
        let mut updated = records.clone();
        updated.set(domain, record_type, value);
        self.save(&updated).await?;
        *records = updated;
        Ok(())
    }

    async fn get(&self, domain: &Domain, record_type: RecordType) -> Result<Option<String>, Error> {
        Ok(self.records.lock().await.get(domain, record_type).cloned())
    }

    async fn conditional_delete(
        &self,
        domain: &Domain,
        record_type: RecordType,
        expected: &str,
    ) -> Result<(), Error> {
        let mut records = self.records.lock().await;
        let mut updated = records.clone();
        updated.delete_if(domain, record_type, expected)?;
        self.save(&updated).await?;
        *records = updated;
        Ok(())
    }
}
