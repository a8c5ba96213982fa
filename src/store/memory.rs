use crate::error::Error;
use crate::store::{Domain, RecordStore, RecordType, StoreKey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The plain record map shared by the in-memory and file-backed stores. Serializes as a JSON
/// object keyed by `<domain>:<TYPE>`.
#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Records {
    #[serde_as(as = "HashMap<DisplayFromStr, _>")]
    records: HashMap<StoreKey, String>,
}

impl Records {
    pub fn set(&mut self, domain: &Domain, record_type: RecordType, value: String) {
        self.records
            .insert(StoreKey::new(domain, record_type), value);
    }

    #[must_use]
    pub fn get(&self, domain: &Domain, record_type: RecordType) -> Option<&String> {
        self.records.get(&StoreKey::new(domain, record_type))
    }

    pub fn delete_if(
        &mut self,
        domain: &Domain,
        record_type: RecordType,
        expected: &str,
    ) -> Result<(), Error> {
        let key = StoreKey::new(domain, record_type);
        match self.records.get(&key) {
            Some(current) if current == expected => {
                self.records.remove(&key);
                Ok(())
            }
            _ => Err(Error::DeleteMismatch(key.domain, key.record_type)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A record store held entirely in process memory behind a lock.
#[derive(Default, Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct InMemoryRecordStore {
    records: RwLock<Records>,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn set(
        &self,
        domain: &Domain,
        record_type: RecordType,
        value: String,
    ) -> Result<(), Error> {
        self.records.write().await.set(domain, record_type, value);
        Ok(())
    }

    async fn get(&self, domain: &Domain, record_type: RecordType) -> Result<Option<String>, Error> {
        Ok(self.records.read().await.get(domain, record_type).cloned())
    }

    async fn conditional_delete(
        &self,
        domain: &Domain,
        record_type: RecordType,
        expected: &str,
    ) -> Result<(), Error> {
        self.records
            .write()
            .await
            .delete_if(domain, record_type, expected)
    }
}
