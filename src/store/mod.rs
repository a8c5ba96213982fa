//! Dynamic record storage.
//!
//! Records are keyed by a lower-cased domain and one of the storable [`RecordType`]s. At most one
//! value exists per key: [`RecordStore::set`] overwrites, and only a matching
//! [`RecordStore::conditional_delete`] removes an entry. Entries never expire.
//!
//! Three implementations are provided. [`memory::InMemoryRecordStore`] is not durable across
//! restarts. [`file::FileRecordStore`] writes its state to disk after each mutation and loads it
//! again on startup. [`redis::RedisRecordStore`] keeps records in a shared Redis server so that
//! several server processes can answer from the same data.
//!
//! Every implementation does its own synchronization; callers share a [`DynRecordStore`] without
//! any outer lock.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use trust_dns_proto::rr;

pub mod file;
pub mod memory;
pub mod redis;

#[allow(clippy::module_name_repetitions)]
pub use file::FileRecordStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryRecordStore;
#[allow(clippy::module_name_repetitions)]
pub use self::redis::RedisRecordStore;

/// `DynRecordStore` is a type alias for a [`RecordStore`] shared by the DNS listener, the HTTP API
/// and the zone importer.
#[allow(clippy::module_name_repetitions)]
pub type DynRecordStore = Arc<dyn RecordStore + Send + Sync>;

/// An async trait describing storage of dynamic record values, keyed by the domain they should be
/// served for in the [DNS server][crate::dns].
#[async_trait::async_trait]
pub trait RecordStore {
    /// Store `value` for the domain and type, replacing any previous value.
    async fn set(&self, domain: &Domain, record_type: RecordType, value: String)
        -> Result<(), Error>;

    /// Get the value stored for the domain and type, or `None` if there isn't one.
    async fn get(&self, domain: &Domain, record_type: RecordType) -> Result<Option<String>, Error>;

    /// Remove the entry for the domain and type, but only if its current value is `expected`.
    ///
    /// The comparison and the removal happen as one atomic step. If the current value differs, or
    /// nothing is stored, [`Error::DeleteMismatch`] is returned and the entry is unchanged.
    async fn conditional_delete(
        &self,
        domain: &Domain,
        record_type: RecordType,
        expected: &str,
    ) -> Result<(), Error>;
}

/// A domain name in its normalized, lower-cased form.
///
/// Trailing dots are kept as given: `example.com.` and `example.com` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(String);

impl Domain {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Domain {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Domain {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&rr::Name> for Domain {
    fn from(name: &rr::Name) -> Self {
        Self::new(name.to_string())
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The record types that can be stored. `NS` and `SOA` answers are synthesized from
/// [`Config`][crate::config::Config] and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    A,
    CNAME,
    TXT,
}

impl RecordType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::CNAME => "CNAME",
            RecordType::TXT => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "CNAME" => Ok(RecordType::CNAME),
            "TXT" => Ok(RecordType::TXT),
            _ => Err(Error::UnknownRecordType(s.to_string())),
        }
    }
}

impl TryFrom<rr::RecordType> for RecordType {
    type Error = Error;

    fn try_from(record_type: rr::RecordType) -> Result<Self, Self::Error> {
        match record_type {
            rr::RecordType::A => Ok(RecordType::A),
            rr::RecordType::CNAME => Ok(RecordType::CNAME),
            rr::RecordType::TXT => Ok(RecordType::TXT),
            other => Err(Error::UnknownRecordType(other.to_string())),
        }
    }
}

impl From<RecordType> for rr::RecordType {
    fn from(record_type: RecordType) -> Self {
        match record_type {
            RecordType::A => rr::RecordType::A,
            RecordType::CNAME => rr::RecordType::CNAME,
            RecordType::TXT => rr::RecordType::TXT,
        }
    }
}

/// The unique key of a stored record. Displays as `<domain>:<TYPE>`, which is also the key used
/// by the Redis backend and the file backend's JSON state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey {
    pub domain: Domain,
    pub record_type: RecordType,
}

impl StoreKey {
    pub fn new(domain: &Domain, record_type: RecordType) -> Self {
        Self {
            domain: domain.clone(),
            record_type,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.record_type)
    }
}

impl FromStr for StoreKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, record_type) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::UnknownRecordType(s.to_string()))?;
        Ok(Self {
            domain: Domain::new(domain),
            record_type: record_type.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_lowercased_but_keeps_trailing_dot() {
        assert_eq!(Domain::new("Foo.COM.").as_str(), "foo.com.");
        assert_ne!(Domain::new("foo.com."), Domain::new("foo.com"));
    }

    #[test]
    fn record_type_parses_case_insensitively() {
        assert_eq!("cname".parse::<RecordType>().unwrap(), RecordType::CNAME);
        assert!(matches!(
            "MX".parse::<RecordType>(),
            Err(Error::UnknownRecordType(t)) if t == "MX"
        ));
    }

    #[test]
    fn store_key_display_and_parse() {
        let key = StoreKey::new(&Domain::new("Host.Example.org."), RecordType::TXT);
        assert_eq!(key.to_string(), "host.example.org.:TXT");
        assert_eq!(key.to_string().parse::<StoreKey>().unwrap(), key);
    }

    #[test]
    fn only_storable_wire_types_convert() {
        assert_eq!(
            RecordType::try_from(rr::RecordType::CNAME).unwrap(),
            RecordType::CNAME
        );
        assert!(RecordType::try_from(rr::RecordType::NS).is_err());
        assert_eq!(rr::RecordType::from(RecordType::A), rr::RecordType::A);
    }
}
