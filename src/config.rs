use crate::error::Error;
use crate::store::{DynRecordStore, FileRecordStore, InMemoryRecordStore, RedisRecordStore};
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trust_dns_proto::rr::rdata::SOA;
use trust_dns_proto::rr::Name;

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Name served for every `NS` query, e.g. `ns1.example.com.`.
    pub ns_domain: Name,
    /// SOA responsible mailbox, either as a DNS name or as an e-mail address.
    pub ns_admin: String,
    pub soa: SoaConfig,
    #[serde(default = "default_record_ttl")]
    pub record_ttl: u32,
    pub dns_udp_bind_addr: SocketAddr,
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Values of the synthesized `SOA` answer. Only `mname` is required; the timers default to
/// serial 1, refresh 7200, retry 900, expire 1209600 and minimum 86400.
#[derive(Deserialize, Debug, Clone)]
pub struct SoaConfig {
    pub mname: Name,
    #[serde(default = "default_serial")]
    pub serial: u32,
    #[serde(default = "default_refresh")]
    pub refresh: i32,
    #[serde(default = "default_retry")]
    pub retry: i32,
    #[serde(default = "default_expire")]
    pub expire: i32,
    #[serde(default = "default_minimum")]
    pub minimum: u32,
}

/// Which [`RecordStore`][crate::store::RecordStore] backend to run with.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    #[default]
    Memory,
    File {
        path: String,
    },
    Redis {
        url: String,
    },
}

fn default_record_ttl() -> u32 {
    60
}

fn default_serial() -> u32 {
    1
}

fn default_refresh() -> i32 {
    7_200
}

fn default_retry() -> i32 {
    900
}

fn default_expire() -> i32 {
    1_209_600
}

fn default_minimum() -> u32 {
    86_400
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf.into_fqdn())
    }

    /// Parse a config from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the JSON is invalid or misses required fields.
    pub fn try_from_json(json: &str) -> Result<Self, Error> {
        let conf: Config = serde_json::from_str(json)?;
        Ok(conf.into_fqdn())
    }

    // Names from the config file are always meant relative to the root.
    fn into_fqdn(mut self) -> Self {
        self.ns_domain.set_fqdn(true);
        self.soa.mname.set_fqdn(true);
        self
    }

    pub fn ns_admin(&self) -> Result<Name, Error> {
        let mut name = Name::from_str(&self.sanitized_ns_admin())?;
        name.set_fqdn(true);
        Ok(name)
    }

    fn sanitized_ns_admin(&self) -> Cow<str> {
        match self.ns_admin.split_once('@') {
            Some((user, domain)) => {
                let user = user.replace('.', "\\.");
                Cow::Owned(format!("{user}.{domain}"))
            }
            _ => Cow::Borrowed(&self.ns_admin),
        }
    }

    /// The synthesized `SOA` record data.
    pub fn soa(&self) -> Result<SOA, Error> {
        Ok(SOA::new(
            self.soa.mname.clone(),
            self.ns_admin()?,
            self.soa.serial,
            self.soa.refresh,
            self.soa.retry,
            self.soa.expire,
            self.soa.minimum,
        ))
    }

    /// Construct the configured record store. The Redis backend stops in-flight calls once
    /// `shutdown` is cancelled.
    pub async fn record_store(&self, shutdown: CancellationToken) -> Result<DynRecordStore, Error> {
        Ok(match &self.store {
            StoreConfig::Memory => Arc::new(InMemoryRecordStore::new()),
            StoreConfig::File { path } => Arc::new(FileRecordStore::try_from_file(path).await?),
            StoreConfig::Redis { url } => Arc::new(RedisRecordStore::connect(url, shutdown).await?),
        })
    }
}
