use crate::config::SharedConfig;
use crate::dns::rdata::RecordData;
use crate::error::Error;
use crate::store::{Domain, DynRecordStore, RecordType as StoredType};
use lazy_static::lazy_static;
use regex::Regex;
use std::net::Ipv4Addr;
use std::str::FromStr;
use trust_dns_proto::rr::rdata::SOA;
use trust_dns_proto::rr::{Name, Record, RecordType};

lazy_static! {
    // Four digit groups split by any non-digit, followed by `.ip.` and two more labels.
    static ref IPV4_QUERY: Regex =
        Regex::new(r"((?:[0-9]+[^0-9]){3}[0-9]+)\.ip\.[^.]+\.[^.]+\.").unwrap();
}

/// The outcome of resolving one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Answer(Record),
    NxDomain,
}

/// Turns a question into at most one answer record.
///
/// `NS` and `SOA` answers are synthesized for any name. `A` queries for names that spell out an
/// address (e.g. `10.20.30.40.ip.example.org.`) are answered with that address. Everything else
/// is looked up in the record store.
#[derive(Clone)]
pub struct Resolver {
    ns_domain: Name,
    soa: SOA,
    ttl: u32,
    store: DynRecordStore,
}

impl Resolver {
    pub fn new(config: &SharedConfig, store: DynRecordStore) -> Result<Self, Error> {
        Ok(Self {
            ns_domain: config.ns_domain.clone(),
            soa: config.soa()?,
            ttl: config.record_ttl,
            store,
        })
    }

    pub async fn resolve(&self, name: &Name, query_type: RecordType) -> Resolution {
        let data = match query_type {
            RecordType::NS => Some(RecordData::Ns(self.ns_domain.clone())),
            RecordType::SOA => Some(RecordData::Soa(self.soa.clone())),
            RecordType::CNAME => self.cname(name).await,
            RecordType::TXT => self.txt(name).await,
            RecordType::A => match synthetic_ipv4(name) {
                Some(addr) => Some(RecordData::A(addr)),
                None => self.a(name).await,
            },
            _ => None,
        };
        match data.and_then(|data| data.into_record(name.clone(), self.ttl)) {
            Some(record) => Resolution::Answer(record),
            None => Resolution::NxDomain,
        }
    }

    async fn cname(&self, name: &Name) -> Option<RecordData> {
        let target = self.lookup(name, StoredType::CNAME).await?;
        match Name::from_str(&target) {
            Ok(target) => Some(RecordData::Cname(target)),
            Err(err) => {
                tracing::warn!("stored CNAME for \"{name}\" is not a valid name: {err}");
                None
            }
        }
    }

    // ACME validators (and others) probe TXT but follow a CNAME placed at the same name.
    async fn txt(&self, name: &Name) -> Option<RecordData> {
        match self.lookup(name, StoredType::TXT).await {
            Some(value) => Some(RecordData::Txt(vec![value])),
            None => self.cname(name).await,
        }
    }

    async fn a(&self, name: &Name) -> Option<RecordData> {
        let value = self.lookup(name, StoredType::A).await?;
        match Ipv4Addr::from_str(&value) {
            Ok(addr) => Some(RecordData::A(addr)),
            Err(err) => {
                tracing::warn!("stored A for \"{name}\" is not an IPv4 address: {err}");
                None
            }
        }
    }

    async fn lookup(&self, name: &Name, record_type: StoredType) -> Option<String> {
        match self.store.get(&Domain::from(name), record_type).await {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                tracing::debug!("no {record_type} record for \"{name}\"");
                None
            }
            Err(err) => {
                tracing::warn!("record store lookup of {record_type} for \"{name}\" failed: {err}");
                None
            }
        }
    }
}

/// Decode the IPv4 address spelled out in a name such as `10-20-30-40.ip.example.org.`.
fn synthetic_ipv4(name: &Name) -> Option<Ipv4Addr> {
    let name = name.to_string();
    let digits = IPV4_QUERY.captures(&name)?.get(1)?.as_str();
    let dotted = digits
        .split(|c: char| !c.is_ascii_digit())
        .collect::<Vec<_>>()
        .join(".");
    Ipv4Addr::from_str(&dotted).ok()
}
