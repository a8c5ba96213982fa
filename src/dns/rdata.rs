use std::net::Ipv4Addr;
use trust_dns_proto::rr::rdata::{SOA, TXT};
use trust_dns_proto::rr::{Name, RData, Record, RecordType};

/// The record data this server reads from update messages and writes into answers. Everything
/// else is [`RecordData::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Cname(Name),
    /// Character-strings in wire order. Empty for an RDATA-less TXT update.
    Txt(Vec<String>),
    Ns(Name),
    Soa(SOA),
    Unsupported(RecordType),
}

impl RecordData {
    /// Classify the data carried by a wire record. Records without RDATA (RFC 2136 deletions)
    /// classify by their type with no payload.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        match record.data() {
            Some(RData::A(addr)) => RecordData::A(*addr),
            Some(RData::CNAME(target)) => RecordData::Cname(target.clone()),
            Some(RData::TXT(txt)) => RecordData::Txt(
                txt.txt_data()
                    .iter()
                    .map(|segment| String::from_utf8_lossy(segment).into_owned())
                    .collect(),
            ),
            Some(RData::NS(name)) => RecordData::Ns(name.clone()),
            Some(RData::SOA(soa)) => RecordData::Soa(soa.clone()),
            None if record.record_type() == RecordType::TXT => RecordData::Txt(Vec::new()),
            _ => RecordData::Unsupported(record.record_type()),
        }
    }

    #[must_use]
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Cname(_) => RecordType::CNAME,
            RecordData::Txt(_) => RecordType::TXT,
            RecordData::Ns(_) => RecordType::NS,
            RecordData::Soa(_) => RecordType::SOA,
            RecordData::Unsupported(record_type) => *record_type,
        }
    }

    /// Build an answer record for `owner`. Returns `None` for [`RecordData::Unsupported`].
    #[must_use]
    pub fn into_record(self, owner: Name, ttl: u32) -> Option<Record> {
        let rdata = match self {
            RecordData::A(addr) => RData::A(addr),
            RecordData::Cname(target) => RData::CNAME(target),
            RecordData::Txt(segments) => RData::TXT(TXT::new(segments)),
            RecordData::Ns(name) => RData::NS(name),
            RecordData::Soa(soa) => RData::SOA(soa),
            RecordData::Unsupported(_) => return None,
        };
        Some(Record::from_rdata(owner, ttl, rdata))
    }
}
