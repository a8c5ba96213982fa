//! Zone file import.
//!
//! Zone files are read with the [RFC-1035][RFC-1035] master file parser from `trust-dns-client`,
//! so comments, `$ORIGIN`, `$TTL`, `@`, relative and repeated owner names, parentheses and
//! quoted or escaped character-strings all follow the usual rules. The file must set `$ORIGIN`,
//! and every record needs a TTL, either its own or from `$TTL`. Records without a class are
//! `IN`.
//!
//! Only `A`, `CNAME` and `TXT` records are stored. Every other type (`SOA`, `NS`, `MX`, ...) is
//! validated and skipped. TTLs are not kept, and only the first character-string of a `TXT`
//! record is stored. When a name has several records of one type the last one wins, as it would
//! when storing them one by one.
//!
//! [RFC-1035]: https://www.rfc-editor.org/rfc/rfc1035#section-5

use crate::dns::rdata::RecordData;
use crate::error::Error;
use crate::store::{Domain, DynRecordStore, RecordType};
use trust_dns_client::serialize::txt::{Lexer, Parser};
use trust_dns_proto::rr::DNSClass;

/// One storable record read from a zone file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    pub domain: Domain,
    pub record_type: RecordType,
    pub value: String,
}

/// Counts from one [`import`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub applied: usize,
    pub failed: usize,
}

/// Parse a zone file into the records that can be stored.
///
/// # Errors
///
/// Returns [`Error::InvalidZone`] if the zone can't be parsed.
pub fn parse(text: &str) -> Result<Vec<ZoneRecord>, Error> {
    let (origin, record_sets) = Parser::new().parse(Lexer::new(text), None, Some(DNSClass::IN))?;
    tracing::debug!("parsed zone {origin} with {} record sets", record_sets.len());

    let mut records = Vec::new();
    for record_set in record_sets.values() {
        let Some(record) = record_set.iter().last() else {
            continue;
        };
        let value = match RecordData::from_record(record) {
            RecordData::A(addr) => addr.to_string(),
            RecordData::Cname(target) => target.to_string(),
            RecordData::Txt(segments) => match segments.into_iter().next() {
                Some(first) => first,
                None => continue,
            },
            _ => continue,
        };
        let Ok(record_type) = RecordType::try_from(record.record_type()) else {
            continue;
        };
        records.push(ZoneRecord {
            domain: Domain::from(record.name()),
            record_type,
            value,
        });
    }
    Ok(records)
}

/// Parse a zone file and store its records. Nothing is stored if parsing fails; after that every
/// record is attempted even if storing an earlier one failed.
///
/// # Errors
///
/// Returns [`Error::InvalidZone`] if the zone can't be parsed.
pub async fn import(store: &DynRecordStore, text: &str) -> Result<ImportSummary, Error> {
    let records = parse(text)?;
    let mut summary = ImportSummary::default();
    for record in records {
        match store
            .set(&record.domain, record.record_type, record.value)
            .await
        {
            Ok(()) => summary.applied += 1,
            Err(err) => {
                tracing::warn!(
                    "failed to store {} record for \"{}\": {err}",
                    record.record_type,
                    record.domain
                );
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
