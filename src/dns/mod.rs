//! Authoritative DNS server with dynamic records.
//!
//! Every inbound datagram first passes the [acceptance policy][acceptance::decide], which only
//! looks at the 12 byte header: responses are dropped, opcodes other than `QUERY`, `NOTIFY` and
//! `UPDATE` get `NOTIMP`, and messages with other than one question, more than one answer or
//! more than two additional records get `FORMERR`.
//!
//! Replies are never name-compressed.
//!
//! # Queries
//!
//! Answers carry a single record with the configured
//! [`Config::record_ttl`][`crate::config::Config::record_ttl`] (60 seconds by default).
//!
//! ## NS and SOA
//!
//! Synthesized for any name from [`Config::ns_domain`][`crate::config::Config::ns_domain`],
//! [`Config::ns_admin`][`crate::config::Config::ns_admin`] and
//! [`Config::soa`][`crate::config::Config::soa`]. The record store is not consulted.
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 +short anything.example.com NS
//! ns1.example.com.
//! ```
//!
//! ## A
//!
//! A name that spells out an IPv4 address as four digit groups split by any non-digit, followed
//! by `.ip.` and two more labels, resolves to that address without touching the store:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 +short 10-20-30-40.ip.example.com A
//! 10.20.30.40
//! ```
//!
//! Other names are answered from the store's `A` record, or `NXDOMAIN`.
//!
//! ## CNAME and TXT
//!
//! Answered from the store, or `NXDOMAIN`. A `TXT` query for a name with no `TXT` record but
//! with a `CNAME` record is answered with the `CNAME`.
//!
//! Every other query type is `NXDOMAIN`.
//!
//! # Updates
//!
//! [RFC-2136][RFC-2136] `UPDATE` messages store each `A`, `CNAME` and `TXT` record of the update
//! section, in order. Only the first character-string of a `TXT` record is kept. Prerequisites
//! are not checked, deletions and other types are ignored, and there is no authentication.
//! The reply is `SERVFAIL` if storing any record failed, even though the others were stored.
//!
//! ```bash
//! ❯ nsupdate <<EOF
//! server 127.0.0.1 5353
//! update add _acme-challenge.example.com 60 TXT "token"
//! send
//! EOF
//! ```
//!
//! [RFC-2136]: https://www.rfc-editor.org/rfc/rfc2136

pub mod acceptance;
mod handlers;
pub mod rdata;
pub mod resolution;
pub mod response;
pub mod server;
pub mod update;

pub use handlers::Handler;
pub use server::{new, DnsServer};
