//! dynadns
//!
//! An authoritative DNS server whose records change at runtime.
//!
//! Records are written through [RFC-2136][RFC-2136] `UPDATE` messages, a small
//! [HTTP API][crate::api] or a [zone file upload][crate::zone], and kept in a shared
//! [record store][crate::store]. Queries for `A`, `CNAME` and `TXT` records are answered from the
//! store. `NS` and `SOA` answers come from the [configuration][crate::config::Config], and names
//! of the form `10-20-30-40.ip.example.com` resolve to the address they spell out.
//!
//! [RFC-2136]: https://www.rfc-editor.org/rfc/rfc2136
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod dns;
pub mod error;
pub mod store;
pub mod zone;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use dns::new as new_dns;
pub use store::{DynRecordStore, FileRecordStore, InMemoryRecordStore, RedisRecordStore};
