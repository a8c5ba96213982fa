//! Error types.

use crate::store::{Domain, RecordType};
use axum::extract::rejection::JsonRejection;
use trust_dns_client::error::ParseError;
use trust_dns_proto::error::ProtoError;

/// Error enumerates the possible dynadns error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned by [`RecordStore::conditional_delete`][crate::store::RecordStore::conditional_delete]
    /// when the stored value differs from the expected value, including when no value is stored.
    /// The entry is left untouched.
    #[error("current {1} value for \"{0}\" does not match the expected value")]
    DeleteMismatch(Domain, RecordType),

    /// Returned when a record type outside of `A`, `CNAME` and `TXT` is named for storage.
    #[error("unsupported record type \"{0}\"")]
    UnknownRecordType(String),

    /// Returned by the [HTTP API][crate::api] when no value is stored for a domain and type.
    #[error("no {1} record for \"{0}\"")]
    RecordNotFound(Domain, RecordType),

    /// Returned when an uploaded zone file can't be parsed. Nothing from the zone is applied.
    #[error("invalid zone file: {0}")]
    InvalidZone(#[from] ParseError),

    /// Returned when the Redis backend fails (unreachable, protocol error, ...).
    #[error("record store backend error")]
    Backend(#[from] redis::RedisError),

    /// Returned when a record store call is interrupted by process shutdown.
    #[error("record store operation cancelled by shutdown")]
    Cancelled,

    /// Returned when clients send invalid JSON.
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g. to
    /// [trying to load a `Config`][crate::config::Config::try_from_file], or to
    /// [trying to load a `FileRecordStore`][crate::store::file::FileRecordStore::try_from_file])
    /// fails due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the DNS server encounters a generic DNS protocol error.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),

    /// Returned when the HTTP API listener can't be bound or fails while serving.
    #[error("HTTP server error")]
    Http(#[from] hyper::Error),
}
