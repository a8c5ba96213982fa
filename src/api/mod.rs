//! HTTP API for reading and changing stored records.
//!
//! Errors are returned as a JSON body of the form `{"error": "..."}`.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/domains/{domain}/record/{type}` (GET)
//!
//!   Returns HTTP 200 (OK) and the stored value:
//!
//!   ```json
//!   { "value": "1.2.3.4" }
//!   ```
//!
//!   Returns HTTP 404 (Not Found) if nothing is stored. `{type}` is one of `A`, `CNAME` or `TXT`
//!   in any case; anything else is HTTP 400 (Bad Request). The domain is matched
//!   case-insensitively, and the trailing dot matters: records stored by DNS `UPDATE` are fully
//!   qualified, e.g. `/domains/www.example.com./record/A`.
//!
//! ## `/domains/{domain}/record/{type}` (PUT)
//!
//!   Expects a JSON request body of the form `{ "value": "1.2.3.4" }` and stores the value,
//!   replacing any previous one. Returns HTTP 204 (No Content).
//!
//!   A malformed body is HTTP 400 (Bad Request), a missing `Content-Type: application/json`
//!   is HTTP 415 (Unsupported Media Type), and a record store failure is HTTP 500.
//!
//! ## `/domains/{domain}/record/{type}` (DELETE)
//!
//!   Expects the same body as `PUT`, holding the value the caller expects to be stored. The
//!   record is removed only if it matches, returning HTTP 204 (No Content). Otherwise nothing
//!   changes and HTTP 409 (Conflict) is returned.
//!
//! ## `/zone` (POST)
//!
//!   Expects a [zone file][crate::zone] as the request body and stores its `A`, `CNAME` and
//!   `TXT` records. Returns HTTP 204 (No Content). A zone that can't be parsed is HTTP 400
//!   (Bad Request) and nothing from it is stored.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
