use crate::api::routes;
use crate::config::SharedConfig;
use crate::error::Error;
use crate::store::DynRecordStore;
use std::future::Future;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub store: DynRecordStore,
}

/// Bind the HTTP API listener.
///
/// Returns the bound address and a future that serves requests until `shutdown` is cancelled,
/// then finishes the requests already in progress.
///
/// # Errors
///
/// Returns [`Error::Http`] if the listener can't be bound.
pub fn new(
    config: SharedConfig,
    store: DynRecordStore,
    shutdown: CancellationToken,
) -> Result<(SocketAddr, impl Future<Output = Result<(), Error>>), Error> {
    let server = axum::Server::try_bind(&config.api_bind_addr)?
        .serve(routes::new(AppState { config, store }).into_make_service());
    let addr = server.local_addr();
    let server = server.with_graceful_shutdown(async move { shutdown.cancelled().await });
    Ok((addr, async move { Ok(server.await?) }))
}
