use crate::config::SharedConfig;
use crate::dns::handlers::Handler;
use crate::error::Error;
use crate::store::DynRecordStore;
use futures_util::FutureExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

// Large enough for any EDNS payload a client may advertise.
const MAX_DATAGRAM: usize = 4096;

/// A UDP DNS listener. Every datagram is handled on its own task; there is no ordering between
/// messages, even from the same client.
pub struct DnsServer {
    socket: Arc<UdpSocket>,
    handler: Arc<Handler>,
    shutdown: CancellationToken,
}

pub async fn new(
    config: SharedConfig,
    store: DynRecordStore,
    shutdown: CancellationToken,
) -> Result<DnsServer, Error> {
    let handler = Handler::new(&config, store)?;
    let socket = UdpSocket::bind(config.dns_udp_bind_addr).await?;
    Ok(DnsServer {
        socket: Arc::new(socket),
        handler: Arc::new(handler),
        shutdown,
    })
}

impl DnsServer {
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve until the shutdown token is cancelled, then wait for in-flight messages to be
    /// answered.
    pub async fn block_until_done(self) -> Result<(), Error> {
        let mut in_flight = JoinSet::new();
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let result = loop {
            let (len, src) = tokio::select! {
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok(received) => received,
                    Err(err) => {
                        warn!("error receiving message on udp socket: {err}");
                        if is_unrecoverable_socket_error(&err) {
                            break Err(Error::IO(err));
                        }
                        continue;
                    }
                },
                () = self.shutdown.cancelled() => break Ok(()),
            };

            let datagram = buf[..len].to_vec();
            let handler = self.handler.clone();
            let socket = self.socket.clone();
            in_flight.spawn(async move {
                if let Some(reply) = handler.handle_datagram(src, &datagram).await {
                    if let Err(err) = socket.send_to(&reply, src).await {
                        warn!("failed to send reply to {src}: {err}");
                    }
                }
            });

            reap_tasks(&mut in_flight);
        };

        debug!("udp listener stopped, draining {} handlers", in_flight.len());
        while in_flight.join_next().await.is_some() {}
        result
    }
}

/// Reap finished handlers from a `JoinSet` without waiting on the rest.
fn reap_tasks(join_set: &mut JoinSet<()>) {
    while FutureExt::now_or_never(join_set.join_next())
        .flatten()
        .is_some()
    {}
}

fn is_unrecoverable_socket_error(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotConnected | std::io::ErrorKind::ConnectionAborted
    )
}
