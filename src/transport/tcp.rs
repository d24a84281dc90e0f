//! TCP listener and dialer.
//!
//! The listener accepts inbound connections in an unbounded loop and spawns a
//! session per accepted socket; an accept failure is logged and does not stop
//! the listener. The dialer walks a list of known peer addresses, opens one
//! keep-alive connection per address, and spawns a session per success; one
//! failed dial does not block the rest.

use std::sync::Arc;
use tokio::net::{lookup_host, TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::{ProtocolError, Result};
use crate::service::node::Node;
use crate::service::session::run_session;

/// Bind the configured listen address and accept until ctrl-c.
pub async fn start_listener(node: Arc<Node>) -> Result<()> {
    // Internal shutdown channel fed by the process signal.
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            info!("Received shutdown signal, closing listener");
            let _ = shutdown_tx.send(()).await;
        }
    });

    start_listener_with_shutdown(node, shutdown_rx).await
}

/// Bind the configured listen address and accept until the shutdown channel
/// fires. Bind failure propagates; it is the one fatal startup error.
pub async fn start_listener_with_shutdown(
    node: Arc<Node>,
    shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    let listener = TcpListener::bind(&node.config().listen_addr).await?;
    info!(addr = %node.config().listen_addr, "Listening for inbound peers");

    accept_loop(node, listener, shutdown_rx).await
}

/// Accept connections on an already-bound listener.
pub async fn accept_loop(
    node: Arc<Node>,
    listener: TcpListener,
    mut shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Listener shutting down");
                return Ok(());
            }

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, addr)) => {
                        info!(peer = %addr, "Inbound connection");
                        let node = node.clone();
                        tokio::spawn(async move {
                            run_session(node, stream, addr.to_string()).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                }
            }
        }
    }
}

/// Dial each known peer address and spawn a session per open connection.
pub async fn connect_to_peers(node: Arc<Node>, known_addresses: Vec<String>) {
    for address in known_addresses {
        info!(peer = %address, "Dialing peer");
        match dial(&address).await {
            Ok(stream) => {
                let peer_addr = match stream.peer_addr() {
                    Ok(addr) => addr.to_string(),
                    Err(e) => {
                        warn!(peer = %address, error = %e, "Dropping dialed connection");
                        continue;
                    }
                };
                let node = node.clone();
                tokio::spawn(async move {
                    run_session(node, stream, peer_addr).await;
                });
            }
            Err(e) => {
                warn!(peer = %address, error = %e, "Failed to connect to peer");
            }
        }
    }
}

/// Open one outbound connection with TCP keep-alive enabled.
///
/// The probe interval is left to the OS; tokio only exposes the enable bit.
async fn dial(address: &str) -> Result<TcpStream> {
    let socket_addr = lookup_host(address)
        .await?
        .next()
        .ok_or_else(|| ProtocolError::Dial(format!("Address '{address}' did not resolve")))?;

    let socket = if socket_addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_keepalive(true)?;

    Ok(socket.connect(socket_addr).await?)
}
