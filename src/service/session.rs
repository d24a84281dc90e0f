//! # Session Loop
//!
//! Per-connection control flow, one task per accepted or dialed transport.
//!
//! The session registers the connection, sends its own greeting
//! unconditionally, arms the handshake deadline, then reads frames until the
//! stream ends or a protocol violation terminates it. Decoded messages pass
//! the handshake gate before being routed to the dispatcher.
//!
//! Failure semantics: send failures are logged and abandoned, never retried;
//! a frame that fails message-level decoding is answered with an
//! `INVALID_FORMAT` error and the session continues. Teardown removes the
//! connection from the registry exactly once (the operation is idempotent),
//! which closes the transport.

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::PROTOCOL_VERSION;
use crate::protocol::handshake::{self, HandshakeVerdict};
use crate::protocol::message::{Message, INVALID_FORMAT, INVALID_HANDSHAKE};
use crate::service::node::Node;
use crate::service::registry::{MessageSink, SessionConn};
use crate::utils::timeout::DeadlineTimer;

/// Drive one connection from registration to teardown.
pub async fn run_session(node: Arc<Node>, stream: TcpStream, peer_addr: String) {
    // Duplicate addresses are rejected here; register already closed the
    // losing transport.
    let Some(conn) = node.registry().register(&peer_addr, stream) else {
        return;
    };
    let SessionConn {
        mut reader,
        writer,
        closed,
    } = conn;

    let greeting = Message::hello(PROTOCOL_VERSION, Some(node.config().agent.clone()));
    send_or_log(&writer, &peer_addr, greeting).await;

    // Evicts the peer unless a valid greeting cancels it first. Dropping the
    // timer on any exit path also cancels it.
    let deadline = DeadlineTimer::arm(node.config().handshake_timeout, {
        let node = node.clone();
        let peer_addr = peer_addr.clone();
        move || evict_on_timeout(node, peer_addr)
    });
    let mut deadline = Some(deadline);

    loop {
        let frame = tokio::select! {
            _ = closed.notified() => break,
            frame = reader.next() => frame,
        };

        let frame = match frame {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                warn!(peer = %peer_addr, error = %e, "Read error, ending session");
                break;
            }
            None => {
                debug!(peer = %peer_addr, "Stream ended");
                break;
            }
        };

        let message = match Message::decode(&frame) {
            Ok(message) => message,
            Err(e) => {
                debug!(peer = %peer_addr, error = %e, "Malformed frame");
                let reply = Message::error(INVALID_FORMAT, "Invalid message format");
                send_or_log(&writer, &peer_addr, reply).await;
                continue;
            }
        };
        debug!(
            peer = %peer_addr,
            message_type = %message.message_type(),
            "Received message"
        );

        let state = node.registry().handshake_state(&peer_addr);
        match handshake::gate(state, &message) {
            HandshakeVerdict::Establish => {
                node.registry().set_handshake_complete(&peer_addr, true);
                if let Some(timer) = deadline.take() {
                    timer.cancel();
                }
                if let Message::Hello { version, agent } = &message {
                    info!(
                        peer = %peer_addr,
                        version = %version,
                        agent = agent.as_deref().unwrap_or("unknown"),
                        "Handshake established"
                    );
                }
            }
            HandshakeVerdict::Terminate { name, description } => {
                warn!(
                    peer = %peer_addr,
                    name = name,
                    description = description,
                    "Protocol violation, terminating session"
                );
                // The send flushes before remove closes the transport, so the
                // peer sees why it was dropped.
                send_or_log(&writer, &peer_addr, Message::error(name, description)).await;
                node.registry().remove(&peer_addr);
                break;
            }
            HandshakeVerdict::Route => {
                match node.dispatcher().dispatch(&peer_addr, &message) {
                    Ok(Some(reply)) => send_or_log(&writer, &peer_addr, reply).await,
                    Ok(None) => {}
                    Err(e) => warn!(peer = %peer_addr, error = %e, "Handler failed"),
                }
            }
        }
    }

    node.registry().remove(&peer_addr);
}

/// Handshake-deadline expiry path. May race the read loop observing a
/// just-arrived greeting; every step tolerates the connection being gone.
async fn evict_on_timeout(node: Arc<Node>, peer_addr: String) {
    if node.registry().is_handshake_complete(&peer_addr) {
        return;
    }

    let secs = node.config().handshake_timeout.as_secs();
    warn!(peer = %peer_addr, "No handshake within deadline, evicting peer");

    if let Some(handle) = node.registry().lookup(&peer_addr) {
        let message = Message::error(
            INVALID_HANDSHAKE,
            format!("No handshake within {secs} seconds"),
        );
        send_or_log(&handle.writer, &peer_addr, message).await;
    }
    node.registry().remove(&peer_addr);
}

/// Send one message; a failure is logged and the send abandoned.
pub(crate) async fn send_or_log(
    writer: &Arc<tokio::sync::Mutex<MessageSink>>,
    peer_addr: &str,
    message: Message,
) {
    let mut sink = writer.lock().await;
    if let Err(e) = sink.send(message).await {
        warn!(peer = %peer_addr, error = %e, "Failed to send message");
    }
}
