//! # Connection Registry
//!
//! The shared map of active peers, keyed by remote address.
//!
//! The registry is the only resource shared across session tasks. All
//! mutations go through its operations, which serialize against each other
//! under a single mutex covering the whole map: register/remove races on the
//! same address are linearized, so at most one connection per peer address
//! exists at any instant.
//!
//! An entry owns the connection's write half; the session task owns the read
//! half for the lifetime of its read loop. `remove` drops the registry's
//! writer handle and wakes the session, which drops the read half in turn,
//! so the transport is closed exactly once per lifecycle, at removal.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use crate::core::codec::MessageCodec;
use crate::protocol::handshake::HandshakeState;

/// Framed sink for outgoing messages on one connection.
pub type MessageSink = FramedWrite<OwnedWriteHalf, MessageCodec>;

/// Framed stream of raw frame payloads from one connection.
pub type MessageStream = FramedRead<OwnedReadHalf, MessageCodec>;

/// State the registry tracks per active peer.
struct ConnectionState {
    writer: Arc<tokio::sync::Mutex<MessageSink>>,
    closed: Arc<Notify>,
    handshake: HandshakeState,
}

/// What a session gets back from a successful registration: the read half it
/// will drive, plus shared handles to the write half and the removal signal.
pub struct SessionConn {
    pub reader: MessageStream,
    pub writer: Arc<tokio::sync::Mutex<MessageSink>>,
    pub closed: Arc<Notify>,
}

/// Snapshot of one entry, for callers outside the owning session.
pub struct PeerHandle {
    pub writer: Arc<tokio::sync::Mutex<MessageSink>>,
    pub handshake: HandshakeState,
}

/// Concurrency-safe map of active peer connections.
#[derive(Default)]
pub struct ConnectionRegistry {
    peers: Mutex<HashMap<String, ConnectionState>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under `peer_addr`.
    ///
    /// If the address is already present the new stream is dropped (closed)
    /// without touching the existing entry and `None` is returned. Otherwise
    /// the stream is split, the entry inserted as `Unestablished`, and the
    /// session's half of the connection handed back.
    pub fn register(&self, peer_addr: &str, stream: TcpStream) -> Option<SessionConn> {
        let mut peers = self.peers.lock();

        if peers.contains_key(peer_addr) {
            warn!(peer = %peer_addr, "Connection already exists, closing duplicate");
            drop(stream);
            return None;
        }

        let (read_half, write_half) = stream.into_split();
        let writer = Arc::new(tokio::sync::Mutex::new(FramedWrite::new(
            write_half,
            MessageCodec::new(),
        )));
        let closed = Arc::new(Notify::new());

        peers.insert(
            peer_addr.to_string(),
            ConnectionState {
                writer: writer.clone(),
                closed: closed.clone(),
                handshake: HandshakeState::Unestablished,
            },
        );
        debug!(peer = %peer_addr, "Peer registered");

        Some(SessionConn {
            reader: FramedRead::new(read_half, MessageCodec::new()),
            writer,
            closed,
        })
    }

    /// Remove a connection and close its transport. Idempotent: removing an
    /// absent address is a no-op.
    pub fn remove(&self, peer_addr: &str) {
        let entry = self.peers.lock().remove(peer_addr);
        if let Some(state) = entry {
            state.closed.notify_one();
            info!(peer = %peer_addr, "Connection removed");
        }
    }

    /// Set the handshake flag for a peer. No-op if the connection was
    /// already torn down concurrently.
    pub fn set_handshake_complete(&self, peer_addr: &str, complete: bool) {
        let mut peers = self.peers.lock();
        if let Some(state) = peers.get_mut(peer_addr) {
            state.handshake = if complete {
                HandshakeState::Established
            } else {
                HandshakeState::Unestablished
            };
            debug!(peer = %peer_addr, complete, "Handshake state updated");
        }
    }

    /// Current handshake state for a peer; absent peers read as unestablished.
    pub fn handshake_state(&self, peer_addr: &str) -> HandshakeState {
        self.peers
            .lock()
            .get(peer_addr)
            .map(|state| state.handshake)
            .unwrap_or_default()
    }

    pub fn is_handshake_complete(&self, peer_addr: &str) -> bool {
        self.handshake_state(peer_addr).is_established()
    }

    /// Look up a peer's shared handles. Absence is a normal outcome.
    pub fn lookup(&self, peer_addr: &str) -> Option<PeerHandle> {
        self.peers.lock().get(peer_addr).map(|state| PeerHandle {
            writer: state.writer.clone(),
            handshake: state.handshake,
        })
    }

    pub fn contains(&self, peer_addr: &str) -> bool {
        self.peers.lock().contains_key(peer_addr)
    }

    pub fn len(&self) -> usize {
        self.peers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.lock().is_empty()
    }
}
