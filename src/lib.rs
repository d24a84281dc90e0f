//! # gossip-node
//!
//! Peer-connection core for a gossip-style peer-to-peer node.
//!
//! The crate accepts and initiates TCP connections, enforces a mandatory
//! greeting handshake before any other message is accepted, tracks
//! per-connection state in a shared registry, and dispatches well-formed
//! messages to type-specific handlers.
//!
//! ## Wire Protocol
//! Newline-delimited UTF-8 frames, each a canonical JSON object with a
//! mandatory `type` discriminator:
//! ```text
//! {"agent":"gossip-node/0.1.0","type":"hello","version":"0.10.0"}\n
//! {"description":"Handshake first","name":"INVALID_HANDSHAKE","type":"error"}\n
//! ```
//! Unrecognized `type` values decode to a generic record and are dropped by
//! the router, leaving room for future message types.
//!
//! ## Entry Points
//! [`Node::start_listening`] and [`Node::connect_to_peers`] are the two
//! operations a host process runs as independent tasks; everything else
//! (per-connection sessions, the handshake deadline watcher) is spawned
//! internally.
//!
//! ## Example
//! ```no_run
//! use gossip_node::{config::NodeConfig, service::Node};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> gossip_node::Result<()> {
//!     let config = NodeConfig::default();
//!     config.validate()?;
//!     let node = Arc::new(Node::new(config));
//!
//!     let peers = node.config().known_peers.clone();
//!     let dialer = node.clone();
//!     tokio::spawn(async move { dialer.connect_to_peers(peers).await });
//!
//!     node.start_listening().await
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use config::NodeConfig;
pub use error::{ProtocolError, Result};
pub use protocol::message::Message;
pub use service::{ConnectionRegistry, Node};
