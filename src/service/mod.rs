//! # Service Layer
//!
//! The connection registry, the per-connection session loop, and the node
//! object that ties them to the transport.
//!
//! ## Components
//! - **Node**: owns config, registry, and dispatcher; exposes the two entry
//!   points the host runs as independent tasks
//! - **Registry**: synchronized peer map with the uniqueness invariant
//! - **Session**: greet, enforce the handshake deadline, read-decode-dispatch

pub mod node;
pub mod registry;
pub mod session;

pub use node::Node;
pub use registry::ConnectionRegistry;
