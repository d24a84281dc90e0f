//! # Error Types
//!
//! Error handling for the peer-connection core.
//!
//! This module defines the error variants that can occur while accepting,
//! dialing, framing, and decoding peer traffic.
//!
//! ## Error Categories
//! - **I/O Errors**: socket and stream failures
//! - **Codec Errors**: unencodable messages, malformed frames, oversized lines
//! - **Configuration Errors**: invalid listen addresses or peer entries
//! - **Dial Errors**: unresolvable or unreachable peer addresses
//!
//! Protocol-sequencing violations (wrong message before the handshake,
//! duplicate greeting) are not modeled here: those are reported to the remote
//! peer as wire-level `error` messages and terminate only the offending
//! session. See [`crate::protocol::message`] for the wire error codes.

use std::io;
use thiserror::Error;

/// Primary error type for all peer-connection operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dial error: {0}")]
    Dial(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
