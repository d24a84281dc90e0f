//! # Core Framing Components
//!
//! Low-level framing over byte streams.
//!
//! The wire protocol is newline-delimited UTF-8 text: each frame carries one
//! canonically-encoded JSON message. This module provides the tokio codec
//! that turns a bidirectional byte stream into a sequence of frame payloads
//! and serializes outgoing messages back into framed bytes.

pub mod codec;

pub use codec::{MessageCodec, MAX_FRAME_SIZE};
