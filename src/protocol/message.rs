//! # Wire Messages
//!
//! Message shapes for the gossip protocol and their canonical JSON encoding.
//!
//! Every frame on the wire is a single JSON object with a mandatory `type`
//! discriminator. Decoding is two-phase: the discriminator is read first,
//! then the full payload is decoded against the schema it selects. An
//! unrecognized discriminator decodes to [`Message::Unknown`] rather than an
//! error, so future message types pass through the codec and are rejected
//! (or ignored) by the router instead.
//!
//! Encoding is canonical: object keys are emitted in sorted order, so two
//! independent encoders of the same logical message produce byte-identical
//! output. The newline terminator is applied by the framer, not here.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::{ProtocolError, Result};

/// Wire error code for handshake-sequencing violations.
pub const INVALID_HANDSHAKE: &str = "INVALID_HANDSHAKE";

/// Wire error code for frames that fail to decode.
pub const INVALID_FORMAT: &str = "INVALID_FORMAT";

/// A protocol message, tagged by its `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// The mandatory greeting. Must be the first message on every connection.
    #[serde(rename = "hello")]
    Hello {
        version: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent: Option<String>,
    },

    /// Structured error report sent before terminating a misbehaving session.
    #[serde(rename = "error")]
    Error { name: String, description: String },

    /// A structurally valid message whose `type` is not known to this node.
    /// Decode-only: encoding it is an error.
    #[serde(skip)]
    Unknown { message_type: String },
}

/// First decode phase: only the discriminator.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    message_type: String,
}

impl Message {
    /// Build a greeting carrying this node's version and agent identity.
    pub fn hello(version: impl Into<String>, agent: Option<String>) -> Self {
        Message::Hello {
            version: version.into(),
            agent,
        }
    }

    /// Build an error message from a wire error code and description.
    pub fn error(name: impl Into<String>, description: impl Into<String>) -> Self {
        Message::Error {
            name: name.into(),
            description: description.into(),
        }
    }

    /// The `type` discriminator used for routing (zero-copy for known types).
    pub fn message_type(&self) -> Cow<'static, str> {
        match self {
            Message::Hello { .. } => Cow::Borrowed("hello"),
            Message::Error { .. } => Cow::Borrowed("error"),
            Message::Unknown { message_type } => Cow::Owned(message_type.clone()),
        }
    }

    /// Encode to canonical JSON bytes (sorted keys, no terminator).
    pub fn encode(&self) -> Result<Vec<u8>> {
        if let Message::Unknown { message_type } = self {
            return Err(ProtocolError::Encode(format!(
                "cannot encode message of unknown type '{message_type}'"
            )));
        }

        // Route through a Value so object keys serialize in sorted order.
        let value = serde_json::to_value(self).map_err(|e| ProtocolError::Encode(e.to_string()))?;
        serde_json::to_vec(&value).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode a single frame payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let envelope: Envelope = serde_json::from_slice(payload)
            .map_err(|e| ProtocolError::Decode(format!("invalid JSON frame: {e}")))?;

        match envelope.message_type.as_str() {
            "hello" | "error" => serde_json::from_slice(payload).map_err(|e| {
                ProtocolError::Decode(format!(
                    "malformed '{}' message: {e}",
                    envelope.message_type
                ))
            }),
            _ => Ok(Message::Unknown {
                message_type: envelope.message_type,
            }),
        }
    }
}
