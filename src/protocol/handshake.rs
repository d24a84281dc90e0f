//! Handshake state machine enforced on every connection.
//!
//! A connection starts `Unestablished` and becomes `Established` exactly once,
//! when the first well-formed greeting arrives. There is no way back: a second
//! greeting, like any non-greeting message before the first one, is a
//! protocol-sequencing violation that terminates the session.
//!
//! The state lives in the connection registry entry and is only mutated
//! through registry operations; this module is the pure policy table.

use crate::protocol::message::{Message, INVALID_HANDSHAKE};

/// Per-connection handshake state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakeState {
    /// Initial state: no greeting received yet.
    #[default]
    Unestablished,
    /// Greeting exchanged; all message types are accepted.
    Established,
}

impl HandshakeState {
    pub fn is_established(self) -> bool {
        matches!(self, HandshakeState::Established)
    }
}

/// Outcome of gating one decoded message against the handshake state.
#[derive(Debug, PartialEq, Eq)]
pub enum HandshakeVerdict {
    /// First well-formed greeting: transition to `Established` and cancel the
    /// handshake deadline.
    Establish,
    /// Message is cleared for routing to its handler.
    Route,
    /// Sequencing violation: send the error, then remove the connection.
    Terminate {
        name: &'static str,
        description: &'static str,
    },
}

/// Apply the handshake policy to one decoded message.
pub fn gate(state: HandshakeState, message: &Message) -> HandshakeVerdict {
    match (state, message) {
        (HandshakeState::Unestablished, Message::Hello { .. }) => HandshakeVerdict::Establish,
        (HandshakeState::Unestablished, _) => HandshakeVerdict::Terminate {
            name: INVALID_HANDSHAKE,
            description: "Handshake first",
        },
        (HandshakeState::Established, Message::Hello { .. }) => HandshakeVerdict::Terminate {
            name: INVALID_HANDSHAKE,
            description: "Handshake already received",
        },
        (HandshakeState::Established, _) => HandshakeVerdict::Route,
    }
}
