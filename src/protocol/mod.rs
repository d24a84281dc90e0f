//! # Protocol Layer
//!
//! Message shapes, the handshake state machine, and message routing.
//!
//! ## Components
//! - **Message**: tagged wire messages with canonical JSON encoding
//! - **Handshake**: the mandatory-greeting state machine gating all traffic
//! - **Dispatcher**: discriminator-to-handler routing with a drop default

pub mod dispatcher;
pub mod handshake;
pub mod message;
