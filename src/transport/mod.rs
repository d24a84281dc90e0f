//! # Transport Layer
//!
//! External-facing glue between the network and the session loop: the TCP
//! listener and the outbound dialer.

pub mod tcp;
