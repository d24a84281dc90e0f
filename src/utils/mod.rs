//! # Utility Modules
//!
//! Supporting utilities for logging and timing.
//!
//! ## Components
//! - **Logging**: structured logging configuration
//! - **Timeout**: the cancellable deadline behind handshake eviction

pub mod logging;
pub mod timeout;

pub use timeout::DeadlineTimer;
