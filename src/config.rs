//! # Configuration Management
//!
//! Centralized configuration for the gossip node core.
//!
//! This module provides structured configuration for the listener, dialer,
//! and per-connection sessions: bind address, agent identity, the handshake
//! deadline, and the initial set of known peer addresses.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Environment variables via `from_env()`
//! - Direct instantiation with defaults, plus `default_with_overrides()`
//!
//! Peer-address persistence across restarts is an external concern; the
//! `known_peers` list is whatever the host hands in at startup.

use crate::error::{ProtocolError, Result};
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Protocol version announced in the greeting.
pub const PROTOCOL_VERSION: &str = "0.10.0";

/// Default port gossip nodes listen on.
pub const DEFAULT_PORT: u16 = 18018;

/// Default agent identity announced in the greeting.
pub const DEFAULT_AGENT: &str = "gossip-node/0.1.0";

/// Node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    /// Address the listener binds, in `host:port` form.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Agent string sent in the outgoing greeting.
    #[serde(default = "default_agent")]
    pub agent: String,

    /// How long a peer may take to complete the handshake before eviction.
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout: Duration,

    /// Peer addresses the dialer connects to at startup.
    #[serde(default)]
    pub known_peers: Vec<String>,
}

fn default_listen_addr() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}

fn default_agent() -> String {
    DEFAULT_AGENT.to_string()
}

fn default_handshake_timeout() -> Duration {
    timeout::HANDSHAKE_TIMEOUT
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            agent: default_agent(),
            handshake_timeout: default_handshake_timeout(),
            known_peers: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::Config(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::Config(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::Config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("GOSSIP_NODE_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(agent) = std::env::var("GOSSIP_NODE_AGENT") {
            config.agent = agent;
        }

        if let Ok(secs) = std::env::var("GOSSIP_NODE_HANDSHAKE_TIMEOUT_SECS") {
            if let Ok(val) = secs.parse::<u64>() {
                config.handshake_timeout = Duration::from_secs(val);
            }
        }

        if let Ok(peers) = std::env::var("GOSSIP_NODE_KNOWN_PEERS") {
            config.known_peers = peers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.listen_addr.parse::<SocketAddr>().map_err(|e| {
            ProtocolError::Config(format!(
                "Invalid listen address '{}': {e}",
                self.listen_addr
            ))
        })?;

        if self.agent.is_empty() {
            return Err(ProtocolError::Config("Agent string is empty".to_string()));
        }

        if self.handshake_timeout.is_zero() {
            return Err(ProtocolError::Config(
                "Handshake timeout must be non-zero".to_string(),
            ));
        }

        for peer in &self.known_peers {
            if !is_valid_peer_addr(peer) {
                return Err(ProtocolError::Config(format!(
                    "Invalid peer address '{peer}'"
                )));
            }
        }

        Ok(())
    }
}

/// Check that a peer address is a `host:port` pair with a usable port and a
/// host that is either an IPv4 literal or a plausible DNS name.
pub fn is_valid_peer_addr(addr: &str) -> bool {
    let mut parts = addr.split(':');
    let (host, port) = match (parts.next(), parts.next(), parts.next()) {
        (Some(host), Some(port), None) => (host, port),
        _ => return false,
    };

    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match port.parse::<u32>() {
        Ok(p) if (1..=65535).contains(&p) => {}
        _ => return false,
    }

    is_valid_ipv4(host) || is_valid_dns_name(host)
}

fn is_valid_ipv4(host: &str) -> bool {
    let octets: Vec<&str> = host.split('.').collect();
    if octets.len() != 4 {
        return false;
    }
    octets.iter().all(|part| {
        !part.is_empty()
            && part.bytes().all(|b| b.is_ascii_digit())
            && part.parse::<u32>().map(|n| n <= 255).unwrap_or(false)
    })
}

fn is_valid_dns_name(host: &str) -> bool {
    // Letters, digits, dots, hyphens, underscores; 3 to 50 characters.
    if host.len() < 3 || host.len() > 50 {
        return false;
    }
    if !host
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_')
    {
        return false;
    }
    // At least one interior dot and at least one letter.
    if host.starts_with('.') || host.ends_with('.') || !host.contains('.') {
        return false;
    }
    host.bytes().any(|b| b.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.handshake_timeout, Duration::from_secs(20));
    }

    #[test]
    fn overrides_apply() {
        let config = NodeConfig::default_with_overrides(|c| {
            c.listen_addr = "127.0.0.1:9000".to_string();
            c.handshake_timeout = Duration::from_secs(5);
        });
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let config = NodeConfig::from_toml(
            r#"
            listen_addr = "0.0.0.0:18018"
            agent = "test-node"
            known_peers = ["172.22.29.47:18018", "node.example.com:18018"]
            "#,
        )
        .unwrap();
        assert_eq!(config.agent, "test-node");
        assert_eq!(config.known_peers.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_known_peer_fails_validation() {
        let config = NodeConfig::default_with_overrides(|c| {
            c.known_peers = vec!["not-an-address".to_string()];
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn peer_addr_validation() {
        assert!(is_valid_peer_addr("172.22.29.47:18018"));
        assert!(is_valid_peer_addr("node.example.com:18018"));
        assert!(is_valid_peer_addr("a.b:1"));

        assert!(!is_valid_peer_addr("172.22.29.47"));
        assert!(!is_valid_peer_addr("172.22.29.47:0"));
        assert!(!is_valid_peer_addr("172.22.29.47:70000"));
        assert!(!is_valid_peer_addr("256.0.0.1:18018"));
        assert!(!is_valid_peer_addr("nodots:18018"));
        assert!(!is_valid_peer_addr(".leading.dot:18018"));
        assert!(!is_valid_peer_addr("trailing.dot.:18018"));
        assert!(!is_valid_peer_addr("123.456:18018"));
        assert!(!is_valid_peer_addr("host:port:extra"));
        assert!(!is_valid_peer_addr("node.example.com:12x4"));
    }
}
