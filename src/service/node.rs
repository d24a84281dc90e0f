//! The node object: configuration, connection registry, and dispatcher,
//! injected into the listener, dialer, and every session task.

use std::sync::Arc;

use crate::config::NodeConfig;
use crate::error::Result;
use crate::protocol::dispatcher::Dispatcher;
use crate::service::registry::ConnectionRegistry;
use crate::transport::tcp;

/// A gossip node's peer-connection core.
///
/// The registry is the sole shared mutable resource; listener, dialer, and
/// sessions all reach it through this object rather than any global state.
pub struct Node {
    config: NodeConfig,
    registry: Arc<ConnectionRegistry>,
    dispatcher: Arc<Dispatcher>,
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            registry: Arc::new(ConnectionRegistry::new()),
            dispatcher: Arc::new(Dispatcher::with_default_handlers()),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Accept inbound connections until the process shuts down.
    ///
    /// Binding the listen address is the only fatal failure; it propagates
    /// because the node has no purpose without inbound capability.
    pub async fn start_listening(self: &Arc<Self>) -> Result<()> {
        tcp::start_listener(self.clone()).await
    }

    /// Dial the given peer addresses, spawning a session per successful
    /// connection. Individual dial failures are logged and skipped.
    pub async fn connect_to_peers(self: &Arc<Self>, known_addresses: Vec<String>) {
        tcp::connect_to_peers(self.clone(), known_addresses).await;
    }
}
