//! Host process for the peer-connection core: load configuration, start the
//! listener and dialer as independent tasks, and run until a shutdown signal
//! arrives.

use gossip_node::{config::NodeConfig, service::Node, utils::logging};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> gossip_node::Result<()> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::from_env()?,
    };
    config.validate()?;

    info!(
        listen_addr = %config.listen_addr,
        agent = %config.agent,
        known_peers = config.known_peers.len(),
        "Starting gossip node"
    );

    let node = Arc::new(Node::new(config));

    let listener = {
        let node = node.clone();
        tokio::spawn(async move { node.start_listening().await })
    };

    let dialer = {
        let node = node.clone();
        let peers = node.config().known_peers.clone();
        tokio::spawn(async move { node.connect_to_peers(peers).await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutting down node");

    listener.abort();
    dialer.abort();
    Ok(())
}
