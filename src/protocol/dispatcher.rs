use crate::error::Result;
use crate::protocol::message::Message;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

type HandlerFn = dyn Fn(&str, &Message) -> Result<Option<Message>> + Send + Sync + 'static;

/// Message dispatcher with zero-copy discriminator routing for statics.
///
/// Handlers receive the peer address and the decoded message and may return a
/// reply to send back. Messages without a registered handler, including
/// messages of unrecognized type, hit the default branch, which logs and
/// drops them rather than erroring.
pub struct Dispatcher {
    handlers: Arc<RwLock<HashMap<Cow<'static, str>, Box<HandlerFn>>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A dispatcher with the built-in handlers registered.
    ///
    /// The greeting is consumed by the session's handshake gate and never
    /// reaches the dispatcher, so only `error` is wired here.
    pub fn with_default_handlers() -> Self {
        let dispatcher = Self::new();

        dispatcher.register("error", |peer, msg| {
            if let Message::Error { name, description } = msg {
                warn!(
                    peer = %peer,
                    name = %name,
                    description = %description,
                    "Peer reported protocol error"
                );
            }
            Ok(None)
        });

        dispatcher
    }

    pub fn register<F>(&self, message_type: &str, handler: F)
    where
        F: Fn(&str, &Message) -> Result<Option<Message>> + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write();
        handlers.insert(Cow::Owned(message_type.to_string()), Box::new(handler));
    }

    /// Route a message to its handler; the default branch drops it.
    pub fn dispatch(&self, peer: &str, message: &Message) -> Result<Option<Message>> {
        let message_type = message.message_type();

        let handlers = self.handlers.read();
        match handlers.get(message_type.as_ref()) {
            Some(handler) => handler(peer, message),
            None => {
                debug!(
                    peer = %peer,
                    message_type = %message_type,
                    "No handler for message type, dropping"
                );
                Ok(None)
            }
        }
    }
}
