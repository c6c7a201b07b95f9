//! Typed publish/subscribe fan-out for inbound gateway events.
//!
//! The push channel emits every parsed frame here, keyed by its
//! `message_type`. Handlers are fallible: a handler returning `Err` is
//! logged and does not stop later handlers on the same topic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{trace, warn};

/// What a handler may fail with. Failures are logged, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type Handler = Arc<dyn Fn(&Value) -> Result<(), HandlerError> + Send + Sync>;

/// Identifies one registration on one topic.
///
/// Closures have no identity in Rust, so `subscribe` hands back an id and
/// `unsubscribe` removes exactly that registration. Registering the same
/// closure twice yields two ids, and both registrations fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

#[derive(Default)]
struct BusInner {
    next_id: u64,
    topics: HashMap<String, Vec<(HandlerId, Handler)>>,
}

/// Topic-keyed event fan-out with insertion-order dispatch.
#[derive(Default)]
pub struct EventBus {
    inner: Mutex<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` on `topic`. Handlers fire in registration order.
    pub fn subscribe<F>(&self, topic: &str, handler: F) -> HandlerId
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = HandlerId(inner.next_id);
        inner
            .topics
            .entry(topic.to_owned())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove the registration named by `id` from `topic`.
    ///
    /// Returns `true` if a registration was removed.
    pub fn unsubscribe(&self, topic: &str, id: HandlerId) -> bool {
        let mut inner = self.lock();
        let Some(handlers) = inner.topics.get_mut(topic) else {
            return false;
        };
        let Some(pos) = handlers.iter().position(|(hid, _)| *hid == id) else {
            return false;
        };
        handlers.remove(pos);
        true
    }

    /// Dispatch `payload` to every handler on `topic`, in registration order.
    ///
    /// A failing handler is logged and skipped; the rest still run. Unknown
    /// topics are a silent no-op. Handlers are invoked outside the registry
    /// lock, so they may subscribe or unsubscribe freely.
    pub fn emit(&self, topic: &str, payload: &Value) {
        let handlers: Vec<Handler> = {
            let inner = self.lock();
            match inner.topics.get(topic) {
                Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };

        trace!(topic, handlers = handlers.len(), "dispatching event");
        for handler in handlers {
            if let Err(error) = handler(payload) {
                warn!(topic, %error, "event handler failed");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        // A poisoned registry is still structurally sound; keep going.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
