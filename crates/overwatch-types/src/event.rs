//! In-process publish/subscribe bridge between the terminal and other
//! surfaces.
//!
//! The interpreter announces every dispatched command here so independent
//! trackers (map, globe, uplink) can react without direct coupling.
//! Delivery is synchronous, same-process, fire-and-forget: a publish with
//! zero subscribers is a silent no-op and there is no acknowledgment.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Broadcast once per dispatched command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExecuted {
    /// Resolved verb (lowercased, alias-folded).
    pub command: String,
    /// First argument, when present.
    pub target: Option<String>,
}

type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Typed event bus with explicit subscribe/unsubscribe lifecycle.
pub struct EventBus<E> {
    subscribers: Mutex<Vec<(u64, Handler<E>)>>,
    next_id: AtomicU64,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler. The returned [`Subscription`] unsubscribes when
    /// dropped, tying handler lifetime to the owning surface.
    pub fn subscribe(
        self: &Arc<Self>,
        handler: impl Fn(&E) + Send + Sync + 'static,
    ) -> Subscription<E> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Box::new(handler)));
        Subscription {
            bus: Arc::clone(self),
            id,
        }
    }

    /// Remove a handler by id. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: u64) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(sub_id, _)| *sub_id != id);
    }

    /// Deliver `event` to every currently-registered handler, in
    /// registration order.
    pub fn publish(&self, event: &E) {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        for (_, handler) in subscribers.iter() {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for a registered subscriber.
pub struct Subscription<E> {
    bus: Arc<EventBus<E>>,
    id: u64,
}

impl<E> Subscription<E> {
    /// Explicitly unsubscribe now instead of at drop.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}
