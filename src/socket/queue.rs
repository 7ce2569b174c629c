//! Ordered socket event queue.
//!
//! Transport callbacks append through an [`EventSink`]; the session drains
//! from the head. Every connection gets its own *generation*: resetting the
//! queue for a new connection invalidates the sinks handed to older ones,
//! so late callbacks from a replaced connection are dropped instead of
//! leaking into the new session.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::SocketEvent;

// ============================================================================
// Types
// ============================================================================

/// Push-delivery callback.
///
/// Installed with [`SocketSession::set_event_handler`](super::SocketSession::set_event_handler);
/// while set, events bypass the queue.
pub type EventHandler = Arc<dyn Fn(SocketEvent) + Send + Sync>;

/// Shared queue state.
#[derive(Default)]
struct QueueState {
    /// Undelivered events, oldest first.
    events: VecDeque<SocketEvent>,
    /// Generation of the active connection.
    generation: u64,
    /// Optional push-delivery callback.
    handler: Option<EventHandler>,
}

// ============================================================================
// EventQueue
// ============================================================================

/// FIFO of socket events for the active connection.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<QueueState>>,
}

impl EventQueue {
    /// Creates an empty queue at generation 0.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all queued events and starts a new generation.
    ///
    /// Returns the sink for the new generation.
    pub fn reset(&self) -> EventSink {
        let mut state = self.inner.lock();
        let discarded = state.events.len();
        state.events.clear();
        state.generation += 1;

        if discarded > 0 {
            debug!(
                discarded,
                generation = state.generation,
                "Discarded events from previous session"
            );
        }

        EventSink {
            inner: Arc::clone(&self.inner),
            generation: state.generation,
        }
    }

    /// Returns a sink for the current generation.
    #[must_use]
    pub fn sink(&self) -> EventSink {
        EventSink {
            inner: Arc::clone(&self.inner),
            generation: self.inner.lock().generation,
        }
    }

    /// Removes and returns the oldest event.
    #[inline]
    pub fn pop(&self) -> Option<SocketEvent> {
        self.inner.lock().events.pop_front()
    }

    /// Returns the number of undelivered events.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Returns `true` if no events are waiting.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    /// Returns the current generation.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Installs a push-delivery handler.
    ///
    /// Events already queued stay queued and remain pollable.
    pub fn set_handler(&self, handler: EventHandler) {
        self.inner.lock().handler = Some(handler);
    }

    /// Removes the push-delivery handler, restoring queueing.
    pub fn clear_handler(&self) {
        self.inner.lock().handler = None;
    }
}

// ============================================================================
// EventSink
// ============================================================================

/// Write end of the queue, bound to one connection generation.
#[derive(Clone)]
pub struct EventSink {
    inner: Arc<Mutex<QueueState>>,
    generation: u64,
}

impl EventSink {
    /// Appends an event.
    ///
    /// Returns `false` (and drops the event) if the sink belongs to a
    /// connection that has since been replaced.
    pub fn push(&self, event: SocketEvent) -> bool {
        let handler = {
            let mut state = self.inner.lock();
            if state.generation != self.generation {
                trace!(
                    sink = self.generation,
                    current = state.generation,
                    "Dropped event from stale connection"
                );
                return false;
            }

            if let Some(handler) = state.handler.clone() {
                handler
            } else {
                state.events.push_back(event);
                return true;
            }
        };

        // Invoke outside the lock so the handler may call back into the session.
        handler(event);
        true
    }

    /// Returns `true` while this sink's connection is the active one.
    #[inline]
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.inner.lock().generation == self.generation
    }

    /// Returns the generation this sink is bound to.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::new();
        let sink = queue.reset();

        sink.push(SocketEvent::Connected);
        sink.push(SocketEvent::DataReceived(vec![1, 2, 3]));

        assert_eq!(queue.pop(), Some(SocketEvent::Connected));
        assert_eq!(queue.pop(), Some(SocketEvent::DataReceived(vec![1, 2, 3])));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_reset_discards_and_invalidates() {
        let queue = EventQueue::new();
        let old = queue.reset();
        old.push(SocketEvent::Connected);

        let new = queue.reset();
        assert!(queue.is_empty());
        assert!(!old.is_current());
        assert!(new.is_current());

        assert!(!old.push(SocketEvent::Closed));
        assert!(queue.is_empty());

        assert!(new.push(SocketEvent::Connected));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_handler_receives_events() {
        let queue = EventQueue::new();
        let sink = queue.reset();
        let seen = Arc::new(Mutex::new(Vec::<SocketEvent>::new()));

        let seen_clone = Arc::clone(&seen);
        queue.set_handler(Arc::new(move |event: SocketEvent| seen_clone.lock().push(event)));

        sink.push(SocketEvent::Connected);
        assert!(queue.is_empty());
        assert_eq!(*seen.lock(), vec![SocketEvent::Connected]);

        queue.clear_handler();
        sink.push(SocketEvent::Closed);
        assert_eq!(queue.pop(), Some(SocketEvent::Closed));
    }

    fn arb_event() -> impl Strategy<Value = SocketEvent> {
        prop_oneof![
            Just(SocketEvent::Connected),
            Just(SocketEvent::Closed),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(SocketEvent::DataReceived),
            "[a-z ]{0,12}".prop_map(SocketEvent::TextReceived),
            "[a-z ]{0,12}".prop_map(SocketEvent::Error),
        ]
    }

    proptest! {
        #[test]
        fn prop_poll_preserves_delivery_order(events in prop::collection::vec(arb_event(), 0..64)) {
            let queue = EventQueue::new();
            let sink = queue.reset();
            for event in &events {
                sink.push(event.clone());
            }

            let mut drained = Vec::new();
            while let Some(event) = queue.pop() {
                drained.push(event);
            }

            prop_assert_eq!(drained, events);
            prop_assert_eq!(queue.pop(), None);
        }
    }
}
