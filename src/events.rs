//! Topology change notification.
//!
//! This file implements the typed publish/subscribe registry that
//! decouples the topology core from the rendering layer. Subscribers
//! register per topic; emission never lets one handler's panic starve
//! its siblings or reach the mutation caller.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use crate::topology::types::{Connection, Node};

/// Topics a subscriber can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    NodeAdded,
    NodeRemoved,
    ConnectionAdded,
    ConnectionRemoved,
    TopologyReset,
    TopologyLoaded,
}

/// A state transition of the topology, carrying the affected data.
#[derive(Debug, Clone)]
pub enum TopologyEvent {
    NodeAdded { node: Node },
    NodeRemoved { node: Node },
    ConnectionAdded { connection: Connection },
    ConnectionRemoved { connection: Connection },
    TopologyReset,
    TopologyLoaded { nodes: usize, connections: usize },
}

impl TopologyEvent {
    /// The topic this event is published under.
    pub fn topic(&self) -> EventTopic {
        match self {
            TopologyEvent::NodeAdded { .. } => EventTopic::NodeAdded,
            TopologyEvent::NodeRemoved { .. } => EventTopic::NodeRemoved,
            TopologyEvent::ConnectionAdded { .. } => EventTopic::ConnectionAdded,
            TopologyEvent::ConnectionRemoved { .. } => EventTopic::ConnectionRemoved,
            TopologyEvent::TopologyReset => EventTopic::TopologyReset,
            TopologyEvent::TopologyLoaded { .. } => EventTopic::TopologyLoaded,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Handler = Box<dyn Fn(&TopologyEvent)>;

/// Observer registry keyed by topic.
///
/// Each `subscribe` call is an independent registration with its own
/// id; registering the same closure twice invokes it twice.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: HashMap<EventTopic, Vec<(SubscriberId, Handler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic.
    pub fn subscribe(
        &mut self,
        topic: EventTopic,
        handler: impl Fn(&TopologyEvent) + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(topic)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a registration. Returns `false` if the id was not
    /// registered under the topic; repeating the call is harmless.
    pub fn unsubscribe(&mut self, topic: EventTopic, id: SubscriberId) -> bool {
        match self.handlers.get_mut(&topic) {
            Some(list) => {
                let before = list.len();
                list.retain(|(sub_id, _)| *sub_id != id);
                list.len() != before
            }
            None => false,
        }
    }

    /// Number of registrations for a topic.
    pub fn subscriber_count(&self, topic: EventTopic) -> usize {
        self.handlers.get(&topic).map_or(0, |list| list.len())
    }

    /// Publish an event to every handler registered for its topic.
    ///
    /// A panicking handler is caught and logged; the remaining handlers
    /// still run and the caller never observes the panic.
    pub fn emit(&self, event: &TopologyEvent) {
        let Some(list) = self.handlers.get(&event.topic()) else {
            return;
        };
        for (id, handler) in list {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                log::warn!(
                    "event subscriber {:?} panicked while handling {:?} event",
                    id,
                    event.topic()
                );
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("next_id", &self.next_id)
            .field("topics", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
