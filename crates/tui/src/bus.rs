//! Publish/subscribe port connecting the input component to its surroundings.
//!
//! Components never reach for a process-wide event target. They receive a
//! `&mut dyn EventPort` on every call, register the topics they care about
//! through it and publish their outbound events into it. The host drains
//! the [`EventBus`] and delivers each event to the interested parties, in
//! the order the events were emitted.

use std::collections::VecDeque;

use chatform_types::{FlowEvent, Topic};
use indexmap::IndexMap;
use tracing::debug;

/// Handle returned by [`EventPort::on`], used to release the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Abstract "on"/"off"/"emit" capability.
pub trait EventPort {
    /// Registers interest in `topic`.
    fn on(&mut self, topic: Topic) -> SubscriptionId;
    /// Releases a subscription. Unknown ids are ignored.
    fn off(&mut self, subscription: SubscriptionId);
    /// Publishes an event.
    fn emit(&mut self, event: FlowEvent);
}

/// Single-threaded FIFO bus with a subscription table.
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: IndexMap<SubscriptionId, Topic>,
    queue: VecDeque<FlowEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops the oldest pending event.
    pub fn next_event(&mut self) -> Option<FlowEvent> {
        self.queue.pop_front()
    }

    /// Removes and returns all pending events.
    pub fn drain(&mut self) -> Vec<FlowEvent> {
        self.queue.drain(..).collect()
    }

    /// Pending events, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &FlowEvent> {
        self.queue.iter()
    }

    /// Whether any live subscription exists for `topic`.
    pub fn is_listening(&self, topic: Topic) -> bool {
        self.subscriptions.values().any(|t| *t == topic)
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl EventPort for EventBus {
    fn on(&mut self, topic: Topic) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.insert(id, topic);
        id
    }

    fn off(&mut self, subscription: SubscriptionId) {
        self.subscriptions.shift_remove(&subscription);
    }

    fn emit(&mut self, event: FlowEvent) {
        debug!(topic = %event.topic(), "bus: emit");
        self.queue.push_back(event);
    }
}
