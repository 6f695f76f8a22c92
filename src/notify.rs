use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::{BookingEvent, ResourceId};

const CHANNEL_CAPACITY: usize = 256;

/// Where successful mutations hand off their domain event. Publishing is
/// fire-and-forget: the engine's responsibility ends here.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: BookingEvent);
}

/// Broadcast hub with one channel per resource.
pub struct BroadcastHub {
    channels: DashMap<ResourceId, broadcast::Sender<BookingEvent>>,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to events for a resource. Creates the channel if needed.
    pub fn subscribe(&self, resource_id: ResourceId) -> broadcast::Receiver<BookingEvent> {
        let sender = self
            .channels
            .entry(resource_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Remove a channel (e.g. when a resource is retired).
    pub fn remove(&self, resource_id: &ResourceId) {
        self.channels.remove(resource_id);
    }
}

impl EventSink for BroadcastHub {
    /// No-op if nobody is listening.
    fn publish(&self, event: BookingEvent) {
        if let Some(sender) = self.channels.get(&event.booking.resource_id) {
            let _ = sender.send(event);
        }
    }
}

/// Discards everything. Useful when the caller has no event consumers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: BookingEvent) {}
}
