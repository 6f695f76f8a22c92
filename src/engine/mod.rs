mod error;
mod mutations;
mod queries;

pub use error::EngineError;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::model::{Booking, BookingEvent, BookingId, EventKind};
use crate::notify::EventSink;
use crate::store::{BookingStore, ScheduleStore};

/// Orchestrates the booking lifecycle: validates requests, runs conflict
/// checks against the store before committing, drives status transitions,
/// and answers availability queries. All collaborators are injected; the
/// engine itself holds no state and is shared freely across tasks.
pub struct Engine {
    pub(super) store: Arc<dyn BookingStore>,
    pub(super) schedule: Arc<dyn ScheduleStore>,
    pub(super) events: Arc<dyn EventSink>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) config: EngineConfig,
}

impl Engine {
    pub fn new(
        store: Arc<dyn BookingStore>,
        schedule: Arc<dyn ScheduleStore>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_config(store, schedule, events, clock, EngineConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn BookingStore>,
        schedule: Arc<dyn ScheduleStore>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            schedule,
            events,
            clock,
            config,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Emit a domain event for a committed mutation. Fire-and-forget: the
    /// sink owns delivery.
    pub(super) fn emit(&self, kind: EventKind, booking: &Booking) {
        self.events.publish(BookingEvent {
            kind,
            booking_id: booking.id,
            user_id: booking.user_id,
            timestamp: self.clock.now(),
            booking: booking.clone(),
        });
    }

    /// Load a booking and enter its resource's critical section, then
    /// re-read so the caller never acts on state observed before the lock.
    pub(super) async fn lock_and_reload(
        &self,
        id: BookingId,
    ) -> Result<(Booking, OwnedMutexGuard<()>), EngineError> {
        let booking = self.store.get(id).await?;
        let guard = self.store.lock_resource(booking.resource_id).await;
        let booking = self.store.get(id).await?;
        Ok((booking, guard))
    }
}
