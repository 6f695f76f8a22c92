use chrono::{DateTime, Utc};
use tracing::info;

use crate::limits::MAX_NOTES_LEN;
use crate::model::{
    Booking, BookingId, BookingStatus, Conflict, EventKind, NewSlot, ResourceId, TimeRange,
    UserId, WeeklySlot,
};
use crate::observability;

use super::{Engine, EngineError};

impl Engine {
    /// Create a booking in Pending status. Fails with `ResourceUnavailable`
    /// (carrying the conflicts) if the interval collides with any
    /// non-canceled booking on the resource; nothing is written on failure.
    pub async fn create_booking(
        &self,
        user_id: UserId,
        resource_id: ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        notes: String,
    ) -> Result<Booking, EngineError> {
        let now = self.clock.now();
        if start >= end {
            return Err(EngineError::InvalidInterval("end must be after start"));
        }
        if start < now {
            return Err(EngineError::InvalidInterval("start is in the past"));
        }
        if notes.len() > MAX_NOTES_LEN {
            return Err(EngineError::NotesTooLong(notes.len()));
        }
        let range = TimeRange::new(start, end);

        // Conflict scan and insert form one critical section per resource;
        // see the store contract.
        let _guard = self.store.lock_resource(resource_id).await;
        let conflicts = self.store.find_conflicting(resource_id, range).await?;
        if !conflicts.is_empty() {
            metrics::counter!(observability::CONFLICTS_REJECTED_TOTAL).increment(1);
            return Err(EngineError::ResourceUnavailable(
                conflicts.iter().map(Conflict::from).collect(),
            ));
        }

        let booking = self
            .store
            .create(Booking {
                id: BookingId::new(),
                user_id,
                resource_id,
                range,
                status: BookingStatus::Pending,
                notes,
                created_at: now,
                updated_at: now,
                canceled_at: None,
            })
            .await?;
        drop(_guard);

        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        info!(booking = %booking.id, resource = %resource_id, "booking created");
        self.emit(EventKind::Created, &booking);
        Ok(booking)
    }

    /// Change a booking's interval and/or notes. When the interval changes,
    /// conflict detection re-runs against the new interval with the booking
    /// itself excluded (a booking never conflicts with itself).
    pub async fn reschedule(
        &self,
        id: BookingId,
        new_start: Option<DateTime<Utc>>,
        new_end: Option<DateTime<Utc>>,
        new_notes: Option<String>,
    ) -> Result<Booking, EngineError> {
        if let Some(ref notes) = new_notes
            && notes.len() > MAX_NOTES_LEN {
                return Err(EngineError::NotesTooLong(notes.len()));
            }

        let (mut booking, _guard) = self.lock_and_reload(id).await?;
        if !booking.status.is_modifiable() {
            return Err(EngineError::BookingNotModifiable(booking.status));
        }

        if new_start.is_some() || new_end.is_some() {
            let start = new_start.unwrap_or(booking.range.start);
            let end = new_end.unwrap_or(booking.range.end);
            if start >= end {
                return Err(EngineError::InvalidInterval("end must be after start"));
            }
            let range = TimeRange::new(start, end);

            let mut conflicts = self
                .store
                .find_conflicting(booking.resource_id, range)
                .await?;
            conflicts.retain(|b| b.id != booking.id);
            if !conflicts.is_empty() {
                metrics::counter!(observability::CONFLICTS_REJECTED_TOTAL).increment(1);
                return Err(EngineError::ResourceUnavailable(
                    conflicts.iter().map(Conflict::from).collect(),
                ));
            }
            booking.range = range;
        }

        if let Some(notes) = new_notes {
            booking.notes = notes;
        }
        booking.updated_at = self.clock.now();
        self.store.update(&booking).await?;

        info!(booking = %booking.id, "booking rescheduled");
        self.emit(EventKind::Updated, &booking);
        Ok(booking)
    }

    /// Pending → Confirmed.
    pub async fn confirm(&self, id: BookingId) -> Result<Booking, EngineError> {
        let (mut booking, _guard) = self.lock_and_reload(id).await?;
        if !booking.status.can_transition(BookingStatus::Confirmed) {
            return Err(EngineError::InvalidStateTransition {
                from: booking.status,
                to: BookingStatus::Confirmed,
            });
        }
        booking.status = BookingStatus::Confirmed;
        booking.updated_at = self.clock.now();
        self.store.update(&booking).await?;

        metrics::counter!(observability::BOOKINGS_CONFIRMED_TOTAL).increment(1);
        info!(booking = %booking.id, "booking confirmed");
        self.emit(EventKind::Confirmed, &booking);
        Ok(booking)
    }

    /// Pending/Confirmed → Canceled. A second cancel fails with
    /// `InvalidStateTransition` rather than succeeding silently.
    pub async fn cancel(&self, id: BookingId) -> Result<(), EngineError> {
        let (mut booking, _guard) = self.lock_and_reload(id).await?;
        if !booking.status.can_transition(BookingStatus::Canceled) {
            return Err(EngineError::InvalidStateTransition {
                from: booking.status,
                to: BookingStatus::Canceled,
            });
        }
        let now = self.clock.now();
        booking.status = BookingStatus::Canceled;
        booking.canceled_at = Some(now);
        booking.updated_at = now;
        self.store.update(&booking).await?;

        metrics::counter!(observability::BOOKINGS_CANCELED_TOTAL).increment(1);
        info!(booking = %booking.id, "booking canceled");
        self.emit(EventKind::Canceled, &booking);
        Ok(())
    }

    /// Confirmed → Completed, once the interval has fully elapsed. Driven by
    /// the completion sweep rather than by the engine itself; emits no event
    /// (the event set covers created/updated/confirmed/canceled only).
    pub async fn complete(&self, id: BookingId) -> Result<(), EngineError> {
        let (mut booking, _guard) = self.lock_and_reload(id).await?;
        if !booking.status.can_transition(BookingStatus::Completed) {
            return Err(EngineError::InvalidStateTransition {
                from: booking.status,
                to: BookingStatus::Completed,
            });
        }
        booking.status = BookingStatus::Completed;
        booking.updated_at = self.clock.now();
        self.store.update(&booking).await?;

        metrics::counter!(observability::BOOKINGS_COMPLETED_TOTAL).increment(1);
        info!(booking = %booking.id, "booking completed");
        Ok(())
    }

    /// Replace a resource's weekly availability template wholesale.
    pub async fn replace_weekly_slots(
        &self,
        resource_id: ResourceId,
        slots: Vec<NewSlot>,
    ) -> Result<(), EngineError> {
        if slots.iter().any(|s| s.day_of_week > 6) {
            return Err(EngineError::InvalidSlot("day_of_week must be 0-6"));
        }
        let slots = slots
            .into_iter()
            .map(|s| WeeklySlot {
                resource_id,
                day_of_week: s.day_of_week,
                start_time: s.start_time,
                end_time: s.end_time,
                active: true,
            })
            .collect();
        self.schedule.replace_slots(resource_id, slots).await?;
        info!(resource = %resource_id, "weekly template replaced");
        Ok(())
    }
}
