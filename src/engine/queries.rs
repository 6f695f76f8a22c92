use chrono::{DateTime, Months, NaiveDate, Utc};

use crate::limits::UPCOMING_LIMIT;
use crate::model::{
    AvailabilityWindow, Booking, BookingFilter, BookingId, BookingStatus, Conflict, Page,
    ResourceId, TimeRange, UserId,
};
use crate::observability;
use crate::schedule::expand_slots;

use super::{Engine, EngineError};

impl Engine {
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, EngineError> {
        Ok(self.store.get(id).await?)
    }

    /// Filtered, paginated listing. Pagination defaults and caps are applied
    /// by the store.
    pub async fn list_bookings(
        &self,
        filter: &BookingFilter,
        page: Page,
    ) -> Result<Vec<Booking>, EngineError> {
        Ok(self.store.list(filter, page).await?)
    }

    /// Pure read: is the interval free on this resource, and if not, which
    /// bookings occupy it?
    pub async fn check_availability(
        &self,
        resource_id: ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(bool, Vec<Conflict>), EngineError> {
        if start >= end {
            return Err(EngineError::InvalidInterval("end must be after start"));
        }
        let conflicts: Vec<Conflict> = self
            .store
            .find_conflicting(resource_id, TimeRange::new(start, end))
            .await?
            .iter()
            .map(Conflict::from)
            .collect();
        Ok((conflicts.is_empty(), conflicts))
    }

    /// Expand the resource's weekly template over `[from, to]` and mark each
    /// window booked if any non-canceled booking overlaps it. Windows are
    /// whole-slot granularity: an overlapped window is returned once, booked,
    /// with the first occupying booking's id — it is never split.
    pub async fn resource_availability(
        &self,
        resource_id: ResourceId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AvailabilityWindow>, EngineError> {
        if to < from {
            return Err(EngineError::InvalidInterval("end date before start date"));
        }
        let days = (to - from).num_days() + 1;
        if days > self.config.max_expansion_days {
            return Err(EngineError::InvalidInterval("date range too wide"));
        }

        let started = std::time::Instant::now();
        let slots = self.schedule.slots_for(resource_id).await?;
        let mut windows = Vec::new();
        for (date, range) in expand_slots(&slots, from, to) {
            let occupant = self
                .store
                .find_conflicting(resource_id, range)
                .await?
                .into_iter()
                .next();
            windows.push(AvailabilityWindow {
                resource_id,
                date,
                range,
                booked: occupant.is_some(),
                booking_id: occupant.map(|b| b.id),
            });
        }
        metrics::histogram!(observability::AVAILABILITY_QUERY_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        Ok(windows)
    }

    /// A user's confirmed bookings starting within the next month.
    pub async fn upcoming_bookings(&self, user_id: UserId) -> Result<Vec<Booking>, EngineError> {
        let now = self.clock.now();
        let horizon = now.checked_add_months(Months::new(1)).unwrap_or(now);
        let filter = BookingFilter {
            user_id: Some(user_id),
            status: Some(BookingStatus::Confirmed),
            start_date: Some(now),
            end_date: Some(horizon.date_naive()),
            ..Default::default()
        };
        Ok(self
            .store
            .list(
                &filter,
                Page {
                    number: 1,
                    size: UPCOMING_LIMIT,
                },
            )
            .await?)
    }

    /// Confirmed bookings whose interval has fully elapsed as of `now` —
    /// the completion sweep's work list. Pages through the store so the
    /// result is not clipped by the listing cap.
    pub async fn collect_elapsed(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<BookingId>, EngineError> {
        let filter = BookingFilter {
            status: Some(BookingStatus::Confirmed),
            ..Default::default()
        };
        let mut elapsed = Vec::new();
        let mut page = Page {
            number: 1,
            size: crate::limits::MAX_PAGE_SIZE,
        };
        loop {
            let batch = self.store.list(&filter, page).await?;
            let done = (batch.len() as u32) < page.size;
            elapsed.extend(
                batch
                    .into_iter()
                    .filter(|b| b.range.end <= now)
                    .map(|b| b.id),
            );
            if done {
                break;
            }
            page.number += 1;
        }
        Ok(elapsed)
    }
}
