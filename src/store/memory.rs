use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveTime;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::model::{
    Booking, BookingFilter, BookingId, BookingStatus, Page, ResourceId, TimeRange, WeeklySlot,
};

use super::{BookingStore, ScheduleStore, StoreError};

/// In-memory backend. Listings are ordered by interval start (then id) so
/// pagination is stable across calls.
pub struct MemoryStore {
    bookings: DashMap<BookingId, Booking>,
    slots: DashMap<ResourceId, Vec<WeeklySlot>>,
    resource_locks: DashMap<ResourceId, Arc<Mutex<()>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            bookings: DashMap::new(),
            slots: DashMap::new(),
            resource_locks: DashMap::new(),
        }
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    fn matches(booking: &Booking, filter: &BookingFilter) -> bool {
        if let Some(user_id) = filter.user_id
            && booking.user_id != user_id {
                return false;
            }
        if let Some(resource_id) = filter.resource_id
            && booking.resource_id != resource_id {
                return false;
            }
        if let Some(status) = filter.status
            && booking.status != status {
                return false;
            }
        if let Some(start_date) = filter.start_date
            && booking.range.start < start_date {
                return false;
            }
        // End date is inclusive of its calendar day: the cutoff is midnight
        // UTC at the start of the following day.
        if let Some(end_date) = filter.end_date
            && let Some(next_day) = end_date.succ_opt() {
                let cutoff = next_day.and_time(NaiveTime::MIN).and_utc();
                if booking.range.end > cutoff {
                    return false;
                }
            }
        true
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn lock_resource(&self, resource_id: ResourceId) -> OwnedMutexGuard<()> {
        let lock = {
            let entry = self
                .resource_locks
                .entry(resource_id)
                .or_insert_with(|| Arc::new(Mutex::new(())));
            entry.value().clone()
        };
        lock.lock_owned().await
    }

    async fn create(&self, mut booking: Booking) -> Result<Booking, StoreError> {
        booking.id = BookingId::new();
        self.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: BookingId) -> Result<Booking, StoreError> {
        self.bookings
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, booking: &Booking) -> Result<(), StoreError> {
        match self.bookings.get_mut(&booking.id) {
            Some(mut entry) => {
                *entry.value_mut() = booking.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(booking.id)),
        }
    }

    async fn find_conflicting(
        &self,
        resource_id: ResourceId,
        range: TimeRange,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut conflicts: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|entry| {
                let b = entry.value();
                b.resource_id == resource_id
                    && b.status != BookingStatus::Canceled
                    && b.range.overlaps(&range)
            })
            .map(|entry| entry.value().clone())
            .collect();
        conflicts.sort_by_key(|b| (b.range.start, b.id));
        Ok(conflicts)
    }

    async fn list(&self, filter: &BookingFilter, page: Page) -> Result<Vec<Booking>, StoreError> {
        let size = if page.size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page.size.min(MAX_PAGE_SIZE)
        } as usize;
        let number = page.number.max(1) as usize;
        let offset = (number - 1) * size;

        let mut matched: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|entry| Self::matches(entry.value(), filter))
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by_key(|b| (b.range.start, b.id));

        Ok(matched.into_iter().skip(offset).take(size).collect())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn replace_slots(
        &self,
        resource_id: ResourceId,
        slots: Vec<WeeklySlot>,
    ) -> Result<(), StoreError> {
        self.slots.insert(resource_id, slots);
        Ok(())
    }

    async fn slots_for(&self, resource_id: ResourceId) -> Result<Vec<WeeklySlot>, StoreError> {
        Ok(self
            .slots
            .get(&resource_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn ts(day: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, h, 0, 0).unwrap()
    }

    fn booking(resource_id: ResourceId, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            id: BookingId::new(),
            user_id: UserId::new(),
            resource_id,
            range: TimeRange::new(start, end),
            status: BookingStatus::Pending,
            notes: String::new(),
            created_at: start,
            updated_at: start,
            canceled_at: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_fresh_id() {
        let store = MemoryStore::new();
        let rid = ResourceId::new();
        let a = store
            .create(booking(rid, ts(2, 9), ts(2, 10)))
            .await
            .unwrap();
        let b = store
            .create(booking(rid, ts(2, 10), ts(2, 11)))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.get(a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn get_and_update_missing_are_not_found() {
        let store = MemoryStore::new();
        let ghost = booking(ResourceId::new(), ts(2, 9), ts(2, 10));
        assert!(matches!(
            store.get(ghost.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update(&ghost).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn conflicts_respect_half_open_adjacency() {
        let store = MemoryStore::new();
        let rid = ResourceId::new();
        store
            .create(booking(rid, ts(2, 10), ts(2, 11)))
            .await
            .unwrap();

        // [11:00, 12:00) is adjacent to [10:00, 11:00) — no conflict.
        let adjacent = store
            .find_conflicting(rid, TimeRange::new(ts(2, 11), ts(2, 12)))
            .await
            .unwrap();
        assert!(adjacent.is_empty());

        let overlapping = store
            .find_conflicting(rid, TimeRange::new(ts(2, 10), ts(2, 12)))
            .await
            .unwrap();
        assert_eq!(overlapping.len(), 1);
    }

    #[tokio::test]
    async fn canceled_bookings_never_conflict() {
        let store = MemoryStore::new();
        let rid = ResourceId::new();
        let mut b = store
            .create(booking(rid, ts(2, 10), ts(2, 11)))
            .await
            .unwrap();
        b.status = BookingStatus::Canceled;
        store.update(&b).await.unwrap();

        let conflicts = store
            .find_conflicting(rid, TimeRange::new(ts(2, 10), ts(2, 11)))
            .await
            .unwrap();
        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn conflicts_are_scoped_to_the_resource() {
        let store = MemoryStore::new();
        let rid = ResourceId::new();
        let other = ResourceId::new();
        store
            .create(booking(other, ts(2, 10), ts(2, 11)))
            .await
            .unwrap();

        let conflicts = store
            .find_conflicting(rid, TimeRange::new(ts(2, 10), ts(2, 11)))
            .await
            .unwrap();
        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn list_filters_compose() {
        let store = MemoryStore::new();
        let rid = ResourceId::new();
        let user = UserId::new();
        let mut mine = booking(rid, ts(2, 9), ts(2, 10));
        mine.user_id = user;
        mine.status = BookingStatus::Confirmed;
        store.create(mine).await.unwrap();
        store
            .create(booking(rid, ts(2, 10), ts(2, 11)))
            .await
            .unwrap();
        store
            .create(booking(ResourceId::new(), ts(2, 11), ts(2, 12)))
            .await
            .unwrap();

        let filter = BookingFilter {
            user_id: Some(user),
            resource_id: Some(rid),
            status: Some(BookingStatus::Confirmed),
            ..Default::default()
        };
        let got = store.list(&filter, Page::default()).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].user_id, user);
    }

    #[tokio::test]
    async fn list_end_date_is_inclusive_of_its_day() {
        let store = MemoryStore::new();
        let rid = ResourceId::new();
        // Ends 23:00 on June 3 — inside the day.
        store
            .create(booking(rid, ts(3, 22), ts(3, 23)))
            .await
            .unwrap();
        // Ends 01:00 on June 4 — outside.
        store
            .create(booking(rid, ts(3, 23), ts(4, 1)))
            .await
            .unwrap();

        let filter = BookingFilter {
            end_date: Some(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()),
            ..Default::default()
        };
        let got = store.list(&filter, Page::default()).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].range.end, ts(3, 23));
    }

    #[tokio::test]
    async fn list_paginates_with_defaults_and_caps() {
        let store = MemoryStore::new();
        let rid = ResourceId::new();
        for h in 0..25u32 {
            let start = ts(2, 0) + chrono::Duration::minutes(h as i64 * 30);
            store
                .create(booking(rid, start, start + chrono::Duration::minutes(30)))
                .await
                .unwrap();
        }

        // size 0 → default of 20
        let first = store
            .list(&BookingFilter::default(), Page { number: 1, size: 0 })
            .await
            .unwrap();
        assert_eq!(first.len(), 20);

        let second = store
            .list(&BookingFilter::default(), Page { number: 2, size: 0 })
            .await
            .unwrap();
        assert_eq!(second.len(), 5);
        // Stable ordering: page 2 picks up exactly where page 1 stopped.
        assert!(first.last().unwrap().range.start < second[0].range.start);

        // Oversized requests are capped.
        let capped = store
            .list(
                &BookingFilter::default(),
                Page {
                    number: 1,
                    size: 10_000,
                },
            )
            .await
            .unwrap();
        assert_eq!(capped.len(), 25.min(MAX_PAGE_SIZE as usize));

        // Page number 0 is treated as page 1.
        let zeroth = store
            .list(&BookingFilter::default(), Page { number: 0, size: 5 })
            .await
            .unwrap();
        assert_eq!(zeroth, store
            .list(&BookingFilter::default(), Page { number: 1, size: 5 })
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn replace_slots_is_wholesale() {
        let store = MemoryStore::new();
        let rid = ResourceId::new();
        let slot = |dow: u8| WeeklySlot {
            resource_id: rid,
            day_of_week: dow,
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            active: true,
        };

        store
            .replace_slots(rid, vec![slot(1), slot(2)])
            .await
            .unwrap();
        assert_eq!(store.slots_for(rid).await.unwrap().len(), 2);

        // Replacement drops the previous template entirely.
        store.replace_slots(rid, vec![slot(5)]).await.unwrap();
        let remaining = store.slots_for(rid).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].day_of_week, 5);
    }

    #[tokio::test]
    async fn unknown_resource_has_empty_template() {
        let store = MemoryStore::new();
        assert!(store.slots_for(ResourceId::new()).await.unwrap().is_empty());
    }
}
