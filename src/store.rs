//! Storage contracts. The engine owns no data; it talks to these traits,
//! which any backend (in-memory, relational, ...) can implement.

pub mod memory;

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::model::{
    Booking, BookingFilter, BookingId, Page, ResourceId, TimeRange, WeeklySlot,
};

pub use memory::MemoryStore;

#[derive(Debug)]
pub enum StoreError {
    NotFound(BookingId),
    /// Backend I/O failure, surfaced verbatim. Never retried here.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "booking not found: {id}"),
            StoreError::Backend(e) => write!(f, "backend error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Canonical booking records live behind this trait.
///
/// Concurrency contract: [`lock_resource`](BookingStore::lock_resource)
/// returns the per-resource critical section. Callers hold the guard across
/// a [`find_conflicting`](BookingStore::find_conflicting) scan and the
/// following `create`/`update` so that two concurrent writers on the same
/// resource cannot both observe zero conflicts and both commit. Plain reads
/// need no guard and may run concurrently.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Acquire the exclusive critical section for one resource. At most one
    /// guard is held per operation, so no lock ordering is needed. A
    /// transactional backend would instead map the guarded sequence onto a
    /// serializable transaction.
    async fn lock_resource(&self, resource_id: ResourceId) -> OwnedMutexGuard<()>;

    /// Persist a new booking. The store assigns the id; the stored record is
    /// returned.
    async fn create(&self, booking: Booking) -> Result<Booking, StoreError>;

    async fn get(&self, id: BookingId) -> Result<Booking, StoreError>;

    /// Full replace. `NotFound` if the id is absent.
    async fn update(&self, booking: &Booking) -> Result<(), StoreError>;

    /// All bookings on `resource_id` whose status is not Canceled and whose
    /// interval overlaps `range` (half-open semantics).
    async fn find_conflicting(
        &self,
        resource_id: ResourceId,
        range: TimeRange,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Filtered, paginated listing. 1-based pages; a size of 0 falls back to
    /// the default and sizes are capped (see [`crate::limits`]).
    async fn list(&self, filter: &BookingFilter, page: Page) -> Result<Vec<Booking>, StoreError>;
}

/// Weekly availability templates, replaced wholesale per resource.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Clear-and-replace: drops the resource's previous template entirely.
    async fn replace_slots(
        &self,
        resource_id: ResourceId,
        slots: Vec<WeeklySlot>,
    ) -> Result<(), StoreError>;

    async fn slots_for(&self, resource_id: ResourceId) -> Result<Vec<WeeklySlot>, StoreError>;
}
