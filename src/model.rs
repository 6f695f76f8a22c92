use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

// ── Identifiers ──────────────────────────────────────────────────

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub Ulid);

        impl $name {
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(BookingId);
id_type!(ResourceId);
id_type!(UserId);

// ── Time ─────────────────────────────────────────────────────────

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end, "TimeRange start must be before end");
        Self { start, end }
    }

    /// The sole overlap authority: every conflict decision routes through
    /// this. An interval ending exactly when another begins does NOT overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains_instant(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

// ── Bookings ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
    Completed,
}

impl BookingStatus {
    /// The full legal-transition table. Everything not listed here is illegal.
    pub fn can_transition(self, target: BookingStatus) -> bool {
        use BookingStatus::*;
        match self {
            Pending => matches!(target, Confirmed | Canceled),
            Confirmed => matches!(target, Canceled | Completed),
            Canceled | Completed => false,
        }
    }

    /// Whether interval/notes edits are permitted in this status.
    pub fn is_modifiable(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Canceled | BookingStatus::Completed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Canceled => "CANCELED",
            BookingStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

/// A reservation of one resource by one user over a half-open interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub resource_id: ResourceId,
    pub range: TimeRange,
    pub status: BookingStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Currently in progress: confirmed and `now` falls inside the interval.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Confirmed && self.range.contains_instant(now)
    }

    /// Not yet started and still live (pending or confirmed).
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.status.is_modifiable() && now < self.range.start
    }
}

// ── Weekly schedule ──────────────────────────────────────────────

/// A recurring weekly availability window. Times are `HH:MM` strings;
/// malformed values are tolerated in storage and skipped (with a warning)
/// during expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub resource_id: ResourceId,
    /// 0 = Sunday, 1 = Monday, ..., 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub active: bool,
}

/// Input for replacing a resource's weekly template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSlot {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

/// One concrete window derived from the weekly template for a single date.
/// Never persisted; produced fresh per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub booked: bool,
    pub booking_id: Option<BookingId>,
}

// ── Conflicts ────────────────────────────────────────────────────

/// Why a requested interval was rejected: the occupying booking and its
/// interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub booking_id: BookingId,
    pub range: TimeRange,
}

impl From<&Booking> for Conflict {
    fn from(b: &Booking) -> Self {
        Self {
            booking_id: b.id,
            range: b.range,
        }
    }
}

// ── Domain events ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "booking.created")]
    Created,
    #[serde(rename = "booking.updated")]
    Updated,
    #[serde(rename = "booking.confirmed")]
    Confirmed,
    #[serde(rename = "booking.canceled")]
    Canceled,
}

/// Handed to the injected event sink on every successful mutation.
/// Delivery guarantees belong to the sink, not to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingEvent {
    pub kind: EventKind,
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
    pub booking: Booking,
}

// ── Listing ──────────────────────────────────────────────────────

/// Optional filters for listing bookings. All criteria are ANDed.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub user_id: Option<UserId>,
    pub resource_id: Option<ResourceId>,
    pub status: Option<BookingStatus>,
    /// Keep bookings starting at or after this instant.
    pub start_date: Option<DateTime<Utc>>,
    /// Keep bookings ending within this calendar day (inclusive): the cutoff
    /// is midnight UTC at the start of the following day.
    pub end_date: Option<NaiveDate>,
}

/// 1-based pagination. A size of 0 means "use the default".
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: crate::limits::DEFAULT_PAGE_SIZE,
        }
    }
}
