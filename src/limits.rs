//! Hard limits and defaults shared across the crate.

/// Maximum length of a booking's free-text notes field.
pub const MAX_NOTES_LEN: usize = 500;

/// Page size used when a listing request leaves the size unset (0).
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on a single listing page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Widest date range (inclusive, in days) an availability expansion accepts.
/// Roughly one quarter.
pub const MAX_EXPANSION_DAYS: i64 = 93;

/// How far ahead the upcoming-bookings convenience query looks, and how many
/// bookings it returns at most.
pub const UPCOMING_LIMIT: u32 = 50;

/// Default cadence of the completion sweep.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
