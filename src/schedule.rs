//! Expansion of weekly recurring availability templates into concrete
//! per-date windows.

use chrono::{Datelike, NaiveDate, NaiveTime};
use tracing::warn;

use crate::model::{TimeRange, WeeklySlot};

/// Expand `slots` over every calendar date in `[from, to]` inclusive.
///
/// For each date, every active slot whose day-of-week matches the date's
/// weekday yields one `(date, window)` pair; the window combines the date
/// with the slot's time-of-day bounds in UTC. Output is lazy, in date-major
/// order with slots in their given order. A slot with a malformed `HH:MM`
/// time (or an inverted pair) is skipped and reported as a data-integrity
/// warning rather than failing the whole expansion.
///
/// The range is finite by construction; callers bound its width (see
/// [`crate::limits::MAX_EXPANSION_DAYS`]).
pub fn expand_slots(
    slots: &[WeeklySlot],
    from: NaiveDate,
    to: NaiveDate,
) -> impl Iterator<Item = (NaiveDate, TimeRange)> + '_ {
    from.iter_days()
        .take_while(move |date| *date <= to)
        .flat_map(move |date| {
            let weekday = date.weekday().num_days_from_sunday() as u8;
            slots
                .iter()
                .filter(move |slot| slot.active && slot.day_of_week == weekday)
                .filter_map(move |slot| Some((date, slot_window(slot, date)?)))
        })
}

/// Combine one slot's time-of-day bounds with a concrete date.
/// Returns `None` (after warning) when the slot's stored times are unusable.
fn slot_window(slot: &WeeklySlot, date: NaiveDate) -> Option<TimeRange> {
    let start = parse_slot_time(slot, &slot.start_time)?;
    let end = parse_slot_time(slot, &slot.end_time)?;
    if start >= end {
        warn!(
            resource = %slot.resource_id,
            start = %slot.start_time,
            end = %slot.end_time,
            "skipping weekly slot with inverted time bounds"
        );
        return None;
    }
    Some(TimeRange::new(
        date.and_time(start).and_utc(),
        date.and_time(end).and_utc(),
    ))
}

fn parse_slot_time(slot: &WeeklySlot, value: &str) -> Option<NaiveTime> {
    match NaiveTime::parse_from_str(value, "%H:%M") {
        Ok(t) => Some(t),
        Err(e) => {
            warn!(
                resource = %slot.resource_id,
                value,
                error = %e,
                "skipping weekly slot with malformed time"
            );
            None
        }
    }
}
