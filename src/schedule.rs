/// Feeding-schedule validation.
///
/// The automated feeder runs at operator-configured wall-clock times. Two
/// events placed too close together would double-dose the pond, so every
/// create or edit is checked against the existing set for a minimum physical
/// spacing, measured on a circular 24-hour clock (23:59 and 00:02 are three
/// minutes apart, not 1437). The number of schedules is further capped by the
/// active life stage's recommended session count.
///
/// All checks here are pure predicates over in-memory data. The backend
/// adapter (`ingest::rtdb`) owns the read and write; it is responsible for
/// surfacing a user-facing rejection and logging the blocked write when a
/// check fails.

use crate::model::EvalError;

/// Minutes on the circular schedule clock.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Default minimum spacing between two automated feed events.
pub const DEFAULT_MIN_SEPARATION_MINUTES: u16 = 5;

/// A configured feeding event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSchedule {
    /// Backend entry key, e.g. "timer0". Opaque to the checker.
    pub id: String,
    /// Time of day in minutes since midnight, 0..=1439.
    pub minutes: u16,
}

// ---------------------------------------------------------------------------
// Wall-clock parsing
// ---------------------------------------------------------------------------

/// Parses a backend wall-clock string ("HH:MM", as written by the dashboard's
/// time picker) into minutes since midnight.
pub fn parse_time_of_day(s: &str) -> Result<u16, EvalError> {
    let invalid = || EvalError::InvalidArgument(format!("malformed time of day '{}'", s));

    let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
    let hours: u16 = hours.parse().map_err(|_| invalid())?;
    let minutes: u16 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight back into the backend's "HH:MM" form.
pub fn format_time_of_day(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

// ---------------------------------------------------------------------------
// Conflict checking
// ---------------------------------------------------------------------------

/// Distance between two times of day on the circular 24-hour clock.
pub fn circular_distance(a: u16, b: u16) -> u16 {
    let d = a.abs_diff(b);
    d.min(MINUTES_PER_DAY - d)
}

/// Checks a candidate time against the existing schedule set.
///
/// Returns the first existing entry (in insertion order) whose circular
/// distance to the candidate is strictly less than `min_separation`, or
/// `None` when the candidate is acceptable. When editing an entry in place,
/// pass its id as `exclude_id` so it cannot conflict with itself.
///
/// A candidate outside 0..=1439 is a contract violation, not a conflict.
pub fn find_conflict<'a>(
    candidate: u16,
    existing: &'a [FeedSchedule],
    exclude_id: Option<&str>,
    min_separation: u16,
) -> Result<Option<&'a FeedSchedule>, EvalError> {
    if candidate >= MINUTES_PER_DAY {
        return Err(EvalError::InvalidArgument(format!(
            "time of day {} outside 0..={}",
            candidate,
            MINUTES_PER_DAY - 1
        )));
    }

    Ok(existing
        .iter()
        .filter(|entry| exclude_id != Some(entry.id.as_str()))
        .find(|entry| circular_distance(candidate, entry.minutes) < min_separation))
}

/// Whether another schedule may be added under the stage's session cap.
pub fn can_add_schedule(current_count: usize, cap: usize) -> bool {
    current_count < cap
}

/// Capacity check as a typed failure, for callers that propagate errors.
pub fn ensure_capacity(current_count: usize, cap: usize) -> Result<(), EvalError> {
    if can_add_schedule(current_count, cap) {
        Ok(())
    } else {
        Err(EvalError::CapacityExceeded {
            count: current_count,
            cap,
        })
    }
}

// ---------------------------------------------------------------------------
// Entry id allocation
// ---------------------------------------------------------------------------

/// Allocates the next backend entry key.
///
/// Entries are keyed "timer0", "timer1", ... and deletes leave holes; the
/// dashboard has always reused the first free index, so the device firmware
/// expects ids to stay dense. Keys not matching the pattern are ignored.
pub fn next_timer_id<'a, I>(existing_ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<u32> = existing_ids
        .into_iter()
        .filter_map(|id| id.strip_prefix("timer"))
        .filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|rest| rest.parse().ok())
        .collect();

    let mut index = 0;
    while taken.contains(&index) {
        index += 1;
    }
    format!("timer{}", index)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
