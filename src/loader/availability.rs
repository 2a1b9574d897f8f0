//! Synthetic availability schedules

use crate::models::AvailabilityInterval;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use rand::Rng;

/// Most intervals generated for one property
pub const MAX_INTERVALS: usize = 50;

/// Day offsets are drawn from `0..MAX_OFFSET_DAYS`
pub const MAX_OFFSET_DAYS: i64 = 30;

/// Durations are drawn from `0..MAX_DURATION_HOURS` whole hours
pub const MAX_DURATION_HOURS: i64 = 8;

/// Generate 1..=50 strictly increasing, non-overlapping windows starting after `start`.
///
/// Each step advances the cursor by a random number of days, snaps to a random
/// whole hour and adds a random duration. The next window always begins after
/// the previous one ends.
pub fn generate_availability<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
) -> Vec<AvailabilityInterval> {
    let count = rng.gen_range(1..=MAX_INTERVALS);

    let (intervals, _) = (0..count).fold(
        (Vec::with_capacity(count), start),
        |(mut intervals, cursor), _| {
            let (begin, end) = next_window(rng, cursor);
            intervals.push(AvailabilityInterval::new(begin.timestamp(), end.timestamp()));
            (intervals, end)
        },
    );

    intervals
}

fn next_window<R: Rng + ?Sized>(
    rng: &mut R,
    cursor: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = cursor.date_naive() + Duration::days(rng.gen_range(0..MAX_OFFSET_DAYS));
    let hour = NaiveTime::from_hms_opt(rng.gen_range(0..24), 0, 0).unwrap_or(NaiveTime::MIN);

    let mut begin = day.and_time(hour).and_utc();
    // Snapping the hour can land at or before the cursor on the same day
    if begin <= cursor {
        begin += Duration::days(1);
    }

    let end = begin + Duration::hours(rng.gen_range(0..MAX_DURATION_HOURS));
    (begin, end)
}
