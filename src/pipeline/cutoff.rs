//! Weekly reporting-window cutoff.
//!
//! A week's data closes the following Sunday morning. The cutoff is 11:00
//! UTC on the Sunday on/after the game's date — a fixed approximation of
//! 06:00 US-Eastern that ignores daylight saving, so it is off by an hour
//! for part of the season. Preserved as-is; the tests pin the approximation.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// Hour (UTC) at which a reporting week closes.
pub const CUTOFF_HOUR_UTC: u32 = 11;

/// The cutoff instant for the week containing `game_start`: 11:00 UTC on the
/// Sunday on/after the game's UTC date.
pub fn weekly_cutoff(game_start: DateTime<Utc>) -> DateTime<Utc> {
    // num_days_from_monday: Monday = 0 .. Sunday = 6.
    let days_to_sunday = (6 - game_start.weekday().num_days_from_monday()) % 7;
    let sunday = (game_start + Duration::days(i64::from(days_to_sunday))).date_naive();
    let cutoff_time = NaiveTime::from_hms_opt(CUTOFF_HOUR_UTC, 0, 0).expect("valid cutoff time");
    sunday.and_time(cutoff_time).and_utc()
}

/// Inclusion test against a known cutoff. A play with no timestamp is always
/// included — missing metadata must not silently drop valid data. A
/// timestamped play is excluded only when strictly after the cutoff.
pub fn include_play(game_start: Option<DateTime<Utc>>, cutoff: DateTime<Utc>) -> bool {
    match game_start {
        None => true,
        Some(ts) => ts <= cutoff,
    }
}

/// Combined check used by the pipeline: derive the cutoff from the play's
/// own timestamp and test against it. Sunday games after 11:00 UTC fall past
/// their own week's close and are excluded.
pub fn passes_weekly_cutoff(game_start: Option<DateTime<Utc>>) -> bool {
    match game_start {
        None => true,
        Some(ts) => ts <= weekly_cutoff(ts),
    }
}
