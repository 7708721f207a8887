use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Timezone used to decide which civil year a booking belongs to.
/// Yearly thresholds reset on the UTC new year of the booking timestamp;
/// `ResolutionOptions::timezone` can move that boundary to a local zone.
pub const DEFAULT_CIVIL_TZ: Tz = chrono_tz::UTC;

/// Converts a UTC instant to a civil date in the given timezone.
pub fn civil_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Civil year of an instant in the given timezone.
pub fn civil_year_from_utc(instant: DateTime<Utc>, tz: Tz) -> i32 {
    civil_date_from_utc(instant, tz).year()
}

/// Adds whole years to a date, clamping Feb 29 to Feb 28 on non leap years.
pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    let target_year = date.year() + years;
    date.with_year(target_year)
        .or_else(|| NaiveDate::from_ymd_opt(target_year, date.month(), 28))
        .unwrap_or(date)
}
