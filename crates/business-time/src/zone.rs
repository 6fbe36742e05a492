//! Zone handling: instants, local wall-clock resolution and input parsing.
//!
//! Every instant that enters a rule is a [`DateTime<Tz>`]. Comparisons happen
//! on the absolute timeline; the attached zone is only used to decompose an
//! instant into a local date and time of day.
//!
//! # DST policy
//!
//! Turning a local date and time back into an instant is not always unique:
//!
//! - **Ambiguous** ("fall back", the wall clock repeats) → the earlier instant.
//! - **Nonexistent** ("spring forward", the wall clock skips) → the wall-clock
//!   time read with the offset in force before the gap, which lands the same
//!   distance past the transition (02:30 in a 02:00→03:00 gap becomes 03:30).

use chrono::{
    DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Weekday,
};
use chrono_tz::Tz;

use crate::error::BusinessTimeError;

/// A zone-aware point in time.
pub type Instant = DateTime<Tz>;

/// Resolve a local date and time of day in `zone` to an instant.
///
/// Never fails: ambiguous and skipped wall-clock times are resolved by the
/// module-level DST policy.
pub fn resolve_local(zone: &Tz, date: NaiveDate, time: NaiveTime) -> Instant {
    let naive = date.and_time(time);
    if let Some(dt) = zone.from_local_datetime(&naive).earliest() {
        return dt;
    }

    // Gap: read the wall clock with the offset from before the transition.
    // Transitions are at least a day apart, so a day earlier is safely "before".
    let probe = naive - TimeDelta::days(1);
    let before = zone.offset_from_utc_datetime(&probe).fix().local_minus_utc();
    let utc = naive - TimeDelta::seconds(i64::from(before));
    zone.from_utc_datetime(&utc)
}

/// Normalize any chrono datetime into an [`Instant`] carried in UTC.
pub fn to_instant<T: TimeZone>(dt: &DateTime<T>) -> Instant {
    dt.with_timezone(&Tz::UTC)
}

/// Treat an unzoned datetime as UTC.
pub fn from_naive_utc(naive: NaiveDateTime) -> Instant {
    Tz::UTC.from_utc_datetime(&naive)
}

/// Parse an RFC 3339 datetime, or an ISO 8601 datetime without offset (read as UTC).
pub fn parse_instant(s: &str) -> Result<Instant, BusinessTimeError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(to_instant(&dt));
    }
    s.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map(from_naive_utc)
        .map_err(|e| BusinessTimeError::InvalidDatetime(format!("'{}': {}", s, e)))
}

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz, BusinessTimeError> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| BusinessTimeError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Result<NaiveDate, BusinessTimeError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| BusinessTimeError::InvalidDatetime(format!("'{}': {}", s, e)))
}

/// Parse a time of day: "14:00", "14:30:00", "2pm", "2:30pm".
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, BusinessTimeError> {
    parse_time_string(s)
        .ok_or_else(|| BusinessTimeError::InvalidDatetime(format!("'{}': not a time of day", s)))
}

/// Parse a weekday name or abbreviation, case-insensitively.
pub fn parse_weekday(s: &str) -> Result<Weekday, BusinessTimeError> {
    let weekday = match s.trim().to_lowercase().as_str() {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => {
            return Err(BusinessTimeError::InvalidConfiguration(format!(
                "unknown weekday '{}'",
                s
            )))
        }
    };
    Ok(weekday)
}

fn parse_time_string(s: &str) -> Option<NaiveTime> {
    let s = s.trim().to_lowercase();

    // 24-hour format: "14:00", "14:30", "14:30:00"
    if let Ok(t) = NaiveTime::parse_from_str(&s, "%H:%M:%S") {
        return Some(t);
    }
    if let Ok(t) = NaiveTime::parse_from_str(&s, "%H:%M") {
        return Some(t);
    }

    // 12-hour format: "2pm", "2:30pm", "2 pm"
    let s_no_space = s.replace(' ', "");
    let (time_part, is_pm) = if let Some(t) = s_no_space.strip_suffix("pm") {
        (t, true)
    } else if let Some(t) = s_no_space.strip_suffix("am") {
        (t, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = time_part.split(':').collect();
    let hour: u32 = parts.first()?.parse().ok()?;
    let minute: u32 = match parts.get(1) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if hour == 0 || hour > 12 {
        return None;
    }

    let hour24 = match (hour, is_pm) {
        (12, true) => 12,
        (12, false) => 0,
        (h, true) => h + 12,
        (h, false) => h,
    };

    NaiveTime::from_hms_opt(hour24, minute, 0)
}

// ── Tests ───────────────────────────────────────────────────────────────────
