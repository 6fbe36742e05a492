//! Daily-window rules: one start/end time of day on a set of weekdays.
//!
//! A window whose end time is earlier than its start time spans midnight and
//! ends on the calendar day after the matched weekday (a night shift).
//! A window whose start equals its end is a zero-length working day: it only
//! ever yields degenerate intervals.
//!
//! The same type serves both availability (a work week) and exclusion (a
//! lunch break); [`DailyWindowRule::lunch_break`] is just a preset.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::error::BusinessTimeError;
use crate::interval::Interval;
use crate::zone::{resolve_local, Instant};

/// A set of weekdays, stored as a bitmask (Monday = bit 0).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Weekdays(u8);

impl Weekdays {
    pub const MON_FRI: Weekdays = Weekdays(0b0001_1111);
    pub const ALL: Weekdays = Weekdays(0b0111_1111);

    pub const fn empty() -> Self {
        Weekdays(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(|d| self.contains(*d))
    }
}

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Weekdays::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Debug for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A recurring start/end time of day on selected weekdays, in one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyWindowRule {
    zone: Tz,
    start: NaiveTime,
    end: NaiveTime,
    weekdays: Weekdays,
    exclusion: bool,
}

impl DailyWindowRule {
    /// Creates an availability window.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessTimeError::InvalidConfiguration`] if `weekdays` is
    /// empty, since no interval could ever be found.
    pub fn new(
        start: NaiveTime,
        end: NaiveTime,
        weekdays: Weekdays,
        zone: Tz,
    ) -> Result<Self, BusinessTimeError> {
        if weekdays.is_empty() {
            return Err(BusinessTimeError::InvalidConfiguration(
                "daily window needs at least one weekday".to_string(),
            ));
        }
        Ok(Self {
            zone,
            start,
            end,
            weekdays,
            exclusion: false,
        })
    }

    /// Monday through Friday, 09:00 to 18:00.
    pub fn workday(zone: Tz) -> Self {
        Self {
            zone,
            start: hms(9),
            end: hms(18),
            weekdays: Weekdays::MON_FRI,
            exclusion: false,
        }
    }

    /// Monday through Friday, 12:00 to 13:00, as an exclusion.
    pub fn lunch_break(zone: Tz) -> Self {
        Self {
            zone,
            start: hms(12),
            end: hms(13),
            weekdays: Weekdays::MON_FRI,
            exclusion: true,
        }
    }

    /// Turns this window into time that is removed rather than granted.
    pub fn into_exclusion(mut self) -> Self {
        self.exclusion = true;
        self
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end
    }

    pub fn weekdays(&self) -> Weekdays {
        self.weekdays
    }

    pub fn is_exclusion(&self) -> bool {
        self.exclusion
    }

    fn is_overnight(&self) -> bool {
        self.end < self.start
    }

    /// The window opened on `date`, unclamped.
    fn window_on(&self, date: NaiveDate) -> Result<Interval, BusinessTimeError> {
        let start = resolve_local(&self.zone, date, self.start);
        let end_date = if self.is_overnight() {
            succ(date)?
        } else {
            date
        };
        let end = resolve_local(&self.zone, end_date, self.end);
        Ok(Interval::new(start, end))
    }

    /// The first window at or after `anchor`; if `anchor` is inside it, the
    /// interval starts at `anchor`.
    pub fn next(&self, anchor: &Instant) -> Result<Interval, BusinessTimeError> {
        let anchor = anchor.with_timezone(&self.zone);
        let local = anchor.naive_local();
        let mut date = local.date();
        let time = local.time();

        // Still inside last night's shift.
        if self.is_overnight() && time < self.end && self.weekdays.contains(pred(date)?.weekday())
        {
            let tail = self.window_on(pred(date)?)?;
            if tail.start < anchor && anchor < tail.end {
                return Ok(Interval::new(anchor, tail.end));
            }
        }

        if !(self.weekdays.contains(date.weekday()) && time < self.start.max(self.end)) {
            date = self.scan(date, succ)?;
        }

        let window = self.window_on(date)?;
        if window.start < anchor && anchor < window.end {
            return Ok(Interval::new(anchor, window.end));
        }
        Ok(window)
    }

    /// The last window at or before `anchor`; if `anchor` is inside it, the
    /// interval ends at `anchor`.
    pub fn previous(&self, anchor: &Instant) -> Result<Interval, BusinessTimeError> {
        let anchor = anchor.with_timezone(&self.zone);
        let local = anchor.naive_local();
        let mut date = local.date();

        if !(self.weekdays.contains(date.weekday()) && local.time() > self.start) {
            date = self.scan(date, pred)?;
        }

        let window = self.window_on(date)?;
        if window.start < anchor && anchor < window.end {
            return Ok(Interval::new(window.start, anchor));
        }
        Ok(window)
    }

    /// Step away from `from` until a qualifying weekday is reached.
    fn scan(
        &self,
        from: NaiveDate,
        step: fn(NaiveDate) -> Result<NaiveDate, BusinessTimeError>,
    ) -> Result<NaiveDate, BusinessTimeError> {
        let mut date = from;
        for _ in 0..7 {
            date = step(date)?;
            if self.weekdays.contains(date.weekday()) {
                return Ok(date);
            }
        }
        Err(BusinessTimeError::RuleExhausted(format!(
            "no weekday of {:?} within a week of {}",
            self.weekdays, from
        )))
    }
}

fn hms(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

pub(crate) fn succ(date: NaiveDate) -> Result<NaiveDate, BusinessTimeError> {
    date.succ_opt()
        .ok_or_else(|| BusinessTimeError::InvalidDatetime(format!("no day after {}", date)))
}

pub(crate) fn pred(date: NaiveDate) -> Result<NaiveDate, BusinessTimeError> {
    date.pred_opt()
        .ok_or_else(|| BusinessTimeError::InvalidDatetime(format!("no day before {}", date)))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::parse_instant;
    use chrono::TimeZone;

    fn at(s: &str) -> Instant {
        parse_instant(s).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn nine_to_five() -> DailyWindowRule {
        DailyWindowRule::new(t(9, 0), t(17, 0), Weekdays::MON_FRI, Tz::UTC).unwrap()
    }

    fn night_shift() -> DailyWindowRule {
        DailyWindowRule::new(t(23, 0), t(1, 0), Weekdays::MON_FRI, Tz::UTC).unwrap()
    }

    fn iv(start: &str, end: &str) -> Interval {
        Interval::new(at(start), at(end))
    }

    // ── Weekdays ────────────────────────────────────────────────────────

    #[test]
    fn test_weekdays_set() {
        let set: Weekdays = [Weekday::Sat, Weekday::Sun].into_iter().collect();
        assert!(set.contains(Weekday::Sat));
        assert!(!set.contains(Weekday::Mon));
        assert_eq!(set.iter().count(), 2);
        assert_eq!(Weekdays::MON_FRI.iter().count(), 5);
        assert!(Weekdays::empty().is_empty());
    }

    #[test]
    fn test_empty_weekdays_rejected() {
        let err = DailyWindowRule::new(t(9, 0), t(17, 0), Weekdays::empty(), Tz::UTC).unwrap_err();
        assert!(matches!(err, BusinessTimeError::InvalidConfiguration(_)));
    }

    // ── next ────────────────────────────────────────────────────────────

    #[test]
    fn test_next_before_work_day() {
        // Monday 2016-01-25
        let result = nine_to_five().next(&at("2016-01-25T07:00:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-25T09:00:00Z", "2016-01-25T17:00:00Z"));
    }

    #[test]
    fn test_next_during_work_day_clamps_start() {
        let result = nine_to_five().next(&at("2016-01-25T10:30:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-25T10:30:00Z", "2016-01-25T17:00:00Z"));
    }

    #[test]
    fn test_next_at_end_moves_to_next_day() {
        let result = nine_to_five().next(&at("2016-01-25T17:00:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-26T09:00:00Z", "2016-01-26T17:00:00Z"));
    }

    #[test]
    fn test_next_over_weekend() {
        // Saturday 2016-01-23 → Monday
        let result = nine_to_five().next(&at("2016-01-23T13:14:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-25T09:00:00Z", "2016-01-25T17:00:00Z"));
    }

    #[test]
    fn test_next_cross_timezone_anchor() {
        // 08:00 in Los Angeles is 16:00 UTC, one hour before close.
        let anchor = Tz::America__Los_Angeles
            .with_ymd_and_hms(2016, 1, 25, 8, 0, 0)
            .unwrap();
        let result = nine_to_five().next(&anchor).unwrap();
        assert_eq!(result, iv("2016-01-25T16:00:00Z", "2016-01-25T17:00:00Z"));
        assert_eq!(result.start.timezone(), Tz::UTC);
    }

    #[test]
    fn test_next_overnight_before_shift() {
        // Thursday 2016-01-21 10:00 → Thursday 23:00 until Friday 01:00
        let result = night_shift().next(&at("2016-01-21T10:00:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-21T23:00:00Z", "2016-01-22T01:00:00Z"));
    }

    #[test]
    fn test_next_overnight_inside_tail() {
        // Friday 00:30 is still inside Thursday's shift.
        let result = night_shift().next(&at("2016-01-22T00:30:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-22T00:30:00Z", "2016-01-22T01:00:00Z"));
    }

    #[test]
    fn test_next_overnight_tail_after_unqualified_day() {
        // Monday 00:30 follows Sunday, which has no shift.
        let result = night_shift().next(&at("2016-01-25T00:30:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-25T23:00:00Z", "2016-01-26T01:00:00Z"));
    }

    #[test]
    fn test_next_zero_length_window_is_degenerate() {
        let rule = DailyWindowRule::new(t(9, 0), t(9, 0), Weekdays::MON_FRI, Tz::UTC).unwrap();
        let result = rule.next(&at("2016-01-25T07:00:00Z")).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.start, at("2016-01-25T09:00:00Z"));

        let result = rule.next(&at("2016-01-25T09:00:00Z")).unwrap();
        assert_eq!(result.start, at("2016-01-26T09:00:00Z"));
    }

    #[test]
    fn test_next_in_rule_zone() {
        let rule = DailyWindowRule::new(
            t(9, 0),
            t(18, 0),
            Weekdays::MON_FRI,
            Tz::America__Santiago,
        )
        .unwrap();
        // 2016-01-18 09:00 PST = 14:00 Santiago (UTC-3)
        let anchor = Tz::America__Los_Angeles
            .with_ymd_and_hms(2016, 1, 18, 9, 0, 0)
            .unwrap();
        let result = rule.next(&anchor).unwrap();
        assert_eq!(result, iv("2016-01-18T17:00:00Z", "2016-01-18T21:00:00Z"));
    }

    // ── previous ────────────────────────────────────────────────────────

    #[test]
    fn test_previous_during_work_day_clamps_end() {
        let result = nine_to_five().previous(&at("2016-01-25T11:14:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-25T09:00:00Z", "2016-01-25T11:14:00Z"));
    }

    #[test]
    fn test_previous_at_start_moves_to_prior_day() {
        // Monday 09:00 → Friday
        let result = nine_to_five().previous(&at("2016-01-25T09:00:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-22T09:00:00Z", "2016-01-22T17:00:00Z"));
    }

    #[test]
    fn test_previous_after_work_day() {
        let result = nine_to_five().previous(&at("2016-01-22T18:00:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-22T09:00:00Z", "2016-01-22T17:00:00Z"));
    }

    #[test]
    fn test_previous_overnight_inside_shift() {
        let result = night_shift().previous(&at("2016-01-22T00:30:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-21T23:00:00Z", "2016-01-22T00:30:00Z"));
    }

    #[test]
    fn test_previous_overnight_after_shift() {
        let result = night_shift().previous(&at("2016-01-22T10:00:00Z")).unwrap();
        assert_eq!(result, iv("2016-01-21T23:00:00Z", "2016-01-22T01:00:00Z"));
    }

    // ── presets ─────────────────────────────────────────────────────────

    #[test]
    fn test_presets() {
        let work = DailyWindowRule::workday(Tz::UTC);
        assert!(!work.is_exclusion());
        assert_eq!(work.end_time(), t(18, 0));

        let lunch = DailyWindowRule::lunch_break(Tz::UTC);
        assert!(lunch.is_exclusion());
        assert_eq!(lunch.start_time(), t(12, 0));
        assert_eq!(lunch.weekdays(), Weekdays::MON_FRI);

        assert_eq!(
            nine_to_five().into_exclusion(),
            DailyWindowRule::new(t(9, 0), t(17, 0), Weekdays::MON_FRI, Tz::UTC)
                .unwrap()
                .into_exclusion()
        );
        assert_ne!(nine_to_five(), nine_to_five().into_exclusion());
    }
}
