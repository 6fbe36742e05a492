//! Calendar-exclusion rules: whole local days removed by date membership.
//!
//! Membership comes from a [`Holidays`] source, either an explicit set of
//! dates or any [`HolidayCalendar`] implementation. Because an arbitrary
//! calendar can only be probed one date at a time, the search is a bounded
//! day-by-day scan; running past the bound is a [`BusinessTimeError::RuleExhausted`].

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::daily::{pred, succ};
use crate::error::BusinessTimeError;
use crate::interval::Interval;
use crate::zone::{resolve_local, Instant};

/// Default scan bound, in days, for finding the next or previous holiday.
pub const MAX_SCAN_DAYS: u32 = 365 * 5;

/// An external source answering "is this date a holiday?".
pub trait HolidayCalendar: Send + Sync + fmt::Debug {
    fn is_holiday(&self, date: NaiveDate) -> bool;

    /// Stable identity of this calendar's configuration; two calendars with
    /// the same id are considered equal.
    fn calendar_id(&self) -> Cow<'_, str>;
}

/// Holidays falling on the same month and day every year (e.g. Dec 25).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnualHolidays {
    days: BTreeSet<(u32, u32)>,
}

impl AnnualHolidays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a month/day pair.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessTimeError::InvalidConfiguration`] for a pair that
    /// never exists (Feb 29 is accepted and only matches leap years).
    pub fn with_day(mut self, month: u32, day: u32) -> Result<Self, BusinessTimeError> {
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(BusinessTimeError::InvalidConfiguration(format!(
                "no such annual date {:02}-{:02}",
                month, day
            )));
        }
        self.days.insert((month, day));
        Ok(self)
    }
}

impl HolidayCalendar for AnnualHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.days.contains(&(date.month(), date.day()))
    }

    fn calendar_id(&self) -> Cow<'_, str> {
        let days: Vec<String> = self
            .days
            .iter()
            .map(|(m, d)| format!("{:02}-{:02}", m, d))
            .collect();
        Cow::Owned(format!("annual:{}", days.join(",")))
    }
}

/// Where holiday membership comes from.
#[derive(Debug, Clone)]
pub enum Holidays {
    Dates(Arc<BTreeSet<NaiveDate>>),
    Calendar(Arc<dyn HolidayCalendar>),
}

impl Holidays {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Holidays::Dates(dates) => dates.contains(&date),
            Holidays::Calendar(calendar) => calendar.is_holiday(date),
        }
    }
}

impl PartialEq for Holidays {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Holidays::Dates(a), Holidays::Dates(b)) => a == b,
            (Holidays::Calendar(a), Holidays::Calendar(b)) => {
                Arc::ptr_eq(a, b) || a.calendar_id() == b.calendar_id()
            }
            _ => false,
        }
    }
}

impl Eq for Holidays {}

impl From<BTreeSet<NaiveDate>> for Holidays {
    fn from(dates: BTreeSet<NaiveDate>) -> Self {
        Holidays::Dates(Arc::new(dates))
    }
}

impl From<Vec<NaiveDate>> for Holidays {
    fn from(dates: Vec<NaiveDate>) -> Self {
        Holidays::Dates(Arc::new(dates.into_iter().collect()))
    }
}

impl From<Arc<dyn HolidayCalendar>> for Holidays {
    fn from(calendar: Arc<dyn HolidayCalendar>) -> Self {
        Holidays::Calendar(calendar)
    }
}

/// Whole-day exclusions for every date in a [`Holidays`] source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarExclusionRule {
    zone: Tz,
    holidays: Holidays,
    max_scan_days: u32,
}

impl CalendarExclusionRule {
    pub fn new(holidays: impl Into<Holidays>, zone: Tz) -> Self {
        Self {
            zone,
            holidays: holidays.into(),
            max_scan_days: MAX_SCAN_DAYS,
        }
    }

    pub fn from_calendar(calendar: impl HolidayCalendar + 'static, zone: Tz) -> Self {
        Self::new(Holidays::Calendar(Arc::new(calendar)), zone)
    }

    /// Overrides how many days a search may scan before giving up.
    pub fn with_max_scan_days(mut self, days: u32) -> Self {
        self.max_scan_days = days;
        self
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn holidays(&self) -> &Holidays {
        &self.holidays
    }

    /// The next holiday at or after `anchor`, clamped to start at `anchor`
    /// when it is already underway.
    pub fn next(&self, anchor: &Instant) -> Result<Interval, BusinessTimeError> {
        self.search(anchor, false)
    }

    /// The last holiday at or before `anchor`, clamped to end at `anchor`
    /// when it is still underway.
    pub fn previous(&self, anchor: &Instant) -> Result<Interval, BusinessTimeError> {
        self.search(anchor, true)
    }

    /// `true` when the holidays are a finite date set with no date left on
    /// the `reverse` side of `anchor`. Such a rule can never exclude time
    /// there again, as opposed to a search that merely ran out of bound.
    pub fn is_spent(&self, anchor: &Instant, reverse: bool) -> bool {
        let Holidays::Dates(dates) = &self.holidays else {
            return false;
        };
        let Ok(from) = self.search_date(&anchor.with_timezone(&self.zone), reverse) else {
            return true;
        };
        if reverse {
            dates.range(..=from).next_back().is_none()
        } else {
            dates.range(from..).next().is_none()
        }
    }

    /// The local date a search starts from.
    fn search_date(&self, anchor: &Instant, reverse: bool) -> Result<NaiveDate, BusinessTimeError> {
        let date = anchor.date_naive();
        // A holiday starting exactly at the anchor lies entirely after it.
        if reverse && self.day_start(date) >= *anchor {
            return pred(date);
        }
        Ok(date)
    }

    fn search(&self, anchor: &Instant, reverse: bool) -> Result<Interval, BusinessTimeError> {
        let anchor = anchor.with_timezone(&self.zone);
        let date = self.search_date(&anchor, reverse)?;

        let found = self.find_holiday(date, reverse)?;
        let start = self.day_start(found);
        let end = self.day_start(succ(found)?);

        if start < anchor && anchor < end {
            if reverse {
                return Ok(Interval::new(start, anchor));
            }
            return Ok(Interval::new(anchor, end));
        }
        Ok(Interval::new(start, end))
    }

    fn find_holiday(&self, from: NaiveDate, reverse: bool) -> Result<NaiveDate, BusinessTimeError> {
        match &self.holidays {
            // A finite set can jump straight to the nearest date.
            Holidays::Dates(dates) => {
                let nearest = if reverse {
                    dates.range(..=from).next_back()
                } else {
                    dates.range(from..).next()
                };
                if let Some(date) = nearest {
                    if (*date - from).num_days().abs() <= i64::from(self.max_scan_days) {
                        return Ok(*date);
                    }
                }
            }
            Holidays::Calendar(calendar) => {
                let mut date = from;
                for _ in 0..=self.max_scan_days {
                    if calendar.is_holiday(date) {
                        return Ok(date);
                    }
                    date = if reverse { pred(date)? } else { succ(date)? };
                }
            }
        }

        tracing::warn!(
            from = %from,
            reverse,
            max_scan_days = self.max_scan_days,
            "holiday scan exhausted"
        );
        Err(BusinessTimeError::RuleExhausted(format!(
            "no holiday within {} days {} {}",
            self.max_scan_days,
            if reverse { "before" } else { "after" },
            from
        )))
    }

    fn day_start(&self, date: NaiveDate) -> Instant {
        resolve_local(&self.zone, date, NaiveTime::MIN)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
