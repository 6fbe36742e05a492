//! # business-time
//!
//! Deterministic business-time arithmetic.
//!
//! Elapsed time is counted only inside "available" intervals: working hours,
//! minus breaks and holidays. Rules describing those intervals are composed
//! into one net-availability rule, which can then offset an instant by a
//! business duration or measure the business time between two instants.
//!
//! ## Modules
//!
//! - [`zone`] — Instants, local wall-clock resolution (DST policy), input parsing
//! - [`interval`] — Half-open `[start, end)` intervals
//! - [`daily`] — Recurring start/end time-of-day windows on chosen weekdays
//! - [`holiday`] — Whole-day exclusions from a date set or holiday calendar
//! - [`composite`] — Available rules minus exclusion rules, merged lazily
//! - [`rule`] — The [`Rule`] capability over all of the above
//! - [`duration`] — Business durations and instant offsetting
//! - [`span`] — Business time between two instants
//! - [`config`] — JSON schedule configuration
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use business_time::{BusinessDuration, CompositeRule, DailyWindowRule, Rule};
//! use business_time::zone::parse_instant;
//! use chrono_tz::Tz;
//!
//! let hours = Rule::from(
//!     CompositeRule::new([
//!         DailyWindowRule::workday(Tz::UTC),
//!         DailyWindowRule::lunch_break(Tz::UTC),
//!     ])
//!     .unwrap(),
//! );
//!
//! let start = parse_instant("2016-01-18T09:00:00Z").unwrap();
//! let due = BusinessDuration::from_hours(hours, 40).unwrap().add_to(&start).unwrap();
//! assert_eq!(due, parse_instant("2016-01-22T18:00:00Z").unwrap());
//! ```

pub mod composite;
pub mod config;
pub mod daily;
pub mod duration;
pub mod error;
pub mod holiday;
pub mod interval;
pub mod rule;
pub mod span;
pub mod zone;

pub use composite::CompositeRule;
pub use config::{ScheduleConfig, WindowConfig};
pub use daily::{DailyWindowRule, Weekdays};
pub use duration::BusinessDuration;
pub use error::{BusinessTimeError, Result};
pub use holiday::{AnnualHolidays, CalendarExclusionRule, HolidayCalendar, Holidays};
pub use interval::Interval;
pub use rule::Rule;
pub use zone::Instant;
