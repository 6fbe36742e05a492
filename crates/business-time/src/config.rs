//! Declarative schedule configuration.
//!
//! A [`ScheduleConfig`] describes a business calendar in plain data (JSON via
//! serde) and builds it into one composite [`Rule`]:
//!
//! ```json
//! {
//!   "timezone": "America/New_York",
//!   "windows": [{ "start": "09:00", "end": "18:00" }],
//!   "breaks": [{ "start": "12:00", "end": "13:00" }],
//!   "holidays": ["2015-12-25"],
//!   "annual_holidays": ["01-01"]
//! }
//! ```
//!
//! Weekdays default to Monday–Friday; a window may override the zone.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::composite::CompositeRule;
use crate::daily::{DailyWindowRule, Weekdays};
use crate::error::BusinessTimeError;
use crate::holiday::{AnnualHolidays, CalendarExclusionRule};
use crate::rule::Rule;
use crate::zone::{parse_date, parse_time_of_day, parse_timezone, parse_weekday};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// IANA zone used by every rule that does not name its own.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Working windows (time granted).
    #[serde(default = "default_windows")]
    pub windows: Vec<WindowConfig>,
    /// Recurring breaks (time removed).
    #[serde(default)]
    pub breaks: Vec<WindowConfig>,
    /// One-off holidays, `YYYY-MM-DD`.
    #[serde(default)]
    pub holidays: Vec<String>,
    /// Holidays repeating every year, `MM-DD`.
    #[serde(default)]
    pub annual_holidays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_weekdays() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_windows() -> Vec<WindowConfig> {
    vec![WindowConfig {
        start: "09:00".to_string(),
        end: "18:00".to_string(),
        weekdays: default_weekdays(),
        timezone: None,
    }]
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            windows: default_windows(),
            breaks: Vec::new(),
            holidays: Vec::new(),
            annual_holidays: Vec::new(),
        }
    }
}

impl ScheduleConfig {
    /// # Errors
    ///
    /// Returns [`BusinessTimeError::InvalidConfiguration`] on malformed JSON
    /// or unknown fields.
    pub fn from_json(json: &str) -> Result<Self, BusinessTimeError> {
        serde_json::from_str(json)
            .map_err(|e| BusinessTimeError::InvalidConfiguration(format!("schedule: {}", e)))
    }

    /// Validate every field and assemble the composite rule.
    pub fn build(&self) -> Result<Rule, BusinessTimeError> {
        let zone = parse_timezone(&self.timezone)?;
        let mut rules: Vec<Rule> = Vec::new();

        for window in &self.windows {
            rules.push(window.build(zone)?.into());
        }
        for window in &self.breaks {
            rules.push(window.build(zone)?.into_exclusion().into());
        }

        if !self.holidays.is_empty() {
            let dates = self
                .holidays
                .iter()
                .map(|s| parse_date(s))
                .collect::<Result<BTreeSet<_>, _>>()?;
            rules.push(CalendarExclusionRule::new(dates, zone).into());
        }

        if !self.annual_holidays.is_empty() {
            let mut annual = AnnualHolidays::new();
            for day in &self.annual_holidays {
                let (month, dom) = parse_month_day(day)?;
                annual = annual.with_day(month, dom)?;
            }
            rules.push(CalendarExclusionRule::from_calendar(annual, zone).into());
        }

        tracing::debug!(
            windows = self.windows.len(),
            breaks = self.breaks.len(),
            holidays = self.holidays.len(),
            annual_holidays = self.annual_holidays.len(),
            timezone = %self.timezone,
            "built schedule"
        );
        Ok(CompositeRule::new(rules)?.into())
    }
}

impl WindowConfig {
    fn build(&self, default_zone: chrono_tz::Tz) -> Result<DailyWindowRule, BusinessTimeError> {
        let zone = match &self.timezone {
            Some(name) => parse_timezone(name)?,
            None => default_zone,
        };
        let start = parse_time_of_day(&self.start).map_err(invalid)?;
        let end = parse_time_of_day(&self.end).map_err(invalid)?;
        let weekdays = self
            .weekdays
            .iter()
            .map(|s| parse_weekday(s))
            .collect::<Result<Weekdays, _>>()?;
        DailyWindowRule::new(start, end, weekdays, zone)
    }
}

fn parse_month_day(s: &str) -> Result<(u32, u32), BusinessTimeError> {
    let bad = || BusinessTimeError::InvalidConfiguration(format!("'{}': expected MM-DD", s));
    let (month, day) = s.trim().split_once('-').ok_or_else(bad)?;
    let month = month.parse().map_err(|_| bad())?;
    let day = day.parse().map_err(|_| bad())?;
    Ok((month, day))
}

fn invalid(err: BusinessTimeError) -> BusinessTimeError {
    BusinessTimeError::InvalidConfiguration(err.to_string())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::parse_instant;

    #[test]
    fn test_default_schedule() {
        let rule = ScheduleConfig::default().build().unwrap();
        let span = rule
            .span(
                &parse_instant("2016-01-18T09:00:00Z").unwrap(),
                &parse_instant("2016-01-25T09:00:00Z").unwrap(),
            )
            .unwrap();
        assert_eq!(span.hours(), 45);
    }

    #[test]
    fn test_from_json_with_breaks_and_holidays() {
        let config = ScheduleConfig::from_json(
            r#"{
                "timezone": "UTC",
                "windows": [{ "start": "09:00", "end": "18:00" }],
                "breaks": [{ "start": "12:00", "end": "13:00" }],
                "holidays": ["2015-12-25"]
            }"#,
        )
        .unwrap();
        let rule = config.build().unwrap();
        let span = rule
            .span(
                &parse_instant("2015-12-21T09:00:00Z").unwrap(),
                &parse_instant("2015-12-28T09:00:00Z").unwrap(),
            )
            .unwrap();
        assert_eq!(span.hours(), 32);
    }

    #[test]
    fn test_from_json_annual_holidays() {
        let config = ScheduleConfig::from_json(
            r#"{ "windows": [{ "start": "9am", "end": "5pm", "weekdays": ["Mon","Tue","Wed","Thu","Fri"] }],
                 "annual_holidays": ["12-25"] }"#,
        )
        .unwrap();
        let rule = config.build().unwrap();
        // Christmas 2030 is a Wednesday.
        let span = rule
            .span(
                &parse_instant("2030-12-24T00:00:00Z").unwrap(),
                &parse_instant("2030-12-27T00:00:00Z").unwrap(),
            )
            .unwrap();
        assert_eq!(span.hours(), 16);
    }

    #[test]
    fn test_window_zone_override() {
        let config = ScheduleConfig::from_json(
            r#"{ "windows": [{ "start": "09:00", "end": "17:00", "timezone": "Asia/Tokyo" }] }"#,
        )
        .unwrap();
        let rule = config.build().unwrap();
        let period = rule
            .next(&parse_instant("2026-06-15T00:00:00Z").unwrap())
            .unwrap();
        assert_eq!(period.start.to_rfc3339(), "2026-06-15T09:00:00+09:00");
    }

    #[test]
    fn test_invalid_fields() {
        let cases = [
            r#"{ "timezone": "Mars/Olympus" }"#,
            r#"{ "windows": [{ "start": "25:00", "end": "17:00" }] }"#,
            r#"{ "windows": [{ "start": "09:00", "end": "17:00", "weekdays": [] }] }"#,
            r#"{ "windows": [{ "start": "09:00", "end": "17:00", "weekdays": ["Funday"] }] }"#,
            r#"{ "windows": [] }"#,
            r#"{ "holidays": ["2015/12/25"] }"#,
            r#"{ "annual_holidays": ["13-01"] }"#,
            r#"{ "annual_holidays": ["xmas"] }"#,
        ];
        for json in cases {
            let config = ScheduleConfig::from_json(json).unwrap();
            assert!(config.build().is_err(), "{json} should fail to build");
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ScheduleConfig::from_json(r#"{ "timzone": "UTC" }"#).unwrap_err();
        assert!(matches!(err, BusinessTimeError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ScheduleConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ScheduleConfig::from_json(&json).unwrap(), config);
    }
}
