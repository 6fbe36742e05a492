//! Business durations: signed amounts of business time bound to one rule.
//!
//! Adding a duration to an instant walks the rule's intervals forward,
//! consuming each one until the remainder fits; subtracting walks backward.
//! Two durations can only be added or subtracted when their rules are equal.

use std::fmt;
use std::ops::Neg;
use std::sync::Arc;

use chrono::TimeDelta;

use crate::error::BusinessTimeError;
use crate::rule::Rule;
use crate::zone::Instant;

/// Consecutive zero-length intervals a walk accepts before treating the rule
/// as never open.
pub const MAX_EMPTY_PERIODS: usize = 366;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessDuration {
    rule: Arc<Rule>,
    magnitude: TimeDelta,
}

impl BusinessDuration {
    pub fn new(rule: impl Into<Arc<Rule>>, magnitude: TimeDelta) -> Self {
        Self {
            rule: rule.into(),
            magnitude,
        }
    }

    pub fn zero(rule: impl Into<Arc<Rule>>) -> Self {
        Self::new(rule, TimeDelta::zero())
    }

    /// # Errors
    ///
    /// Returns [`BusinessTimeError::InvalidDuration`] if `hours` does not fit a `TimeDelta`.
    pub fn from_hours(rule: impl Into<Arc<Rule>>, hours: i64) -> Result<Self, BusinessTimeError> {
        Self::from_hours_seconds(rule, hours, 0)
    }

    /// # Errors
    ///
    /// Returns [`BusinessTimeError::InvalidDuration`] if the total does not fit a `TimeDelta`.
    pub fn from_hours_seconds(
        rule: impl Into<Arc<Rule>>,
        hours: i64,
        seconds: i64,
    ) -> Result<Self, BusinessTimeError> {
        let magnitude = TimeDelta::try_hours(hours)
            .zip(TimeDelta::try_seconds(seconds))
            .and_then(|(h, s)| h.checked_add(&s))
            .ok_or_else(|| {
                BusinessTimeError::InvalidDuration(format!(
                    "{} hours {} seconds is out of range",
                    hours, seconds
                ))
            })?;
        Ok(Self::new(rule, magnitude))
    }

    /// Parse a compact duration such as `"8h"`, `"+1d2h30m"` or `"-45m"`.
    ///
    /// Units are `w` (168h), `d` (24h), `h`, `m` and `s`, all counted in
    /// business time. A missing sign means positive.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessTimeError::InvalidDuration`] if the string cannot be parsed.
    pub fn parse(rule: impl Into<Arc<Rule>>, s: &str) -> Result<Self, BusinessTimeError> {
        Ok(Self::new(rule, parse_magnitude(s)?))
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn magnitude(&self) -> TimeDelta {
        self.magnitude
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Whole hours, truncated toward zero.
    pub fn hours(&self) -> i64 {
        self.magnitude.num_seconds() / 3600
    }

    /// Seconds left over after [`hours`](Self::hours), truncated toward zero.
    pub fn seconds(&self) -> i64 {
        self.magnitude.num_seconds() % 3600
    }

    /// The instant reached by spending this much business time after `t`.
    ///
    /// A zero duration returns `t` unchanged; a negative one walks backward.
    pub fn add_to(&self, t: &Instant) -> Result<Instant, BusinessTimeError> {
        if self.magnitude < TimeDelta::zero() {
            return walk_backward(&self.rule, t, -self.magnitude);
        }
        walk_forward(&self.rule, t, self.magnitude)
    }

    /// The instant from which spending this much business time reaches `t`.
    pub fn subtract_from(&self, t: &Instant) -> Result<Instant, BusinessTimeError> {
        if self.magnitude < TimeDelta::zero() {
            return walk_forward(&self.rule, t, -self.magnitude);
        }
        walk_backward(&self.rule, t, self.magnitude)
    }

    /// # Errors
    ///
    /// Returns [`BusinessTimeError::RuleMismatch`] if the rules differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, BusinessTimeError> {
        self.ensure_same_rule(other)?;
        Ok(Self::new(
            Arc::clone(&self.rule),
            self.magnitude + other.magnitude,
        ))
    }

    /// # Errors
    ///
    /// Returns [`BusinessTimeError::RuleMismatch`] if the rules differ.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, BusinessTimeError> {
        self.ensure_same_rule(other)?;
        Ok(Self::new(
            Arc::clone(&self.rule),
            self.magnitude - other.magnitude,
        ))
    }

    fn ensure_same_rule(&self, other: &Self) -> Result<(), BusinessTimeError> {
        if Arc::ptr_eq(&self.rule, &other.rule) || self.rule == other.rule {
            Ok(())
        } else {
            Err(BusinessTimeError::RuleMismatch)
        }
    }
}

impl Neg for BusinessDuration {
    type Output = BusinessDuration;

    fn neg(self) -> Self::Output {
        Self {
            rule: self.rule,
            magnitude: -self.magnitude,
        }
    }
}

impl fmt::Display for BusinessDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hours {} seconds", self.hours(), self.seconds())
    }
}

fn walk_forward(
    rule: &Rule,
    from: &Instant,
    amount: TimeDelta,
) -> Result<Instant, BusinessTimeError> {
    if amount.is_zero() {
        return Ok(*from);
    }

    let mut left = amount;
    let mut cursor = *from;
    let mut empty = 0;
    loop {
        let period = rule.next(&cursor)?;
        let length = period.duration();
        if length >= left {
            return Ok(period.start + left);
        }
        left = left - length;
        if period.end <= cursor {
            return Err(no_progress(&cursor));
        }
        empty = if length.is_zero() { empty + 1 } else { 0 };
        if empty >= MAX_EMPTY_PERIODS {
            return Err(never_open(&cursor));
        }
        cursor = period.end;
    }
}

fn walk_backward(
    rule: &Rule,
    from: &Instant,
    amount: TimeDelta,
) -> Result<Instant, BusinessTimeError> {
    if amount.is_zero() {
        return Ok(*from);
    }

    let mut left = amount;
    let mut cursor = *from;
    let mut empty = 0;
    loop {
        let period = rule.previous(&cursor)?;
        let length = period.duration();
        if length >= left {
            return Ok(period.end - left);
        }
        left = left - length;
        if period.start >= cursor {
            return Err(no_progress(&cursor));
        }
        empty = if length.is_zero() { empty + 1 } else { 0 };
        if empty >= MAX_EMPTY_PERIODS {
            return Err(never_open(&cursor));
        }
        cursor = period.start;
    }
}

fn never_open(at: &Instant) -> BusinessTimeError {
    tracing::warn!(at = %at, max_empty = MAX_EMPTY_PERIODS, "rule only yields empty intervals");
    BusinessTimeError::RuleExhausted(format!(
        "rule yielded {} empty intervals in a row up to {}",
        MAX_EMPTY_PERIODS,
        at.to_rfc3339()
    ))
}

pub(crate) fn no_progress(at: &Instant) -> BusinessTimeError {
    tracing::warn!(at = %at, "rule returned an interval that does not move past the cursor");
    BusinessTimeError::RuleExhausted(format!("rule made no progress at {}", at.to_rfc3339()))
}

/// Parse a signed compact duration ("+2h", "-1d30m", "90m") into a `TimeDelta`.
fn parse_magnitude(s: &str) -> Result<TimeDelta, BusinessTimeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(BusinessTimeError::InvalidDuration("empty duration".to_string()));
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1i64, &s[1..]),
        Some(b'-') => (-1i64, &s[1..]),
        _ => (1i64, s),
    };

    if rest.is_empty() {
        return Err(BusinessTimeError::InvalidDuration(format!(
            "duration has no components: '{s}'"
        )));
    }

    let mut total_seconds: i64 = 0;
    let mut num_buf = String::new();

    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
            continue;
        }
        if num_buf.is_empty() {
            return Err(BusinessTimeError::InvalidDuration(format!(
                "expected number before '{ch}' in '{s}'"
            )));
        }
        let n: i64 = num_buf
            .parse()
            .map_err(|_| BusinessTimeError::InvalidDuration(format!("invalid number in '{s}'")))?;
        num_buf.clear();

        let unit = match ch {
            'w' | 'W' => 7 * 86400,
            'd' | 'D' => 86400,
            'h' | 'H' => 3600,
            'm' | 'M' => 60,
            's' | 'S' => 1,
            _ => {
                return Err(BusinessTimeError::InvalidDuration(format!(
                    "unknown unit '{ch}' in '{s}'"
                )));
            }
        };
        total_seconds = n
            .checked_mul(unit)
            .and_then(|v| total_seconds.checked_add(v))
            .ok_or_else(|| BusinessTimeError::InvalidDuration(format!("'{s}' is too large")))?;
    }

    // Trailing number without unit
    if !num_buf.is_empty() {
        return Err(BusinessTimeError::InvalidDuration(format!(
            "number without unit at end of '{s}'"
        )));
    }

    TimeDelta::try_seconds(sign * total_seconds)
        .ok_or_else(|| BusinessTimeError::InvalidDuration(format!("'{s}' is out of range")))
}

// ── Tests ───────────────────────────────────────────────────────────────────
