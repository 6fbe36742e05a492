//! The rule capability: "nearest qualifying interval" in either direction.
//!
//! [`Rule`] is a closed set of shapes behind one interface, so a
//! [`CompositeRule`] can hold any mix of them (including other composites).
//! Equality is structural: two rules are equal when their configuration is.

use crate::composite::CompositeRule;
use crate::daily::DailyWindowRule;
use crate::duration::BusinessDuration;
use crate::error::BusinessTimeError;
use crate::holiday::CalendarExclusionRule;
use crate::interval::Interval;
use crate::span;
use crate::zone::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    DailyWindow(DailyWindowRule),
    CalendarExclusion(CalendarExclusionRule),
    Composite(CompositeRule),
}

impl Rule {
    /// The upcoming (or current) interval, starting no earlier than `anchor`.
    pub fn next(&self, anchor: &Instant) -> Result<Interval, BusinessTimeError> {
        match self {
            Rule::DailyWindow(rule) => rule.next(anchor),
            Rule::CalendarExclusion(rule) => rule.next(anchor),
            Rule::Composite(rule) => rule.next(anchor),
        }
    }

    /// The preceding (or current) interval, ending no later than `anchor`.
    pub fn previous(&self, anchor: &Instant) -> Result<Interval, BusinessTimeError> {
        match self {
            Rule::DailyWindow(rule) => rule.previous(anchor),
            Rule::CalendarExclusion(rule) => rule.previous(anchor),
            Rule::Composite(rule) => rule.previous(anchor),
        }
    }

    /// `true` if this rule removes time instead of granting it.
    pub fn is_exclusion(&self) -> bool {
        match self {
            Rule::DailyWindow(rule) => rule.is_exclusion(),
            Rule::CalendarExclusion(_) => true,
            Rule::Composite(rule) => rule.is_exclusion(),
        }
    }

    /// Business time between `from` and `to` under this rule.
    ///
    /// Negative when `to` is before `from`.
    pub fn span(
        &self,
        from: &Instant,
        to: &Instant,
    ) -> Result<BusinessDuration, BusinessTimeError> {
        span::between(self, from, to)
    }
}

impl From<DailyWindowRule> for Rule {
    fn from(rule: DailyWindowRule) -> Self {
        Rule::DailyWindow(rule)
    }
}

impl From<CalendarExclusionRule> for Rule {
    fn from(rule: CalendarExclusionRule) -> Self {
        Rule::CalendarExclusion(rule)
    }
}

impl From<CompositeRule> for Rule {
    fn from(rule: CompositeRule) -> Self {
        Rule::Composite(rule)
    }
}
