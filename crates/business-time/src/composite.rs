//! Composite rules: net availability = covered by some available rule and
//! not covered by any exclusion rule.
//!
//! Nothing is materialized. Each probe asks every child rule for its nearest
//! interval and merges the answers:
//!
//! 1. Take the available interval with the earliest start (latest end when
//!    walking backward). On a tie the wider interval wins, so the result does
//!    not depend on the order rules were given in.
//! 2. If an exclusion covers the candidate's start, the whole candidate is
//!    swallowed; restart from the end of that exclusion.
//! 3. Otherwise cut the candidate short at the first exclusion that begins
//!    inside it.
//!
//! Restarts must move the anchor forward (backward for `previous`); a search
//! that stops moving, or runs past [`MAX_SEARCH_STEPS`] restarts, fails with
//! [`BusinessTimeError::RuleExhausted`].

use crate::error::BusinessTimeError;
use crate::interval::Interval;
use crate::rule::Rule;
use crate::zone::Instant;

/// Maximum restarts a single `next`/`previous` probe may take.
pub const MAX_SEARCH_STEPS: usize = 10_000;

#[derive(Debug, Clone, Eq)]
pub struct CompositeRule {
    available: Vec<Rule>,
    exclusions: Vec<Rule>,
    exclusion: bool,
}

impl CompositeRule {
    /// Builds a composite, sorting each rule into the available or exclusion
    /// group by its own flag.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessTimeError::InvalidConfiguration`] if no rule grants time.
    pub fn new<I, R>(rules: I) -> Result<Self, BusinessTimeError>
    where
        I: IntoIterator<Item = R>,
        R: Into<Rule>,
    {
        let (exclusions, available): (Vec<Rule>, Vec<Rule>) = rules
            .into_iter()
            .map(Into::into)
            .partition(Rule::is_exclusion);

        if available.is_empty() {
            return Err(BusinessTimeError::InvalidConfiguration(
                "composite rule needs at least one availability rule".to_string(),
            ));
        }

        Ok(Self {
            available,
            exclusions,
            exclusion: false,
        })
    }

    /// Use the net availability of this composite as time to remove.
    pub fn into_exclusion(mut self) -> Self {
        self.exclusion = true;
        self
    }

    pub fn available(&self) -> &[Rule] {
        &self.available
    }

    pub fn exclusions(&self) -> &[Rule] {
        &self.exclusions
    }

    pub fn is_exclusion(&self) -> bool {
        self.exclusion
    }

    pub fn next(&self, anchor: &Instant) -> Result<Interval, BusinessTimeError> {
        let mut cursor = *anchor;

        for step in 0..MAX_SEARCH_STEPS {
            let candidate = self.earliest_available(&cursor)?;

            if let Some(blocking) = self.exclusion_covering_start(&candidate)? {
                tracing::trace!(
                    step,
                    start = %candidate.start,
                    resume = %blocking.end,
                    "candidate swallowed by exclusion"
                );
                cursor = advance(cursor, blocking.end)?;
                continue;
            }

            let mut end = candidate.end;
            for rule in &self.exclusions {
                if let Some(excluded) = probe(rule, &candidate.start, Direction::Forward)? {
                    if excluded.start > candidate.start && excluded.start < end {
                        end = excluded.start;
                    }
                }
            }

            if end > candidate.start {
                return Ok(Interval::new(candidate.start, end));
            }

            tracing::trace!(step, at = %candidate.start, "skipping empty candidate");
            cursor = advance(cursor, candidate.start)?;
        }

        Err(exhausted(anchor, Direction::Forward))
    }

    pub fn previous(&self, anchor: &Instant) -> Result<Interval, BusinessTimeError> {
        let mut cursor = *anchor;

        for step in 0..MAX_SEARCH_STEPS {
            let candidate = self.latest_available(&cursor)?;

            if let Some(blocking) = self.exclusion_covering_end(&candidate)? {
                tracing::trace!(
                    step,
                    end = %candidate.end,
                    resume = %blocking.start,
                    "candidate swallowed by exclusion"
                );
                cursor = regress(cursor, blocking.start)?;
                continue;
            }

            let mut start = candidate.start;
            for rule in &self.exclusions {
                if let Some(excluded) = probe(rule, &candidate.end, Direction::Backward)? {
                    if excluded.end < candidate.end && excluded.end > start {
                        start = excluded.end;
                    }
                }
            }

            if candidate.end > start {
                return Ok(Interval::new(start, candidate.end));
            }

            tracing::trace!(step, at = %candidate.end, "skipping empty candidate");
            cursor = regress(cursor, candidate.end)?;
        }

        Err(exhausted(anchor, Direction::Backward))
    }

    fn earliest_available(&self, cursor: &Instant) -> Result<Interval, BusinessTimeError> {
        let mut best: Option<Interval> = None;
        for rule in &self.available {
            let found = rule.next(cursor)?;
            best = match best {
                Some(b) if prefer_earlier(&b, &found) => Some(b),
                _ => Some(found),
            };
        }
        best.ok_or_else(no_available_rules)
    }

    fn latest_available(&self, cursor: &Instant) -> Result<Interval, BusinessTimeError> {
        let mut best: Option<Interval> = None;
        for rule in &self.available {
            let found = rule.previous(cursor)?;
            best = match best {
                Some(b) if prefer_later(&b, &found) => Some(b),
                _ => Some(found),
            };
        }
        best.ok_or_else(no_available_rules)
    }

    /// The first exclusion interval that already covers `candidate.start`.
    fn exclusion_covering_start(
        &self,
        candidate: &Interval,
    ) -> Result<Option<Interval>, BusinessTimeError> {
        for rule in &self.exclusions {
            if let Some(excluded) = probe(rule, &candidate.start, Direction::Forward)? {
                if excluded.start <= candidate.start && excluded.end > candidate.start {
                    return Ok(Some(excluded));
                }
            }
        }
        Ok(None)
    }

    /// The first exclusion interval that still covers the instant just before `candidate.end`.
    fn exclusion_covering_end(
        &self,
        candidate: &Interval,
    ) -> Result<Option<Interval>, BusinessTimeError> {
        for rule in &self.exclusions {
            if let Some(excluded) = probe(rule, &candidate.end, Direction::Backward)? {
                if excluded.end >= candidate.end && excluded.start < candidate.end {
                    return Ok(Some(excluded));
                }
            }
        }
        Ok(None)
    }
}

impl PartialEq for CompositeRule {
    fn eq(&self, other: &Self) -> bool {
        self.exclusion == other.exclusion
            && same_members(&self.available, &other.available)
            && same_members(&self.exclusions, &other.exclusions)
    }
}

/// Earlier start wins; on a tie the wider interval does.
fn prefer_earlier(kept: &Interval, found: &Interval) -> bool {
    kept.start < found.start || (kept.start == found.start && kept.end >= found.end)
}

fn prefer_later(kept: &Interval, found: &Interval) -> bool {
    kept.end > found.end || (kept.end == found.end && kept.start <= found.start)
}

/// Multiset equality, ignoring order.
fn same_members(a: &[Rule], b: &[Rule]) -> bool {
    a.len() == b.len()
        && a.iter().all(|rule| {
            let count = |rules: &[Rule]| rules.iter().filter(|r| *r == rule).count();
            count(a) == count(b)
        })
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

/// Ask an exclusion rule for its nearest interval. A finite holiday set with
/// no dates left in `direction` removes nothing; every other failure,
/// exhaustion included, propagates.
fn probe(
    rule: &Rule,
    anchor: &Instant,
    direction: Direction,
) -> Result<Option<Interval>, BusinessTimeError> {
    let reverse = matches!(direction, Direction::Backward);
    if let Rule::CalendarExclusion(holidays) = rule {
        if holidays.is_spent(anchor, reverse) {
            tracing::trace!(?direction, "holiday set has no dates left");
            return Ok(None);
        }
    }
    let found = if reverse {
        rule.previous(anchor)?
    } else {
        rule.next(anchor)?
    };
    Ok(Some(found))
}

fn advance(cursor: Instant, to: Instant) -> Result<Instant, BusinessTimeError> {
    if to <= cursor {
        return Err(stalled(&cursor));
    }
    Ok(to)
}

fn regress(cursor: Instant, to: Instant) -> Result<Instant, BusinessTimeError> {
    if to >= cursor {
        return Err(stalled(&cursor));
    }
    Ok(to)
}

fn stalled(at: &Instant) -> BusinessTimeError {
    tracing::warn!(at = %at, "composite search stopped making progress");
    BusinessTimeError::RuleExhausted(format!(
        "composite search made no progress at {}",
        at.to_rfc3339()
    ))
}

fn exhausted(anchor: &Instant, direction: Direction) -> BusinessTimeError {
    tracing::warn!(
        anchor = %anchor,
        ?direction,
        max_steps = MAX_SEARCH_STEPS,
        "composite search exhausted"
    );
    BusinessTimeError::RuleExhausted(format!(
        "no available interval within {} search steps of {}",
        MAX_SEARCH_STEPS,
        anchor.to_rfc3339()
    ))
}

fn no_available_rules() -> BusinessTimeError {
    BusinessTimeError::InvalidConfiguration("composite rule has no availability rules".to_string())
}

// ── Tests ───────────────────────────────────────────────────────────────────
