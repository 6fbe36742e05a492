//! Span calculator: business time elapsed between two instants.

use chrono::TimeDelta;

use crate::duration::{no_progress, BusinessDuration};
use crate::error::BusinessTimeError;
use crate::rule::Rule;
use crate::zone::Instant;

/// Business time between `from` and `to`, walking `rule` forward from the
/// earlier of the two. The result is negative when `to` precedes `from`.
///
/// Adding the span back to `from` lands on `to` when `to` is inside an
/// available interval, and otherwise on the last boundary before `to`.
///
/// The rule is cloned once, into the returned duration, and only after the
/// walk succeeds.
pub fn between(
    rule: &Rule,
    from: &Instant,
    to: &Instant,
) -> Result<BusinessDuration, BusinessTimeError> {
    let magnitude = if to < from {
        -accumulate(rule, to, from)?
    } else {
        accumulate(rule, from, to)?
    };
    Ok(BusinessDuration::new(rule.clone(), magnitude))
}

fn accumulate(rule: &Rule, from: &Instant, to: &Instant) -> Result<TimeDelta, BusinessTimeError> {
    let mut total = TimeDelta::zero();
    let mut cursor = *from;

    loop {
        let period = rule.next(&cursor)?;

        if period.end > *to {
            let tail = (*to - period.start).max(TimeDelta::zero());
            return Ok(total + tail);
        }

        total = total + period.duration();
        if period.end <= cursor {
            return Err(no_progress(&cursor));
        }
        cursor = period.end;
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
