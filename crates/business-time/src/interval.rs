//! Half-open intervals on the absolute timeline.

use chrono::TimeDelta;
use crate::zone::Instant;

/// A half-open span `[start, end)`.
///
/// `start == end` is a degenerate interval; rules only produce one for a
/// zero-length daily window, and walkers treat it as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: Instant,
    pub end: Instant,
}

impl Interval {
    /// Creates an interval, collapsing an inverted pair onto `start`.
    pub fn new(start: Instant, end: Instant) -> Self {
        let end = if end < start { start } else { end };
        Self { start, end }
    }

    #[inline]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `t` falls within `[start, end)`.
    #[inline]
    pub fn contains(&self, t: &Instant) -> bool {
        self.start <= *t && *t < self.end
    }
}
