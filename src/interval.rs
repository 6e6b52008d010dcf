//! Coordinate intervals and the end-coordinate ordering shared by the
//! aggregation, validation and scrambling passes.

use serde::{Deserialize, Serialize};

/// The integer type for MIC and MAC coordinates.
///
/// Signed, since gaps between adjacent intervals are negative when they overlap.
pub type Position = i64;

/// A `(start, end)` pair in a single coordinate space.
///
/// No `start <= end` invariant is enforced; every ordering in this crate
/// keys on `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    pub start: Position,
    pub end: Position,
}

impl Interval {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Width in basepairs, saturating at the `Position` range.
    pub fn width(&self) -> Position {
        self.end.saturating_sub(self.start)
    }

    /// The distance from the end of this interval to the start of `next`.
    /// Negative values are overlaps. Saturates at the `Position` range.
    pub fn gap_to(&self, next: &Interval) -> Position {
        next.start.saturating_sub(self.end)
    }
}

/// One MIC segment paired with the MAC segment it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Correspondence {
    pub mic: Interval,
    pub mac: Interval,
}

impl Correspondence {
    pub fn new(mic: Interval, mac: Interval) -> Self {
        Self { mic, mac }
    }
}

/// Source indices of `intervals` after a stable ascending sort on the end
/// coordinate. Equal ends keep their source order.
pub fn end_order<'a, I>(intervals: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a Interval>,
{
    let mut tagged: Vec<(usize, Position)> = intervals
        .into_iter()
        .map(|interval| interval.end)
        .enumerate()
        .collect();
    // slice::sort_by_key is stable, which the tie-break relies on
    tagged.sort_by_key(|&(_, end)| end);
    tagged.into_iter().map(|(idx, _)| idx).collect()
}

/// Stable in-place sort of intervals by end coordinate.
pub fn sort_by_end(intervals: &mut [Interval]) {
    intervals.sort_by_key(|interval| interval.end);
}
