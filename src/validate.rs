//! Deciding whether a contig's MDS cover it completely, with no more than
//! pointer overlap between neighbours.
//!
//! The intervals must be sorted by *end* coordinate (see
//! [`crate::aggregate::ContigAggregator::finish`]). When sorting by end puts an
//! interval ahead of one that starts earlier, the two overlap, and the
//! overlap check rejects the contig anyway, so end order is treated as the
//! contig's linear order.

use crate::error::MdsMapError;
use crate::interval::{Interval, Position};

/// Default number of basepairs that may go unexplained at a contig end or
/// between two MDS.
pub const DEFAULT_COVERAGE_CUTOFF: Position = 50;

/// Default value of the configurable overlap cutoff.
pub const DEFAULT_OVERLAP_CUTOFF: f64 = 0.8;

/// The fraction of the preceding MDS that a neighbour may overlap. This is
/// what the overlap check uses unless
/// [`ValidationParams::apply_overlap_cutoff`] is set.
pub const POINTER_OVERLAP_FRACTION: f64 = 0.8;

/// Tolerances for contig validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationParams {
    /// Maximum uncovered basepairs at either end or between adjacent MDS.
    pub coverage_cutoff: Position,
    /// Fraction of an MDS that may be overlapped by the next one.
    pub overlap_cutoff: f64,
    /// Use `overlap_cutoff` in the overlap check instead of
    /// [`POINTER_OVERLAP_FRACTION`].
    pub apply_overlap_cutoff: bool,
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            coverage_cutoff: DEFAULT_COVERAGE_CUTOFF,
            overlap_cutoff: DEFAULT_OVERLAP_CUTOFF,
            apply_overlap_cutoff: false,
        }
    }
}

impl ValidationParams {
    /// Reject cutoffs that cannot describe a tolerance. The overlap cutoff
    /// is only range-checked when it is applied.
    pub fn check(&self) -> Result<(), MdsMapError> {
        if self.coverage_cutoff < 0 {
            return Err(MdsMapError::InvalidParameter(format!(
                "coverage cutoff must be non-negative, got {}",
                self.coverage_cutoff
            )));
        }
        if self.apply_overlap_cutoff && !(0.0..=1.0).contains(&self.overlap_cutoff) {
            return Err(MdsMapError::InvalidParameter(format!(
                "overlap cutoff must be a fraction in [0, 1], got {}",
                self.overlap_cutoff
            )));
        }
        Ok(())
    }

    /// The overlap fraction actually applied by [`validate_contig`].
    pub fn overlap_fraction(&self) -> f64 {
        if self.apply_overlap_cutoff {
            self.overlap_cutoff
        } else {
            POINTER_OVERLAP_FRACTION
        }
    }
}

/// The outcome of validating one contig.
///
/// Indices refer to positions in the end-sorted interval sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Valid,
    /// The first MDS starts more than the coverage cutoff into the contig.
    UncoveredStart { start: Position },
    /// The last MDS ends more than the coverage cutoff before the contig end.
    UncoveredEnd { uncovered: Position },
    /// The MDS at `after` and `after + 1` leave too large a gap.
    InternalGap { after: usize, gap: Position },
    /// The MDS at `after + 1` overlaps too much of the MDS at `after`.
    ExcessOverlap { after: usize, overlap: u64 },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// Validate a contig from its end-sorted MAC intervals and physical length.
///
/// # Arguments
///  * `contig`: the contig name, used for error reporting.
///  * `intervals`: the contig's MAC intervals, sorted by end coordinate.
///  * `length`: the contig length in basepairs, excluding telomeres.
///  * `params`: the coverage and overlap tolerances.
///
/// Fails with [`MdsMapError::EmptyContig`] if `intervals` is empty.
pub fn validate_contig(
    contig: &str,
    intervals: &[Interval],
    length: Position,
    params: &ValidationParams,
) -> Result<Verdict, MdsMapError> {
    let (first, last) = match (intervals.first(), intervals.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(MdsMapError::EmptyContig(contig.to_string())),
    };

    if first.start > params.coverage_cutoff {
        return Ok(Verdict::UncoveredStart { start: first.start });
    }
    let uncovered = length.saturating_sub(last.end);
    if uncovered > params.coverage_cutoff {
        return Ok(Verdict::UncoveredEnd { uncovered });
    }

    let fraction = params.overlap_fraction();
    for (after, pair) in intervals.windows(2).enumerate() {
        let gap = pair[0].gap_to(&pair[1]);
        if gap > params.coverage_cutoff {
            return Ok(Verdict::InternalGap { after, gap });
        }
        if gap < 0 {
            let overlap = gap.unsigned_abs();
            if overlap as f64 > fraction * pair[0].width() as f64 {
                return Ok(Verdict::ExcessOverlap { after, overlap });
            }
        }
    }

    Ok(Verdict::Valid)
}
