//! Detecting MDS scrambling within a single map.
//!
//! Both the MIC and MAC segments are ranked by end coordinate. If the two
//! rankings agree, or the MAC ranking is the exact mirror of the MIC one (the
//! contig is simply assembled in reverse), the map is not scrambled.
//! Otherwise the permutation is reported as the MIC rank of each MAC slot.

use std::fmt;

use crate::interval::{end_order, Correspondence};

/// A scrambling pattern: for each MAC-order slot, the MIC-order slot that
/// occupies it. Displays as colon-separated indices, e.g. `1:2:0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{}", idx)?;
        }
        Ok(())
    }
}

/// Segment source indices in MIC and MAC end-coordinate order, respectively.
pub fn segment_orders(segments: &[Correspondence]) -> (Vec<usize>, Vec<usize>) {
    let mic_order = end_order(segments.iter().map(|segment| &segment.mic));
    let mac_order = end_order(segments.iter().map(|segment| &segment.mac));
    (mic_order, mac_order)
}

/// Return the scrambling permutation of a map's segments, or `None` if the
/// map is in order or merely reversed.
///
/// Maps with fewer than three segments are never scrambled.
pub fn detect_scrambling(segments: &[Correspondence]) -> Option<Permutation> {
    let (mic_order, mac_order) = segment_orders(segments);

    if mac_order == mic_order {
        return None;
    }
    if mac_order.iter().eq(mic_order.iter().rev()) {
        return None;
    }

    Some(Permutation(
        mac_order.iter().map(|&idx| mic_order[idx]).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Interval, Position};

    /// Build segments from MIC and MAC end coordinates; starts sit 5bp before.
    fn segments(mic_ends: &[Position], mac_ends: &[Position]) -> Vec<Correspondence> {
        mic_ends
            .iter()
            .zip(mac_ends)
            .map(|(&mic, &mac)| {
                Correspondence::new(Interval::new(mic - 5, mic), Interval::new(mac - 5, mac))
            })
            .collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(detect_scrambling(&[]), None);
        assert_eq!(detect_scrambling(&segments(&[10], &[500])), None);
    }

    #[test]
    fn test_identity() {
        let segs = segments(&[10, 20, 30, 40], &[100, 200, 300, 400]);
        assert_eq!(detect_scrambling(&segs), None);
    }

    #[test]
    fn test_same_order_from_unsorted_source() {
        // both sides list segments out of order, but agree with each other
        let segs = segments(&[30, 10, 20], &[300, 100, 200]);
        assert_eq!(detect_scrambling(&segs), None);
    }

    #[test]
    fn test_reversal() {
        let segs = segments(&[10, 20, 30], &[30, 20, 10]);
        assert_eq!(segment_orders(&segs).1, vec![2, 1, 0]);
        assert_eq!(detect_scrambling(&segs), None);
    }

    #[test]
    fn test_two_segments_never_scrambled() {
        assert_eq!(detect_scrambling(&segments(&[10, 20], &[20, 10])), None);
    }

    #[test]
    fn test_permutation() {
        let segs = segments(&[10, 20, 30], &[30, 10, 20]);
        let (mic_order, mac_order) = segment_orders(&segs);
        assert_eq!(mic_order, vec![0, 1, 2]);
        assert_eq!(mac_order, vec![1, 2, 0]);

        let perm = detect_scrambling(&segs).unwrap();
        assert_eq!(perm.as_slice(), &[1, 2, 0]);
        assert_eq!(perm.to_string(), "1:2:0");
    }

    #[test]
    fn test_permutation_with_unsorted_mic() {
        let segs = segments(&[20, 10, 40, 30], &[100, 200, 300, 400]);
        let (mic_order, mac_order) = segment_orders(&segs);
        assert_eq!(mic_order, vec![1, 0, 3, 2]);
        assert_eq!(mac_order, vec![0, 1, 2, 3]);
        assert_eq!(detect_scrambling(&segs).unwrap().to_string(), "1:0:3:2");
    }

    #[test]
    fn test_equal_ends_break_ties_by_source_order() {
        let segs = segments(&[10, 20, 30], &[50, 50, 10]);
        assert_eq!(segment_orders(&segs).1, vec![2, 0, 1]);
        let first = detect_scrambling(&segs).unwrap().to_string();
        assert_eq!(first, "2:0:1");
        assert_eq!(detect_scrambling(&segs).unwrap().to_string(), first);
    }
}
