//! Merging per-map segment lists into per-contig MAC coverage.
//!
//! A MAC contig may be the target of several maps, each contributing some of
//! its MDS. Validity can only be judged once every map has been seen, so the
//! [`ContigAggregator`] collects segments in a first phase and
//! [`ContigAggregator::finish`] freezes them into an [`Aggregation`] that the
//! validation phase consumes.

use indexmap::{IndexMap, IndexSet};

use crate::interval::{sort_by_end, Correspondence, Interval};

/// The MAC intervals assembled onto one contig, and the MIC loci they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContigSegments {
    /// MAC intervals from every contributing map, sorted by end coordinate
    /// once the aggregation is finished.
    pub intervals: Vec<Interval>,
    /// Distinct MIC loci, in order of first contribution.
    pub loci: IndexSet<String>,
}

impl ContigSegments {
    pub fn is_multi_locus(&self) -> bool {
        self.loci.len() > 1
    }
}

/// Accumulates MAC intervals by contig across all maps.
#[derive(Debug, Default)]
pub struct ContigAggregator {
    contigs: IndexMap<String, ContigSegments>,
    multi_locus: IndexSet<String>,
}

impl ContigAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one map's segments to its MAC contig.
    ///
    /// Maps without segments contribute nothing, not even their locus.
    pub fn add_map(&mut self, mic_locus: &str, mac_contig: &str, segments: &[Correspondence]) {
        if segments.is_empty() {
            return;
        }
        let entry = self.contigs.entry(mac_contig.to_string()).or_default();
        if !entry.loci.is_empty() && !entry.loci.contains(mic_locus) {
            // IndexSet::insert is a no-op for later loci on the same contig
            self.multi_locus.insert(mac_contig.to_string());
        }
        entry.loci.insert(mic_locus.to_string());
        entry.intervals.extend(segments.iter().map(|segment| segment.mac));
    }

    /// Sort every contig's intervals by end coordinate and freeze the result.
    pub fn finish(self) -> Aggregation {
        let mut contigs = self.contigs;
        for segments in contigs.values_mut() {
            sort_by_end(&mut segments.intervals);
        }
        Aggregation {
            contigs,
            multi_locus: self.multi_locus,
        }
    }
}

/// The finished, read-only contig aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    contigs: IndexMap<String, ContigSegments>,
    multi_locus: IndexSet<String>,
}

impl Aggregation {
    /// Return the number of contigs with at least one MDS.
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, contig: &str) -> Option<&ContigSegments> {
        self.contigs.get(contig)
    }

    /// Iterate over contig name and [`ContigSegments`] tuples, in order of
    /// first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContigSegments)> {
        self.contigs.iter()
    }

    /// Contigs that received MDS from more than one MIC locus, in the order
    /// they were detected.
    pub fn multi_locus_contigs(&self) -> &IndexSet<String> {
        &self.multi_locus
    }

    pub fn is_multi_locus(&self, contig: &str) -> bool {
        self.multi_locus.contains(contig)
    }
}
