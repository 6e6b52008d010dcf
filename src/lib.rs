//! Annotation of ciliate genome rearrangement maps.
//!
//! A rearrangement map records how MDS (macronuclear destined sequences) at a
//! micronuclear (MIC) locus are reassembled, possibly out of order, into a
//! macronuclear (MAC) contig. Given a [`MapSet`] and a table of MAC contig
//! lengths, this crate determines:
//!
//!  - which contigs are *valid*, i.e. covered end to end by their MDS with
//!    only pointer overlap between neighbours ([`validate_contig`]),
//!  - which contigs are assembled from more than one MIC locus
//!    ([`ContigAggregator`]),
//!  - which maps are *scrambled*, and their permutation
//!    ([`detect_scrambling`]).
//!
//! Here is an example which annotates a dataset and prints the scrambling
//! patterns of its valid maps.
//!
//! ```no_run
//! use mdsmap::prelude::*;
//! let lengths = read_contig_lengths("contig_lengths.tsv")
//!                   .expect("could not read contig lengths");
//! let document = MapDocument::from_path("maps.xml")
//!                   .expect("cannot read maps");
//!
//! let (annotated, _) = annotate(&document, &lengths, &ValidationParams::default())
//!                   .expect("annotation failed");
//! for pattern in scrambling_patterns(annotated.map_set()) {
//!     println!("{}", pattern);
//! }
//! ```
//!
//! The same pass is available on the command line with:
//!
//! ```bash
//! mdsmap annotate maps.xml contig_lengths.tsv --output annotated.xml
//! mdsmap patterns annotated.xml
//! ```

pub mod aggregate;
pub mod annotate;
pub mod error;
pub mod file;
pub mod interval;
pub mod mapset;
pub mod report;
pub mod scramble;
pub mod validate;

pub use aggregate::{Aggregation, ContigAggregator, ContigSegments};
pub use annotate::{annotate, AnnotationSummary, Annotations};
pub use error::MdsMapError;
pub use interval::{Correspondence, Interval, Position};
pub use mapset::{read_contig_lengths, MapDocument, MapMarkers, MapSet, RearrangementMap};
pub use report::{scrambling_patterns, write_patterns, ScramblingPattern};
pub use scramble::{detect_scrambling, Permutation};
pub use validate::{validate_contig, ValidationParams, Verdict};

pub mod prelude {
    pub use crate::annotate::{annotate, Annotations};
    pub use crate::error::MdsMapError;
    pub use crate::mapset::{read_contig_lengths, MapDocument, MapSet};
    pub use crate::report::{scrambling_patterns, write_patterns};
    pub use crate::validate::ValidationParams;
}
