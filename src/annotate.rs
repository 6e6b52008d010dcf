//! The annotation pass over a [`MapSet`].
//!
//! Annotation runs in two strictly ordered phases:
//!
//!  1. [`Annotations::analyze`] scans every map once, recording each map's
//!     scrambling pattern and feeding its MDS into a [`ContigAggregator`].
//!     Only once all maps are aggregated is each contig validated against
//!     its length.
//!  2. [`Annotations::apply`] builds a new, annotated copy of the document
//!     from those facts. Only the markers change; all other XML content is
//!     carried over as read.
//!
//! Existing `valid` and `scrambled` markers are replaced rather than added
//! to, so re-annotating an annotated dataset with the same cutoffs returns it
//! unchanged.

use indexmap::{IndexMap, IndexSet};

use crate::aggregate::{Aggregation, ContigAggregator};
use crate::error::MdsMapError;
use crate::interval::Position;
use crate::mapset::{MapDocument, MapMarkers, MapSet, RearrangementMap};
use crate::scramble::{detect_scrambling, Permutation};
use crate::validate::{validate_contig, ValidationParams, Verdict};

/// Facts gathered about a dataset, ready to be attached to its maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    /// Contigs whose MDS cover them completely.
    pub valid_contigs: IndexSet<String>,
    /// Scrambling patterns keyed by map identifier.
    pub scrambled: IndexMap<String, Permutation>,
    /// Contigs assembled from more than one MIC locus.
    pub multi_locus_contigs: IndexSet<String>,
    /// Number of contigs that were validated.
    pub n_contigs: usize,
}

/// Counts describing one annotation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    pub maps: usize,
    pub contigs: usize,
    pub valid_contigs: usize,
    pub valid_maps: usize,
    pub scrambled_maps: usize,
    pub multi_locus_contigs: usize,
}

impl Annotations {
    /// Compute validity, scrambling and multi-locus facts for a dataset.
    ///
    /// # Arguments
    ///  * `map_set`: the dataset to analyze.
    ///  * `lengths`: MAC contig lengths, excluding telomeres.
    ///  * `params`: the validation tolerances.
    ///
    /// Fails with [`MdsMapError::MissingLength`] if any map's contig has no
    /// entry in `lengths`, whether or not the map has MDS.
    pub fn analyze(
        map_set: &MapSet,
        lengths: &IndexMap<String, Position>,
        params: &ValidationParams,
    ) -> Result<Annotations, MdsMapError> {
        params.check()?;

        let mut scrambled = IndexMap::new();
        let mut aggregator = ContigAggregator::new();

        for map in map_set.maps.iter() {
            if !lengths.contains_key(&map.mac_contig) {
                return Err(MdsMapError::MissingLength(map.mac_contig.clone()));
            }
            let segments = map.correspondences();
            if segments.is_empty() {
                log::warn!(
                    "map '{}' ({}:{}) has no MDS",
                    map.id,
                    map.mic_locus,
                    map.mac_contig
                );
            }

            if let Some(permutation) = detect_scrambling(&segments) {
                log::debug!("map '{}' is scrambled: {}", map.id, permutation);
                if scrambled.insert(map.id.clone(), permutation).is_some() {
                    log::warn!(
                        "duplicate map id '{}'; keeping the last scrambling pattern",
                        map.id
                    );
                }
            }

            aggregator.add_map(&map.mic_locus, &map.mac_contig, &segments);
        }

        let aggregation = aggregator.finish();
        let valid_contigs = validate_aggregation(&aggregation, lengths, params)?;

        Ok(Annotations {
            valid_contigs,
            scrambled,
            multi_locus_contigs: aggregation.multi_locus_contigs().clone(),
            n_contigs: aggregation.len(),
        })
    }

    /// Return an annotated copy of `document`.
    pub fn apply(&self, document: &MapDocument) -> Result<MapDocument, MdsMapError> {
        let xml = document.rewrite_markers(|map| self.markers_for(map))?;
        MapDocument::from_xml(xml)
    }

    /// The markers `map` should carry.
    pub fn markers_for(&self, map: &RearrangementMap) -> MapMarkers {
        MapMarkers {
            valid: self.valid_contigs.contains(&map.mac_contig),
            scrambled: self.scrambled.get(&map.id).map(Permutation::to_string),
        }
    }

    /// Summarize these annotations as applied to `map_set`.
    pub fn summary(&self, map_set: &MapSet) -> AnnotationSummary {
        AnnotationSummary {
            maps: map_set.len(),
            contigs: self.n_contigs,
            valid_contigs: self.valid_contigs.len(),
            valid_maps: map_set
                .maps
                .iter()
                .filter(|map| self.valid_contigs.contains(&map.mac_contig))
                .count(),
            scrambled_maps: map_set
                .maps
                .iter()
                .filter(|map| self.scrambled.contains_key(&map.id))
                .count(),
            multi_locus_contigs: self.multi_locus_contigs.len(),
        }
    }
}

fn validate_aggregation(
    aggregation: &Aggregation,
    lengths: &IndexMap<String, Position>,
    params: &ValidationParams,
) -> Result<IndexSet<String>, MdsMapError> {
    let mut valid_contigs = IndexSet::new();
    for (contig, segments) in aggregation.iter() {
        let length = *lengths
            .get(contig)
            .ok_or_else(|| MdsMapError::MissingLength(contig.clone()))?;
        match validate_contig(contig, &segments.intervals, length, params)? {
            Verdict::Valid => {
                valid_contigs.insert(contig.clone());
            }
            verdict => log::debug!("contig '{}' is invalid: {:?}", contig, verdict),
        }
    }
    Ok(valid_contigs)
}

/// Annotate a dataset in one call, returning the annotated copy together
/// with the facts it was built from.
pub fn annotate(
    document: &MapDocument,
    lengths: &IndexMap<String, Position>,
    params: &ValidationParams,
) -> Result<(MapDocument, Annotations), MdsMapError> {
    let annotations = Annotations::analyze(document.map_set(), lengths, params)?;
    let summary = annotations.summary(document.map_set());
    log::info!(
        "{} maps on {} contigs: {} valid contigs ({} maps), {} scrambled maps, {} multi-locus contigs",
        summary.maps,
        summary.contigs,
        summary.valid_contigs,
        summary.valid_maps,
        summary.scrambled_maps,
        summary.multi_locus_contigs
    );
    Ok((annotations.apply(document)?, annotations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapset::{Coords, Mds, ScrambledMarker, ValidMarker};

    fn mds(mic: (Position, Position), mac: (Position, Position)) -> Mds {
        Mds {
            mic: Coords {
                start: mic.0,
                end: mic.1,
            },
            mac: Coords {
                start: mac.0,
                end: mac.1,
            },
        }
    }

    fn map(id: &str, mic: &str, mac: &str, segments: Vec<Mds>) -> RearrangementMap {
        RearrangementMap {
            id: id.to_string(),
            mic_locus: mic.to_string(),
            mac_contig: mac.to_string(),
            segments,
            ..Default::default()
        }
    }

    fn dataset() -> (MapSet, IndexMap<String, Position>) {
        let map_set = MapSet {
            maps: vec![
                // scrambled, fully covering ctg1
                map(
                    "m1",
                    "micA",
                    "ctg1",
                    vec![
                        mds((0, 100), (200, 300)),
                        mds((150, 250), (0, 100)),
                        mds((300, 400), (95, 205)),
                    ],
                ),
                // in order, but leaves the end of ctg2 uncovered
                map(
                    "m2",
                    "micB",
                    "ctg2",
                    vec![mds((0, 100), (0, 100)), mds((200, 300), (110, 210))],
                ),
                // second locus for ctg3, split across two maps
                map("m3", "micC", "ctg3", vec![mds((0, 100), (0, 100))]),
                map("m4", "micD", "ctg3", vec![mds((500, 600), (100, 200))]),
            ],
        };
        let lengths = indexmap::indexmap! {
            "ctg1".to_string() => 300,
            "ctg2".to_string() => 400,
            "ctg3".to_string() => 220,
        };
        (map_set, lengths)
    }

    #[test]
    fn test_analyze() {
        let (map_set, lengths) = dataset();
        let annotations =
            Annotations::analyze(&map_set, &lengths, &ValidationParams::default()).unwrap();

        let valid: Vec<&str> = annotations.valid_contigs.iter().map(String::as_str).collect();
        assert_eq!(valid, vec!["ctg1", "ctg3"]);
        assert_eq!(annotations.scrambled.len(), 1);
        assert_eq!(annotations.scrambled["m1"].to_string(), "1:2:0");
        assert!(annotations.multi_locus_contigs.contains("ctg3"));
        assert_eq!(annotations.multi_locus_contigs.len(), 1);

        let summary = annotations.summary(&map_set);
        assert_eq!(
            summary,
            AnnotationSummary {
                maps: 4,
                contigs: 3,
                valid_contigs: 2,
                valid_maps: 3,
                scrambled_maps: 1,
                multi_locus_contigs: 1,
            }
        );
    }

    fn document() -> (MapDocument, IndexMap<String, Position>) {
        let (map_set, lengths) = dataset();
        (MapDocument::from_map_set(&map_set).unwrap(), lengths)
    }

    #[test]
    fn test_apply_marks_maps() {
        let (document, lengths) = document();
        let (annotated, _) = annotate(&document, &lengths, &ValidationParams::default()).unwrap();
        let maps = &annotated.map_set().maps;

        assert!(maps[0].is_valid());
        assert_eq!(maps[0].scrambling_order(), Some("1:2:0"));
        assert!(!maps[1].is_valid());
        assert_eq!(maps[1].scrambling_order(), None);
        assert!(maps[2].is_valid() && maps[3].is_valid());
        assert_eq!(maps[0].segments, document.map_set().maps[0].segments);
        // the input is left untouched
        assert!(document.map_set().maps.iter().all(|m| m.valid.is_none()));
    }

    #[test]
    fn test_reannotation_is_noop() {
        let (document, lengths) = document();
        let params = ValidationParams::default();
        let (once, _) = annotate(&document, &lengths, &params).unwrap();
        let (twice, _) = annotate(&once, &lengths, &params).unwrap();
        assert_eq!(once.as_xml(), twice.as_xml());
        assert_eq!(once.map_set(), twice.map_set());
    }

    #[test]
    fn test_stale_markers_are_replaced() {
        let (mut map_set, lengths) = dataset();
        map_set.maps[1].valid = Some(ValidMarker {});
        map_set.maps[1].scrambled = Some(ScrambledMarker {
            order: "1:0".to_string(),
        });
        let document = MapDocument::from_map_set(&map_set).unwrap();
        let (annotated, _) = annotate(&document, &lengths, &ValidationParams::default()).unwrap();
        assert!(annotated.map_set().maps[1].valid.is_none());
        assert!(annotated.map_set().maps[1].scrambled.is_none());
        assert!(!annotated.as_xml().contains(r#"order="1:0""#));
    }

    const EXTENDED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mapSet source="assembly_v2">
  <map id="m1" organism="Oxytricha">
    <mic>micA</mic>
    <mac>ctg1</mac>
    <!-- three MDS with one IES between the first two -->
    <mds id="mds1">
      <mic start="0" end="100"/>
      <mac start="200" end="300"/>
    </mds>
    <ies start="100" end="150"/>
    <mds id="mds2">
      <mic start="150" end="250"/>
      <mac start="0" end="100"/>
    </mds>
    <mds id="mds3">
      <mic start="300" end="400"/>
      <mac start="95" end="205"/>
    </mds>
  </map>
</mapSet>
"#;

    #[test]
    fn test_unmodelled_content_is_kept() {
        let document = MapDocument::from_xml(EXTENDED.to_string()).unwrap();
        let lengths = indexmap::indexmap! { "ctg1".to_string() => 300 };
        let (annotated, _) = annotate(&document, &lengths, &ValidationParams::default()).unwrap();

        let expected = EXTENDED.replace(
            "<mac>ctg1</mac>",
            "<mac>ctg1</mac>\n    <valid/>\n    <scrambled order=\"1:2:0\"/>",
        );
        assert_eq!(annotated.as_xml(), expected);
        assert!(annotated.as_xml().contains(r#"<ies start="100" end="150"/>"#));
        assert!(annotated.as_xml().contains(r#"<mapSet source="assembly_v2">"#));

        let (again, _) = annotate(&annotated, &lengths, &ValidationParams::default()).unwrap();
        assert_eq!(again.as_xml(), expected);
    }

    #[test]
    fn test_map_order_does_not_change_validity() {
        let (map_set, lengths) = dataset();
        let reversed = MapSet {
            maps: map_set.maps.iter().rev().cloned().collect(),
        };
        let params = ValidationParams::default();
        let forward = Annotations::analyze(&map_set, &lengths, &params).unwrap();
        let backward = Annotations::analyze(&reversed, &lengths, &params).unwrap();
        let mut f: Vec<_> = forward.valid_contigs.into_iter().collect();
        let mut b: Vec<_> = backward.valid_contigs.into_iter().collect();
        f.sort();
        b.sort();
        assert_eq!(f, b);
    }

    #[test]
    fn test_missing_length_is_fatal() {
        let (map_set, mut lengths) = dataset();
        lengths.shift_remove("ctg2");
        let result = Annotations::analyze(&map_set, &lengths, &ValidationParams::default());
        assert!(matches!(result, Err(MdsMapError::MissingLength(ref c)) if c == "ctg2"));
    }

    #[test]
    fn test_missing_length_without_segments_is_fatal() {
        let (mut map_set, lengths) = dataset();
        map_set.maps.push(map("m5", "micE", "ctg_unlisted", vec![]));
        let result = Annotations::analyze(&map_set, &lengths, &ValidationParams::default());
        assert!(matches!(result, Err(MdsMapError::MissingLength(ref c)) if c == "ctg_unlisted"));
    }

    #[test]
    fn test_map_without_segments_is_not_valid() {
        let (mut map_set, mut lengths) = dataset();
        map_set.maps.push(map("m5", "micE", "ctg4", vec![]));
        lengths.insert("ctg4".to_string(), 100);
        let document = MapDocument::from_map_set(&map_set).unwrap();
        let (annotated, annotations) =
            annotate(&document, &lengths, &ValidationParams::default()).unwrap();
        assert_eq!(annotations.n_contigs, 3);
        assert!(!annotated.map_set().maps[4].is_valid());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let (map_set, lengths) = dataset();
        let params = ValidationParams {
            overlap_cutoff: 1.5,
            apply_overlap_cutoff: true,
            ..Default::default()
        };
        assert!(matches!(
            Annotations::analyze(&map_set, &lengths, &params),
            Err(MdsMapError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unapplied_overlap_cutoff_is_not_checked() {
        let (map_set, lengths) = dataset();
        let params = ValidationParams {
            overlap_cutoff: 1.5,
            ..Default::default()
        };
        assert!(Annotations::analyze(&map_set, &lengths, &params).is_ok());
    }
}
