//! Projecting an annotated dataset onto its scrambling patterns.
//!
//! One line is written per map that is both valid and scrambled:
//!
//! ```text
//! <MIC locus>:<MAC contig>\t<permutation>
//! ```
//!
//! A valid contig may have several scrambled maps, so each line names both
//! the locus and the contig.

use std::fmt;
use std::io::Write;

use crate::error::MdsMapError;
use crate::file::open_writer;
use crate::mapset::MapSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScramblingPattern<'a> {
    pub mic_locus: &'a str,
    pub mac_contig: &'a str,
    pub order: &'a str,
}

impl fmt::Display for ScramblingPattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}\t{}", self.mic_locus, self.mac_contig, self.order)
    }
}

/// The patterns of all valid, scrambled maps, in dataset order.
pub fn scrambling_patterns(map_set: &MapSet) -> impl Iterator<Item = ScramblingPattern<'_>> {
    map_set.maps.iter().filter_map(|map| {
        let order = map.scrambling_order()?;
        map.is_valid().then_some(ScramblingPattern {
            mic_locus: &map.mic_locus,
            mac_contig: &map.mac_contig,
            order,
        })
    })
}

/// Write the scrambling pattern report, returning the number of lines.
///
/// # Arguments
///  * `map_set`: an annotated dataset.
///  * `filepath`: the output path (gzip compressed if it ends in `.gz`), or
///  `None` for standard out.
pub fn write_patterns(map_set: &MapSet, filepath: Option<&str>) -> Result<usize, MdsMapError> {
    let mut writer = open_writer(filepath)?;
    let mut n = 0;
    for pattern in scrambling_patterns(map_set) {
        writeln!(writer, "{}", pattern)?;
        n += 1;
    }
    writer.flush()?;
    log::info!("wrote {} scrambling patterns", n);
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapset::{RearrangementMap, ScrambledMarker, ValidMarker};
    use std::fs;
    use tempfile::tempdir;

    fn map(mic: &str, mac: &str, valid: bool, order: Option<&str>) -> RearrangementMap {
        RearrangementMap {
            id: format!("{}-{}", mic, mac),
            mic_locus: mic.to_string(),
            mac_contig: mac.to_string(),
            valid: valid.then_some(ValidMarker {}),
            scrambled: order.map(|o| ScrambledMarker {
                order: o.to_string(),
            }),
            segments: vec![],
        }
    }

    fn map_set() -> MapSet {
        MapSet {
            maps: vec![
                map("micA", "ctg1", true, Some("1:2:0")),
                map("micB", "ctg1", true, None),
                map("micC", "ctg2", false, Some("0:2:1")),
                map("micD", "ctg1", true, Some("2:0:3:1")),
            ],
        }
    }

    #[test]
    fn test_selects_valid_and_scrambled() {
        let map_set = map_set();
        let lines: Vec<String> = scrambling_patterns(&map_set)
            .map(|p| p.to_string())
            .collect();
        assert_eq!(lines, vec!["micA:ctg1\t1:2:0", "micD:ctg1\t2:0:3:1"]);
    }

    #[test]
    fn test_write_patterns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patterns.txt");
        let n = write_patterns(&map_set(), path.to_str()).unwrap();
        assert_eq!(n, 2);
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "micA:ctg1\t1:2:0\nmicD:ctg1\t2:0:3:1\n");
    }
}
