//! The rearrangement map dataset and the contig length table.
//!
//! A dataset is an XML `mapSet` of `map` records, each naming its MIC locus
//! and MAC contig and listing its MDS:
//!
//! ```text
//! <mapSet>
//!   <map id="m1">
//!     <mic>locus_12</mic>
//!     <mac>contig_7</mac>
//!     <mds>
//!       <mic start="1040" end="1210"/>
//!       <mac start="0" end="170"/>
//!     </mds>
//!     ...
//!   </map>
//! </mapSet>
//! ```
//!
//! Annotated datasets additionally carry `<valid/>` and
//! `<scrambled order="..."/>` markers between the names and the MDS. Only
//! the fields above are modelled by [`MapSet`]. A [`MapDocument`] keeps the
//! XML it was read from, so annotating it rewrites the markers and passes
//! every other element, attribute and comment through untouched.

use csv::ReaderBuilder;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Read, Write};

use crate::error::MdsMapError;
use crate::file::{open_writer, InputFile};
use crate::interval::{Correspondence, Interval, Position};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A full dataset of rearrangement maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "mapSet")]
pub struct MapSet {
    #[serde(rename = "map", default)]
    pub maps: Vec<RearrangementMap>,
}

/// One MIC locus to MAC contig map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RearrangementMap {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "mic")]
    pub mic_locus: String,
    #[serde(rename = "mac")]
    pub mac_contig: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<ValidMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrambled: Option<ScrambledMarker>,
    #[serde(rename = "mds", default)]
    pub segments: Vec<Mds>,
}

/// Marks a map whose MAC contig is completely covered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidMarker {}

/// Marks a scrambled map, carrying its permutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrambledMarker {
    #[serde(rename = "@order")]
    pub order: String,
}

/// A single MDS: its MIC and MAC coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mds {
    pub mic: Coords,
    pub mac: Coords,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coords {
    #[serde(rename = "@start")]
    pub start: Position,
    #[serde(rename = "@end")]
    pub end: Position,
}

impl From<Coords> for Interval {
    fn from(coords: Coords) -> Self {
        Interval::new(coords.start, coords.end)
    }
}

impl RearrangementMap {
    /// The map's MDS as MIC/MAC interval pairs, in document order.
    pub fn correspondences(&self) -> Vec<Correspondence> {
        self.segments
            .iter()
            .map(|mds| Correspondence::new(mds.mic.into(), mds.mac.into()))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.valid.is_some()
    }

    /// The scrambling permutation string, if the map is marked scrambled.
    pub fn scrambling_order(&self) -> Option<&str> {
        self.scrambled.as_ref().map(|marker| marker.order.as_str())
    }
}

impl MapSet {
    /// Parse a dataset from XML.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<MapSet, MdsMapError> {
        Ok(quick_xml::de::from_reader(reader)?)
    }

    /// Read a dataset from a (possibly gzip-compressed) XML file.
    pub fn from_path(filepath: &str) -> Result<MapSet, MdsMapError> {
        let reader = InputFile::new(filepath).reader()?;
        let map_set = MapSet::from_reader(reader)?;
        log::info!("read {} maps from '{}'", map_set.len(), filepath);
        Ok(map_set)
    }

    /// Return the number of maps.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Serialize to indented XML, including the XML declaration.
    pub fn to_xml(&self) -> Result<String, MdsMapError> {
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        self.serialize(serializer)?;
        Ok(format!("{}\n{}\n", XML_DECLARATION, body))
    }
}

/// Annotation markers to place on one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapMarkers {
    pub valid: bool,
    pub scrambled: Option<String>,
}

fn is_marker(name: &[u8]) -> bool {
    name == b"valid" || name == b"scrambled"
}

fn is_whitespace(text: &BytesText) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn write_markers<W: Write>(
    writer: &mut Writer<W>,
    markers: &MapMarkers,
    indent: Option<&BytesText>,
) -> Result<(), MdsMapError> {
    if markers.valid {
        if let Some(ws) = indent {
            writer.write_event(Event::Text(ws.clone()))?;
        }
        writer.write_event(Event::Empty(BytesStart::new("valid")))?;
    }
    if let Some(order) = &markers.scrambled {
        if let Some(ws) = indent {
            writer.write_event(Event::Text(ws.clone()))?;
        }
        let scrambled = BytesStart::new("scrambled").with_attributes([("order", order.as_str())]);
        writer.write_event(Event::Empty(scrambled))?;
    }
    Ok(())
}

/// A dataset together with the XML text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDocument {
    source: String,
    map_set: MapSet,
}

impl MapDocument {
    /// Parse a dataset, keeping its XML text.
    pub fn from_xml(source: String) -> Result<MapDocument, MdsMapError> {
        let map_set = quick_xml::de::from_str(&source)?;
        Ok(MapDocument { source, map_set })
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<MapDocument, MdsMapError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        MapDocument::from_xml(source)
    }

    /// Read a dataset from a (possibly gzip-compressed) XML file.
    pub fn from_path(filepath: &str) -> Result<MapDocument, MdsMapError> {
        let reader = InputFile::new(filepath).reader()?;
        let document = MapDocument::from_reader(reader)?;
        log::info!("read {} maps from '{}'", document.map_set.len(), filepath);
        Ok(document)
    }

    /// Serialize `map_set` into a new document.
    pub fn from_map_set(map_set: &MapSet) -> Result<MapDocument, MdsMapError> {
        Ok(MapDocument {
            source: map_set.to_xml()?,
            map_set: map_set.clone(),
        })
    }

    pub fn map_set(&self) -> &MapSet {
        &self.map_set
    }

    pub fn as_xml(&self) -> &str {
        &self.source
    }

    /// Rewrite the `valid` and `scrambled` markers of every map.
    ///
    /// Markers already present are removed, along with the whitespace before
    /// them. New markers go directly after the map's `<mac>` element, using
    /// the indentation found before `<mac>`. Everything else is written back
    /// as read.
    pub fn rewrite_markers<F>(&self, mut markers_for: F) -> Result<String, MdsMapError>
    where
        F: FnMut(&RearrangementMap) -> MapMarkers,
    {
        let mut reader = Reader::from_str(&self.source);
        let mut writer = Writer::new(Vec::with_capacity(self.source.len()));

        // number of open elements
        let mut depth = 0usize;
        let mut next_map = 0usize;
        let mut in_map = false;
        let mut markers: Option<MapMarkers> = None;
        // whitespace between children of a map, held back until we know
        // whether the next child is a stale marker
        let mut pending: Option<BytesText> = None;
        let mut mac_indent: Option<BytesText> = None;
        // depth to return to when skipping a stale marker with content
        let mut skipping: Option<usize> = None;

        loop {
            let event = reader.read_event()?;

            if let Some(level) = skipping {
                match event {
                    Event::Start(_) => depth += 1,
                    Event::End(_) => {
                        depth -= 1;
                        if depth == level {
                            skipping = None;
                        }
                    }
                    Event::Eof => break,
                    _ => {}
                }
                continue;
            }

            let level = match event {
                Event::End(_) => depth.saturating_sub(1),
                _ => depth,
            };
            let child_of_map = in_map && level == 2;

            match event {
                Event::Text(text) if child_of_map && is_whitespace(&text) => {
                    if let Some(ws) = pending.replace(text) {
                        writer.write_event(Event::Text(ws))?;
                    }
                }
                Event::Start(start) if child_of_map && is_marker(start.name().as_ref()) => {
                    pending = None;
                    skipping = Some(depth);
                    depth += 1;
                }
                Event::Empty(empty) if child_of_map && is_marker(empty.name().as_ref()) => {
                    pending = None;
                }
                Event::Eof => {
                    if let Some(ws) = pending.take() {
                        writer.write_event(Event::Text(ws))?;
                    }
                    break;
                }
                event => {
                    let (opens_mac, closes_mac) = match &event {
                        Event::Start(e) => (child_of_map && e.name().as_ref() == b"mac", false),
                        Event::Empty(e) => {
                            let is_mac = child_of_map && e.name().as_ref() == b"mac";
                            (is_mac, is_mac)
                        }
                        Event::End(e) => (false, child_of_map && e.name().as_ref() == b"mac"),
                        _ => (false, false),
                    };
                    if opens_mac {
                        mac_indent = pending.clone();
                    }
                    if let Some(ws) = pending.take() {
                        writer.write_event(Event::Text(ws))?;
                    }

                    match &event {
                        Event::Start(e) => {
                            if depth == 1 && e.name().as_ref() == b"map" {
                                markers = self.map_set.maps.get(next_map).map(|map| markers_for(map));
                                next_map += 1;
                                in_map = true;
                            }
                            depth += 1;
                        }
                        Event::End(_) => {
                            depth -= 1;
                            if depth == 1 && in_map {
                                in_map = false;
                                markers = None;
                                mac_indent = None;
                            }
                        }
                        Event::Empty(e) if depth == 1 && e.name().as_ref() == b"map" => {
                            next_map += 1;
                        }
                        _ => {}
                    }

                    writer.write_event(event)?;
                    if closes_mac {
                        if let Some(map_markers) = markers.take() {
                            write_markers(&mut writer, &map_markers, mac_indent.as_ref())?;
                        }
                    }
                }
            }
        }

        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Write the document's XML.
    ///
    /// # Arguments
    ///  * `filepath`: The filepath to write to. If the filepath has a `.gz`
    ///  extension, the output will be gzip compressed. If `filepath` is
    ///  `None`, uncompressed output will be written to standard out.
    pub fn write_xml(&self, filepath: Option<&str>) -> Result<(), MdsMapError> {
        let mut writer = open_writer(filepath)?;
        writer.write_all(self.source.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Read a tab-delimited table of MAC contig names and their lengths (in
/// basepairs, excluding telomeres).
///
/// Whitespace around fields is trimmed, lines starting with `#` are skipped
/// and gzip-compressed tables are supported. A repeated contig keeps its
/// last length.
pub fn read_contig_lengths(filepath: &str) -> Result<IndexMap<String, Position>, MdsMapError> {
    let reader = InputFile::new(filepath).reader()?;
    let lengths = read_contig_lengths_from(reader)?;
    log::info!("read {} contig lengths from '{}'", lengths.len(), filepath);
    Ok(lengths)
}

fn read_contig_lengths_from<R: BufRead>(
    reader: R,
) -> Result<IndexMap<String, Position>, MdsMapError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut lengths = IndexMap::new();

    for result in rdr.records() {
        let record = result?;
        let contig = record.get(0).ok_or(MdsMapError::MissingField)?;
        if contig.is_empty() && record.len() == 1 {
            // blank line
            continue;
        }
        let length_str = record.get(1).ok_or(MdsMapError::MissingField)?;
        let length: Position = length_str.parse().map_err(|_| {
            MdsMapError::ParseError(format!(
                "failed to parse length of contig '{}' from string: {}",
                contig, length_str
            ))
        })?;
        lengths.insert(contig.to_string(), length);
    }

    Ok(lengths)
}
