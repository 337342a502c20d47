//! Building sequence sources from GFA files.
//!
//! The reader understands the parts of [GFA 1](https://github.com/GFA-spec/GFA-spec/blob/master/GFA1.md) needed for a node-level graph:
//!
//! * `S` lines: segment name and sequence. The sequence cannot be empty or missing (`*`).
//! * `L` lines: edges between oriented segments. Overlaps are ignored.
//!
//! All other lines are skipped.
//!
//! Segments become nodes either directly, when the segment names are node identifiers, or through segment translation.
//! See [`TranslationPolicy`] for choosing between the two.
//! When segments are translated, each segment longer than [`GFAParams::max_node_length`] is split into multiple nodes.
//! The resulting [`GFAGraph`] contains the edges between the nodes, including the edges between successive nodes of a segment.

use crate::source::node_id_from_name;
use crate::{utils, SequenceSource, SourceError};

use std::collections::{BTreeSet, HashSet};
use std::io::{self, BufRead, Write};
use std::ops::Range;
use std::path::Path;
use std::str::{self, FromStr};

use gbwt::Orientation;
use gbwt::support;


//-----------------------------------------------------------------------------

/// When to translate segment names into node identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslationPolicy {
    /// Translate if a segment name is not a node identifier or a segment is too long.
    Automatic,
    /// Always translate.
    Always,
    /// Never translate. Segment names must be node identifiers, and long segments are not split.
    Never,
}

impl FromStr for TranslationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(TranslationPolicy::Automatic),
            "always" => Ok(TranslationPolicy::Always),
            "never" => Ok(TranslationPolicy::Never),
            _ => Err(format!("Invalid translation policy: {} (expected auto, always, or never)", s)),
        }
    }
}

/// Parameters for building a [`GFAGraph`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GFAParams {
    /// First node identifier for translated segments.
    pub start_id: usize,
    /// Maximum length of a node created by segment translation.
    pub max_node_length: usize,
    /// When to translate segments.
    pub translation: TranslationPolicy,
}

impl GFAParams {
    /// Default maximum node length.
    pub const MAX_NODE_LENGTH: usize = 1024;
}

impl Default for GFAParams {
    fn default() -> Self {
        Self {
            start_id: SequenceSource::START_ID,
            max_node_length: Self::MAX_NODE_LENGTH,
            translation: TranslationPolicy::Automatic,
        }
    }
}

//-----------------------------------------------------------------------------

/// A node-level graph built from a GFA file.
///
/// Edges are stored in canonical form: an edge and its reverse `(flip(to), flip(from))` are the same edge.
///
/// # Examples
///
/// ```
/// use gbz_source::{gfa, GFAParams};
/// use gbwt::Orientation;
/// use gbwt::support;
///
/// let input = "S\tleft\tGATTACA\nS\tright\tCAT\nL\tleft\t+\tright\t-\t0M\n";
/// let params = GFAParams { max_node_length: 4, ..GFAParams::default() };
/// let graph = gfa::read_gfa(input.as_bytes(), &params).unwrap();
///
/// assert_eq!(graph.segment_count(), 2);
/// let source = graph.source();
/// assert_eq!(source.segment_range("left").unwrap(), 1..3);
/// assert_eq!(source.segment_range("right").unwrap(), 3..4);
///
/// // The edge between the nodes of `left` and the edge from `left` to `right`.
/// assert_eq!(graph.link_count(), 2);
/// let from = support::encode_node(2, Orientation::Forward);
/// let to = support::encode_node(3, Orientation::Reverse);
/// assert!(graph.has_link(from, to));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GFAGraph {
    source: SequenceSource,
    links: BTreeSet<(usize, usize)>,
    segments: usize,
}

impl GFAGraph {
    /// Returns the node sequences and the segment translation.
    #[inline]
    pub fn source(&self) -> &SequenceSource {
        &self.source
    }

    /// Consumes the graph and returns the node sequences.
    pub fn into_source(self) -> SequenceSource {
        self.source
    }

    /// Returns the number of distinct segments in the input.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Returns the number of edges.
    #[inline]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Returns an iterator over the edges as `(from, to)` handle pairs in canonical form.
    pub fn link_iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.links.iter().copied()
    }

    /// Returns `true` if the graph contains an edge from `from` to `to` in either direction.
    pub fn has_link(&self, from: usize, to: usize) -> bool {
        self.links.contains(&canonical_link(from, to))
    }

    fn add_link(&mut self, from: usize, to: usize) {
        self.links.insert(canonical_link(from, to));
    }
}

fn flip(handle: usize) -> usize {
    let (node_id, orientation) = support::decode_node(handle);
    match orientation {
        Orientation::Forward => support::encode_node(node_id, Orientation::Reverse),
        Orientation::Reverse => support::encode_node(node_id, Orientation::Forward),
    }
}

fn canonical_link(from: usize, to: usize) -> (usize, usize) {
    (from, to).min((flip(to), flip(from)))
}

//-----------------------------------------------------------------------------

// Segments in the order they were encountered. Sequences are stored in a single buffer.
#[derive(Default)]
struct Segments {
    names: Vec<String>,
    sequences: Vec<Range<usize>>,
    buffer: Vec<u8>,
    seen: HashSet<String>,
}

impl Segments {
    fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> + '_ {
        self.names.iter().zip(self.sequences.iter())
            .map(|(name, range)| (name.as_str(), &self.buffer[range.clone()]))
    }

    // Returns `false` if the segment already exists.
    fn insert(&mut self, name: &str, sequence: &[u8]) -> bool {
        if !self.seen.insert(name.to_owned()) {
            return false;
        }
        let start = self.buffer.len();
        self.buffer.extend_from_slice(sequence);
        self.names.push(name.to_owned());
        self.sequences.push(start..self.buffer.len());
        true
    }
}

struct Link {
    from: (String, Orientation),
    to: (String, Orientation),
    line: usize,
}

fn parse_name(field: &[u8], line: usize) -> Result<&str, SourceError> {
    let name = str::from_utf8(field).map_err(|err| SourceError::parse(line, format!("Invalid segment name: {}", err)))?;
    if name.is_empty() {
        return Err(SourceError::parse(line, "Empty segment name"));
    }
    Ok(name)
}

fn parse_orientation(field: &[u8], line: usize) -> Result<Orientation, SourceError> {
    match field {
        b"+" => Ok(Orientation::Forward),
        b"-" => Ok(Orientation::Reverse),
        _ => Err(SourceError::parse(line, format!("Invalid orientation: {}", String::from_utf8_lossy(field)))),
    }
}

fn parse_lines<R: BufRead>(mut reader: R) -> Result<(Segments, Vec<Link>), SourceError> {
    let mut segments = Segments::default();
    let mut links: Vec<Link> = Vec::new();

    let mut buf: Vec<u8> = Vec::new();
    let mut line_num = 0;
    loop {
        buf.clear();
        let len = reader.read_until(b'\n', &mut buf)?;
        if len == 0 {
            break;
        }
        line_num += 1;
        while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
            buf.pop();
        }

        let fields: Vec<&[u8]> = buf.split(|c| *c == b'\t').collect();
        match fields[0] {
            b"S" => {
                if fields.len() < 3 {
                    return Err(SourceError::parse(line_num, "Segment line must have at least 3 fields"));
                }
                let name = parse_name(fields[1], line_num)?;
                let sequence = fields[2];
                if sequence.is_empty() || sequence == b"*" {
                    return Err(SourceError::parse(line_num, format!("Segment {} has no sequence", name)));
                }
                if !segments.insert(name, sequence) {
                    log::warn!("Line {}: ignoring duplicate segment {}", line_num, name);
                }
            },
            b"L" => {
                if fields.len() < 5 {
                    return Err(SourceError::parse(line_num, "Link line must have at least 5 fields"));
                }
                let from = (parse_name(fields[1], line_num)?.to_owned(), parse_orientation(fields[2], line_num)?);
                let to = (parse_name(fields[3], line_num)?.to_owned(), parse_orientation(fields[4], line_num)?);
                links.push(Link { from, to, line: line_num });
            },
            _ => {},
        }
    }

    Ok((segments, links))
}

fn use_translation(segments: &Segments, params: &GFAParams) -> bool {
    match params.translation {
        TranslationPolicy::Always => true,
        TranslationPolicy::Never => false,
        TranslationPolicy::Automatic => segments.iter().any(|(name, sequence)| {
            node_id_from_name(name).is_none() || sequence.len() > params.max_node_length
        }),
    }
}

//-----------------------------------------------------------------------------

/// Reads a GFA file and builds a node-level graph.
///
/// Duplicate segments are ignored with a warning.
/// Returns an error if the input is malformed, a link refers to an unknown segment, `params.max_node_length == 0`, or the policy is [`TranslationPolicy::Never`] and a segment name is not a node identifier.
pub fn read_gfa<R: BufRead>(reader: R, params: &GFAParams) -> Result<GFAGraph, SourceError> {
    if params.max_node_length == 0 {
        return Err(SourceError::InvalidArgument(String::from("Maximum node length must be positive")));
    }
    let (segments, links) = parse_lines(reader)?;

    let translate = use_translation(&segments, params);
    let mut source = SequenceSource::new(params.start_id)?;
    for (name, sequence) in segments.iter() {
        if translate {
            source.translate_segment(name, sequence, params.max_node_length)?;
        } else {
            let node_id = node_id_from_name(name).ok_or_else(|| {
                SourceError::InvalidArgument(format!("Segment name {} is not a node identifier", name))
            })?;
            source.add_node(node_id, sequence)?;
        }
    }

    let mut graph = GFAGraph {
        source,
        links: BTreeSet::new(),
        segments: segments.names.len(),
    };

    // Edges within translated segments.
    let mut internal: Vec<(usize, usize)> = Vec::new();
    for (_, range) in graph.source.translation().iter() {
        for node_id in range.start..range.end - 1 {
            internal.push((
                support::encode_node(node_id, Orientation::Forward),
                support::encode_node(node_id + 1, Orientation::Forward),
            ));
        }
    }
    for (from, to) in internal {
        graph.add_link(from, to);
    }

    for link in links.iter() {
        let (from, to) = graph.source.link_handles(
            (link.from.0.as_str(), link.from.1),
            (link.to.0.as_str(), link.to.1)
        ).map_err(|err| SourceError::parse(link.line, err.to_string()))?;
        graph.add_link(from, to);
    }

    log::info!(
        "Read {} segments as {} nodes ({} bp) with {} edges{}",
        graph.segment_count(), graph.source.node_count(), graph.source.total_length(), graph.link_count(),
        if translate { " using segment translation" } else { "" }
    );
    Ok(graph)
}

/// Reads a GFA file, which may be gzip-compressed, and builds a node-level graph.
///
/// See [`read_gfa`] for details.
pub fn load_gfa<P: AsRef<Path>>(filename: P, params: &GFAParams) -> Result<GFAGraph, SourceError> {
    let reader = utils::open_file(filename)?;
    read_gfa(reader, params)
}

//-----------------------------------------------------------------------------

/// Writes the node-level graph in GFA 1.1 format.
///
/// Each node becomes a segment named after the node identifier.
/// Edges are written as links in canonical form.
pub fn write_gfa<T: Write>(graph: &GFAGraph, output: &mut T) -> io::Result<()> {
    output.write_all(b"H\tVN:Z:1.1\n")?;

    let source = graph.source();
    for node_id in source.node_iter() {
        if let Some(sequence) = source.forward_sequence(node_id) {
            write_gfa_segment(node_id, sequence, output)?;
        }
    }

    for (from, to) in graph.link_iter() {
        write_gfa_link(support::decode_node(from), support::decode_node(to), output)?;
    }

    Ok(())
}

fn write_gfa_segment<T: Write>(node_id: usize, sequence: &[u8], output: &mut T) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::with_capacity(sequence.len() + 16);
    buffer.extend_from_slice(b"S\t");
    utils::append_usize(&mut buffer, node_id);
    buffer.push(b'\t');
    buffer.extend_from_slice(sequence);
    buffer.push(b'\n');
    output.write_all(&buffer)
}

fn write_gfa_link<T: Write>(from: (usize, Orientation), to: (usize, Orientation), output: &mut T) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    buffer.extend_from_slice(b"L\t");
    utils::append_usize(&mut buffer, from.0);
    match from.1 {
        Orientation::Forward => buffer.extend_from_slice(b"\t+\t"),
        Orientation::Reverse => buffer.extend_from_slice(b"\t-\t"),
    }
    utils::append_usize(&mut buffer, to.0);
    match to.1 {
        Orientation::Forward => buffer.extend_from_slice(b"\t+\t0M\n"),
        Orientation::Reverse => buffer.extend_from_slice(b"\t-\t0M\n"),
    }
    output.write_all(&buffer)
}

//-----------------------------------------------------------------------------
