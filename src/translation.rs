//! Segment-to-node translation.
//!
//! A segment of arbitrary length is stored as a run of nodes with consecutive identifiers.
//! Each node except possibly the last one has exactly `max_length` residues.
//! The translation maps segment names to the half-open identifier ranges of the nodes.
//!
//! The translation is conventionally stored next to the graph in a text file with extension [`TRANSLATION_EXTENSION`].
//! Each line of the file describes one segment:
//!
//! ```text
//! T <TAB> segment name <TAB> comma-separated node identifiers
//! ```
//!
//! The lines are ordered by the first node identifier.

use crate::{utils, SequenceSource, SourceError};

use std::cmp;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::ops::Range;
use std::path::Path;

use gbwt::ENDMARKER;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// File name extension for translation files.
pub const TRANSLATION_EXTENSION: &str = ".trans";

/// Returns the number of nodes used for a segment of `len` residues.
///
/// # Panics
///
/// Panics if `max_length == 0`.
#[inline]
pub fn chunk_count(len: usize, max_length: usize) -> usize {
    len.div_ceil(max_length)
}

/// Returns the residue ranges of the nodes used for a segment of `len` residues.
///
/// # Panics
///
/// Panics if `max_length == 0`.
///
/// # Examples
///
/// ```
/// use gbz_source::translation;
///
/// let chunks: Vec<_> = translation::chunk_ranges(7, 3).collect();
/// assert_eq!(chunks, vec![0..3, 3..6, 6..7]);
/// ```
pub fn chunk_ranges(len: usize, max_length: usize) -> impl Iterator<Item = Range<usize>> {
    (0..chunk_count(len, max_length)).map(move |chunk| {
        let start = chunk * max_length;
        start..cmp::min(start + max_length, len)
    })
}

//-----------------------------------------------------------------------------

/// A mapping from segment names to ranges of node identifiers.
///
/// Ranges assigned to distinct segments never overlap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentTranslation {
    segments: HashMap<String, Range<usize>>,
}

impl SegmentTranslation {
    /// Creates an empty translation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if there are no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` if the segment has been translated.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.segments.contains_key(name)
    }

    /// Returns the node identifier range for the segment, or [`None`] if there is no such segment.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Range<usize>> {
        self.segments.get(name).cloned()
    }

    // The caller must ensure that the name is new and the range is disjoint from the existing ones.
    pub(crate) fn insert(&mut self, name: &str, range: Range<usize>) {
        self.segments.insert(name.to_owned(), range);
    }

    /// Returns an iterator over the segments in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Range<usize>)> + '_ {
        self.segments.iter().map(|(name, range)| (name.as_str(), range.clone()))
    }

    /// Returns the segments sorted by their first node identifier.
    pub fn sorted(&self) -> Vec<(&str, Range<usize>)> {
        let mut result: Vec<(&str, Range<usize>)> = self.iter().collect();
        result.sort_unstable_by_key(|(_, range)| range.start);
        result
    }

    /// Returns a structure for finding the segment for a node identifier.
    pub fn invert(&self) -> InverseTranslation {
        let segments = self.sorted().into_iter()
            .map(|(name, range)| (name.to_owned(), range))
            .collect();
        InverseTranslation { segments }
    }
}

//-----------------------------------------------------------------------------

/// A mapping from node identifiers to the segments they belong to.
///
/// # Examples
///
/// ```
/// use gbz_source::SequenceSource;
///
/// let mut source = SequenceSource::new(1).unwrap();
/// source.translate_segment("s1", b"GATTACA", 3).unwrap();
/// source.translate_segment("s2", b"CAT", 3).unwrap();
///
/// let inverse = source.translation().invert();
/// assert_eq!(inverse.segment(2), Some(("s1", 1..4)));
/// assert_eq!(inverse.locate(&source, 3), Some(("s1", 6)));
/// assert_eq!(inverse.locate(&source, 4), Some(("s2", 0)));
/// assert!(inverse.segment(5).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InverseTranslation {
    // Sorted by the first node identifier.
    segments: Vec<(String, Range<usize>)>,
}

impl InverseTranslation {
    /// Returns the name and the identifier range of the segment containing the node.
    pub fn segment(&self, node_id: usize) -> Option<(&str, Range<usize>)> {
        let index = self.segments.partition_point(|(_, range)| range.end <= node_id);
        let (name, range) = self.segments.get(index)?;
        if range.contains(&node_id) {
            Some((name.as_str(), range.clone()))
        } else {
            None
        }
    }

    /// Returns the name of the segment containing the node and the offset of the node within the segment.
    ///
    /// The offset is the total length of the preceding nodes of the same segment in `source`.
    /// Returns [`None`] if one of those nodes is missing from `source`.
    pub fn locate(&self, source: &SequenceSource, node_id: usize) -> Option<(&str, usize)> {
        let (name, range) = self.segment(node_id)?;
        let offset = (range.start..node_id).map(|id| source.node_len(id)).sum::<Option<usize>>()?;
        Some((name, offset))
    }
}

//-----------------------------------------------------------------------------

/// Writes the translation in the translation file format.
pub fn write_translation<T: Write>(translation: &SegmentTranslation, output: &mut T) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    for (name, range) in translation.sorted() {
        buffer.clear();
        buffer.extend_from_slice(b"T\t");
        buffer.extend_from_slice(name.as_bytes());
        buffer.push(b'\t');
        for id in range.clone() {
            if id > range.start {
                buffer.push(b',');
            }
            utils::append_usize(&mut buffer, id);
        }
        buffer.push(b'\n');
        output.write_all(&buffer)?;
    }
    Ok(())
}

/// Reads a translation from a reader in the translation file format.
///
/// Empty lines are ignored.
/// Returns an error if a line is malformed, a segment appears twice, node identifiers of a segment are not consecutive, or two segments share nodes.
pub fn read_translation<R: BufRead>(reader: R) -> Result<SegmentTranslation, SourceError> {
    let mut result = SegmentTranslation::new();
    let mut ranges: Vec<(Range<usize>, usize)> = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = line_num + 1;
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 || fields[0] != "T" {
            return Err(SourceError::parse(line_num, "Expected a translation line with 3 fields"));
        }
        let name = fields[1];
        if result.contains(name) {
            return Err(SourceError::parse(line_num, format!("Duplicate segment {}", name)));
        }
        let range = parse_node_range(fields[2]).map_err(|message| SourceError::parse(line_num, message))?;
        ranges.push((range.clone(), line_num));
        result.insert(name, range);
    }

    ranges.sort_unstable_by_key(|(range, _)| range.start);
    for pair in ranges.windows(2) {
        if pair[0].0.end > pair[1].0.start {
            let line_num = cmp::max(pair[0].1, pair[1].1);
            return Err(SourceError::parse(line_num, "Node identifiers overlap with another segment"));
        }
    }

    Ok(result)
}

// Parses a comma-separated list of consecutive node identifiers.
fn parse_node_range(field: &str) -> Result<Range<usize>, String> {
    let mut range: Option<Range<usize>> = None;
    for value in field.split(',') {
        let id = value.parse::<usize>().map_err(|err| format!("Invalid node identifier {}: {}", value, err))?;
        if id == ENDMARKER {
            return Err(format!("Node identifier {} is reserved", ENDMARKER));
        }
        let end = id.checked_add(1).filter(|_| id <= SequenceSource::MAX_NODE_ID)
            .ok_or_else(|| format!("Node identifier {} is too large", id))?;
        range = match range {
            None => Some(id..end),
            Some(range) if range.end == id => Some(range.start..end),
            Some(_) => return Err(format!("Node identifiers are not consecutive: {}", field)),
        };
    }
    range.ok_or(String::from("No node identifiers"))
}

/// Reads a translation from a file, which may be gzip-compressed.
pub fn load_translation<P: AsRef<Path>>(filename: P) -> Result<SegmentTranslation, SourceError> {
    let reader = utils::open_file(filename)?;
    read_translation(reader)
}

/// Writes the translation to a file.
pub fn save_translation<P: AsRef<Path>>(translation: &SegmentTranslation, filename: P) -> Result<(), SourceError> {
    let mut output = io::BufWriter::new(std::fs::File::create(filename)?);
    write_translation(translation, &mut output)?;
    output.flush()?;
    Ok(())
}

//-----------------------------------------------------------------------------
