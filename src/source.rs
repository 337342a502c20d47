//! Node sequences and segment translation.

use crate::translation::{self, SegmentTranslation};
use crate::{complement, SourceError};

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::mem;
use std::ops::Range;

use gbwt::{Orientation, ENDMARKER};
use gbwt::support;


//-----------------------------------------------------------------------------

/// Node sequences for building a graph, with an optional translation from segment names to node identifiers.
///
/// All sequences are stored in a single buffer, and each node refers to an `(offset, length)` range of it.
/// Only the forward orientation is stored; the reverse orientation is computed on demand.
/// Nodes are accessed by handles, which are [`gbwt::GBWT`] node identifiers encoding both the node identifier and the orientation.
/// Node identifier [`ENDMARKER`] is reserved and cannot be used.
/// Identifiers larger than [`SequenceSource::MAX_NODE_ID`] do not fit in a handle.
///
/// A segment can be translated into a run of nodes with consecutive identifiers using [`SequenceSource::translate_segment`].
/// The identifiers are assigned in the order the segments arrive, starting from the identifier given to [`SequenceSource::new`].
///
/// Stored data is never modified or removed.
/// Adding an existing node, translating a known segment, or adding an empty sequence does nothing.
///
/// # Examples
///
/// ```
/// use gbz_source::SequenceSource;
/// use gbwt::Orientation;
/// use gbwt::support;
///
/// let mut source = SequenceSource::new(1).unwrap();
/// source.translate_segment("S1", b"ACGTAC", 3).unwrap();
/// assert_eq!(source.segment_range("S1").unwrap(), 1..3);
/// assert_eq!(source.next_id(), 3);
///
/// let forward = support::encode_node(1, Orientation::Forward);
/// assert_eq!(source.sequence(forward).unwrap().as_ref(), b"ACG");
/// let reverse = support::encode_node(2, Orientation::Reverse);
/// assert_eq!(source.sequence(reverse).unwrap().as_ref(), b"GTA");
///
/// assert_eq!(source.segment_sequence("S1").unwrap(), b"ACGTAC");
/// assert!(source.sequence(support::encode_node(3, Orientation::Forward)).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceSource {
    // Forward handle to (offset, length) in `sequences`.
    nodes: BTreeMap<usize, (usize, usize)>,

    // Concatenated node sequences.
    sequences: Vec<u8>,

    translation: SegmentTranslation,

    // Next identifier to assign in segment translation.
    next_id: usize,
}

impl SequenceSource {
    /// Default identifier for the first translated node.
    pub const START_ID: usize = 1;

    /// Largest node identifier that can be encoded as a handle.
    pub const MAX_NODE_ID: usize = usize::MAX / 2;

    /// Creates an empty source that assigns node identifiers starting from `start_id`.
    ///
    /// Returns an error if `start_id` is the reserved identifier [`ENDMARKER`] or larger than [`SequenceSource::MAX_NODE_ID`].
    pub fn new(start_id: usize) -> Result<Self, SourceError> {
        check_node_id(start_id)?;
        Ok(SequenceSource {
            nodes: BTreeMap::new(),
            sequences: Vec::new(),
            translation: SegmentTranslation::new(),
            next_id: start_id,
        })
    }

    /// Exchanges the contents of the two sources.
    pub fn swap(&mut self, another: &mut SequenceSource) {
        mem::swap(self, another);
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if there are no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the total length of the node sequences.
    #[inline]
    pub fn total_length(&self) -> usize {
        self.sequences.len()
    }

    /// Returns the identifier the next translated segment will start from.
    #[inline]
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    /// Returns the smallest node identifier, or [`None`] if there are no nodes.
    pub fn min_node(&self) -> Option<usize> {
        self.nodes.keys().next().map(|handle| support::node_id(*handle))
    }

    /// Returns the largest node identifier, or [`None`] if there are no nodes.
    pub fn max_node(&self) -> Option<usize> {
        self.nodes.keys().next_back().map(|handle| support::node_id(*handle))
    }

    /// Returns `true` if the node exists.
    #[inline]
    pub fn has_node(&self, node_id: usize) -> bool {
        forward_handle(node_id).is_some_and(|handle| self.nodes.contains_key(&handle))
    }

    /// Returns the length of the node, or [`None`] if there is no such node.
    #[inline]
    pub fn node_len(&self, node_id: usize) -> Option<usize> {
        self.nodes.get(&forward_handle(node_id)?).map(|(_, len)| *len)
    }

    /// Returns an iterator over the forward handles in increasing order.
    pub fn handle_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.keys().copied()
    }

    /// Returns an iterator over the node identifiers in increasing order.
    pub fn node_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.keys().map(|handle| support::node_id(*handle))
    }

    /// Returns the forward sequence of the node, or [`None`] if there is no such node.
    pub fn forward_sequence(&self, node_id: usize) -> Option<&[u8]> {
        let (offset, len) = *self.nodes.get(&forward_handle(node_id)?)?;
        Some(&self.sequences[offset..offset + len])
    }

    /// Returns the sequence of the node in the orientation given by the handle.
    ///
    /// The forward sequence is borrowed from the source, while the reverse complement is computed on demand.
    /// Returns an error if there is no such node.
    pub fn sequence(&self, handle: usize) -> Result<Cow<'_, [u8]>, SourceError> {
        let (node_id, orientation) = support::decode_node(handle);
        let sequence = self.forward_sequence(node_id).ok_or(SourceError::NodeNotFound(node_id))?;
        match orientation {
            Orientation::Forward => Ok(Cow::Borrowed(sequence)),
            Orientation::Reverse => Ok(Cow::Owned(complement::reverse_complement(sequence))),
        }
    }

    //-------------------------------------------------------------------------

    /// Adds a node with the given identifier and sequence.
    ///
    /// Does nothing if the sequence is empty or the node already exists.
    /// If the identifier is at least [`SequenceSource::next_id`], segment translation will continue after it.
    /// Returns an error if the identifier is reserved or too large.
    pub fn add_node(&mut self, node_id: usize, sequence: &[u8]) -> Result<(), SourceError> {
        check_node_id(node_id)?;
        if self.insert_node(node_id, sequence) {
            self.next_id = self.next_id.max(node_id + 1);
        }
        Ok(())
    }

    // Returns `true` if the node was inserted. The identifier must be valid.
    fn insert_node(&mut self, node_id: usize, sequence: &[u8]) -> bool {
        let handle = support::encode_node(node_id, Orientation::Forward);
        if sequence.is_empty() || self.nodes.contains_key(&handle) {
            return false;
        }
        let offset = self.sequences.len();
        self.sequences.extend_from_slice(sequence);
        self.nodes.insert(handle, (offset, sequence.len()));
        true
    }

    /// Translates a segment into nodes of length at most `max_length`.
    ///
    /// The segment becomes `ceil(sequence.len() / max_length)` nodes with consecutive identifiers starting from [`SequenceSource::next_id`].
    /// Node `k` contains the residues starting from offset `k * max_length`.
    /// Does nothing if the segment has already been translated or the sequence is empty.
    /// Returns an error without changing anything if `max_length == 0` or the identifiers would exceed [`SequenceSource::MAX_NODE_ID`].
    pub fn translate_segment(&mut self, name: &str, sequence: &[u8], max_length: usize) -> Result<(), SourceError> {
        if max_length == 0 {
            return Err(SourceError::InvalidArgument(String::from("Maximum node length must be positive")));
        }
        if self.translation.contains(name) || sequence.is_empty() {
            return Ok(());
        }

        let start = self.next_id;
        let limit = start.checked_add(translation::chunk_count(sequence.len(), max_length))
            .filter(|limit| *limit - 1 <= Self::MAX_NODE_ID)
            .ok_or_else(|| SourceError::InvalidArgument(format!("Not enough node identifiers for segment {}", name)))?;
        for (node_id, chunk) in (start..limit).zip(translation::chunk_ranges(sequence.len(), max_length)) {
            self.insert_node(node_id, &sequence[chunk]);
        }
        log::debug!("Translated segment {} ({} bp) to nodes {}..{}", name, sequence.len(), start, limit);

        self.translation.insert(name, start..limit);
        self.next_id = limit;
        Ok(())
    }

    //-------------------------------------------------------------------------

    /// Returns `true` if at least one segment has been translated.
    #[inline]
    pub fn uses_translation(&self) -> bool {
        !self.translation.is_empty()
    }

    /// Returns the segment translation.
    #[inline]
    pub fn translation(&self) -> &SegmentTranslation {
        &self.translation
    }

    /// Returns the half-open range of node identifiers for the segment.
    ///
    /// If no segment has been translated, the name must be a node identifier (see [`node_id_from_name`]).
    /// Returns an error if there is no such segment.
    pub fn segment_range(&self, name: &str) -> Result<Range<usize>, SourceError> {
        if self.uses_translation() {
            return self.translation.get(name).ok_or_else(|| SourceError::SegmentNotFound(name.to_owned()));
        }
        match node_id_from_name(name) {
            Some(node_id) if self.has_node(node_id) => Ok(node_id..node_id + 1),
            _ => Err(SourceError::SegmentNotFound(name.to_owned())),
        }
    }

    /// Returns the handles that spell the segment in the given orientation.
    ///
    /// In reverse orientation, the nodes are listed in reverse order.
    pub fn segment_handles(&self, name: &str, orientation: Orientation) -> Result<Vec<usize>, SourceError> {
        let range = self.segment_range(name)?;
        let result = match orientation {
            Orientation::Forward => range.map(|id| support::encode_node(id, orientation)).collect(),
            Orientation::Reverse => range.rev().map(|id| support::encode_node(id, orientation)).collect(),
        };
        Ok(result)
    }

    /// Returns the sequence of the segment in forward orientation.
    pub fn segment_sequence(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        let mut result = Vec::new();
        for node_id in self.segment_range(name)? {
            let sequence = self.forward_sequence(node_id).ok_or(SourceError::NodeNotFound(node_id))?;
            result.extend_from_slice(sequence);
        }
        Ok(result)
    }

    /// Translates an edge between two oriented segments into an edge between node handles.
    ///
    /// The edge leaves from the last node of `from` and enters the first node of `to` in the given orientations.
    pub fn link_handles(&self, from: (&str, Orientation), to: (&str, Orientation)) -> Result<(usize, usize), SourceError> {
        let from_range = self.segment_range(from.0)?;
        let to_range = self.segment_range(to.0)?;
        let from_id = match from.1 {
            Orientation::Forward => from_range.end - 1,
            Orientation::Reverse => from_range.start,
        };
        let to_id = match to.1 {
            Orientation::Forward => to_range.start,
            Orientation::Reverse => to_range.end - 1,
        };
        Ok((support::encode_node(from_id, from.1), support::encode_node(to_id, to.1)))
    }
}

impl Default for SequenceSource {
    fn default() -> Self {
        SequenceSource {
            nodes: BTreeMap::new(),
            sequences: Vec::new(),
            translation: SegmentTranslation::new(),
            next_id: Self::START_ID,
        }
    }
}

//-----------------------------------------------------------------------------

/// Returns the node identifier corresponding to the segment name, if the name is a node identifier.
///
/// The name must be the canonical decimal representation of a valid identifier: no sign, no leading zeros, not [`ENDMARKER`], and at most [`SequenceSource::MAX_NODE_ID`].
pub fn node_id_from_name(name: &str) -> Option<usize> {
    let node_id = name.parse::<usize>().ok()?;
    if node_id == ENDMARKER || node_id > SequenceSource::MAX_NODE_ID || node_id.to_string() != name {
        return None;
    }
    Some(node_id)
}

fn check_node_id(node_id: usize) -> Result<(), SourceError> {
    if node_id == ENDMARKER {
        return Err(SourceError::InvalidArgument(format!("Node identifier {} is reserved", ENDMARKER)));
    }
    if node_id > SequenceSource::MAX_NODE_ID {
        return Err(SourceError::InvalidArgument(format!("Node identifier {} is too large", node_id)));
    }
    Ok(())
}

// Returns [`None`] if the identifier does not fit in a handle.
#[inline]
fn forward_handle(node_id: usize) -> Option<usize> {
    if node_id > SequenceSource::MAX_NODE_ID {
        return None;
    }
    Some(support::encode_node(node_id, Orientation::Forward))
}

//-----------------------------------------------------------------------------
