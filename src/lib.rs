//! # GBZ-source: node sequences and segment translation for GBWT-based graphs.
//!
//! Building a GBWT index and a GBZ graph from GFA requires turning the segments of the GFA file into nodes.
//! This crate handles that part of the construction.
//! The index itself is built elsewhere from the resulting [`SequenceSource`].
//!
//! ### Basic concepts
//!
//! Nodes are accessed by handles, which are [`gbwt::GBWT`] node identifiers.
//! A handle encodes both the identifier of the node and its orientation.
//! Only the forward orientation of each node is stored; the reverse complement is computed when needed.
//! See [`complement`] for the alphabet.
//!
//! A segment can be used as a node directly, if its name is a node identifier.
//! Otherwise, or if the segment is too long, the segment is translated into a run of nodes with consecutive identifiers.
//! The mapping from segment names to node identifier ranges is a [`SegmentTranslation`].
//! It can be stored in a translation file (see [`translation`]).
//!
//! See [`gfa`] for reading GFA files and writing the resulting node-level graph.

pub mod complement;
pub mod error;
pub mod gfa;
pub mod source;
pub mod translation;
pub mod utils;

#[cfg(test)]
pub(crate) mod internal;

pub use error::SourceError;
pub use gfa::{GFAGraph, GFAParams, TranslationPolicy};
pub use source::SequenceSource;
pub use translation::{InverseTranslation, SegmentTranslation};
