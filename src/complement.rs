//! Reverse complements of nucleotide sequences.
//!
//! The substitution is a total 256-entry table: every byte has an image, and bytes outside the alphabet become [`UNKNOWN`].
//! The alphabet consists of `ACGT` and the IUPAC ambiguity codes in both upper and lower case.
//! Case is preserved.
//!
//! Structural characters used by the surrounding formats are handled by a sentinel policy.
//! The default table [`COMPLEMENT`] swaps the GBWT path boundary markers `$` and `#` and keeps the gap symbol `-`.
//! Other policies can be built with [`ComplementTable::nucleotides`] and [`ComplementTable::with_sentinel`].
//!
//! # Examples
//!
//! ```
//! use gbz_source::complement::{self, ComplementTable};
//!
//! assert_eq!(complement::reverse_complement(b"ACGTAC"), b"GTACGT".to_vec());
//! assert_eq!(complement::reverse_complement(b"$acgN#"), b"$Ncgt#".to_vec());
//!
//! // Without sentinels, the boundary markers are unknown characters.
//! let table = ComplementTable::nucleotides();
//! assert_eq!(table.reverse_complement(b"$ACG"), b"CGTN".to_vec());
//! ```

use crate::SourceError;

//-----------------------------------------------------------------------------

/// Image of every byte outside the alphabet.
pub const UNKNOWN: u8 = b'N';

// Complementary pairs in upper case. Self-complementary codes are listed as (x, x).
// IUPAC semantics: `S` and `W` are their own complements, and `Q` and `U` are not in the alphabet.
// This differs from tables that swap `S` and `W`.
const PAIRS: [(u8, u8); 9] = [
    (b'A', b'T'), (b'C', b'G'),
    (b'R', b'Y'), (b'K', b'M'), (b'B', b'V'), (b'D', b'H'),
    (b'S', b'S'), (b'W', b'W'), (b'N', b'N'),
];

/// Sentinel pairs in the default table: GBWT path boundaries and the gap symbol.
pub const DEFAULT_SENTINELS: [(u8, u8); 2] = [(b'$', b'#'), (b'-', b'-')];

const fn nucleotide_table() -> [u8; 256] {
    let mut result = [UNKNOWN; 256];
    let mut i = 0;
    while i < PAIRS.len() {
        let (a, b) = PAIRS[i];
        result[a as usize] = b; result[b as usize] = a;
        let (a, b) = (a.to_ascii_lowercase(), b.to_ascii_lowercase());
        result[a as usize] = b; result[b as usize] = a;
        i += 1;
    }
    result
}

const fn default_table() -> [u8; 256] {
    let mut result = nucleotide_table();
    let mut i = 0;
    while i < DEFAULT_SENTINELS.len() {
        let (a, b) = DEFAULT_SENTINELS[i];
        result[a as usize] = b; result[b as usize] = a;
        i += 1;
    }
    result
}

/// The process-wide complement table with the default sentinels.
pub static COMPLEMENT: ComplementTable = ComplementTable::standard();

//-----------------------------------------------------------------------------

/// A byte-to-byte complement table.
///
/// The table is an involution over the alphabet and the registered sentinels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplementTable {
    table: [u8; 256],
}

impl ComplementTable {
    /// Returns a table with the nucleotide alphabet and no sentinels.
    pub const fn nucleotides() -> Self {
        ComplementTable { table: nucleotide_table() }
    }

    /// Returns a table with the nucleotide alphabet and [`DEFAULT_SENTINELS`].
    pub const fn standard() -> Self {
        ComplementTable { table: default_table() }
    }

    /// Adds a sentinel pair `a <-> b` to the table.
    ///
    /// Use `a == b` for a self-complementary sentinel.
    /// Returns an error if either byte already has a defined complement.
    pub fn with_sentinel(mut self, a: u8, b: u8) -> Result<Self, SourceError> {
        for c in [a, b] {
            if self.is_defined(c) {
                return Err(SourceError::InvalidArgument(format!(
                    "Sentinel {:?} already has a complement", c as char
                )));
            }
        }
        self.table[a as usize] = b;
        self.table[b as usize] = a;
        Ok(self)
    }

    /// Returns `true` if the byte belongs to the alphabet or is a registered sentinel.
    #[inline]
    pub fn is_defined(&self, c: u8) -> bool {
        self.table[c as usize] != UNKNOWN || c == UNKNOWN
    }

    /// Returns the complement of the byte.
    #[inline]
    pub fn complement(&self, c: u8) -> u8 {
        self.table[c as usize]
    }

    /// Returns the reverse complement of the sequence.
    pub fn reverse_complement(&self, sequence: &[u8]) -> Vec<u8> {
        sequence.iter().rev().map(|&c| self.complement(c)).collect()
    }

    /// Replaces the sequence with its reverse complement.
    pub fn reverse_complement_in_place(&self, sequence: &mut [u8]) {
        let swap_size = sequence.len() / 2;
        for i in 0..swap_size {
            let j = sequence.len() - 1 - i;
            let tmp = sequence[i];
            sequence[i] = self.complement(sequence[j]);
            sequence[j] = self.complement(tmp);
        }
        if sequence.len() % 2 != 0 {
            sequence[swap_size] = self.complement(sequence[swap_size]);
        }
    }
}

impl Default for ComplementTable {
    fn default() -> Self {
        Self::standard()
    }
}

//-----------------------------------------------------------------------------

/// Returns the complement of the byte using [`COMPLEMENT`].
#[inline]
pub fn complement(c: u8) -> u8 {
    COMPLEMENT.complement(c)
}

/// Returns the reverse complement of the sequence using [`COMPLEMENT`].
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    COMPLEMENT.reverse_complement(sequence)
}

/// Replaces the sequence with its reverse complement using [`COMPLEMENT`].
pub fn reverse_complement_in_place(sequence: &mut [u8]) {
    COMPLEMENT.reverse_complement_in_place(sequence);
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
