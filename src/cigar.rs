//! CIGAR strings: parsing and decoding into graph-relevant operations.
//!
//! A CIGAR string such as `3S10M2I5M1D20M` is a sequence of run-length tokens.
//! [`CigarToken::parse`] splits it into [`CigarToken`] values.
//! [`decode`] then strips the leading clips, drops the corresponding prefix of the read sequence, and turns the remaining tokens into [`Operation`] values.
//! Only operations that move the reference cursor or the read cursor survive decoding.

use std::fmt::{self, Display};
use std::str;


//-----------------------------------------------------------------------------

/// Operation type of a CIGAR token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CigarKind {
    /// `M`: alignment match (sequence match or mismatch).
    Match,
    /// `I`: insertion to the reference.
    Insertion,
    /// `D`: deletion from the reference.
    Deletion,
    /// `N`: skipped region of the reference.
    Skip,
    /// `S`: soft clip; the bases are present in the read.
    SoftClip,
    /// `H`: hard clip; the bases are not present in the read.
    HardClip,
    /// `P`: padding.
    Padding,
    /// `=`: sequence match.
    SequenceMatch,
    /// `X`: sequence mismatch.
    SequenceMismatch,
}

impl CigarKind {
    /// Returns the operation type for a CIGAR symbol.
    pub fn from_symbol(symbol: u8) -> Option<Self> {
        match symbol {
            b'M' => Some(Self::Match),
            b'I' => Some(Self::Insertion),
            b'D' => Some(Self::Deletion),
            b'N' => Some(Self::Skip),
            b'S' => Some(Self::SoftClip),
            b'H' => Some(Self::HardClip),
            b'P' => Some(Self::Padding),
            b'=' => Some(Self::SequenceMatch),
            b'X' => Some(Self::SequenceMismatch),
            _ => None,
        }
    }

    /// Returns the CIGAR symbol for the operation type.
    pub fn symbol(&self) -> u8 {
        match self {
            Self::Match => b'M',
            Self::Insertion => b'I',
            Self::Deletion => b'D',
            Self::Skip => b'N',
            Self::SoftClip => b'S',
            Self::HardClip => b'H',
            Self::Padding => b'P',
            Self::SequenceMatch => b'=',
            Self::SequenceMismatch => b'X',
        }
    }
}

/// A single run-length token in a CIGAR string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CigarToken {
    /// Length of the run.
    pub len: usize,
    /// Operation type.
    pub kind: CigarKind,
}

impl CigarToken {
    /// Creates a new token.
    pub fn new(len: usize, kind: CigarKind) -> Self {
        CigarToken { len, kind }
    }

    /// Parses a CIGAR string into a sequence of tokens.
    ///
    /// The missing value `*` and the empty string are both parsed as an empty sequence.
    /// Returns an error if a token lacks a length, a length is not a valid integer, or the operation is unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use pgg_base::cigar::{CigarKind, CigarToken};
    ///
    /// let tokens = CigarToken::parse(b"5S20M2D10M").unwrap();
    /// assert_eq!(tokens.len(), 4);
    /// assert_eq!(tokens[0], CigarToken::new(5, CigarKind::SoftClip));
    /// assert_eq!(tokens[2], CigarToken::new(2, CigarKind::Deletion));
    /// ```
    pub fn parse(cigar: &[u8]) -> Result<Vec<Self>, String> {
        let mut result = Vec::new();
        if cigar == b"*" {
            return Ok(result);
        }

        let mut start = 0;
        while start < cigar.len() {
            let mut end = start;
            while end < cigar.len() && cigar[end].is_ascii_digit() {
                end += 1;
            }
            if end == start || end >= cigar.len() {
                return Err(format!("Invalid CIGAR string: {}", String::from_utf8_lossy(cigar)));
            }
            // The slice contains only ASCII digits.
            let len = str::from_utf8(&cigar[start..end]).map_err(|x| x.to_string())?;
            let len = len.parse::<usize>().map_err(|x| format!("Invalid CIGAR length {}: {}", len, x))?;
            let kind = CigarKind::from_symbol(cigar[end]).ok_or(
                format!("Invalid CIGAR operation: {}", cigar[end] as char)
            )?;
            result.push(CigarToken::new(len, kind));
            start = end + 1;
        }

        Ok(result)
    }
}

impl Display for CigarToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.kind.symbol() as char)
    }
}

//-----------------------------------------------------------------------------

/// An operation that may change the graph or the cursors of the graph updater.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Aligned bases; advances both the reference and the read.
    Match(usize),
    /// Deleted reference bases; advances the reference.
    Deletion(usize),
    /// Inserted read bases; advances the read.
    Insertion(usize),
    /// Skipped reference region; advances the reference without creating an edge.
    Skip(usize),
}

impl Operation {
    /// Converts a CIGAR token into an operation.
    ///
    /// Returns [`None`] for tokens that do not move the cursors within the aligned region (clips and padding).
    pub fn from_token(token: &CigarToken) -> Option<Self> {
        match token.kind {
            CigarKind::Match | CigarKind::SequenceMatch | CigarKind::SequenceMismatch => Some(Self::Match(token.len)),
            CigarKind::Deletion => Some(Self::Deletion(token.len)),
            CigarKind::Insertion => Some(Self::Insertion(token.len)),
            CigarKind::Skip => Some(Self::Skip(token.len)),
            CigarKind::SoftClip | CigarKind::HardClip | CigarKind::Padding => None,
        }
    }

    /// Returns the length of the operation.
    pub fn len(&self) -> usize {
        match self {
            Self::Match(len) => *len,
            Self::Deletion(len) => *len,
            Self::Insertion(len) => *len,
            Self::Skip(len) => *len,
        }
    }

    /// Returns `true` if the operation is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of reference bases consumed by the operation.
    pub fn ref_len(&self) -> usize {
        match self {
            Self::Match(len) | Self::Deletion(len) | Self::Skip(len) => *len,
            Self::Insertion(_) => 0,
        }
    }

    /// Returns the number of read bases consumed by the operation.
    pub fn read_len(&self) -> usize {
        match self {
            Self::Match(len) | Self::Insertion(len) => *len,
            Self::Deletion(_) | Self::Skip(_) => 0,
        }
    }

    /// Returns `true` if the operation can add nodes or edges to the graph.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Deletion(_) | Self::Insertion(_))
    }
}

//-----------------------------------------------------------------------------

/// An alignment decoded for graph construction.
///
/// The read sequence no longer contains the soft-clipped prefix, so read offsets start from the first aligned base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAlignment<'a> {
    /// Operations in the original order.
    pub ops: Vec<Operation>,
    /// Read sequence starting from the first aligned base.
    pub sequence: &'a [u8],
}

impl<'a> DecodedAlignment<'a> {
    /// Returns `true` if at least one operation can change the graph.
    pub fn has_structure(&self) -> bool {
        self.ops.iter().any(|op| op.is_structural())
    }

    /// Returns the number of reference bases spanned by the alignment.
    pub fn ref_len(&self) -> usize {
        self.ops.iter().map(|op| op.ref_len()).sum()
    }

    /// Returns the number of read bases covered by the alignment.
    pub fn read_len(&self) -> usize {
        self.ops.iter().map(|op| op.read_len()).sum()
    }
}

/// Decodes a tokenized CIGAR string and the corresponding read sequence.
///
/// A leading hard clip is discarded.
/// A soft clip that is then the first token is discarded along with the same number of bases from the start of the sequence.
/// Clips and padding elsewhere in the CIGAR string are dropped.
///
/// Returns [`None`] for degenerate alignments: a CIGAR string with at most one token, or no operations left after clip stripping.
///
/// # Examples
///
/// ```
/// use pgg_base::cigar::{self, CigarToken, Operation};
///
/// let tokens = CigarToken::parse(b"2H3S4M1I4M").unwrap();
/// let decoded = cigar::decode(&tokens, b"NNNACGTTACGT").unwrap();
/// assert_eq!(decoded.ops, vec![Operation::Match(4), Operation::Insertion(1), Operation::Match(4)]);
/// assert_eq!(decoded.sequence, b"ACGTTACGT");
///
/// // A single token carries no structural information.
/// let tokens = CigarToken::parse(b"100M").unwrap();
/// assert!(cigar::decode(&tokens, b"").is_none());
/// ```
pub fn decode<'a>(tokens: &[CigarToken], sequence: &'a [u8]) -> Option<DecodedAlignment<'a>> {
    if tokens.len() <= 1 {
        return None;
    }

    let mut tokens = tokens;
    let mut sequence = sequence;
    if tokens.first().map(|x| x.kind) == Some(CigarKind::HardClip) {
        tokens = &tokens[1..];
    }
    if let Some(first) = tokens.first() {
        if first.kind == CigarKind::SoftClip {
            sequence = &sequence[first.len.min(sequence.len())..];
            tokens = &tokens[1..];
        }
    }

    let ops: Vec<Operation> = tokens.iter().filter_map(Operation::from_token).collect();
    if ops.is_empty() {
        return None;
    }
    Some(DecodedAlignment { ops, sequence })
}

//-----------------------------------------------------------------------------
