//! Alignment records for linear reference sequences.
//!
//! An [`AlignmentRecord`] keeps the fields of a SAM line that graph construction needs: the target contig, the 1-based position, the CIGAR string, and the read sequence.
//! Records are usually read with [`read_sam_file`], which reads the entire file before returning anything.

use crate::cigar::{self, CigarToken, DecodedAlignment};
use crate::utils;

use std::io::BufRead;
use std::path::Path;
use std::str;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// An alignment of a read to a linear reference sequence.
///
/// # Examples
///
/// ```
/// use pgg_base::AlignmentRecord;
///
/// let line = b"read1\t0\tchr1\t100\t60\t5S20M2D10M\t*\t0\t0\tNNNNNACGTACGTACACGTACGTACACGTACGTAC\t*";
/// let record = AlignmentRecord::from_sam(line).unwrap();
/// assert_eq!(record.contig, "chr1");
/// assert_eq!(record.position, Some(100));
/// assert!(!record.is_unaligned());
///
/// let decoded = record.decode().unwrap().unwrap();
/// assert_eq!(decoded.ops.len(), 3);
/// assert_eq!(decoded.sequence.len(), 30);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentRecord {
    /// Name of the target contig.
    pub contig: String,
    /// 1-based target position, or [`None`] if the read is unaligned.
    pub position: Option<usize>,
    /// CIGAR string, or `*` if missing.
    pub cigar: Vec<u8>,
    /// Read sequence; empty if missing.
    pub sequence: Vec<u8>,
}

impl AlignmentRecord {
    /// Symbol for a missing field in SAM.
    pub const MISSING: &'static [u8] = b"*";

    // 0-based field numbers in a SAM line.
    const RNAME_FIELD: usize = 2;
    const POS_FIELD: usize = 3;
    const CIGAR_FIELD: usize = 5;
    const SEQ_FIELD: usize = 9;

    /// Creates a new record.
    ///
    /// The missing sequence `*` is stored as an empty sequence.
    pub fn new(contig: &str, position: Option<usize>, cigar: &[u8], sequence: &[u8]) -> Self {
        let sequence = if sequence == Self::MISSING { Vec::new() } else { sequence.to_vec() };
        AlignmentRecord {
            contig: contig.to_string(),
            position,
            cigar: cigar.to_vec(),
            sequence,
        }
    }

    /// Parses a record from a SAM alignment line without the trailing newline.
    ///
    /// Position `0` or `*` is parsed as an unaligned record.
    /// Returns an error if the line has too few fields or the position is not an integer.
    pub fn from_sam(line: &[u8]) -> Result<Self, String> {
        let fields: Vec<&[u8]> = line.split(|&c| c == b'\t').take(Self::SEQ_FIELD + 1).collect();
        if fields.len() <= Self::SEQ_FIELD {
            return Err(format!("SAM line has {} fields, expected at least 10", fields.len()));
        }

        let contig = str::from_utf8(fields[Self::RNAME_FIELD]).map_err(|x| format!("Invalid contig name: {}", x))?;
        let position = if fields[Self::POS_FIELD] == Self::MISSING {
            None
        } else {
            let value = String::from_utf8_lossy(fields[Self::POS_FIELD]);
            let value = value.parse::<usize>().map_err(|x| format!("Invalid position {}: {}", value, x))?;
            if value == 0 { None } else { Some(value) }
        };

        Ok(Self::new(contig, position, fields[Self::CIGAR_FIELD], fields[Self::SEQ_FIELD]))
    }

    /// Returns `true` if the record has no position or no CIGAR string.
    pub fn is_unaligned(&self) -> bool {
        self.position.is_none() || self.cigar.is_empty() || self.cigar == Self::MISSING
    }

    /// Decodes the CIGAR string and the sequence for graph construction.
    ///
    /// Returns [`None`] if the record carries no structural information (see [`cigar::decode`]).
    /// Returns an error if the CIGAR string is invalid.
    pub fn decode(&self) -> Result<Option<DecodedAlignment<'_>>, String> {
        let tokens = CigarToken::parse(&self.cigar)?;
        Ok(cigar::decode(&tokens, &self.sequence))
    }
}

//-----------------------------------------------------------------------------

/// Returns `true` if the buffer contains a SAM header line.
pub fn is_sam_header_line(buf: &[u8]) -> bool {
    buf.first() == Some(&b'@')
}

/// Reads all alignment records from a SAM file, which may be gzip-compressed.
///
/// Header lines and empty lines are skipped.
/// Returns an error if the file cannot be read or any alignment line cannot be parsed.
/// No records are returned in that case.
pub fn read_sam_file<P: AsRef<Path>>(filename: P) -> Result<Vec<AlignmentRecord>, String> {
    let mut reader = utils::open_file(&filename)?;
    let mut result = Vec::new();
    let mut line_num = 0;
    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        let len = reader.read_until(b'\n', &mut buf).map_err(|x| x.to_string())?;
        if len == 0 {
            break;
        }
        line_num += 1;
        utils::trim_line(&mut buf);
        if buf.is_empty() || is_sam_header_line(&buf) {
            continue;
        }
        let record = AlignmentRecord::from_sam(&buf).map_err(|x| {
            format!("{} line {}: {}", filename.as_ref().display(), line_num, x)
        })?;
        result.push(record);
    }
    Ok(result)
}

//-----------------------------------------------------------------------------
