//! Support for reading and writing various file formats.
//!
//! ### FASTA (reading)
//!
//! Reference sequences are read with [`FastaReader`], which iterates over `(name, sequence)` pairs.
//! The name of a record is the first whitespace-delimited token of the header line.
//! [`read_fasta_file`] reads the records for selected contigs from a file that may be gzip-compressed.
//!
//! ### Name lists (reading)
//!
//! Contig lists and sample lists are text files with one name per line.
//! Only the first whitespace-delimited column is used, so a chromosome length file such as a `.fai` index can also be used as a contig list.
//! See [`read_name_list`].
//!
//! ### GFA (writing)
//!
//! The GFA format is a text-based format for representing sequence graphs.
//! See [the specification](https://github.com/GFA-spec/GFA-spec/blob/master/GFA1.md) for details.
//! The following functions support line-by-line writing of GFA version 1.1:
//!
//! * [`write_gfa_header`]: Write a GFA file header.
//! * [`write_gfa_segment`]: Write a segment line for a node.
//! * [`write_gfa_link`]: Write a link line for an edge.
//! * [`write_gfa_walk`]: Write a walk line for a path.
//!
//! [`write_gfa`] writes an entire [`PanGraph`] with a walk for the reference backbone.

use crate::PanGraph;
use crate::utils;

use std::io::{self, BufRead, Write};
use std::ops::Range;
use std::path::Path;
use std::str;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// An iterator over the records in a FASTA file.
///
/// Each item is a `(name, sequence)` pair or an error.
/// Line breaks within a sequence are removed; the sequence is otherwise returned as it is.
///
/// # Examples
///
/// ```
/// use pgg_base::formats::FastaReader;
///
/// let input = b">chr1 first contig\nACGT\nAC\n>chr2\nGG\n";
/// let records: Vec<(String, Vec<u8>)> = FastaReader::new(&input[..]).map(|x| x.unwrap()).collect();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0], (String::from("chr1"), b"ACGTAC".to_vec()));
/// assert_eq!(records[1], (String::from("chr2"), b"GG".to_vec()));
/// ```
pub struct FastaReader<R: BufRead> {
    reader: R,
    // Header of the next record, if it has already been read.
    next_header: Option<Vec<u8>>,
    line_num: usize,
    finished: bool,
}

impl<R: BufRead> FastaReader<R> {
    /// Creates a new reader.
    pub fn new(reader: R) -> Self {
        FastaReader {
            reader,
            next_header: None,
            line_num: 0,
            finished: false,
        }
    }

    // Reads the next line into the buffer without the newline.
    // Returns `false` at the end of the input.
    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool, String> {
        buf.clear();
        let len = self.reader.read_until(b'\n', buf).map_err(|x| x.to_string())?;
        if len == 0 {
            return Ok(false);
        }
        self.line_num += 1;
        utils::trim_line(buf);
        Ok(true)
    }

    fn parse_name(&self, header: &[u8]) -> Result<String, String> {
        let name = header[1..].split(|c| c.is_ascii_whitespace()).next().unwrap_or_default();
        if name.is_empty() {
            return Err(format!("Empty FASTA record name on line {}", self.line_num));
        }
        let name = str::from_utf8(name).map_err(|x| format!("Invalid FASTA record name on line {}: {}", self.line_num, x))?;
        Ok(name.to_string())
    }

    fn next_record(&mut self) -> Result<Option<(String, Vec<u8>)>, String> {
        let mut buf: Vec<u8> = Vec::new();

        // Find the header.
        let header = match self.next_header.take() {
            Some(header) => header,
            None => loop {
                if !self.read_line(&mut buf)? {
                    return Ok(None);
                }
                if buf.is_empty() {
                    continue;
                }
                if buf[0] != b'>' {
                    return Err(format!("Expected a FASTA header on line {}", self.line_num));
                }
                break buf.clone();
            },
        };
        let name = self.parse_name(&header)?;

        // Read the sequence until the next header.
        let mut sequence: Vec<u8> = Vec::new();
        while self.read_line(&mut buf)? {
            if buf.first() == Some(&b'>') {
                self.next_header = Some(buf.clone());
                break;
            }
            sequence.extend(buf.iter().filter(|c| !c.is_ascii_whitespace()));
        }

        Ok(Some((name, sequence)))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<(String, Vec<u8>), String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            },
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            },
        }
    }
}

/// Reads the records for which `keep` returns `true` from a FASTA file, which may be gzip-compressed.
///
/// The records are returned in file order.
pub fn read_fasta_file<P, F>(filename: P, keep: F) -> Result<Vec<(String, Vec<u8>)>, String>
where
    P: AsRef<Path>,
    F: Fn(&str) -> bool,
{
    let reader = utils::open_file(&filename)?;
    let mut result = Vec::new();
    for record in FastaReader::new(reader) {
        let (name, sequence) = record.map_err(|x| format!("{}: {}", filename.as_ref().display(), x))?;
        if keep(&name) {
            result.push((name, sequence));
        }
    }
    Ok(result)
}

//-----------------------------------------------------------------------------

/// Reads a list of names from the first column of a text file, which may be gzip-compressed.
///
/// Empty lines and lines starting with `#` are skipped.
pub fn read_name_list<P: AsRef<Path>>(filename: P) -> Result<Vec<String>, String> {
    let reader = utils::open_file(&filename)?;
    let mut result = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|x| format!("{}: {}", filename.as_ref().display(), x))?;
        if line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.split_whitespace().next() {
            result.push(name.to_string());
        }
    }
    Ok(result)
}

//-----------------------------------------------------------------------------

/// Writes a GFA 1.1 header line.
pub fn write_gfa_header<T: Write>(output: &mut T) -> io::Result<()> {
    output.write_all(b"H\tVN:Z:1.1\n")
}

/// Writes a segment line for a single-base node.
pub fn write_gfa_segment<T: Write>(id: usize, base: u8, output: &mut T) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::with_capacity(16);
    buffer.extend_from_slice(b"S\t");
    buffer.extend_from_slice(id.to_string().as_bytes());
    buffer.push(b'\t');
    buffer.push(base);
    buffer.push(b'\n');
    output.write_all(&buffer)
}

/// Writes a link line for an edge between the forward orientations of two nodes.
pub fn write_gfa_link<T: Write>(from: usize, to: usize, output: &mut T) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::with_capacity(32);
    buffer.extend_from_slice(b"L\t");
    buffer.extend_from_slice(from.to_string().as_bytes());
    buffer.extend_from_slice(b"\t+\t");
    buffer.extend_from_slice(to.to_string().as_bytes());
    buffer.extend_from_slice(b"\t+\t0M\n");
    output.write_all(&buffer)
}

/// Metadata for a GFA walk line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkMetadata {
    /// Sample name.
    pub sample: String,
    /// Haplotype number.
    pub haplotype: usize,
    /// Contig name.
    pub contig: String,
    /// Interval of the contig covered by the walk.
    pub interval: Range<usize>,
}

impl WalkMetadata {
    /// Sample name used for the reference backbone.
    pub const REFERENCE_SAMPLE: &'static str = "_reference";

    /// Returns metadata for the reference backbone of the graph.
    pub fn reference(graph: &PanGraph) -> Self {
        WalkMetadata {
            sample: Self::REFERENCE_SAMPLE.to_string(),
            haplotype: 0,
            contig: graph.contig().to_string(),
            interval: 0..graph.reference_len(),
        }
    }
}

/// Writes a walk line visiting the given nodes in forward orientation.
pub fn write_gfa_walk<T: Write>(path: &[usize], metadata: &WalkMetadata, output: &mut T) -> io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    buffer.push(b'W');
    buffer.push(b'\t');
    buffer.extend_from_slice(metadata.sample.as_bytes());
    buffer.push(b'\t');
    buffer.extend_from_slice(metadata.haplotype.to_string().as_bytes());
    buffer.push(b'\t');
    buffer.extend_from_slice(metadata.contig.as_bytes());
    buffer.push(b'\t');
    buffer.extend_from_slice(metadata.interval.start.to_string().as_bytes());
    buffer.push(b'\t');
    buffer.extend_from_slice(metadata.interval.end.to_string().as_bytes());
    buffer.push(b'\t');
    for id in path.iter() {
        buffer.push(b'>');
        buffer.extend_from_slice(id.to_string().as_bytes());
    }
    buffer.push(b'\n');
    output.write_all(&buffer)
}

/// Writes the graph in GFA 1.1 format.
///
/// The output contains a segment for each node, a link for each edge, and a walk for the reference backbone.
/// Duplicate edges are written as they are; deduplicate the graph first if necessary.
pub fn write_gfa<T: Write>(graph: &PanGraph, output: &mut T) -> io::Result<()> {
    write_gfa_header(output)?;

    for (id, base) in graph.node_iter().zip(graph.labels().iter()) {
        write_gfa_segment(id, *base, output)?;
    }
    for (from, to) in graph.edges().iter() {
        write_gfa_link(*from, *to, output)?;
    }

    if graph.reference_len() > 0 {
        let backbone: Vec<usize> = graph.node_iter().take(graph.reference_len()).collect();
        write_gfa_walk(&backbone, &WalkMetadata::reference(graph), output)?;
    }

    Ok(())
}

//-----------------------------------------------------------------------------
