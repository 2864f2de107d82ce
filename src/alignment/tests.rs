use super::*;

use flate2::write::GzEncoder;
use flate2::Compression;

use simple_sds::serialize;

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

//-----------------------------------------------------------------------------

const SAM_CONTENT: &str = "@HD\tVN:1.6\tSO:coordinate
@SQ\tSN:chr1\tLN:20
r1\t0\tchr1\t2\t60\t1M1D1M\t*\t0\t0\tAG\t*
r2\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*
r3\t0\tchr1\t3\t60\t3S1M2I1M\t*\t0\t0\tNNNATTG\tIIIIIII\tNM:i:2

r4\t0\tchr2\t5\t60\t4M\t*\t0\t0\t*\t*
";

fn write_temp_file(name: &str, content: &[u8], compress: bool) -> PathBuf {
    let filename = serialize::temp_file_name(name);
    let file = File::create(&filename);
    assert!(file.is_ok(), "Failed to create {}: {}", filename.display(), file.unwrap_err());
    let file = file.unwrap();
    if compress {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
    } else {
        let mut file = file;
        file.write_all(content).unwrap();
    }
    filename
}

fn check_records(records: &[AlignmentRecord]) {
    assert_eq!(records.len(), 4, "Wrong number of records");

    assert_eq!(records[0], AlignmentRecord::new("chr1", Some(2), b"1M1D1M", b"AG"), "Wrong first record");
    assert!(!records[0].is_unaligned(), "First record should be aligned");

    assert_eq!(records[1].contig, "*", "Wrong contig for an unaligned record");
    assert_eq!(records[1].position, None, "Position 0 should be parsed as unaligned");
    assert!(records[1].is_unaligned(), "Second record should be unaligned");

    assert_eq!(records[2].cigar, b"3S1M2I1M", "Wrong CIGAR string");
    assert_eq!(records[2].sequence, b"NNNATTG", "Wrong sequence");

    assert!(records[3].sequence.is_empty(), "Missing sequence should be empty");
}

//-----------------------------------------------------------------------------

// Tests for `AlignmentRecord`.

#[test]
fn parse_sam_line() {
    let line = b"read\t16\tchrX\t12345\t37\t10M\t=\t12400\t100\tACGTACGTAC\tIIIIIIIIII";
    let record = AlignmentRecord::from_sam(line);
    assert!(record.is_ok(), "Failed to parse a SAM line: {}", record.unwrap_err());
    let record = record.unwrap();
    assert_eq!(record.contig, "chrX", "Wrong contig");
    assert_eq!(record.position, Some(12345), "Wrong position");
    assert_eq!(record.cigar, b"10M", "Wrong CIGAR string");
    assert_eq!(record.sequence, b"ACGTACGTAC", "Wrong sequence");
}

#[test]
fn parse_unaligned() {
    let missing_position = AlignmentRecord::from_sam(b"r\t4\tchr1\t*\t0\t10M\t*\t0\t0\tACGTACGTAC\t*").unwrap();
    assert!(missing_position.is_unaligned(), "Position * should be unaligned");
    let missing_cigar = AlignmentRecord::from_sam(b"r\t4\tchr1\t100\t0\t*\t*\t0\t0\tACGTACGTAC\t*").unwrap();
    assert!(missing_cigar.is_unaligned(), "CIGAR * should be unaligned");
}

#[test]
fn parse_invalid_lines() {
    let too_short = b"r\t0\tchr1\t100\t60\t10M";
    assert!(AlignmentRecord::from_sam(too_short).is_err(), "Parsed a line with too few fields");
    let bad_position = b"r\t0\tchr1\tabc\t60\t10M\t*\t0\t0\tACGTACGTAC\t*";
    assert!(AlignmentRecord::from_sam(bad_position).is_err(), "Parsed a non-numeric position");
    let negative_position = b"r\t0\tchr1\t-5\t60\t10M\t*\t0\t0\tACGTACGTAC\t*";
    assert!(AlignmentRecord::from_sam(negative_position).is_err(), "Parsed a negative position");
}

#[test]
fn decode_record() {
    let record = AlignmentRecord::new("chr1", Some(3), b"2H3S1M2I1M", b"NNNATTG");
    let decoded = record.decode();
    assert!(decoded.is_ok(), "Failed to decode a record: {}", decoded.unwrap_err());
    let decoded = decoded.unwrap();
    assert!(decoded.is_some(), "The record should not be degenerate");
    let decoded = decoded.unwrap();
    assert_eq!(decoded.sequence, b"ATTG", "Wrong sequence after clipping");

    let degenerate = AlignmentRecord::new("chr1", Some(3), b"10S", b"ACGTACGTAC");
    assert_eq!(degenerate.decode(), Ok(None), "A clip-only record should be degenerate");

    let invalid = AlignmentRecord::new("chr1", Some(3), b"10Q", b"ACGTACGTAC");
    assert!(invalid.decode().is_err(), "Decoded an invalid CIGAR string");
}

//-----------------------------------------------------------------------------

// Tests for `read_sam_file`.

#[test]
fn read_plain_sam() {
    let filename = write_temp_file("pgg-base-sam", SAM_CONTENT.as_bytes(), false);
    let records = read_sam_file(&filename);
    assert!(records.is_ok(), "Failed to read SAM file: {}", records.unwrap_err());
    check_records(&records.unwrap());
    let _ = fs::remove_file(&filename);
}

#[test]
fn read_gzipped_sam() {
    let filename = write_temp_file("pgg-base-sam-gz", SAM_CONTENT.as_bytes(), true);
    assert!(utils::is_gzipped(&filename), "The file is not gzip-compressed");
    let records = read_sam_file(&filename);
    assert!(records.is_ok(), "Failed to read gzipped SAM file: {}", records.unwrap_err());
    check_records(&records.unwrap());
    let _ = fs::remove_file(&filename);
}

#[test]
fn read_corrupt_sam() {
    let content = format!("{}r5\t0\tchr1\tseven\t60\t4M\t*\t0\t0\tACGT\t*\n", SAM_CONTENT);
    let filename = write_temp_file("pgg-base-sam-bad", content.as_bytes(), false);
    let records = read_sam_file(&filename);
    assert!(records.is_err(), "Read a corrupt SAM file");
    let _ = fs::remove_file(&filename);
}

#[test]
fn read_missing_sam() {
    let filename = serialize::temp_file_name("pgg-base-missing");
    assert!(read_sam_file(&filename).is_err(), "Read a missing file");
}

//-----------------------------------------------------------------------------
