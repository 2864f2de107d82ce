use super::*;

use simple_sds::serialize;

use std::fs;

//-----------------------------------------------------------------------------

fn read_all(input: &[u8]) -> Result<Vec<(String, Vec<u8>)>, String> {
    FastaReader::new(input).collect()
}

//-----------------------------------------------------------------------------

// Tests for FASTA reading.

#[test]
fn fasta_records() {
    let input = b"\n>chr1 Homo sapiens chromosome 1\nACGTN\nacgt\n\n>chr2\tsecond\nGATTACA\n>chrM\n";
    let records = read_all(input);
    assert!(records.is_ok(), "Failed to read FASTA: {}", records.unwrap_err());
    let records = records.unwrap();
    assert_eq!(records.len(), 3, "Wrong number of records");
    assert_eq!(records[0], (String::from("chr1"), b"ACGTNacgt".to_vec()), "Wrong first record");
    assert_eq!(records[1], (String::from("chr2"), b"GATTACA".to_vec()), "Wrong second record");
    assert_eq!(records[2], (String::from("chrM"), Vec::new()), "Wrong empty record");
}

#[test]
fn fasta_windows_line_breaks() {
    let input = b">chr1\r\nAC\r\nGT\r\n";
    let records = read_all(input).unwrap();
    assert_eq!(records, vec![(String::from("chr1"), b"ACGT".to_vec())], "Carriage returns were not removed");
}

#[test]
fn fasta_empty_input() {
    let records = read_all(b"").unwrap();
    assert!(records.is_empty(), "Empty input should have no records");
}

#[test]
fn fasta_invalid() {
    assert!(read_all(b"ACGT\n>chr1\nACGT\n").is_err(), "Accepted a sequence before the first header");
    assert!(read_all(b">\nACGT\n").is_err(), "Accepted an empty record name");
    assert!(read_all(b"> chr1\nACGT\n").is_err(), "Accepted a record name starting with whitespace");
}

#[test]
fn fasta_file_with_filter() {
    let filename = serialize::temp_file_name("pgg-base-fasta");
    fs::write(&filename, b">chr1\nACGT\n>chr2\nGGGG\n>chr3\nTT\n").unwrap();
    let records = read_fasta_file(&filename, |name| name != "chr2");
    assert!(records.is_ok(), "Failed to read FASTA file: {}", records.unwrap_err());
    let names: Vec<String> = records.unwrap().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec![String::from("chr1"), String::from("chr3")], "Wrong records after filtering");
    let _ = fs::remove_file(&filename);
}

//-----------------------------------------------------------------------------

// Tests for name lists.

#[test]
fn name_list() {
    let filename = serialize::temp_file_name("pgg-base-names");
    fs::write(&filename, b"# contigs\nchr1\t248956422\n\nchr2 242193529\n  chrX\n").unwrap();
    let names = read_name_list(&filename);
    assert!(names.is_ok(), "Failed to read name list: {}", names.unwrap_err());
    assert_eq!(names.unwrap(), vec![String::from("chr1"), String::from("chr2"), String::from("chrX")], "Wrong names");
    let _ = fs::remove_file(&filename);
}

//-----------------------------------------------------------------------------

// Tests for GFA writing.

#[test]
fn gfa_lines() {
    let mut output: Vec<u8> = Vec::new();
    write_gfa_header(&mut output).unwrap();
    write_gfa_segment(12, b'A', &mut output).unwrap();
    write_gfa_link(12, 13, &mut output).unwrap();
    let metadata = WalkMetadata {
        sample: String::from("sample"),
        haplotype: 1,
        contig: String::from("chr1"),
        interval: 5..7,
    };
    write_gfa_walk(&[12, 13], &metadata, &mut output).unwrap();
    let expected = "H\tVN:Z:1.1\nS\t12\tA\nL\t12\t+\t13\t+\t0M\nW\tsample\t1\tchr1\t5\t7\t>12>13\n";
    assert_eq!(String::from_utf8(output).unwrap(), expected, "Wrong GFA lines");
}

#[test]
fn gfa_graph() {
    let mut graph = PanGraph::from_reference("chr1", b"ACGT");
    graph.add_deletion(2, 1).unwrap();
    graph.add_insertion(3, b"T").unwrap();
    graph.remove_duplicate_edges();

    let mut output: Vec<u8> = Vec::new();
    let result = write_gfa(&graph, &mut output);
    assert!(result.is_ok(), "Failed to write GFA: {}", result.unwrap_err());
    let expected = "H\tVN:Z:1.1\n\
        S\t1\tA\nS\t2\tC\nS\t3\tG\nS\t4\tT\nS\t5\tT\n\
        L\t1\t+\t2\t+\t0M\nL\t1\t+\t3\t+\t0M\nL\t2\t+\t3\t+\t0M\nL\t2\t+\t5\t+\t0M\nL\t3\t+\t4\t+\t0M\nL\t5\t+\t3\t+\t0M\n\
        W\t_reference\t0\tchr1\t0\t4\t>1>2>3>4\n";
    assert_eq!(String::from_utf8(output).unwrap(), expected, "Wrong GFA output");
}

#[test]
fn gfa_empty_graph() {
    let graph = PanGraph::from_reference("chr1", b"");
    let mut output: Vec<u8> = Vec::new();
    write_gfa(&graph, &mut output).unwrap();
    assert_eq!(output, b"H\tVN:Z:1.1\n", "Empty graph should only have a header");
}

//-----------------------------------------------------------------------------
