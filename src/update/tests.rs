use super::*;

use crate::cigar::{self, CigarToken};

//-----------------------------------------------------------------------------

fn decoded<'a>(cigar_string: &str, sequence: &'a [u8]) -> DecodedAlignment<'a> {
    let tokens = CigarToken::parse(cigar_string.as_bytes());
    assert!(tokens.is_ok(), "Failed to parse CIGAR string {}: {}", cigar_string, tokens.unwrap_err());
    let alignment = cigar::decode(&tokens.unwrap(), sequence);
    assert!(alignment.is_some(), "CIGAR string {} is degenerate", cigar_string);
    alignment.unwrap()
}

fn fold_alignment(graph: &mut PanGraph, position: usize, alignment: &DecodedAlignment) -> Result<UpdateStats, String> {
    let mutations = plan(graph, position, alignment)?;
    let stats = apply(graph, &mutations, alignment.sequence);
    assert!(stats.is_ok(), "Failed to apply planned mutations: {}", stats.unwrap_err());
    Ok(stats.unwrap())
}

fn sorted_edges(graph: &PanGraph) -> Vec<(usize, usize)> {
    let mut edges = graph.edges().to_vec();
    edges.sort_unstable();
    edges
}

//-----------------------------------------------------------------------------

#[test]
fn match_only() {
    let mut graph = PanGraph::from_reference("chr1", b"ACGTACGT");
    let original = graph.clone();
    let alignment = decoded("2S4M2S", b"TTACGTTT");
    let stats = fold_alignment(&mut graph, 2, &alignment).unwrap();
    assert_eq!(stats, UpdateStats::default(), "Matches should not change the graph");
    assert_eq!(graph, original, "Graph was modified");
}

#[test]
fn single_deletion() {
    // The deletion is at position 2 after one matching base at position 1.
    let mut graph = PanGraph::from_reference("chr1", b"ACGT");
    let labels = graph.labels().to_vec();
    let alignment = decoded("1M1D1M", b"AG");
    let stats = fold_alignment(&mut graph, 1, &alignment).unwrap();
    assert_eq!(stats, UpdateStats { nodes: 0, edges: 1 }, "Wrong update statistics");
    assert_eq!(sorted_edges(&graph), vec![(1, 2), (1, 3), (2, 3), (3, 4)], "Wrong edges");
    assert_eq!(graph.nodes(), 4, "A deletion added nodes");
    assert_eq!(graph.labels(), labels.as_slice(), "A deletion changed labels");
}

#[test]
fn single_insertion() {
    // The insertion is before position 3 after one matching base at position 2.
    let mut graph = PanGraph::from_reference("chr1", b"ACGT");
    let alignment = decoded("1M2I1M", b"ATTG");
    let stats = fold_alignment(&mut graph, 2, &alignment).unwrap();
    assert_eq!(stats, UpdateStats { nodes: 2, edges: 3 }, "Wrong update statistics");
    assert_eq!(graph.nodes(), 6, "Wrong number of nodes");
    assert_eq!(graph.label(5), Some(b'T'), "Wrong label for node 5");
    assert_eq!(graph.label(6), Some(b'T'), "Wrong label for node 6");
    assert_eq!(sorted_edges(&graph), vec![(1, 2), (2, 3), (2, 5), (3, 4), (5, 6), (6, 3)], "Wrong edges");
}

#[test]
fn insertion_after_soft_clip() {
    let mut graph = PanGraph::from_reference("chr1", b"ACGTACGT");
    let alignment = decoded("3S2M3I2M", b"NNNCGAGCTA");
    let stats = fold_alignment(&mut graph, 2, &alignment).unwrap();
    assert_eq!(stats.nodes, 3, "Wrong number of new nodes");
    assert_eq!(&graph.labels()[8..], b"AGC", "Inserted bases were taken from the wrong read offset");
    assert!(graph.has_edge(3, 9) && graph.has_edge(11, 4), "Missing anchor edges");
}

#[test]
fn mixed_operations() {
    let reference = b"ACGTACGTACGTACGTACGT";
    let mut graph = PanGraph::from_reference("chr1", reference);
    // Position 3: 2 matches (3, 4), deletion of 5..=6, 3 matches (7, 8, 9), insertion of 2 bases, 2 matches (10, 11).
    let alignment = decoded("2M2D3M2I2M", b"GTCGTAAAC");
    let stats = fold_alignment(&mut graph, 3, &alignment).unwrap();
    assert_eq!(stats, UpdateStats { nodes: 2, edges: 4 }, "Wrong update statistics");
    assert!(graph.has_edge(4, 7), "Missing deletion edge");
    assert_eq!(&graph.labels()[20..], b"AA", "Wrong inserted labels");
    assert!(graph.has_edge(9, 21) && graph.has_edge(21, 22) && graph.has_edge(22, 10), "Missing insertion edges");
}

#[test]
fn reference_skip() {
    let mut graph = PanGraph::from_reference("chr1", b"ACGTACGTACGT");
    let alignment = decoded("2M4N2M1D2M", b"ACACCG");
    fold_alignment(&mut graph, 1, &alignment).unwrap();
    assert!(graph.has_edge(8, 10), "The skip should advance the reference position");
    assert_eq!(graph.edge_count(), 12, "The skip should not add an edge");
}

#[test]
fn zero_length_operations() {
    let mut graph = PanGraph::from_reference("chr1", b"ACGTACGT");
    let original = graph.clone();
    let alignment = decoded("2M0D0I2M", b"ACGT");
    let stats = fold_alignment(&mut graph, 1, &alignment).unwrap();
    assert_eq!(stats, UpdateStats::default(), "Empty operations should not change the graph");
    assert_eq!(graph, original, "Graph was modified");
}

//-----------------------------------------------------------------------------

#[test]
fn rejected_alignment_is_atomic() {
    let mut graph = PanGraph::from_reference("chr1", b"ACGTACGT");
    let original = graph.clone();
    // The insertion is valid, but the deletion runs past the end of the contig.
    let alignment = decoded("2M1I4M5D", b"ACTGTAC");
    let result = plan(&graph, 1, &alignment);
    assert!(result.is_err(), "Accepted a deletion past the end of the contig");
    assert_eq!(graph, original, "Planning modified the graph");

    let result = fold_alignment(&mut graph, 1, &alignment);
    assert!(result.is_err(), "Folded an invalid alignment");
    assert_eq!(graph, original, "A rejected alignment modified the graph");
}

#[test]
fn anchors_outside_reference() {
    let graph = PanGraph::from_reference("chr1", b"ACGT");
    let cases: [(usize, &str, &[u8]); 4] = [
        (1, "1D3M", b"CGT"),
        (1, "1I4M", b"AACGT"),
        (3, "2M1I", b"GTA"),
        (3, "1M2D", b"G"),
    ];
    for (position, cigar_string, sequence) in cases.iter() {
        let alignment = decoded(cigar_string, sequence);
        let result = plan(&graph, *position, &alignment);
        assert!(result.is_err(), "Accepted {} at position {}", cigar_string, position);
    }
}

#[test]
fn insertion_past_read_end() {
    let graph = PanGraph::from_reference("chr1", b"ACGTACGT");
    let alignment = decoded("2M4I2M", b"ACTT");
    let result = plan(&graph, 1, &alignment);
    assert!(result.is_err(), "Accepted an insertion past the end of the read");

    let alignment = decoded("2M1D2M", b"");
    let result = plan(&graph, 1, &alignment);
    assert!(result.is_ok(), "A deletion should not need the read sequence: {}", result.unwrap_err());
}

#[test]
fn planned_mutations() {
    let graph = PanGraph::from_reference("chr1", b"ACGTACGTAC");
    let alignment = decoded("5S2M1D1M3I2M", b"NNNNNACGTTTAC");
    let mutations = plan(&graph, 2, &alignment).unwrap();
    assert_eq!(mutations, vec![
        Mutation::Deletion { position: 4, len: 1 },
        Mutation::Insertion { position: 6, bases: 3..6 },
    ], "Wrong mutations");
}

//-----------------------------------------------------------------------------
