//! Folding a decoded alignment into a contig graph.
//!
//! The updater walks the operations of one alignment from left to right with two cursors:
//! `position` is the 1-based reference coordinate of the next reference base, and `read_offset` is the offset of the next read base.
//!
//! * A match advances both cursors.
//! * A deletion adds an edge from node `position - 1` to node `position + len` and advances `position`.
//! * An insertion adds a chain of new nodes between nodes `position - 1` and `position` and advances `read_offset`.
//! * A reference skip advances `position`.
//!
//! The alignment is first turned into a list of [`Mutation`] values and validated against the graph.
//! Only a fully valid alignment is applied, so a rejected alignment never leaves a partial change behind.

use crate::PanGraph;
use crate::cigar::{DecodedAlignment, Operation};

use std::ops::Range;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// A single change to a contig graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Deletion of `len` reference bases starting from `position`.
    Deletion {
        /// Reference position of the first deleted base.
        position: usize,
        /// Number of deleted bases.
        len: usize,
    },
    /// Insertion of read bases before reference `position`.
    Insertion {
        /// Reference position of the base following the insertion.
        position: usize,
        /// Interval of the read sequence with the inserted bases.
        bases: Range<usize>,
    },
}

/// Changes made to a graph by one alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Number of new nodes.
    pub nodes: usize,
    /// Number of new edges, including edges that may duplicate existing ones.
    pub edges: usize,
}

//-----------------------------------------------------------------------------

/// Converts an alignment starting at reference `position` into a list of mutations.
///
/// Zero-length insertions and deletions produce no mutations.
///
/// # Errors
///
/// Returns an error if a deletion or an insertion is anchored outside the reference backbone of the graph, or if an insertion extends past the end of the read.
pub fn plan(graph: &PanGraph, position: usize, alignment: &DecodedAlignment) -> Result<Vec<Mutation>, String> {
    let mut result = Vec::new();
    let mut position = position;
    let mut read_offset: usize = 0;

    for op in alignment.ops.iter() {
        match op {
            Operation::Match(len) => {
                position = position.saturating_add(*len);
                read_offset = read_offset.saturating_add(*len);
            },
            Operation::Deletion(len) => {
                if *len > 0 {
                    let end = position.checked_add(*len).ok_or(format!("Deletion at {} is too long", position))?;
                    if position < 2 || !graph.is_reference_node(end) {
                        return Err(format!(
                            "Deletion {}..{} is not within contig {} of length {}",
                            position, end, graph.contig(), graph.reference_len()
                        ));
                    }
                    result.push(Mutation::Deletion { position, len: *len });
                }
                position = position.saturating_add(*len);
            },
            Operation::Insertion(len) => {
                if *len > 0 {
                    if position < 2 || !graph.is_reference_node(position) {
                        return Err(format!(
                            "Insertion at {} is not within contig {} of length {}",
                            position, graph.contig(), graph.reference_len()
                        ));
                    }
                    let bases = read_offset..read_offset.saturating_add(*len);
                    if bases.end > alignment.sequence.len() {
                        return Err(format!(
                            "Insertion at read offset {}..{} extends past the read of length {}",
                            bases.start, bases.end, alignment.sequence.len()
                        ));
                    }
                    result.push(Mutation::Insertion { position, bases });
                }
                read_offset = read_offset.saturating_add(*len);
            },
            Operation::Skip(len) => {
                position = position.saturating_add(*len);
            },
        }
    }

    Ok(result)
}

/// Applies mutations created by [`plan`] to the graph.
///
/// `sequence` must be the read sequence used for planning.
/// Returns an error if a mutation is invalid for this graph.
/// That should not happen with mutations planned for the same graph.
pub fn apply(graph: &mut PanGraph, mutations: &[Mutation], sequence: &[u8]) -> Result<UpdateStats, String> {
    let mut stats = UpdateStats::default();
    for mutation in mutations.iter() {
        match mutation {
            Mutation::Deletion { position, len } => {
                graph.add_deletion(*position, *len)?;
                stats.edges += 1;
            },
            Mutation::Insertion { position, bases } => {
                let bases = sequence.get(bases.clone()).ok_or(
                    format!("Read interval {}..{} does not exist", bases.start, bases.end)
                )?;
                let inserted = graph.add_insertion(*position, bases)?;
                stats.nodes += inserted.len();
                stats.edges += inserted.len() + 1;
            },
        }
    }
    Ok(stats)
}

//-----------------------------------------------------------------------------
