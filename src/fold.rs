//! Folding alignment records into a set of contig graphs.
//!
//! A [`GraphSet`] owns one [`PanGraph`] for each tracked contig.
//! The set of tracked contigs is fixed when the graphs are inserted, before any records are folded.
//! Records are folded with [`GraphSet::fold_record`] one at a time, and the graphs are deduplicated once at the end with [`GraphSet::remove_duplicate_edges`].
//!
//! Problems with individual records are not errors.
//! They are reported as [`FoldOutcome::Skipped`] with a [`SkipReason`], and the graphs are not modified.
//! Only structural problems that would leave a graph in an inconsistent state are returned as errors.

use crate::{AlignmentRecord, PanGraph};
use crate::update::{self, UpdateStats};

use std::collections::HashMap;
use std::fmt::{self, Display};

use log::trace;


//-----------------------------------------------------------------------------

/// Reason for skipping an alignment record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The record has no position or no CIGAR string.
    Unaligned,
    /// The target contig is not tracked.
    UntrackedContig,
    /// The CIGAR string cannot be parsed.
    InvalidCigar(String),
    /// The CIGAR string has no operations left after clip stripping.
    Degenerate,
    /// The alignment refers to nodes outside the reference backbone or bases outside the read.
    OutOfBounds(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unaligned => write!(f, "unaligned"),
            SkipReason::UntrackedContig => write!(f, "untracked contig"),
            SkipReason::InvalidCigar(msg) => write!(f, "invalid CIGAR string: {}", msg),
            SkipReason::Degenerate => write!(f, "no structural information"),
            SkipReason::OutOfBounds(msg) => write!(f, "out of bounds: {}", msg),
        }
    }
}

/// Result of folding a single alignment record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoldOutcome {
    /// The record was folded into the graph of its contig.
    Folded(UpdateStats),
    /// The record was skipped without modifying any graph.
    Skipped(SkipReason),
}

//-----------------------------------------------------------------------------

/// Statistics for folding a number of alignment records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FoldStats {
    /// Records seen.
    pub records: usize,
    /// Records folded into a graph.
    pub folded: usize,
    /// Unaligned records.
    pub unaligned: usize,
    /// Records for untracked contigs.
    pub untracked: usize,
    /// Records with an invalid CIGAR string.
    pub invalid: usize,
    /// Records without structural information.
    pub degenerate: usize,
    /// Records referring to positions outside the reference or bases outside the read.
    pub out_of_bounds: usize,
    /// New nodes.
    pub nodes_added: usize,
    /// New edges, including duplicates.
    pub edges_added: usize,
}

impl FoldStats {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the statistics with the outcome of a single record.
    pub fn update(&mut self, outcome: &FoldOutcome) {
        self.records += 1;
        match outcome {
            FoldOutcome::Folded(stats) => {
                self.folded += 1;
                self.nodes_added += stats.nodes;
                self.edges_added += stats.edges;
            },
            FoldOutcome::Skipped(SkipReason::Unaligned) => self.unaligned += 1,
            FoldOutcome::Skipped(SkipReason::UntrackedContig) => self.untracked += 1,
            FoldOutcome::Skipped(SkipReason::InvalidCigar(_)) => self.invalid += 1,
            FoldOutcome::Skipped(SkipReason::Degenerate) => self.degenerate += 1,
            FoldOutcome::Skipped(SkipReason::OutOfBounds(_)) => self.out_of_bounds += 1,
        }
    }

    /// Adds the statistics from another set of records.
    pub fn merge(&mut self, other: &FoldStats) {
        self.records += other.records;
        self.folded += other.folded;
        self.unaligned += other.unaligned;
        self.untracked += other.untracked;
        self.invalid += other.invalid;
        self.degenerate += other.degenerate;
        self.out_of_bounds += other.out_of_bounds;
        self.nodes_added += other.nodes_added;
        self.edges_added += other.edges_added;
    }

    /// Returns the number of skipped records.
    pub fn skipped(&self) -> usize {
        self.records - self.folded
    }
}

//-----------------------------------------------------------------------------

/// Graphs for a fixed set of contigs.
///
/// # Examples
///
/// ```
/// use pgg_base::{AlignmentRecord, GraphSet, PanGraph};
/// use pgg_base::fold::{FoldOutcome, SkipReason};
///
/// let mut graphs = GraphSet::new();
/// graphs.insert(PanGraph::from_reference("chr1", b"ACGTACGT")).unwrap();
///
/// // A deletion of the base at position 3.
/// let record = AlignmentRecord::new("chr1", Some(1), b"2M1D2M", b"ACTA");
/// let outcome = graphs.fold_record(&record).unwrap();
/// assert!(matches!(outcome, FoldOutcome::Folded(_)));
/// assert!(graphs.get("chr1").unwrap().has_edge(2, 4));
///
/// let record = AlignmentRecord::new("chr2", Some(1), b"2M1D2M", b"ACTA");
/// let outcome = graphs.fold_record(&record).unwrap();
/// assert_eq!(outcome, FoldOutcome::Skipped(SkipReason::UntrackedContig));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphSet {
    graphs: Vec<PanGraph>,
    index: HashMap<String, usize>,
}

impl GraphSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds reference graphs for the given `(contig, sequence)` pairs.
    ///
    /// Returns an error if a contig name is repeated.
    pub fn from_reference<I, S>(sequences: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let mut result = Self::new();
        for (contig, sequence) in sequences {
            result.insert(PanGraph::from_reference(contig.as_ref(), &sequence))?;
        }
        Ok(result)
    }

    /// Adds the graph for a new contig.
    ///
    /// Returns an error if the contig is already tracked.
    pub fn insert(&mut self, graph: PanGraph) -> Result<(), String> {
        if self.index.contains_key(graph.contig()) {
            return Err(format!("Contig {} is already tracked", graph.contig()));
        }
        self.index.insert(graph.contig().to_string(), self.graphs.len());
        self.graphs.push(graph);
        Ok(())
    }

    /// Returns the number of tracked contigs.
    #[inline]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns `true` if no contigs are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Returns `true` if the contig is tracked.
    #[inline]
    pub fn contains(&self, contig: &str) -> bool {
        self.index.contains_key(contig)
    }

    /// Returns the graph for the contig, or [`None`] if the contig is not tracked.
    pub fn get(&self, contig: &str) -> Option<&PanGraph> {
        self.index.get(contig).map(|&offset| &self.graphs[offset])
    }

    /// Returns a mutable reference to the graph for the contig, or [`None`] if the contig is not tracked.
    pub fn get_mut(&mut self, contig: &str) -> Option<&mut PanGraph> {
        self.index.get(contig).map(|&offset| &mut self.graphs[offset])
    }

    /// Returns an iterator over the graphs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PanGraph> {
        self.graphs.iter()
    }

    /// Returns the names of the tracked contigs in insertion order.
    pub fn contigs(&self) -> Vec<String> {
        self.graphs.iter().map(|graph| graph.contig().to_string()).collect()
    }

    /// Folds a single alignment record into the graph of its contig.
    ///
    /// Records that are unaligned, target an untracked contig, have an invalid or degenerate CIGAR string, or reach outside the reference are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a validated alignment still cannot be applied.
    /// The graph of the contig may be partially modified in that case and should not be stored.
    pub fn fold_record(&mut self, record: &AlignmentRecord) -> Result<FoldOutcome, String> {
        if record.is_unaligned() {
            return Ok(FoldOutcome::Skipped(SkipReason::Unaligned));
        }
        let graph = match self.index.get(record.contig.as_str()) {
            Some(&offset) => &mut self.graphs[offset],
            None => return Ok(FoldOutcome::Skipped(SkipReason::UntrackedContig)),
        };
        let alignment = match record.decode() {
            Ok(Some(alignment)) => alignment,
            Ok(None) => return Ok(FoldOutcome::Skipped(SkipReason::Degenerate)),
            Err(msg) => return Ok(FoldOutcome::Skipped(SkipReason::InvalidCigar(msg))),
        };
        if !alignment.has_structure() {
            return Ok(FoldOutcome::Folded(UpdateStats::default()));
        }
        // `is_unaligned()` guarantees a position.
        let position = record.position.unwrap_or_default();

        let mutations = match update::plan(graph, position, &alignment) {
            Ok(mutations) => mutations,
            Err(msg) => return Ok(FoldOutcome::Skipped(SkipReason::OutOfBounds(msg))),
        };
        let stats = update::apply(graph, &mutations, alignment.sequence)?;
        Ok(FoldOutcome::Folded(stats))
    }

    /// Folds a sequence of alignment records in order.
    ///
    /// Skipped records are logged at trace level and counted in the statistics.
    /// Returns an error from [`GraphSet::fold_record`].
    pub fn fold_records<'a, I>(&mut self, records: I) -> Result<FoldStats, String>
    where
        I: IntoIterator<Item = &'a AlignmentRecord>,
    {
        let mut stats = FoldStats::new();
        for record in records {
            let outcome = self.fold_record(record)?;
            if let FoldOutcome::Skipped(reason) = &outcome {
                trace!("Skipped a record on {} at {:?}: {}", record.contig, record.position, reason);
            }
            stats.update(&outcome);
        }
        Ok(stats)
    }

    /// Removes duplicate edges from every graph.
    ///
    /// This should be called once after all records have been folded.
    /// Returns the total number of removed edges.
    pub fn remove_duplicate_edges(&mut self) -> usize {
        self.graphs.iter_mut().map(|graph| graph.remove_duplicate_edges()).sum()
    }
}

//-----------------------------------------------------------------------------
