//! # PGG-base: incremental pan-genome graphs stored in SQLite databases.
//!
//! This crate builds a pan-genome graph for each contig of a linear reference from short-read alignments of many samples.
//! The graph starts as the reference backbone, with one node per base.
//! Each alignment may add deletion edges that skip reference bases and insertion branches with new nodes for the inserted bases.
//! The graphs are stored in a SQLite database, and later runs can load them and fold in more samples.
//!
//! See [`PanGraph`] for the graph, [`GraphSet`] for folding alignments into the graphs, and [`PggBase`] for the database interface.
//! [`build::build`] runs the entire pipeline from a reference FASTA file and a number of SAM files.
//!
//! ### Basic concepts
//!
//! Nodes are identified by integers starting from 1.
//! The first nodes of each graph form the reference backbone, so the identifier of a backbone node is also its 1-based reference position.
//! Nodes for inserted bases get the next unused identifiers, and identifiers are never reused or renumbered, even when a graph is stored and loaded again.
//!
//! Alignments are folded into the graphs in the order they are read.
//! Duplicate edges are allowed during folding and removed once at the end of a run.
//! The final set of edges does not depend on the order of the alignments, but the identifiers of insertion nodes do.
//!
//! Each contig is stored as an independent record in table `Contigs`, with node labels in table `Sequences` and edges in table `Edges`.
//! A graph is saved in a single transaction.

pub mod alignment;
pub mod build;
pub mod cigar;
pub mod db;
pub mod fold;
pub mod formats;
pub mod graph;
pub mod update;
pub mod utils;

pub use alignment::AlignmentRecord;
pub use build::{BuildParams, BuildStats};
pub use cigar::{CigarToken, DecodedAlignment, Operation};
pub use db::PggBase;
pub use fold::{FoldOutcome, FoldStats, GraphSet, SkipReason};
pub use graph::{NodeAllocator, PanGraph};
