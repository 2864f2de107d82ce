//! Building or extending a PGG-base database from a reference and a number of samples.
//!
//! [`build`] processes the tracked contigs in passes of at most [`BuildParams::contigs_per_pass`] contigs.
//! In each pass, it loads the stored graphs for the contigs of the pass, initializes the missing ones from the reference, folds the alignments from every sample into them, removes duplicate edges, and saves the graphs.
//! Only the graphs of one pass are in memory at the same time.
//!
//! A sample that cannot be read is skipped with a warning.
//! If an error log file is given, the failure is also appended to the file as a timestamped line.

use crate::{GraphSet, PanGraph, PggBase};
use crate::alignment;
use crate::fold::FoldStats;
use crate::formats::{self, FastaReader};
use crate::utils;

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};


//-----------------------------------------------------------------------------

/// Parameters for [`build`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildParams {
    /// Contigs to track, or [`None`] for the contigs in the database followed by the contigs in the reference.
    pub contigs: Option<Vec<String>>,
    /// Maximum number of contigs processed in the same pass; `0` processes all contigs in a single pass.
    pub contigs_per_pass: usize,
    /// Append sample read failures to this file.
    pub error_log: Option<PathBuf>,
}

impl BuildParams {
    /// Default number of contigs per pass.
    pub const CONTIGS_PER_PASS: usize = 1;
}

impl Default for BuildParams {
    fn default() -> Self {
        BuildParams {
            contigs: None,
            contigs_per_pass: Self::CONTIGS_PER_PASS,
            error_log: None,
        }
    }
}

//-----------------------------------------------------------------------------

/// Statistics for a [`build`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of passes over the samples.
    pub passes: usize,
    /// Contigs loaded from the database.
    pub contigs_loaded: usize,
    /// Contigs initialized from the reference.
    pub contigs_initialized: usize,
    /// Samples read successfully.
    pub samples: usize,
    /// Samples that could not be read.
    pub samples_failed: usize,
    /// Statistics for folding the alignment records.
    pub fold: FoldStats,
    /// Duplicate edges removed.
    pub duplicates_removed: usize,
    /// Total number of nodes in the saved graphs.
    pub nodes: usize,
    /// Total number of edges in the saved graphs.
    pub edges: usize,
}

impl BuildStats {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of contigs in the saved graphs.
    pub fn contigs(&self) -> usize {
        self.contigs_loaded + self.contigs_initialized
    }
}

//-----------------------------------------------------------------------------

/// Builds or extends the database `db_file` with alignments from the given samples.
///
/// The database is created if it does not exist.
/// Stored graphs are extended, and the graphs for the remaining tracked contigs are initialized from the `reference` FASTA file.
///
/// # Errors
///
/// Returns an error if the tracked contigs cannot be determined, a contig has neither a stored graph nor a reference sequence, or a stored graph is malformed.
/// Passes through database errors and structural errors from folding.
/// The graphs of the failing pass are not saved, while graphs saved in earlier passes remain in the database.
pub fn build(reference: Option<&Path>, samples: &[PathBuf], db_file: &Path, params: &BuildParams) -> Result<BuildStats, String> {
    if !PggBase::exists(db_file) {
        info!("Creating database {}", db_file.display());
        PggBase::create(db_file)?;
    }
    let mut database = PggBase::open_mut(db_file)?;

    let contigs = tracked_contigs(&database, reference, params)?;
    if contigs.is_empty() {
        return Err(String::from("No contigs to track"));
    }
    let tracked: HashSet<&str> = contigs.iter().map(|x| x.as_str()).collect();
    info!("Tracking {} contigs", contigs.len());

    let pass_size = if params.contigs_per_pass == 0 { contigs.len() } else { params.contigs_per_pass };
    let passes = contigs.len().div_ceil(pass_size);
    let mut stats = BuildStats::new();
    let mut failed: HashSet<usize> = HashSet::new();

    for (pass, pass_contigs) in contigs.chunks(pass_size).enumerate() {
        info!("Pass {} of {}: {}", pass + 1, passes, pass_contigs.join(", "));
        let mut graphs = load_graphs(&database, reference, pass_contigs, &mut stats)?;
        let in_pass: HashSet<&str> = pass_contigs.iter().map(|x| x.as_str()).collect();

        for (sample_id, sample) in samples.iter().enumerate() {
            if failed.contains(&sample_id) {
                continue;
            }
            let records = match alignment::read_sam_file(sample) {
                Ok(records) => records,
                Err(msg) => {
                    report_failure(sample, &msg, params.error_log.as_deref())?;
                    failed.insert(sample_id);
                    stats.samples_failed += 1;
                    continue;
                },
            };
            if pass == 0 {
                stats.samples += 1;
            }

            // Records for contigs in other passes are left for those passes.
            // Records for untracked contigs are counted in the first pass.
            let selected = records.iter().filter(|record| {
                let contig = record.contig.as_str();
                in_pass.contains(contig) || (pass == 0 && !tracked.contains(contig))
            });
            let sample_stats = graphs.fold_records(selected).map_err(|x| {
                format!("Sample {}: {}", sample.display(), x)
            })?;
            debug!(
                "Sample {}: folded {} of {} records, {} new nodes, {} new edges",
                sample.display(), sample_stats.folded, sample_stats.records, sample_stats.nodes_added, sample_stats.edges_added
            );
            stats.fold.merge(&sample_stats);
        }

        let removed = graphs.remove_duplicate_edges();
        stats.duplicates_removed += removed;
        info!("Removed {} duplicate edges", removed);

        for graph in graphs.iter() {
            database.save_graph(graph)?;
            stats.nodes += graph.nodes();
            stats.edges += graph.edge_count();
            info!("Saved contig {}: {} nodes, {} edges", graph.contig(), graph.nodes(), graph.edge_count());
        }
        stats.passes += 1;
    }

    Ok(stats)
}

// Returns the tracked contigs without duplicates.
fn tracked_contigs(database: &PggBase, reference: Option<&Path>, params: &BuildParams) -> Result<Vec<String>, String> {
    let mut result: Vec<String> = Vec::new();
    let mut found: HashSet<String> = HashSet::new();
    let mut add = |name: String| {
        if found.insert(name.clone()) {
            result.push(name);
        }
    };

    if let Some(contigs) = params.contigs.as_ref() {
        contigs.iter().cloned().for_each(&mut add);
        return Ok(result);
    }

    database.contig_names()?.into_iter().for_each(&mut add);
    if let Some(filename) = reference {
        reference_contigs(filename)?.into_iter().for_each(&mut add);
    }
    Ok(result)
}

/// Returns the names of the records in a FASTA file in file order.
pub fn reference_contigs(filename: &Path) -> Result<Vec<String>, String> {
    let reader = utils::open_file(filename)?;
    let mut result = Vec::new();
    for record in FastaReader::new(reader) {
        let (name, _) = record.map_err(|x| format!("{}: {}", filename.display(), x))?;
        result.push(name);
    }
    Ok(result)
}

// Loads or initializes the graphs for the given contigs.
fn load_graphs(database: &PggBase, reference: Option<&Path>, contigs: &[String], stats: &mut BuildStats) -> Result<GraphSet, String> {
    let mut graphs = GraphSet::new();
    let mut missing: Vec<&str> = Vec::new();
    for contig in contigs.iter() {
        match database.load_graph(contig)? {
            Some(graph) => {
                info!("Loaded contig {}: {} nodes, {} edges", contig, graph.nodes(), graph.edge_count());
                graphs.insert(graph)?;
                stats.contigs_loaded += 1;
            },
            None => missing.push(contig),
        }
    }
    if missing.is_empty() {
        return Ok(graphs);
    }

    let filename = reference.ok_or(format!("No reference for contigs without a stored graph: {}", missing.join(", ")))?;
    let sequences = formats::read_fasta_file(filename, |name| missing.contains(&name))?;
    for (name, sequence) in sequences {
        if graphs.contains(&name) {
            warn!("Ignoring a repeated reference sequence for contig {}", name);
            continue;
        }
        info!("Initialized contig {} from the reference: {} bp", name, sequence.len());
        graphs.insert(PanGraph::from_reference(&name, &sequence))?;
        stats.contigs_initialized += 1;
    }

    let absent: Vec<&str> = missing.into_iter().filter(|contig| !graphs.contains(contig)).collect();
    if !absent.is_empty() {
        return Err(format!("Contigs not found in reference {}: {}", filename.display(), absent.join(", ")));
    }
    Ok(graphs)
}

// Logs a sample read failure and appends it to the error log.
fn report_failure(sample: &Path, msg: &str, error_log: Option<&Path>) -> Result<(), String> {
    let line = format!("{}:Error occurred while reading {}: {}", utils::timestamp(), sample.display(), msg);
    warn!("{}", line);
    if let Some(filename) = error_log {
        let mut file = OpenOptions::new().create(true).append(true).open(filename).map_err(|x| {
            format!("Cannot open error log {}: {}", filename.display(), x)
        })?;
        writeln!(file, "{}", line).map_err(|x| x.to_string())?;
    }
    Ok(())
}

//-----------------------------------------------------------------------------
