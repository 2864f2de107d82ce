use std::path::PathBuf;
use std::time::Instant;
use std::{env, fs, process};

use pgg_base::{utils, BuildParams, PggBase};
use pgg_base::build;
use pgg_base::formats;
use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();
    utils::init_logging(config.verbosity);

    // Check if the database already exists.
    if PggBase::exists(&config.db_file) {
        if config.overwrite {
            eprintln!("Overwriting database {}", config.db_file.display());
            fs::remove_file(&config.db_file).map_err(|x| x.to_string())?;
        } else {
            eprintln!("Extending database {}", config.db_file.display());
        }
    }

    // Resolve contigs and samples.
    let mut params = config.params.clone();
    if let Some(filename) = config.contig_list.as_ref() {
        params.contigs = Some(formats::read_name_list(filename)?);
    }
    let mut samples = config.samples.clone();
    if let Some(filename) = config.sample_list.as_ref() {
        samples.extend(formats::read_name_list(filename)?.into_iter().map(PathBuf::from));
    }
    if samples.is_empty() {
        eprintln!("No samples were given; the graphs will only be initialized");
    }

    // Build the graphs.
    let stats = build::build(config.reference.as_deref(), &samples, &config.db_file, &params)?;

    // Statistics.
    eprintln!(
        "Processed {} contigs in {} passes: {} loaded, {} initialized from the reference",
        stats.contigs(), stats.passes, stats.contigs_loaded, stats.contigs_initialized
    );
    eprintln!("Read {} samples; {} samples could not be read", stats.samples, stats.samples_failed);
    let fold = &stats.fold;
    eprintln!(
        "Folded {} of {} records ({} unaligned, {} untracked, {} invalid, {} degenerate, {} out of bounds)",
        fold.folded, fold.records, fold.unaligned, fold.untracked, fold.invalid, fold.degenerate, fold.out_of_bounds
    );
    eprintln!(
        "Added {} nodes and {} edges; removed {} duplicate edges",
        fold.nodes_added, fold.edges_added, stats.duplicates_removed
    );
    eprintln!("The graphs contain {} nodes and {} edges", stats.nodes, stats.edges);
    if let Some(size) = utils::file_size(&config.db_file) {
        eprintln!("Database size: {}", size);
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub reference: Option<PathBuf>,
    pub contig_list: Option<PathBuf>,
    pub sample_list: Option<PathBuf>,
    pub samples: Vec<PathBuf>,
    pub db_file: PathBuf,
    pub params: BuildParams,
    pub overwrite: bool,
    pub verbosity: usize,
}

impl Config {
    const DEFAULT_OUTPUT: &'static str = "pgg.db";

    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("r", "reference", "reference FASTA file; required for contigs without a stored graph", "FILE");
        opts.optopt("c", "contigs", "track the contigs listed in this file (default: stored and reference contigs)", "FILE");
        opts.optopt("l", "samples", "read SAM file names from this file", "FILE");
        opts.optopt("o", "output", "database file (default: pgg.db)", "FILE");
        let pass_desc = format!("process at most N contigs per pass; 0 for all (default: {})", BuildParams::CONTIGS_PER_PASS);
        opts.optopt("p", "contigs-per-pass", &pass_desc, "N");
        opts.optopt("e", "error-log", "append unreadable samples to this file", "FILE");
        opts.optflag("", "overwrite", "overwrite the database file if it exists");
        opts.optflagmulti("v", "verbose", "print progress information; repeat for more");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] [sample1.sam [sample2.sam ...]]", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let mut params = BuildParams::default();
        if let Some(s) = matches.opt_str("p") {
            params.contigs_per_pass = match s.parse::<usize>() {
                Ok(x) => x,
                Err(e) => {
                    eprintln!("Error: Failed to parse --contigs-per-pass: {}", e);
                    process::exit(1);
                }
            };
        }
        params.error_log = matches.opt_str("e").map(PathBuf::from);

        let reference = matches.opt_str("r").map(PathBuf::from);
        let contig_list = matches.opt_str("c").map(PathBuf::from);
        let sample_list = matches.opt_str("l").map(PathBuf::from);
        let samples: Vec<PathBuf> = matches.free.iter().map(PathBuf::from).collect();
        if samples.is_empty() && sample_list.is_none() && reference.is_none() {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }
        let db_file = matches.opt_str("o").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(Self::DEFAULT_OUTPUT));

        Config {
            reference,
            contig_list,
            sample_list,
            samples,
            db_file,
            params,
            overwrite: matches.opt_present("overwrite"),
            verbosity: matches.opt_count("v"),
        }
    }
}

//-----------------------------------------------------------------------------
